use super::{
    confirm_password, ensure_accepted, reject, report_api_error, require_token, FlowError,
    FlowGuard, FlowPhase, PortalContext, Submission, FILL_ALL_FIELDS, PASSWORDS_DO_NOT_MATCH,
    TITLE_SUCCESS,
};
use crate::ui::{DialogKind, DialogManager, View, ViewRefresh};
use crate::validation::password::PASSWORD_RULE_MESSAGE;
use crate::validation::{any_empty, is_password_format_valid};
use std::sync::Arc;

pub const PASSWORD_UPDATED: &str = "Password updated successfully.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangePasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

/// Modal flow replacing the account password.
///
/// The current password is verified server-side before the new one is sent.
pub struct ChangePasswordController {
    ctx: PortalContext,
    dialogs: Arc<DialogManager>,
    views: Arc<dyn ViewRefresh>,
    access_token: Option<String>,
    guard: FlowGuard,
}

impl ChangePasswordController {
    pub fn new(ctx: PortalContext, dialogs: Arc<DialogManager>, views: Arc<dyn ViewRefresh>) -> Self {
        let access_token = ctx.session.get_session_token();
        Self {
            ctx,
            dialogs,
            views,
            access_token,
            guard: FlowGuard::new(),
        }
    }

    pub fn open_dialog(&self) {
        self.dialogs.open(DialogKind::ChangePassword);
    }

    pub fn phase(&self) -> FlowPhase {
        self.guard.phase()
    }

    pub async fn submit(&self, form: &ChangePasswordForm) -> Result<(), FlowError> {
        let submission = self.guard.begin()?;
        let result = self.run(form, &submission).await;
        submission.finish(result)
    }

    async fn run(&self, form: &ChangePasswordForm, submission: &Submission<'_>) -> Result<(), FlowError> {
        let notifier = self.ctx.notifier.as_ref();

        if any_empty(&[&form.current_password, &form.new_password, &form.confirm_password]) {
            return Err(reject(notifier, FILL_ALL_FIELDS));
        }
        if !is_password_format_valid(&form.new_password) {
            return Err(reject(notifier, PASSWORD_RULE_MESSAGE));
        }
        if form.new_password != form.confirm_password {
            return Err(reject(notifier, PASSWORDS_DO_NOT_MATCH));
        }
        let token = require_token(&self.access_token, notifier)?;

        submission.submitting();
        confirm_password(&self.ctx, &form.current_password, &token).await?;

        self.ctx
            .api
            .request_update_password(&form.new_password, &token)
            .await
            .and_then(ensure_accepted)
            .map_err(|e| report_api_error(notifier, e))?;

        log::info!("Account password changed");
        notifier.show_success(PASSWORD_UPDATED, TITLE_SUCCESS, None);
        self.dialogs.close_all();
        self.views.refresh(View::Profile).await;
        Ok(())
    }
}
