use super::{
    confirm_password, ensure_accepted, reject, report_api_error, require_token, FlowError,
    FlowGuard, FlowPhase, PortalContext, Submission, FILL_ALL_FIELDS, INVALID_EMAIL,
    INVALID_PASSWORD, TITLE_SUCCESS,
};
use crate::types::UserProfile;
use crate::ui::{DialogKind, DialogManager, View, ViewRefresh};
use crate::validation::{any_empty, is_password_format_valid, is_valid_email};
use std::sync::Arc;

pub const EMAIL_RECOVERY_UPDATED: &str = "Recovery email updated successfully.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeEmailRecoveryForm {
    pub email_recovery: String,
    pub password: String,
}

/// Modal flow replacing the account's recovery address
pub struct ChangeEmailRecoveryController {
    ctx: PortalContext,
    dialogs: Arc<DialogManager>,
    views: Arc<dyn ViewRefresh>,
    access_token: Option<String>,
    guard: FlowGuard,
}

impl ChangeEmailRecoveryController {
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
        self.dialogs.open(DialogKind::ChangeEmailRecovery);
    }

    pub fn phase(&self) -> FlowPhase {
        self.guard.phase()
    }

    pub async fn submit(&self, form: &ChangeEmailRecoveryForm) -> Result<(), FlowError> {
        let submission = self.guard.begin()?;
        let result = self.run(form, &submission).await;
        submission.finish(result)
    }

    async fn run(
        &self,
        form: &ChangeEmailRecoveryForm,
        submission: &Submission<'_>,
    ) -> Result<(), FlowError> {
        let notifier = self.ctx.notifier.as_ref();

        if any_empty(&[&form.email_recovery, &form.password]) {
            return Err(reject(notifier, FILL_ALL_FIELDS));
        }
        if !is_valid_email(&form.email_recovery) {
            return Err(reject(notifier, INVALID_EMAIL));
        }
        if !is_password_format_valid(&form.password) {
            return Err(reject(notifier, INVALID_PASSWORD));
        }
        let token = require_token(&self.access_token, notifier)?;

        submission.submitting();
        confirm_password(&self.ctx, &form.password, &token).await?;

        let profile = UserProfile {
            email_recovery: Some(form.email_recovery.clone()),
            ..UserProfile::default()
        };
        self.ctx
            .api
            .request_update_email_recovery(&profile, &token)
            .await
            .and_then(ensure_accepted)
            .map_err(|e| report_api_error(notifier, e))?;

        log::info!("Account recovery email changed");
        notifier.show_success(EMAIL_RECOVERY_UPDATED, TITLE_SUCCESS, None);
        self.dialogs.close_all();
        self.views.refresh(View::Profile).await;
        Ok(())
    }
}
