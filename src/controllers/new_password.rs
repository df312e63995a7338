use super::{
    ensure_accepted, reject, report_api_error, FlowError, FlowGuard, FlowPhase, PortalContext,
    Submission, FILL_ALL_FIELDS, PASSWORDS_DO_NOT_MATCH, TITLE_SUCCESS,
};
use crate::ui::{Navigator, Route};
use crate::validation::password::PASSWORD_RULE_MESSAGE;
use crate::validation::{any_empty, is_password_format_valid};
use std::sync::Arc;

pub const PASSWORD_RESET: &str = "Password changed! You can now log in with the new password.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPasswordForm {
    pub code: String,
    pub password: String,
    pub confirm_password: String,
}

/// Set a new password with a recovery code (`/new-password`)
pub struct NewPasswordController {
    ctx: PortalContext,
    navigator: Arc<dyn Navigator>,
    guard: FlowGuard,
}

impl NewPasswordController {
    pub fn new(ctx: PortalContext, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            ctx,
            navigator,
            guard: FlowGuard::new(),
        }
    }

    pub fn phase(&self) -> FlowPhase {
        self.guard.phase()
    }

    pub async fn submit(&self, form: &NewPasswordForm) -> Result<(), FlowError> {
        let submission = self.guard.begin()?;
        let result = self.run(form, &submission).await;
        submission.finish(result)
    }

    async fn run(&self, form: &NewPasswordForm, submission: &Submission<'_>) -> Result<(), FlowError> {
        let notifier = self.ctx.notifier.as_ref();
        let code = form.code.trim();

        if any_empty(&[code, &form.password, &form.confirm_password]) {
            return Err(reject(notifier, FILL_ALL_FIELDS));
        }
        if !is_password_format_valid(&form.password) {
            return Err(reject(notifier, PASSWORD_RULE_MESSAGE));
        }
        if form.password != form.confirm_password {
            return Err(reject(notifier, PASSWORDS_DO_NOT_MATCH));
        }

        submission.submitting();
        self.ctx
            .api
            .reset_password(code, &form.password)
            .await
            .and_then(ensure_accepted)
            .map_err(|e| report_api_error(notifier, e))?;

        notifier.show_success(PASSWORD_RESET, TITLE_SUCCESS, None);
        self.navigator.navigate(Route::Login);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{ApiOperation, MockAccountApi, RecordingNavigator, RecordingNotifier};
    use crate::notify::ToastKind;
    use crate::session::MemorySessionStore;
    use serde_json::json;

    fn setup() -> (MockAccountApi, RecordingNotifier, RecordingNavigator, NewPasswordController) {
        let api = MockAccountApi::new();
        let notifier = RecordingNotifier::new();
        let navigator = RecordingNavigator::new();
        let ctx = PortalContext::new(
            Arc::new(api.clone()),
            Arc::new(notifier.clone()),
            Arc::new(MemorySessionStore::new()),
        );
        let controller = NewPasswordController::new(ctx, Arc::new(navigator.clone()));
        (api, notifier, navigator, controller)
    }

    fn form() -> NewPasswordForm {
        NewPasswordForm {
            code: " 482913 ".to_string(),
            password: "Fresh123$".to_string(),
            confirm_password: "Fresh123$".to_string(),
        }
    }

    #[tokio::test]
    async fn test_reset_with_code() {
        let (api, notifier, navigator, controller) = setup();

        controller.submit(&form()).await.unwrap();

        assert_eq!(
            api.last_call(ApiOperation::ResetPassword).unwrap().payload,
            json!({ "code": "482913", "password": "Fresh123$" })
        );
        assert_eq!(notifier.last(), Some((ToastKind::Success, PASSWORD_RESET.to_string())));
        assert_eq!(navigator.history(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn test_blank_code_counts_as_empty() {
        let (api, _, _, controller) = setup();
        let result = controller
            .submit(&NewPasswordForm {
                code: "   ".to_string(),
                ..form()
            })
            .await;
        assert_eq!(result, Err(FlowError::Validation(FILL_ALL_FIELDS.to_string())));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_mismatch() {
        let (api, _, _, controller) = setup();
        let result = controller
            .submit(&NewPasswordForm {
                confirm_password: "Fresh123%".to_string(),
                ..form()
            })
            .await;
        assert_eq!(result, Err(FlowError::Validation(PASSWORDS_DO_NOT_MATCH.to_string())));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_expired_code() {
        let (api, notifier, navigator, controller) = setup();
        api.respond(ApiOperation::ResetPassword, 400, json!({ "error": "Invalid or expired code" }));

        let result = controller.submit(&form()).await;

        assert!(matches!(
            result,
            Err(FlowError::Client {
                status: 400,
                ..
            })
        ));
        assert_eq!(notifier.last(), Some((ToastKind::Error, "Invalid or expired code".to_string())));
        assert!(navigator.history().is_empty());
    }
}
