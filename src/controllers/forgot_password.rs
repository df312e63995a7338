use super::{
    ensure_accepted, reject, report_api_error, FlowError, FlowGuard, FlowPhase, PortalContext,
    Submission, FILL_ALL_FIELDS, INVALID_EMAIL, TITLE_INFO,
};
use crate::ui::{Navigator, Route};
use crate::validation::{any_empty, is_valid_email};
use std::sync::Arc;

pub const RECOVERY_CODE_SENT: &str =
    "If the address belongs to an account, a recovery code has been sent to it.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForgotPasswordForm {
    pub email: String,
}

/// Request a password recovery code (`/forgot-password`)
pub struct ForgotPasswordController {
    ctx: PortalContext,
    navigator: Arc<dyn Navigator>,
    guard: FlowGuard,
}

impl ForgotPasswordController {
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

    pub async fn submit(&self, form: &ForgotPasswordForm) -> Result<(), FlowError> {
        let submission = self.guard.begin()?;
        let result = self.run(form, &submission).await;
        submission.finish(result)
    }

    async fn run(&self, form: &ForgotPasswordForm, submission: &Submission<'_>) -> Result<(), FlowError> {
        let notifier = self.ctx.notifier.as_ref();

        if any_empty(&[&form.email]) {
            return Err(reject(notifier, FILL_ALL_FIELDS));
        }
        if !is_valid_email(&form.email) {
            return Err(reject(notifier, INVALID_EMAIL));
        }

        submission.submitting();
        self.ctx
            .api
            .request_password_recovery(&form.email)
            .await
            .and_then(ensure_accepted)
            .map_err(|e| report_api_error(notifier, e))?;

        notifier.show_info(RECOVERY_CODE_SENT, TITLE_INFO, None);
        self.navigator.navigate(Route::NewPassword);
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

    fn setup() -> (MockAccountApi, RecordingNotifier, RecordingNavigator, ForgotPasswordController) {
        let api = MockAccountApi::new();
        let notifier = RecordingNotifier::new();
        let navigator = RecordingNavigator::new();
        let ctx = PortalContext::new(
            Arc::new(api.clone()),
            Arc::new(notifier.clone()),
            Arc::new(MemorySessionStore::new()),
        );
        let controller = ForgotPasswordController::new(ctx, Arc::new(navigator.clone()));
        (api, notifier, navigator, controller)
    }

    #[tokio::test]
    async fn test_code_requested() {
        let (api, notifier, navigator, controller) = setup();

        controller
            .submit(&ForgotPasswordForm {
                email: "maria@example.com".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(
            api.last_call(ApiOperation::RequestPasswordRecovery).unwrap().payload,
            json!({ "email": "maria@example.com" })
        );
        assert_eq!(notifier.last(), Some((ToastKind::Info, RECOVERY_CODE_SENT.to_string())));
        assert_eq!(navigator.history(), vec![Route::NewPassword]);
    }

    #[tokio::test]
    async fn test_missing_or_malformed_email() {
        let (api, _, navigator, controller) = setup();
        assert_eq!(
            controller.submit(&ForgotPasswordForm::default()).await,
            Err(FlowError::Validation(FILL_ALL_FIELDS.to_string()))
        );
        assert_eq!(
            controller
                .submit(&ForgotPasswordForm {
                    email: "maria@".to_string()
                })
                .await,
            Err(FlowError::Validation(INVALID_EMAIL.to_string()))
        );
        assert!(api.calls().is_empty());
        assert!(navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_service_down() {
        let (api, notifier, navigator, controller) = setup();
        api.respond(ApiOperation::RequestPasswordRecovery, 503, json!(null));

        let result = controller
            .submit(&ForgotPasswordForm {
                email: "maria@example.com".to_string(),
            })
            .await;

        assert_eq!(
            result,
            Err(FlowError::Server {
                status: 503
            })
        );
        assert_eq!(notifier.count(ToastKind::Error), 1);
        assert!(navigator.history().is_empty());
    }
}
