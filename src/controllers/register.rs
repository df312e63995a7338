//! Account registration flow (`/register`)

use super::{
    ensure_accepted, reject, report_api_error, FlowError, FlowGuard, FlowPhase, PortalContext,
    Submission, FILL_ALL_FIELDS, INVALID_EMAIL, PASSWORDS_DO_NOT_MATCH, TITLE_SUCCESS,
};
use crate::types::RegisterRequest;
use crate::ui::{Navigator, Route};
use crate::validation::password::PASSWORD_RULE_MESSAGE;
use crate::validation::{
    any_empty, document_kind, is_password_format_valid, is_valid_email, validate_cpf_or_cnpj,
    validate_name, DocumentKind,
};
use std::sync::Arc;

pub const INVALID_CPF: &str = "Invalid CPF!";
pub const INVALID_CNPJ: &str = "Invalid CNPJ!";
pub const INVALID_NAME: &str = "Invalid name.";
pub const ACCOUNT_CREATED: &str = "Account created successfully! You can now log in.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub cpf_cnpj: String,
    pub phone_number: String,
}

impl RegisterForm {
    /// Payload for one submission; the recovery address starts as the login email
    fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            name: self.name.trim().to_string(),
            email: self.email.clone(),
            email_recovery: self.email.clone(),
            password: self.password.clone(),
            cpf_cnpj: self.cpf_cnpj.clone(),
            phone_number: self.phone_number.clone(),
        }
    }
}

pub struct RegisterController {
    ctx: PortalContext,
    navigator: Arc<dyn Navigator>,
    guard: FlowGuard,
}

impl RegisterController {
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

    /// Checks run in a fixed order and stop at the first failure: fields
    /// present, password rule, confirmation, CPF/CNPJ, email, name.
    pub async fn submit(&self, form: &RegisterForm) -> Result<(), FlowError> {
        let submission = self.guard.begin()?;
        let result = self.run(form, &submission).await;
        submission.finish(result)
    }

    fn validate(&self, form: &RegisterForm) -> Result<(), FlowError> {
        let notifier = self.ctx.notifier.as_ref();

        if any_empty(&[
            &form.name,
            &form.email,
            &form.password,
            &form.confirm_password,
            &form.cpf_cnpj,
            &form.phone_number,
        ]) {
            return Err(reject(notifier, FILL_ALL_FIELDS));
        }
        if !is_password_format_valid(&form.password) {
            return Err(reject(notifier, PASSWORD_RULE_MESSAGE));
        }
        if form.password != form.confirm_password {
            return Err(reject(notifier, PASSWORDS_DO_NOT_MATCH));
        }
        if !validate_cpf_or_cnpj(&form.cpf_cnpj) {
            let message = match document_kind(&form.cpf_cnpj) {
                DocumentKind::Cpf => INVALID_CPF,
                DocumentKind::Cnpj => INVALID_CNPJ,
            };
            return Err(reject(notifier, message));
        }
        if !is_valid_email(&form.email) {
            return Err(reject(notifier, INVALID_EMAIL));
        }
        if !validate_name(&form.name) {
            return Err(reject(notifier, INVALID_NAME));
        }
        Ok(())
    }

    async fn run(&self, form: &RegisterForm, submission: &Submission<'_>) -> Result<(), FlowError> {
        self.validate(form)?;

        submission.submitting();
        let notifier = self.ctx.notifier.as_ref();
        self.ctx
            .api
            .register_user(&form.to_request())
            .await
            .and_then(ensure_accepted)
            .map_err(|e| report_api_error(notifier, e))?;

        log::info!("Account registered for {}", form.email);
        notifier.show_success(ACCOUNT_CREATED, TITLE_SUCCESS, None);
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

    fn setup() -> (MockAccountApi, RecordingNotifier, RecordingNavigator, RegisterController) {
        let api = MockAccountApi::new();
        let notifier = RecordingNotifier::new();
        let navigator = RecordingNavigator::new();
        let ctx = PortalContext::new(
            Arc::new(api.clone()),
            Arc::new(notifier.clone()),
            Arc::new(MemorySessionStore::new()),
        );
        let controller = RegisterController::new(ctx, Arc::new(navigator.clone()));
        (api, notifier, navigator, controller)
    }

    fn valid_form() -> RegisterForm {
        RegisterForm {
            name: "Maria Silva".to_string(),
            email: "maria@example.com".to_string(),
            password: "Secret12!".to_string(),
            confirm_password: "Secret12!".to_string(),
            cpf_cnpj: "111.444.777-35".to_string(),
            phone_number: "+55 11 98888-7777".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_success() {
        let (api, notifier, navigator, controller) = setup();

        controller.submit(&valid_form()).await.unwrap();

        let call = api.last_call(ApiOperation::RegisterUser).unwrap();
        assert_eq!(call.token, None);
        assert_eq!(
            call.payload,
            json!({
                "name": "Maria Silva",
                "email": "maria@example.com",
                "email_recovery": "maria@example.com",
                "password": "Secret12!",
                "cpf_cnpj": "111.444.777-35",
                "phone_number": "+55 11 98888-7777"
            })
        );
        assert_eq!(notifier.last(), Some((ToastKind::Success, ACCOUNT_CREATED.to_string())));
        assert_eq!(navigator.history(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn test_created_status_is_accepted() {
        let (api, _, navigator, controller) = setup();
        api.respond(ApiOperation::RegisterUser, 201, json!({ "id": "x" }));

        controller.submit(&valid_form()).await.unwrap();
        assert_eq!(navigator.history(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn test_empty_fields_make_no_request() {
        let (api, notifier, navigator, controller) = setup();
        let form = RegisterForm {
            phone_number: String::new(),
            ..valid_form()
        };

        let result = controller.submit(&form).await;

        assert_eq!(result, Err(FlowError::Validation(FILL_ALL_FIELDS.to_string())));
        assert!(api.calls().is_empty());
        assert_eq!(notifier.toasts(), vec![(ToastKind::Warning, FILL_ALL_FIELDS.to_string())]);
        assert!(navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_mismatch_stops_before_document_check() {
        let (api, notifier, _, controller) = setup();
        let form = RegisterForm {
            confirm_password: "Secret12?".to_string(),
            cpf_cnpj: "11111111111".to_string(),
            email: "not-an-email".to_string(),
            ..valid_form()
        };

        let result = controller.submit(&form).await;

        assert_eq!(result, Err(FlowError::Validation(PASSWORDS_DO_NOT_MATCH.to_string())));
        assert_eq!(notifier.toasts(), vec![(ToastKind::Warning, PASSWORDS_DO_NOT_MATCH.to_string())]);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_password_rule_checked_before_confirmation() {
        let (_, notifier, _, controller) = setup();
        let form = RegisterForm {
            password: "secret".to_string(),
            confirm_password: "different".to_string(),
            ..valid_form()
        };

        let result = controller.submit(&form).await;

        assert_eq!(result, Err(FlowError::Validation(PASSWORD_RULE_MESSAGE.to_string())));
        assert_eq!(notifier.count(ToastKind::Warning), 1);
    }

    #[tokio::test]
    async fn test_document_warning_names_the_kind() {
        let (api, notifier, _, controller) = setup();

        let cpf = RegisterForm {
            cpf_cnpj: "111.444.777-36".to_string(),
            ..valid_form()
        };
        assert_eq!(
            controller.submit(&cpf).await,
            Err(FlowError::Validation(INVALID_CPF.to_string()))
        );

        let cnpj = RegisterForm {
            cpf_cnpj: "11.222.333/0001-82".to_string(),
            ..valid_form()
        };
        assert_eq!(
            controller.submit(&cnpj).await,
            Err(FlowError::Validation(INVALID_CNPJ.to_string()))
        );
        assert_eq!(notifier.last(), Some((ToastKind::Warning, INVALID_CNPJ.to_string())));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_valid_cnpj_is_accepted() {
        let (api, _, _, controller) = setup();
        let form = RegisterForm {
            name: "Acme Ltda.".to_string(),
            cpf_cnpj: "11222333000181".to_string(),
            ..valid_form()
        };

        controller.submit(&form).await.unwrap();
        assert_eq!(api.call_count(ApiOperation::RegisterUser), 1);
    }

    #[tokio::test]
    async fn test_email_then_name() {
        let (_, _, _, controller) = setup();
        let bad_email = RegisterForm {
            email: "maria@example".to_string(),
            name: "4ria".to_string(),
            ..valid_form()
        };
        assert_eq!(
            controller.submit(&bad_email).await,
            Err(FlowError::Validation(INVALID_EMAIL.to_string()))
        );

        let bad_name = RegisterForm {
            name: "4ria".to_string(),
            ..valid_form()
        };
        assert_eq!(
            controller.submit(&bad_name).await,
            Err(FlowError::Validation(INVALID_NAME.to_string()))
        );
    }

    #[tokio::test]
    async fn test_duplicate_account_reports_server_message() {
        let (api, notifier, navigator, controller) = setup();
        api.respond(ApiOperation::RegisterUser, 409, json!({ "error": "Email already registered" }));

        let result = controller.submit(&valid_form()).await;

        assert!(matches!(
            result,
            Err(FlowError::Client {
                status: 409,
                ..
            })
        ));
        assert_eq!(notifier.last(), Some((ToastKind::Error, "Email already registered".to_string())));
        assert!(navigator.history().is_empty());
    }

    #[tokio::test]
    async fn test_unexpected_success_status_is_not_a_success() {
        let (api, notifier, navigator, controller) = setup();
        api.respond(ApiOperation::RegisterUser, 204, serde_json::Value::Null);

        let result = controller.submit(&valid_form()).await;

        assert_eq!(result, Err(FlowError::UnexpectedStatus(204)));
        assert!(notifier.toasts().is_empty());
        assert!(navigator.history().is_empty());
    }
}
