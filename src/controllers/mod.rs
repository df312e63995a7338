//! Form-flow controllers.
//!
//! Every controller runs the same skeleton for a user action: read the form,
//! run the local validators in a fixed order (stopping at the first failure
//! with a warning), call the account API, then notify and perform the
//! follow-up action. Each step returns a `Result`, so the chain stops at the
//! first error.

pub mod change_email;
pub mod change_email_recovery;
pub mod change_password;
pub mod forgot_password;
pub mod login;
pub mod new_password;
pub mod profile;
pub mod register;

pub use change_email::{ChangeEmailController, ChangeEmailForm};
pub use change_email_recovery::{ChangeEmailRecoveryController, ChangeEmailRecoveryForm};
pub use change_password::{ChangePasswordController, ChangePasswordForm};
pub use forgot_password::{ForgotPasswordController, ForgotPasswordForm};
pub use login::{LoginController, LoginForm};
pub use new_password::{NewPasswordController, NewPasswordForm};
pub use profile::{ProfileController, PREFERENCE_LOAD_FAILED, PREFERENCE_SAVED};
pub use register::{RegisterController, RegisterForm};

use crate::api::{AccountApi, ApiError};
use crate::notify::Notifier;
use crate::session::SessionStore;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub const FILL_ALL_FIELDS: &str = "Please fill in all fields!";
pub const INVALID_EMAIL: &str = "Invalid email. Please enter a valid email address.";
pub const INVALID_PASSWORD: &str = "Invalid password.";
pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match!";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error.";
pub const SERVICE_UNREACHABLE: &str = "Unable to reach the account service.";
pub const PASSWORD_CHECK_FAILED: &str = "Unable to validate password.";
pub const SESSION_MISSING: &str = "Your session has expired. Please log in again.";

pub const TITLE_SUCCESS: &str = "Success";
pub const TITLE_ERROR: &str = "Error";
pub const TITLE_WARNING: &str = "Warning";
pub const TITLE_INFO: &str = "Info";

/// Collaborators shared by every controller
#[derive(Clone)]
pub struct PortalContext {
    pub api: Arc<dyn AccountApi>,
    pub notifier: Arc<dyn Notifier>,
    pub session: Arc<dyn SessionStore>,
}

impl PortalContext {
    pub fn new(
        api: Arc<dyn AccountApi>,
        notifier: Arc<dyn Notifier>,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            api,
            notifier,
            session,
        }
    }
}

/// Why a flow stopped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    /// Local check failed, nothing was sent
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The server rejected the credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Request rejected ({status}): {message}")]
    Client {
        status: u16,
        message: String,
    },

    #[error("Server error ({status})")]
    Server {
        status: u16,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response status {0}")]
    UnexpectedStatus(u16),

    #[error("No active session")]
    MissingSession,

    #[error("Could not store the session: {0}")]
    Session(String),

    #[error("A submission is already in progress")]
    Busy,
}

impl From<ApiError> for FlowError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Client {
                status,
                message,
            } => FlowError::Client {
                status,
                message,
            },
            ApiError::Server {
                status,
            } => FlowError::Server {
                status,
            },
            ApiError::Transport(msg) | ApiError::Decode(msg) => FlowError::Transport(msg),
            ApiError::UnexpectedStatus(status) => FlowError::UnexpectedStatus(status),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowPhase {
    #[default]
    Idle,
    Validating,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    Success,
    Failed,
}

#[derive(Debug, Default)]
struct GuardState {
    phase: FlowPhase,
    last_outcome: Option<FlowOutcome>,
}

/// Per-controller submission state: `Idle → Validating → Submitting → Idle`.
///
/// Only one chain may run at a time; a second submission is refused with
/// [`FlowError::Busy`] before anything is validated or sent.
#[derive(Debug, Default)]
pub struct FlowGuard {
    state: Mutex<GuardState>,
}

impl FlowGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Result<Submission<'_>, FlowError> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.phase != FlowPhase::Idle {
            log::warn!("Submission refused, another one is in progress");
            return Err(FlowError::Busy);
        }
        state.phase = FlowPhase::Validating;
        Ok(Submission {
            guard: self,
            outcome: FlowOutcome::Failed,
        })
    }

    pub fn phase(&self) -> FlowPhase {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).phase
    }

    pub fn last_outcome(&self) -> Option<FlowOutcome> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).last_outcome
    }

    fn set_phase(&self, phase: FlowPhase) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).phase = phase;
    }
}

/// An in-flight submission; dropping it returns the guard to `Idle`
pub struct Submission<'a> {
    guard: &'a FlowGuard,
    outcome: FlowOutcome,
}

impl Submission<'_> {
    pub fn submitting(&self) {
        self.guard.set_phase(FlowPhase::Submitting);
    }

    /// Record the terminal state of the chain
    pub fn finish<T>(mut self, result: Result<T, FlowError>) -> Result<T, FlowError> {
        self.outcome = if result.is_ok() {
            FlowOutcome::Success
        } else {
            FlowOutcome::Failed
        };
        result
    }
}

impl Drop for Submission<'_> {
    fn drop(&mut self) {
        let mut state = self.guard.state.lock().unwrap_or_else(|e| e.into_inner());
        state.last_outcome = Some(self.outcome);
        state.phase = FlowPhase::Idle;
    }
}

/// Warn about a failed local check and stop the chain
pub(crate) fn reject(notifier: &dyn Notifier, message: &str) -> FlowError {
    notifier.show_warning(message, TITLE_WARNING, None);
    FlowError::Validation(message.to_string())
}

/// Tell the user why a request failed.
///
/// Unexpected statuses are only logged.
pub(crate) fn report_api_error(notifier: &dyn Notifier, error: ApiError) -> FlowError {
    match &error {
        ApiError::Client {
            status,
            message,
        } => {
            log::warn!("Account API rejected the request ({}): {}", status, message);
            notifier.show_error(message, TITLE_ERROR, None);
        },
        ApiError::Server {
            status,
        } => {
            log::error!("Account API failed with status {}", status);
            notifier.show_error(INTERNAL_SERVER_ERROR, TITLE_ERROR, None);
        },
        ApiError::Transport(msg) | ApiError::Decode(msg) => {
            log::error!("Account API unreachable: {}", msg);
            notifier.show_error(SERVICE_UNREACHABLE, TITLE_ERROR, None);
        },
        ApiError::UnexpectedStatus(status) => {
            log::warn!("Ignoring unexpected account API status {}", status);
        },
    }
    error.into()
}

/// Check that a 2xx response is one the portal treats as done
pub(crate) fn ensure_accepted<T>(
    response: crate::api::ApiResponse<T>,
) -> Result<crate::api::ApiResponse<T>, ApiError> {
    if response.is_accepted() {
        Ok(response)
    } else {
        Err(ApiError::UnexpectedStatus(response.status))
    }
}

/// Token read at construction, or a warning when there is none
pub(crate) fn require_token(
    token: &Option<String>,
    notifier: &dyn Notifier,
) -> Result<String, FlowError> {
    match token {
        Some(token) => Ok(token.clone()),
        None => {
            notifier.show_warning(SESSION_MISSING, TITLE_WARNING, None);
            Err(FlowError::MissingSession)
        },
    }
}

/// Re-verify the current password with the server before a sensitive change.
///
/// `false` from the server is an authentication failure. A failed request is
/// reported as such and returned with its own classification so the caller
/// can offer a retry; in both cases the change is not submitted.
pub(crate) async fn confirm_password(
    ctx: &PortalContext,
    password: &str,
    token: &str,
) -> Result<(), FlowError> {
    match ctx.api.validate_user_password(password, token).await.and_then(ensure_accepted) {
        Ok(response) if response.body.is_valid_password => Ok(()),
        Ok(_) => {
            ctx.notifier.show_warning(INVALID_PASSWORD, TITLE_WARNING, None);
            Err(FlowError::Auth(INVALID_PASSWORD.to_string()))
        },
        Err(error) => {
            log::error!("Password verification failed: {}", error);
            ctx.notifier.show_error(PASSWORD_CHECK_FAILED, TITLE_ERROR, None);
            Err(error.into())
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::RecordingNotifier;
    use crate::notify::ToastKind;

    #[test]
    fn test_guard_refuses_overlapping_submissions() {
        let guard = FlowGuard::new();
        let first = guard.begin().unwrap();
        assert_eq!(guard.phase(), FlowPhase::Validating);
        assert_eq!(guard.begin().err(), Some(FlowError::Busy));

        first.submitting();
        assert_eq!(guard.phase(), FlowPhase::Submitting);
        drop(first);

        assert_eq!(guard.phase(), FlowPhase::Idle);
        assert_eq!(guard.last_outcome(), Some(FlowOutcome::Failed));
        assert!(guard.begin().is_ok());
    }

    #[test]
    fn test_guard_records_success() {
        let guard = FlowGuard::new();
        let submission = guard.begin().unwrap();
        let result: Result<u8, FlowError> = submission.finish(Ok(1));
        assert_eq!(result, Ok(1));
        assert_eq!(guard.last_outcome(), Some(FlowOutcome::Success));
        assert_eq!(guard.phase(), FlowPhase::Idle);
    }

    #[test]
    fn test_report_client_error_shows_server_message() {
        let notifier = RecordingNotifier::new();
        let error = report_api_error(
            &notifier,
            ApiError::Client {
                status: 409,
                message: "Email already in use".to_string(),
            },
        );
        assert_eq!(
            error,
            FlowError::Client {
                status: 409,
                message: "Email already in use".to_string()
            }
        );
        assert_eq!(notifier.last(), Some((ToastKind::Error, "Email already in use".to_string())));
    }

    #[test]
    fn test_report_server_error_is_generic() {
        let notifier = RecordingNotifier::new();
        report_api_error(
            &notifier,
            ApiError::Server {
                status: 502,
            },
        );
        assert_eq!(notifier.last(), Some((ToastKind::Error, INTERNAL_SERVER_ERROR.to_string())));
    }

    #[test]
    fn test_report_transport_error() {
        let notifier = RecordingNotifier::new();
        let error = report_api_error(&notifier, ApiError::Transport("refused".to_string()));
        assert_eq!(error, FlowError::Transport("refused".to_string()));
        assert_eq!(notifier.last(), Some((ToastKind::Error, SERVICE_UNREACHABLE.to_string())));
    }

    #[test]
    fn test_unexpected_status_is_only_logged() {
        let notifier = RecordingNotifier::new();
        let error = report_api_error(&notifier, ApiError::UnexpectedStatus(204));
        assert_eq!(error, FlowError::UnexpectedStatus(204));
        assert!(notifier.toasts().is_empty());
    }

    #[test]
    fn test_require_token() {
        let notifier = RecordingNotifier::new();
        assert_eq!(require_token(&Some("t".to_string()), &notifier), Ok("t".to_string()));
        assert_eq!(require_token(&None, &notifier), Err(FlowError::MissingSession));
        assert_eq!(notifier.last(), Some((ToastKind::Warning, SESSION_MISSING.to_string())));
    }
}
