use super::{
    ensure_accepted, reject, report_api_error, FlowError, FlowGuard, FlowPhase, PortalContext,
    Submission, FILL_ALL_FIELDS, INVALID_EMAIL, TITLE_ERROR, TITLE_INFO, TITLE_SUCCESS,
};
use crate::ui::{Navigator, Route};
use crate::validation::{any_empty, is_valid_email};
use std::sync::Arc;

pub const LOGIN_SUCCESS: &str = "Welcome back!";
pub const LOGGED_OUT: &str = "You have been logged out.";
pub const SESSION_NOT_STORED: &str = "Could not store your session.";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login and logout (`/login`)
pub struct LoginController {
    ctx: PortalContext,
    navigator: Arc<dyn Navigator>,
    guard: FlowGuard,
}

impl LoginController {
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

    /// Exchange credentials for an access token, store it and go home
    pub async fn submit(&self, form: &LoginForm) -> Result<(), FlowError> {
        let submission = self.guard.begin()?;
        let result = self.run(form, &submission).await;
        submission.finish(result)
    }

    async fn run(&self, form: &LoginForm, submission: &Submission<'_>) -> Result<(), FlowError> {
        let notifier = self.ctx.notifier.as_ref();

        if any_empty(&[&form.email, &form.password]) {
            return Err(reject(notifier, FILL_ALL_FIELDS));
        }
        if !is_valid_email(&form.email) {
            return Err(reject(notifier, INVALID_EMAIL));
        }

        submission.submitting();
        let response = self
            .ctx
            .api
            .login(&form.email, &form.password)
            .await
            .and_then(ensure_accepted)
            .map_err(|e| report_api_error(notifier, e))?;

        self.ctx.session.set_session_token(&response.body.access_token).map_err(|e| {
            log::error!("Failed to store session: {}", e);
            notifier.show_error(SESSION_NOT_STORED, TITLE_ERROR, None);
            FlowError::Session(e.to_string())
        })?;

        log::info!("Logged in as {}", form.email);
        notifier.show_success(LOGIN_SUCCESS, TITLE_SUCCESS, None);
        self.navigator.navigate(Route::Home);
        Ok(())
    }

    /// Drop the stored session and return to the login page
    pub fn logout(&self) -> Result<(), FlowError> {
        self.ctx.session.clear_session().map_err(|e| {
            log::error!("Failed to clear session: {}", e);
            FlowError::Session(e.to_string())
        })?;
        self.ctx.notifier.show_info(LOGGED_OUT, TITLE_INFO, None);
        self.navigator.navigate(Route::Login);
        Ok(())
    }
}
