//! Portal assembly.
//!
//! Builds the collaborators once from [`PortalConfig`] and hands out
//! controllers sharing them.

use crate::api::{AccountApi, HttpAccountApi};
use crate::controllers::{
    ChangeEmailController, ChangeEmailRecoveryController, ChangePasswordController,
    ForgotPasswordController, LoginController, NewPasswordController, PortalContext,
    ProfileController, RegisterController,
};
use crate::notify::{ConsoleNotifier, Notifier};
use crate::session::{FileSessionStore, MemorySessionStore, SessionStore};
use crate::types::PortalConfig;
use crate::ui::{DialogManager, Navigator, Route, Router, ViewRefresh};
use std::sync::Arc;

pub struct Portal {
    ctx: PortalContext,
    dialogs: Arc<DialogManager>,
    router: Arc<Router>,
    profile: Arc<ProfileController>,
}

impl Portal {
    pub fn from_config(config: &PortalConfig) -> Self {
        let session: Arc<dyn SessionStore> = match &config.session_file {
            Some(path) => Arc::new(FileSessionStore::new(path)),
            None => Arc::new(MemorySessionStore::new()),
        };
        log::debug!("Account API at {}", config.api_base_url);

        Self::new(
            Arc::new(HttpAccountApi::new(config.api_base_url.as_str())),
            Arc::new(ConsoleNotifier::new()),
            session,
            &config.default_profile_photo,
        )
    }

    pub fn new(
        api: Arc<dyn AccountApi>,
        notifier: Arc<dyn Notifier>,
        session: Arc<dyn SessionStore>,
        placeholder_photo: &str,
    ) -> Self {
        let ctx = PortalContext::new(api, notifier, session.clone());
        let dialogs = Arc::new(DialogManager::new());
        let router = Arc::new(Router::new(session));
        let profile = Arc::new(ProfileController::new(ctx.clone(), dialogs.clone(), placeholder_photo));
        Self {
            ctx,
            dialogs,
            router,
            profile,
        }
    }

    pub fn context(&self) -> &PortalContext {
        &self.ctx
    }

    pub fn dialogs(&self) -> Arc<DialogManager> {
        self.dialogs.clone()
    }

    pub fn router(&self) -> Arc<Router> {
        self.router.clone()
    }

    /// Guarded navigation; returns the route actually shown
    pub fn navigate(&self, route: Route) -> Route {
        self.router.navigate(route)
    }

    pub fn profile(&self) -> Arc<ProfileController> {
        self.profile.clone()
    }

    fn navigator(&self) -> Arc<dyn Navigator> {
        self.router.clone()
    }

    fn views(&self) -> Arc<dyn ViewRefresh> {
        self.profile.clone()
    }

    pub fn register(&self) -> RegisterController {
        RegisterController::new(self.ctx.clone(), self.navigator())
    }

    pub fn login(&self) -> LoginController {
        LoginController::new(self.ctx.clone(), self.navigator())
    }

    pub fn forgot_password(&self) -> ForgotPasswordController {
        ForgotPasswordController::new(self.ctx.clone(), self.navigator())
    }

    pub fn new_password(&self) -> NewPasswordController {
        NewPasswordController::new(self.ctx.clone(), self.navigator())
    }

    pub fn change_email(&self) -> ChangeEmailController {
        ChangeEmailController::new(self.ctx.clone(), self.dialogs.clone(), self.views())
    }

    pub fn change_email_recovery(&self) -> ChangeEmailRecoveryController {
        ChangeEmailRecoveryController::new(self.ctx.clone(), self.dialogs.clone(), self.views())
    }

    pub fn change_password(&self) -> ChangePasswordController {
        ChangePasswordController::new(self.ctx.clone(), self.dialogs.clone(), self.views())
    }
}
