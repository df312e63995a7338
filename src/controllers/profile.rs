//! Profile page (`/home/profile`)
//!
//! Holds the snapshot of the signed-in account shown on the page, the
//! remember-password-change preference, and opens the edit dialogs. It is the
//! [`ViewRefresh`] target the modal flows call after a successful change.

use super::{
    ensure_accepted, report_api_error, FlowError, FlowGuard, FlowPhase, PortalContext, TITLE_ERROR,
    TITLE_SUCCESS,
};
use crate::types::UserProfile;
use crate::ui::{DialogKind, DialogManager, View, ViewRefresh};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

pub const PREFERENCE_SAVED: &str = "Preference saved.";
pub const PREFERENCE_LOAD_FAILED: &str = "Unable to load the preference.";

pub struct ProfileController {
    ctx: PortalContext,
    dialogs: Arc<DialogManager>,
    placeholder_photo: String,
    profile: RwLock<UserProfile>,
    remember_password_change: RwLock<bool>,
    toggle_guard: FlowGuard,
}

impl ProfileController {
    pub fn new(ctx: PortalContext, dialogs: Arc<DialogManager>, placeholder_photo: &str) -> Self {
        Self {
            ctx,
            dialogs,
            placeholder_photo: placeholder_photo.to_string(),
            profile: RwLock::new(UserProfile::default()),
            remember_password_change: RwLock::new(false),
            toggle_guard: FlowGuard::new(),
        }
    }

    pub fn profile(&self) -> UserProfile {
        self.profile.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn remember_password_change(&self) -> bool {
        *self.remember_password_change.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn toggle_phase(&self) -> FlowPhase {
        self.toggle_guard.phase()
    }

    fn set_profile(&self, profile: UserProfile) {
        *self.profile.write().unwrap_or_else(|e| e.into_inner()) = profile;
    }

    fn set_flag(&self, value: bool) {
        *self.remember_password_change.write().unwrap_or_else(|e| e.into_inner()) = value;
    }

    /// Fetch the preference flag, then the profile.
    ///
    /// The session is read on every call, so a login or logout made through
    /// the same portal is picked up. Without a session the snapshot is
    /// cleared and nothing is fetched. A failed flag fetch shows an error
    /// toast; a failed profile fetch is only logged and leaves the fallback
    /// profile in place.
    pub async fn load(&self) -> Result<(), FlowError> {
        let Some(token) = self.ctx.session.get_session_token() else {
            log::debug!("No session, skipping profile load");
            self.set_profile(UserProfile::default());
            self.set_flag(false);
            return Err(FlowError::MissingSession);
        };

        match self.ctx.api.get_remember_password_flag(&token).await.and_then(ensure_accepted) {
            Ok(response) => self.set_flag(response.body.is_flag_enable),
            Err(e) => {
                log::warn!("Could not load the remember-password-change flag: {}", e);
                self.ctx.notifier.show_error(PREFERENCE_LOAD_FAILED, TITLE_ERROR, None);
            },
        }

        match self.ctx.api.get_user_data(&token).await.and_then(ensure_accepted) {
            Ok(response) => {
                self.set_profile(response.body.with_photo_placeholder(&self.placeholder_photo));
                Ok(())
            },
            Err(e) => {
                log::error!("Could not load the profile: {}", e);
                self.set_profile(UserProfile::fallback(&self.placeholder_photo));
                Err(e.into())
            },
        }
    }

    /// Flip the flag and persist it; the previous value comes back on failure
    pub async fn toggle_remember_password_change(&self) -> Result<bool, FlowError> {
        let submission = self.toggle_guard.begin()?;
        let result = async {
            let token = super::require_token(
                &self.ctx.session.get_session_token(),
                self.ctx.notifier.as_ref(),
            )?;
            let previous = self.remember_password_change();
            let next = !previous;
            self.set_flag(next);

            submission.submitting();
            match self.ctx.api.set_remember_password_flag(&token, next).await.and_then(ensure_accepted) {
                Ok(_) => {
                    self.ctx.notifier.show_success(PREFERENCE_SAVED, TITLE_SUCCESS, None);
                    Ok(next)
                },
                Err(e) => {
                    self.set_flag(previous);
                    Err(report_api_error(self.ctx.notifier.as_ref(), e))
                },
            }
        }
        .await;
        submission.finish(result)
    }

    pub fn open_change_email(&self) {
        self.dialogs.open(DialogKind::ChangeEmail);
    }

    pub fn open_change_email_recovery(&self) {
        self.dialogs.open(DialogKind::ChangeEmailRecovery);
    }

    pub fn open_change_password(&self) {
        self.dialogs.open(DialogKind::ChangePassword);
    }

    pub fn open_change_personal_information(&self) {
        self.dialogs.open(DialogKind::ChangePersonalInformation);
    }
}

#[async_trait]
impl ViewRefresh for ProfileController {
    async fn refresh(&self, view: View) {
        if view != View::Profile {
            return;
        }
        if let Err(e) = self.load().await {
            log::warn!("Profile refresh failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{ApiOperation, MockAccountApi, RecordingNotifier};
    use crate::notify::ToastKind;
    use crate::session::{MemorySessionStore, SessionStore};
    use serde_json::json;

    const PLACEHOLDER: &str = "assets/images/shared/profile-photo.svg";

    fn setup_with(session: MemorySessionStore) -> (MockAccountApi, RecordingNotifier, Arc<DialogManager>, ProfileController) {
        let api = MockAccountApi::new();
        let notifier = RecordingNotifier::new();
        let dialogs = Arc::new(DialogManager::new());
        let ctx = PortalContext::new(Arc::new(api.clone()), Arc::new(notifier.clone()), Arc::new(session));
        let controller = ProfileController::new(ctx, dialogs.clone(), PLACEHOLDER);
        (api, notifier, dialogs, controller)
    }

    fn setup() -> (MockAccountApi, RecordingNotifier, Arc<DialogManager>, ProfileController) {
        setup_with(MemorySessionStore::with_token("session-token"))
    }

    #[tokio::test]
    async fn test_load_fetches_flag_then_profile() {
        let (api, _, _, controller) = setup();
        api.respond(ApiOperation::GetRememberPasswordFlag, 200, json!({ "isFlagEnable": true }));

        controller.load().await.unwrap();

        assert_eq!(
            api.operations(),
            vec![ApiOperation::GetRememberPasswordFlag, ApiOperation::GetUserData]
        );
        assert!(controller.remember_password_change());
        let profile = controller.profile();
        assert_eq!(profile.name.as_deref(), Some("Test User"));
        assert_eq!(profile.email.as_deref(), Some("test@example.com"));
        // null photo from the server
        assert_eq!(profile.profile_photo.as_deref(), Some(PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_server_error_yields_fallback_profile() {
        let (api, notifier, _, controller) = setup();
        api.respond(ApiOperation::GetUserData, 500, json!(null));

        let result = controller.load().await;

        assert_eq!(
            result,
            Err(FlowError::Server {
                status: 500
            })
        );
        assert_eq!(controller.profile(), UserProfile::fallback(PLACEHOLDER));
        // profile failures are logged, not toasted
        assert_eq!(notifier.count(ToastKind::Error), 0);
    }

    #[tokio::test]
    async fn test_flag_failure_does_not_block_profile() {
        let (api, notifier, _, controller) = setup();
        api.respond(ApiOperation::GetRememberPasswordFlag, 500, json!(null));

        controller.load().await.unwrap();

        assert!(!controller.remember_password_change());
        assert_eq!(controller.profile().name.as_deref(), Some("Test User"));
        assert_eq!(notifier.last(), Some((ToastKind::Error, PREFERENCE_LOAD_FAILED.to_string())));
    }

    #[tokio::test]
    async fn test_load_follows_session_changes() {
        let session = Arc::new(MemorySessionStore::new());
        let api = MockAccountApi::new();
        let ctx = PortalContext::new(Arc::new(api.clone()), Arc::new(RecordingNotifier::new()), session.clone());
        let controller = ProfileController::new(ctx, Arc::new(DialogManager::new()), PLACEHOLDER);

        assert_eq!(controller.load().await, Err(FlowError::MissingSession));

        session.set_session_token("fresh-token").unwrap();
        controller.load().await.unwrap();
        assert_eq!(controller.profile().name.as_deref(), Some("Test User"));
        assert_eq!(api.last_call(ApiOperation::GetUserData).unwrap().token.as_deref(), Some("fresh-token"));

        session.clear_session().unwrap();
        assert_eq!(controller.load().await, Err(FlowError::MissingSession));
        assert_eq!(controller.profile(), UserProfile::default());
        assert_eq!(api.call_count(ApiOperation::GetUserData), 1);
    }

    #[tokio::test]
    async fn test_no_session_skips_fetching() {
        let (api, _, _, controller) = setup_with(MemorySessionStore::new());

        assert_eq!(controller.load().await, Err(FlowError::MissingSession));
        assert!(api.calls().is_empty());
        assert_eq!(controller.profile(), UserProfile::default());
    }

    #[tokio::test]
    async fn test_toggle_persists_new_value() {
        let (api, notifier, _, controller) = setup();

        assert_eq!(controller.toggle_remember_password_change().await, Ok(true));

        assert!(controller.remember_password_change());
        assert_eq!(
            api.last_call(ApiOperation::SetRememberPasswordFlag).unwrap().payload,
            json!({ "flagValue": true })
        );
        assert_eq!(notifier.last(), Some((ToastKind::Success, PREFERENCE_SAVED.to_string())));
        assert_eq!(controller.toggle_phase(), FlowPhase::Idle);
    }

    #[tokio::test]
    async fn test_toggle_failure_restores_flag() {
        let (api, notifier, _, controller) = setup();
        api.respond(ApiOperation::SetRememberPasswordFlag, 502, json!(null));

        let result = controller.toggle_remember_password_change().await;

        assert_eq!(
            result,
            Err(FlowError::Server {
                status: 502
            })
        );
        assert!(!controller.remember_password_change());
        assert_eq!(notifier.count(ToastKind::Error), 1);
    }

    #[tokio::test]
    async fn test_refresh_reloads_only_profile_view() {
        let (api, _, _, controller) = setup();

        controller.refresh(View::DashboardCharts).await;
        assert!(api.calls().is_empty());

        controller.refresh(View::Profile).await;
        assert_eq!(api.call_count(ApiOperation::GetUserData), 1);
    }

    #[tokio::test]
    async fn test_open_dialogs() {
        let (_, _, dialogs, controller) = setup();
        controller.open_change_email();
        controller.open_change_password();
        controller.open_change_email();

        assert!(dialogs.is_open(DialogKind::ChangeEmail));
        assert!(dialogs.is_open(DialogKind::ChangePassword));
        assert!(!dialogs.is_open(DialogKind::ChangeEmailRecovery));

        controller.open_change_email_recovery();
        controller.open_change_personal_information();
        assert_eq!(dialogs.open_dialogs().len(), 4);
    }
}
