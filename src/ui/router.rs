//! Route table and session guard.

use crate::session::SessionStore;
use std::fmt;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Register,
    ForgotPassword,
    NewPassword,
    Home,
    Profile,
    DashboardApiKeys,
    DashboardCharts,
}

impl Route {
    pub const ALL: [Route; 8] = [
        Route::Login,
        Route::Register,
        Route::ForgotPassword,
        Route::NewPassword,
        Route::Home,
        Route::Profile,
        Route::DashboardApiKeys,
        Route::DashboardCharts,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::ForgotPassword => "/forgot-password",
            Route::NewPassword => "/new-password",
            Route::Home => "/home",
            Route::Profile => "/home/profile",
            Route::DashboardApiKeys => "/home/dashboard-api-keys",
            Route::DashboardCharts => "/home/dashboard-charts",
        }
    }

    /// Parse a path, tolerating a missing leading or an extra trailing slash
    pub fn from_path(path: &str) -> Option<Route> {
        let trimmed = path.trim().trim_end_matches('/');
        let normalized = if trimmed.starts_with('/') {
            trimmed.to_string()
        } else {
            format!("/{}", trimmed)
        };
        Route::ALL.iter().copied().find(|route| route.path() == normalized)
    }

    /// Every `/home` child needs a session
    pub fn requires_session(&self) -> bool {
        matches!(
            self,
            Route::Home | Route::Profile | Route::DashboardApiKeys | Route::DashboardCharts
        )
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Guard for the `/home` subtree
pub struct AuthGuard;

impl AuthGuard {
    /// `Err(Route::Login)` when the route needs a session that is missing
    pub fn can_activate(route: Route, session: &dyn SessionStore) -> Result<Route, Route> {
        if route.requires_session() && !session.has_session() {
            log::info!("Access to {} denied without a session, redirecting to login", route);
            return Err(Route::Login);
        }
        Ok(route)
    }
}

pub trait Navigator: Send + Sync {
    /// Activate a route, returning the route actually shown
    fn navigate(&self, route: Route) -> Route;
}

/// Guarded navigator tracking the active route
pub struct Router {
    session: Arc<dyn SessionStore>,
    current: RwLock<Route>,
}

impl Router {
    pub fn new(session: Arc<dyn SessionStore>) -> Self {
        Self {
            session,
            current: RwLock::new(Route::Login),
        }
    }

    pub fn current(&self) -> Route {
        *self.current.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl Navigator for Router {
    fn navigate(&self, route: Route) -> Route {
        let target = AuthGuard::can_activate(route, self.session.as_ref()).unwrap_or_else(|r| r);
        *self.current.write().unwrap_or_else(|e| e.into_inner()) = target;
        log::debug!("Navigated to {}", target);
        target
    }
}
