use async_trait::async_trait;
use std::fmt;

/// Views whose data can be re-fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Profile,
    DashboardApiKeys,
    DashboardCharts,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            View::Home => write!(f, "home"),
            View::Profile => write!(f, "profile"),
            View::DashboardApiKeys => write!(f, "dashboard-api-keys"),
            View::DashboardCharts => write!(f, "dashboard-charts"),
        }
    }
}

/// Hook used after a successful mutation instead of reloading the whole page
#[async_trait]
pub trait ViewRefresh: Send + Sync {
    async fn refresh(&self, view: View);
}
