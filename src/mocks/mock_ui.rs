use crate::notify::{Notifier, Toast, ToastKind};
use crate::ui::{Navigator, Route, View, ViewRefresh};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct RecordingNotifier {
    toasts: Arc<Mutex<Vec<Toast>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<(ToastKind, String)> {
        self.toasts.lock().unwrap().iter().map(|t| (t.kind, t.message.clone())).collect()
    }

    pub fn last(&self) -> Option<(ToastKind, String)> {
        self.toasts().pop()
    }

    pub fn count(&self, kind: ToastKind) -> usize {
        self.toasts.lock().unwrap().iter().filter(|t| t.kind == kind).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().unwrap().push(toast);
    }
}

/// Navigator without a guard, remembering every request
#[derive(Clone, Default)]
pub struct RecordingNavigator {
    history: Arc<Mutex<Vec<Route>>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Route> {
        self.history.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) -> Route {
        self.history.lock().unwrap().push(route);
        route
    }
}

#[derive(Clone, Default)]
pub struct RecordingRefresher {
    refreshed: Arc<Mutex<Vec<View>>>,
}

impl RecordingRefresher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refreshed(&self) -> Vec<View> {
        self.refreshed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ViewRefresh for RecordingRefresher {
    async fn refresh(&self, view: View) {
        self.refreshed.lock().unwrap().push(view);
    }
}
