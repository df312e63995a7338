//! Toast notifications.
//!
//! Notifications are fire-and-forget from the caller's side: showing a toast
//! never fails and never waits on the user.

use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToastKind::Success => write!(f, "success"),
            ToastKind::Error => write!(f, "error"),
            ToastKind::Warning => write!(f, "warning"),
            ToastKind::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastPosition {
    TopCenter,
    TopRight,
    BottomCenter,
    BottomRight,
}

/// Display configuration of a toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastOptions {
    pub time_out: Duration,
    pub position: ToastPosition,
    pub tap_to_dismiss: bool,
    pub newest_on_top: bool,
}

impl Default for ToastOptions {
    fn default() -> Self {
        Self {
            time_out: Duration::from_millis(5000),
            position: ToastPosition::TopCenter,
            tap_to_dismiss: true,
            newest_on_top: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub title: String,
    pub message: String,
    pub options: ToastOptions,
    pub created_at: DateTime<Utc>,
}

impl Toast {
    pub fn new(kind: ToastKind, message: &str, title: &str, options: Option<ToastOptions>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: title.to_string(),
            message: message.to_string(),
            options: options.unwrap_or_default(),
            created_at: Utc::now(),
        }
    }
}

/// Sink for user-facing messages
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);

    fn show_success(&self, message: &str, title: &str, options: Option<ToastOptions>) {
        self.notify(Toast::new(ToastKind::Success, message, title, options));
    }

    fn show_error(&self, message: &str, title: &str, options: Option<ToastOptions>) {
        self.notify(Toast::new(ToastKind::Error, message, title, options));
    }

    fn show_warning(&self, message: &str, title: &str, options: Option<ToastOptions>) {
        self.notify(Toast::new(ToastKind::Warning, message, title, options));
    }

    fn show_info(&self, message: &str, title: &str, options: Option<ToastOptions>) {
        self.notify(Toast::new(ToastKind::Info, message, title, options));
    }
}

/// Prints toasts on stderr
#[derive(Debug, Default, Clone)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }

    fn render(toast: &Toast) -> String {
        let marker = match toast.kind {
            ToastKind::Success => "✔",
            ToastKind::Error => "✖",
            ToastKind::Warning => "!",
            ToastKind::Info => "i",
        };
        format!("[{}] {}: {}", marker, toast.title, toast.message)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, toast: Toast) {
        log::debug!("{} toast {}: {}", toast.kind, toast.id, toast.message);
        eprintln!("{}", Self::render(&toast));
    }
}
