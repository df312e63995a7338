//! Modal dialog state.
//!
//! Each dialog is either `Closed` or `Open`. Controllers ask the manager to
//! change state; they never own the dialogs themselves.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKind {
    ChangeEmail,
    ChangeEmailRecovery,
    ChangePassword,
    ChangePersonalInformation,
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogKind::ChangeEmail => write!(f, "change-email"),
            DialogKind::ChangeEmailRecovery => write!(f, "change-email-recovery"),
            DialogKind::ChangePassword => write!(f, "change-password"),
            DialogKind::ChangePersonalInformation => write!(f, "change-personal-information"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogState {
    #[default]
    Closed,
    Open,
}

#[derive(Debug, Default)]
pub struct DialogManager {
    dialogs: Mutex<HashMap<DialogKind, DialogState>>,
}

impl DialogManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opening an already open dialog is a no-op
    pub fn open(&self, kind: DialogKind) {
        let mut dialogs = self.dialogs.lock().unwrap_or_else(|e| e.into_inner());
        if dialogs.insert(kind, DialogState::Open) != Some(DialogState::Open) {
            log::debug!("Dialog {} opened", kind);
        }
    }

    pub fn close(&self, kind: DialogKind) {
        let mut dialogs = self.dialogs.lock().unwrap_or_else(|e| e.into_inner());
        if dialogs.insert(kind, DialogState::Closed) == Some(DialogState::Open) {
            log::debug!("Dialog {} closed", kind);
        }
    }

    pub fn close_all(&self) {
        let mut dialogs = self.dialogs.lock().unwrap_or_else(|e| e.into_inner());
        for (kind, state) in dialogs.iter_mut() {
            if *state == DialogState::Open {
                log::debug!("Dialog {} closed", kind);
            }
            *state = DialogState::Closed;
        }
    }

    pub fn state(&self, kind: DialogKind) -> DialogState {
        self.dialogs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&kind)
            .copied()
            .unwrap_or_default()
    }

    pub fn is_open(&self, kind: DialogKind) -> bool {
        self.state(kind) == DialogState::Open
    }

    pub fn open_dialogs(&self) -> Vec<DialogKind> {
        self.dialogs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|(_, state)| **state == DialogState::Open)
            .map(|(kind, _)| *kind)
            .collect()
    }
}
