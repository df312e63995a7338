//! Collaborators standing in for the UI layer: dialogs, routing and view
//! refresh.

pub mod dialog;
pub mod router;
pub mod view;

pub use dialog::{DialogKind, DialogManager, DialogState};
pub use router::{AuthGuard, Navigator, Route, Router};
pub use view::{View, ViewRefresh};
