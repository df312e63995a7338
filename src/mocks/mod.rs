//! Test doubles for the portal's collaborators

pub mod mock_client;
pub mod mock_ui;

pub use mock_client::{ApiOperation, MockAccountApi, RecordedCall};
pub use mock_ui::{RecordingNavigator, RecordingNotifier, RecordingRefresher};
