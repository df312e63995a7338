//! Account Portal
//!
//! Headless core of a user-account portal: registration, login, password
//! recovery, profile editing and dashboard routing against a remote account
//! API. Rendering is left to the front-end; toasts, dialogs, navigation and
//! session storage are reached through small traits.

pub mod api;
pub mod config;
pub mod controllers;
pub mod mock_handlers;
pub mod mocks;
pub mod notify;
pub mod portal;
pub mod session;
pub mod types;
pub mod ui;
pub mod validation;

pub use portal::Portal;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SERVICE_NAME: &str = "account-portal";
