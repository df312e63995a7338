//! Type definitions for account_portal
//!
//! Contains the shared data model and configuration structures used
//! throughout the portal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Placeholder shown whenever the account has no profile photo.
pub const DEFAULT_PROFILE_PHOTO: &str = "assets/images/shared/profile-photo.svg";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// User profile as exchanged with the account API.
///
/// Every field stays `None` until populated from the API. `password` is only
/// ever written by the portal and is never read back from a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_recovery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", skip_deserializing)]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf_cnpj: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_photo: Option<String>,
}

impl UserProfile {
    /// Profile shown when the account data could not be fetched
    pub fn fallback(placeholder_photo: &str) -> Self {
        Self {
            name: Some("Default".to_string()),
            email: Some(String::new()),
            profile_photo: Some(placeholder_photo.to_string()),
            phone_number: Some(String::new()),
            ..Self::default()
        }
    }

    /// Replace a null or empty photo with the placeholder
    pub fn with_photo_placeholder(mut self, placeholder_photo: &str) -> Self {
        if self.profile_photo.as_deref().map_or(true, str::is_empty) {
            self.profile_photo = Some(placeholder_photo.to_string());
        }
        self
    }
}

/// Registration payload, built fresh for every submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub email_recovery: String,
    pub password: String,
    pub cpf_cnpj: String,
    pub phone_number: String,
}

/// Portal configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PortalConfig {
    pub api_base_url: String,
    /// File backing the session token; in-memory session when absent
    #[serde(default)]
    pub session_file: Option<String>,
    pub default_profile_photo: String,
    pub log_level: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3001/api/v1".to_string(),
            session_file: None,
            default_profile_photo: DEFAULT_PROFILE_PHOTO.to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Development account API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MockServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            jwt_secret: "change_me_in_production_0123456789".to_string(),
            token_ttl_hours: 24,
        }
    }
}
