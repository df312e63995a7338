//! Account API client.
//!
//! One method per remote operation. Each call issues exactly one request and
//! resolves to a success carrying status and body, or a classified failure.
//! No retries and no timeout handling: the caller decides what a failure means.

pub mod client;
pub mod dto;

use crate::types::{RegisterRequest, UserProfile};
use async_trait::async_trait;
use dto::{ErrorBody, FlagState, LoginResponse, PasswordCheck};
use serde_json::Value;
use thiserror::Error;

pub use client::HttpAccountApi;

/// Message used when a 4xx body carries no usable `error` field
pub const GENERIC_CLIENT_ERROR: &str = "The request could not be completed.";

/// Successful HTTP exchange
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: u16,
    pub body: T,
}

impl<T> ApiResponse<T> {
    pub fn new(status: u16, body: T) -> Self {
        Self {
            status,
            body,
        }
    }

    /// Only 200 and 201 count as an accepted operation
    pub fn is_accepted(&self) -> bool {
        matches!(self.status, 200 | 201)
    }
}

/// Failed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{message}")]
    Client {
        status: u16,
        message: String,
    },

    #[error("Internal server error (status {status})")]
    Server {
        status: u16,
    },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("Unexpected response status {0}")]
    UnexpectedStatus(u16),
}

impl ApiError {
    /// Classify a non-2xx response. 4xx bodies are read for an `error`
    /// message, 5xx bodies are opaque.
    pub fn from_status(status: u16, body: &[u8]) -> Self {
        match status {
            400..=499 => {
                let message = serde_json::from_slice::<ErrorBody>(body)
                    .map(|b| b.error)
                    .ok()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_CLIENT_ERROR.to_string());
                ApiError::Client {
                    status,
                    message,
                }
            },
            500..=599 => ApiError::Server {
                status,
            },
            _ => ApiError::UnexpectedStatus(status),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Client {
                status,
                ..
            }
            | ApiError::Server {
                status,
            } => Some(*status),
            ApiError::UnexpectedStatus(status) => Some(*status),
            ApiError::Transport(_) | ApiError::Decode(_) => None,
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// Remote account operations
#[async_trait]
pub trait AccountApi: Send + Sync {
    async fn get_user_data(&self, token: &str) -> ApiResult<UserProfile>;

    async fn request_update_email(&self, profile: &UserProfile, token: &str) -> ApiResult<Value>;

    async fn request_update_email_recovery(
        &self,
        profile: &UserProfile,
        token: &str,
    ) -> ApiResult<Value>;

    async fn request_update_password(&self, new_password: &str, token: &str) -> ApiResult<Value>;

    async fn validate_user_password(&self, password: &str, token: &str)
        -> ApiResult<PasswordCheck>;

    async fn register_user(&self, request: &RegisterRequest) -> ApiResult<Value>;

    async fn get_remember_password_flag(&self, token: &str) -> ApiResult<FlagState>;

    async fn set_remember_password_flag(&self, token: &str, value: bool) -> ApiResult<Value>;

    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse>;

    async fn request_password_recovery(&self, email: &str) -> ApiResult<Value>;

    async fn reset_password(&self, code: &str, new_password: &str) -> ApiResult<Value>;
}
