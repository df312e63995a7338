//! HTTP implementation of [`AccountApi`] over reqwest

use super::dto::{
    FlagState, FlagUpdate, LoginRequest, LoginResponse, PasswordCheck, PasswordCheckRequest,
    PasswordRecoveryRequest, PasswordResetRequest, PasswordUpdate,
};
use super::{AccountApi, ApiError, ApiResponse, ApiResult};
use crate::types::{RegisterRequest, UserProfile};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const PROFILE_PATH: &str = "/user/profile";
pub const EMAIL_PATH: &str = "/user/email";
pub const EMAIL_RECOVERY_PATH: &str = "/user/email-recovery";
pub const PASSWORD_PATH: &str = "/user/password";
pub const VALIDATE_PASSWORD_PATH: &str = "/user/validate-password";
pub const REGISTER_PATH: &str = "/user/register";
pub const REMEMBER_PASSWORD_FLAG_PATH: &str = "/user/flag/remember-password-change";
pub const LOGIN_PATH: &str = "/auth/login";
pub const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";
pub const NEW_PASSWORD_PATH: &str = "/auth/new-password";

pub struct HttpAccountApi {
    base_url: String,
    client: Client,
}

impl HttpAccountApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let response = request.send().await.map_err(|e| {
            log::error!("Account API request failed: {}", e);
            ApiError::Transport(e.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| ApiError::Transport(e.to_string()))?;
        log::debug!("Account API responded {} ({} bytes)", status, body.len());

        decode_response(status, &body)
    }
}

/// Turn a raw status and body into a typed outcome
pub(crate) fn decode_response<T: DeserializeOwned>(status: u16, body: &[u8]) -> ApiResult<T> {
    if !(200..300).contains(&status) {
        return Err(ApiError::from_status(status, body));
    }

    // an empty 2xx body reads as JSON null
    let body = if body.iter().all(u8::is_ascii_whitespace) {
        &b"null"[..]
    } else {
        body
    };

    serde_json::from_slice(body)
        .map(|body| ApiResponse::new(status, body))
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl AccountApi for HttpAccountApi {
    async fn get_user_data(&self, token: &str) -> ApiResult<UserProfile> {
        self.send(self.client.get(self.url(PROFILE_PATH)).bearer_auth(token)).await
    }

    async fn request_update_email(&self, profile: &UserProfile, token: &str) -> ApiResult<Value> {
        self.send(self.client.put(self.url(EMAIL_PATH)).bearer_auth(token).json(profile)).await
    }

    async fn request_update_email_recovery(
        &self,
        profile: &UserProfile,
        token: &str,
    ) -> ApiResult<Value> {
        self.send(self.client.put(self.url(EMAIL_RECOVERY_PATH)).bearer_auth(token).json(profile))
            .await
    }

    async fn request_update_password(&self, new_password: &str, token: &str) -> ApiResult<Value> {
        let payload = PasswordUpdate {
            password: new_password.to_string(),
        };
        self.send(self.client.put(self.url(PASSWORD_PATH)).bearer_auth(token).json(&payload)).await
    }

    async fn validate_user_password(
        &self,
        password: &str,
        token: &str,
    ) -> ApiResult<PasswordCheck> {
        let payload = PasswordCheckRequest {
            password: password.to_string(),
        };
        self.send(
            self.client.post(self.url(VALIDATE_PASSWORD_PATH)).bearer_auth(token).json(&payload),
        )
        .await
    }

    async fn register_user(&self, request: &RegisterRequest) -> ApiResult<Value> {
        self.send(self.client.post(self.url(REGISTER_PATH)).json(request)).await
    }

    async fn get_remember_password_flag(&self, token: &str) -> ApiResult<FlagState> {
        self.send(self.client.get(self.url(REMEMBER_PASSWORD_FLAG_PATH)).bearer_auth(token)).await
    }

    async fn set_remember_password_flag(&self, token: &str, value: bool) -> ApiResult<Value> {
        let payload = FlagUpdate {
            flag_value: value,
        };
        self.send(
            self.client
                .put(self.url(REMEMBER_PASSWORD_FLAG_PATH))
                .bearer_auth(token)
                .json(&payload),
        )
        .await
    }

    async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let payload = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send(self.client.post(self.url(LOGIN_PATH)).json(&payload)).await
    }

    async fn request_password_recovery(&self, email: &str) -> ApiResult<Value> {
        let payload = PasswordRecoveryRequest {
            email: email.to_string(),
        };
        self.send(self.client.post(self.url(FORGOT_PASSWORD_PATH)).json(&payload)).await
    }

    async fn reset_password(&self, code: &str, new_password: &str) -> ApiResult<Value> {
        let payload = PasswordResetRequest {
            code: code.to_string(),
            password: new_password.to_string(),
        };
        self.send(self.client.post(self.url(NEW_PASSWORD_PATH)).json(&payload)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let api = HttpAccountApi::new("http://localhost:3001/api/v1/");
        assert_eq!(api.base_url(), "http://localhost:3001/api/v1");
        assert_eq!(api.url(PROFILE_PATH), "http://localhost:3001/api/v1/user/profile");
    }

    #[test]
    fn test_decode_success_body() {
        let response: ApiResponse<PasswordCheck> =
            decode_response(200, br#"{"isValidPassword":false}"#).unwrap();
        assert_eq!(response.status, 200);
        assert!(!response.body.is_valid_password);
    }

    #[test]
    fn test_decode_empty_body_as_null() {
        let response: ApiResponse<Value> = decode_response(201, b"").unwrap();
        assert_eq!(response.body, Value::Null);
        assert!(response.is_accepted());
    }

    #[test]
    fn test_decode_mismatched_body() {
        let result: ApiResult<PasswordCheck> = decode_response(200, br#"{"unexpected":1}"#);
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_decode_error_statuses() {
        let result: ApiResult<Value> = decode_response(401, br#"{"error":"Invalid token"}"#);
        assert_eq!(
            result.unwrap_err(),
            ApiError::Client {
                status: 401,
                message: "Invalid token".to_string()
            }
        );

        let result: ApiResult<Value> = decode_response(500, b"<html>oops</html>");
        assert_eq!(
            result.unwrap_err(),
            ApiError::Server {
                status: 500
            }
        );
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // port 9 (discard) on localhost is not expected to accept HTTP
        let api = HttpAccountApi::new("http://127.0.0.1:9");
        let result = api.get_user_data("token").await;
        assert!(matches!(result, Err(ApiError::Transport(_))));
    }
}
