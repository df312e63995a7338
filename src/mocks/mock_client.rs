use crate::api::client::decode_response;
use crate::api::{AccountApi, ApiError, ApiResult};
use crate::types::{RegisterRequest, UserProfile};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Scripted = Result<(u16, Value), ApiError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOperation {
    GetUserData,
    UpdateEmail,
    UpdateEmailRecovery,
    UpdatePassword,
    ValidatePassword,
    RegisterUser,
    GetRememberPasswordFlag,
    SetRememberPasswordFlag,
    Login,
    RequestPasswordRecovery,
    ResetPassword,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation: ApiOperation,
    pub token: Option<String>,
    pub payload: Value,
}

/// Scripted [`AccountApi`] recording every call.
///
/// Responses queued for an operation are consumed in order; the last one
/// keeps answering. Unscripted operations answer 200 with a plausible body.
#[derive(Clone, Default)]
pub struct MockAccountApi {
    responses: Arc<Mutex<HashMap<ApiOperation, VecDeque<Scripted>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl MockAccountApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw HTTP answer; non-2xx statuses are classified like the real client does
    pub fn respond(&self, operation: ApiOperation, status: u16, body: Value) -> &Self {
        self.push(operation, Ok((status, body)))
    }

    pub fn fail(&self, operation: ApiOperation, error: ApiError) -> &Self {
        self.push(operation, Err(error))
    }

    /// Delay every answer, to keep a chain in flight
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn operations(&self) -> Vec<ApiOperation> {
        self.calls.lock().unwrap().iter().map(|c| c.operation).collect()
    }

    pub fn call_count(&self, operation: ApiOperation) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.operation == operation).count()
    }

    pub fn last_call(&self, operation: ApiOperation) -> Option<RecordedCall> {
        self.calls.lock().unwrap().iter().rev().find(|c| c.operation == operation).cloned()
    }

    fn push(&self, operation: ApiOperation, scripted: Scripted) -> &Self {
        self.responses.lock().unwrap().entry(operation).or_default().push_back(scripted);
        self
    }

    fn next(&self, operation: ApiOperation) -> Scripted {
        let mut responses = self.responses.lock().unwrap();
        match responses.get_mut(&operation) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap(),
            Some(queue) if !queue.is_empty() => queue[0].clone(),
            _ => Ok((200, Self::default_body(operation))),
        }
    }

    fn default_body(operation: ApiOperation) -> Value {
        match operation {
            ApiOperation::GetUserData => json!({
                "name": "Test User",
                "email": "test@example.com",
                "email_recovery": "recovery@example.com",
                "cpf_cnpj": "11144477735",
                "phone_number": "+55 11 99999-0000",
                "profile_photo": null
            }),
            ApiOperation::ValidatePassword => json!({ "isValidPassword": true }),
            ApiOperation::GetRememberPasswordFlag => json!({ "isFlagEnable": false }),
            ApiOperation::Login => json!({ "accessToken": "mock-access-token" }),
            _ => Value::Null,
        }
    }

    async fn answer<T: DeserializeOwned>(
        &self,
        operation: ApiOperation,
        token: Option<&str>,
        payload: Value,
    ) -> ApiResult<T> {
        self.calls.lock().unwrap().push(RecordedCall {
            operation,
            token: token.map(str::to_string),
            payload,
        });

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let (status, body) = self.next(operation)?;
        let bytes = serde_json::to_vec(&body).map_err(|e| ApiError::Decode(e.to_string()))?;
        decode_response(status, &bytes)
    }
}

#[async_trait]
impl AccountApi for MockAccountApi {
    async fn get_user_data(&self, token: &str) -> ApiResult<UserProfile> {
        self.answer(ApiOperation::GetUserData, Some(token), Value::Null).await
    }

    async fn request_update_email(&self, profile: &UserProfile, token: &str) -> ApiResult<Value> {
        self.answer(ApiOperation::UpdateEmail, Some(token), json!(profile)).await
    }

    async fn request_update_email_recovery(
        &self,
        profile: &UserProfile,
        token: &str,
    ) -> ApiResult<Value> {
        self.answer(ApiOperation::UpdateEmailRecovery, Some(token), json!(profile)).await
    }

    async fn request_update_password(&self, new_password: &str, token: &str) -> ApiResult<Value> {
        self.answer(ApiOperation::UpdatePassword, Some(token), json!({ "password": new_password }))
            .await
    }

    async fn validate_user_password(
        &self,
        password: &str,
        token: &str,
    ) -> ApiResult<crate::api::dto::PasswordCheck> {
        self.answer(ApiOperation::ValidatePassword, Some(token), json!({ "password": password }))
            .await
    }

    async fn register_user(&self, request: &RegisterRequest) -> ApiResult<Value> {
        self.answer(ApiOperation::RegisterUser, None, json!(request)).await
    }

    async fn get_remember_password_flag(
        &self,
        token: &str,
    ) -> ApiResult<crate::api::dto::FlagState> {
        self.answer(ApiOperation::GetRememberPasswordFlag, Some(token), Value::Null).await
    }

    async fn set_remember_password_flag(&self, token: &str, value: bool) -> ApiResult<Value> {
        self.answer(ApiOperation::SetRememberPasswordFlag, Some(token), json!({ "flagValue": value }))
            .await
    }

    async fn login(&self, email: &str, password: &str) -> ApiResult<crate::api::dto::LoginResponse> {
        self.answer(ApiOperation::Login, None, json!({ "email": email, "password": password })).await
    }

    async fn request_password_recovery(&self, email: &str) -> ApiResult<Value> {
        self.answer(ApiOperation::RequestPasswordRecovery, None, json!({ "email": email })).await
    }

    async fn reset_password(&self, code: &str, new_password: &str) -> ApiResult<Value> {
        self.answer(ApiOperation::ResetPassword, None, json!({ "code": code, "password": new_password }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_responses_are_consumed_in_order() {
        let api = MockAccountApi::new();
        api.respond(ApiOperation::ValidatePassword, 200, json!({ "isValidPassword": false }))
            .respond(ApiOperation::ValidatePassword, 200, json!({ "isValidPassword": true }));

        assert!(!api.validate_user_password("x", "t").await.unwrap().body.is_valid_password);
        assert!(api.validate_user_password("x", "t").await.unwrap().body.is_valid_password);
        // the last answer sticks
        assert!(api.validate_user_password("x", "t").await.unwrap().body.is_valid_password);
        assert_eq!(api.call_count(ApiOperation::ValidatePassword), 3);
    }

    #[tokio::test]
    async fn test_error_statuses_are_classified() {
        let api = MockAccountApi::new();
        api.respond(ApiOperation::GetUserData, 500, Value::Null);

        let result = api.get_user_data("t").await;
        assert_eq!(
            result.unwrap_err(),
            ApiError::Server {
                status: 500
            }
        );
        assert_eq!(api.last_call(ApiOperation::GetUserData).unwrap().token.as_deref(), Some("t"));
    }
}
