//! Development account API
//!
//! In-memory implementation of the HTTP contract the portal talks to. It backs
//! the `mock_server` binary and the end-to-end tests. Accounts live in a map
//! keyed by id, passwords are hashed with argon2 and bearer tokens are HS256
//! JWTs. Recovery codes are only logged, nothing is mailed.

use crate::api::dto::{
    ErrorBody, FlagState, FlagUpdate, LoginRequest, LoginResponse, PasswordCheck,
    PasswordCheckRequest, PasswordRecoveryRequest, PasswordResetRequest, PasswordUpdate,
};
use crate::types::{MockServerConfig, RegisterRequest, UserProfile};
use crate::validation::{any_empty, is_password_format_valid, is_valid_email, validate_cpf_or_cnpj};
use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;
use uuid::Uuid;

const RECOVERY_CODE_TTL_MINUTES: i64 = 15;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MockError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for MockError {
    fn status_code(&self) -> StatusCode {
        match self {
            MockError::BadRequest(_) => StatusCode::BAD_REQUEST,
            MockError::Unauthorized | MockError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            MockError::NotFound => StatusCode::NOT_FOUND,
            MockError::Conflict(_) => StatusCode::CONFLICT,
            MockError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let MockError::Internal(detail) = self {
            log::error!("Mock account API failure: {}", detail);
        }
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

/// Stored account; the password is only kept as an argon2 hash
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub email_recovery: String,
    pub password_hash: String,
    pub cpf_cnpj: String,
    pub phone_number: String,
    pub profile_photo: Option<String>,
    pub remember_password_change: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    fn profile(&self) -> UserProfile {
        UserProfile {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            email_recovery: Some(self.email_recovery.clone()),
            password: None,
            cpf_cnpj: Some(self.cpf_cnpj.clone()),
            phone_number: Some(self.phone_number.clone()),
            profile_photo: self.profile_photo.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
struct RecoveryCode {
    account_id: Uuid,
    expires_at: DateTime<Utc>,
}

pub struct MockAccountState {
    accounts: Mutex<HashMap<Uuid, Account>>,
    recovery_codes: Mutex<HashMap<String, RecoveryCode>>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
}

impl std::fmt::Debug for MockAccountState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockAccountState")
            .field("encoding_key", &"<hidden>")
            .field("decoding_key", &"<hidden>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl MockAccountState {
    pub fn new(jwt_secret: &str, token_ttl_hours: i64) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            recovery_codes: Mutex::new(HashMap::new()),
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            token_ttl: Duration::hours(token_ttl_hours),
        }
    }

    pub fn from_config(config: &MockServerConfig) -> Self {
        Self::new(&config.jwt_secret, config.token_ttl_hours)
    }

    fn accounts(&self) -> MutexGuard<'_, HashMap<Uuid, Account>> {
        self.accounts.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn codes(&self) -> MutexGuard<'_, HashMap<String, RecoveryCode>> {
        self.recovery_codes.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn account_count(&self) -> usize {
        self.accounts().len()
    }

    /// Latest live recovery code issued for an email
    pub fn recovery_code_for(&self, email: &str) -> Option<String> {
        let account_id = self.find_by_email(email)?.id;
        let now = Utc::now();
        self.codes()
            .iter()
            .filter(|(_, code)| code.account_id == account_id && code.expires_at > now)
            .max_by_key(|(_, code)| code.expires_at)
            .map(|(code, _)| code.clone())
    }

    fn find_by_email(&self, email: &str) -> Option<Account> {
        self.accounts().values().find(|a| a.email.eq_ignore_ascii_case(email)).cloned()
    }

    fn email_taken(accounts: &HashMap<Uuid, Account>, email: &str, except: Option<Uuid>) -> bool {
        accounts.values().any(|a| a.email.eq_ignore_ascii_case(email) && Some(a.id) != except)
    }

    /// Store a new account unless its email is already registered
    pub fn insert_account(&self, account: Account) -> Result<Uuid, MockError> {
        let mut accounts = self.accounts();
        if Self::email_taken(&accounts, &account.email, None) {
            return Err(MockError::Conflict("Email already registered".to_string()));
        }
        let id = account.id;
        accounts.insert(id, account);
        Ok(id)
    }

    /// Move an account to a new login email unless another account holds it
    pub fn change_email(&self, id: Uuid, email: String) -> Result<(), MockError> {
        let mut accounts = self.accounts();
        if Self::email_taken(&accounts, &email, Some(id)) {
            return Err(MockError::Conflict("Email already in use".to_string()));
        }
        let account = accounts.get_mut(&id).ok_or(MockError::NotFound)?;
        account.email = email;
        Ok(())
    }

    fn with_account<T>(&self, id: Uuid, f: impl FnOnce(&mut Account) -> T) -> Result<T, MockError> {
        let mut accounts = self.accounts();
        let account = accounts.get_mut(&id).ok_or(MockError::NotFound)?;
        Ok(f(account))
    }

    pub fn issue_token(&self, account_id: Uuid) -> Result<String, MockError> {
        let now = Utc::now();
        let claims = Claims {
            sub: account_id,
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| MockError::Internal(format!("Failed to generate an access token: {}", e)))
    }

    /// Resolve the bearer token of a request to an existing account id
    pub fn authenticate(&self, req: &HttpRequest) -> Result<Uuid, MockError> {
        let token = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(MockError::Unauthorized)?;

        let claims = decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                log::debug!("Rejected bearer token: {}", e);
                MockError::Unauthorized
            })?
            .claims;

        if self.accounts().contains_key(&claims.sub) {
            Ok(claims.sub)
        } else {
            Err(MockError::Unauthorized)
        }
    }

    fn issue_recovery_code(&self, account_id: Uuid) -> String {
        let code = format!("{:06}", Uuid::new_v4().as_u128() % 1_000_000);
        let expires_at = Utc::now() + Duration::minutes(RECOVERY_CODE_TTL_MINUTES);
        let mut codes = self.codes();
        codes.retain(|_, c| c.account_id != account_id);
        codes.insert(
            code.clone(),
            RecoveryCode {
                account_id,
                expires_at,
            },
        );
        code
    }

    fn redeem_recovery_code(&self, code: &str) -> Option<Uuid> {
        let entry = self.codes().remove(code)?;
        (entry.expires_at > Utc::now()).then_some(entry.account_id)
    }
}

fn hash_password(password: &str) -> Result<String, MockError> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| MockError::Internal(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| MockError::Internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok(),
        Err(e) => {
            log::error!("Stored password hash is unreadable: {}", e);
            false
        },
    }
}

fn require_password_format(password: &str) -> Result<(), MockError> {
    if is_password_format_valid(password) {
        Ok(())
    } else {
        Err(MockError::BadRequest("Password does not meet the format rules".to_string()))
    }
}

fn require_email(email: Option<&str>) -> Result<&str, MockError> {
    match email {
        Some(email) if is_valid_email(email) => Ok(email),
        _ => Err(MockError::BadRequest("A valid email is required".to_string())),
    }
}

fn ok_message(message: &str) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": message }))
}

pub async fn register(
    state: web::Data<MockAccountState>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, MockError> {
    let request = payload.into_inner();
    if any_empty(&[
        &request.name,
        &request.email,
        &request.password,
        &request.cpf_cnpj,
        &request.phone_number,
    ]) {
        return Err(MockError::BadRequest("All fields are required".to_string()));
    }
    require_email(Some(&request.email))?;
    require_password_format(&request.password)?;
    if !validate_cpf_or_cnpj(&request.cpf_cnpj) {
        return Err(MockError::BadRequest("Invalid CPF/CNPJ".to_string()));
    }
    let account = Account {
        id: Uuid::new_v4(),
        name: request.name.trim().to_string(),
        email_recovery: if request.email_recovery.is_empty() {
            request.email.clone()
        } else {
            request.email_recovery
        },
        email: request.email,
        password_hash: hash_password(&request.password)?,
        cpf_cnpj: request.cpf_cnpj,
        phone_number: request.phone_number,
        profile_photo: None,
        remember_password_change: false,
        created_at: Utc::now(),
    };
    let email = account.email.clone();
    let id = state.insert_account(account)?;
    log::info!("Registered account {} for {}", id, email);

    Ok(HttpResponse::Created().json(json!({ "id": id })))
}

pub async fn login(
    state: web::Data<MockAccountState>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, MockError> {
    let account = state.find_by_email(&payload.email).ok_or(MockError::InvalidCredentials)?;
    if !verify_password(&payload.password, &account.password_hash) {
        log::info!("Failed login for {}", payload.email);
        return Err(MockError::InvalidCredentials);
    }

    Ok(HttpResponse::Ok().json(LoginResponse {
        access_token: state.issue_token(account.id)?,
    }))
}

/// Always answers 200 so the endpoint does not reveal which emails exist
pub async fn forgot_password(
    state: web::Data<MockAccountState>,
    payload: web::Json<PasswordRecoveryRequest>,
) -> Result<HttpResponse, MockError> {
    require_email(Some(&payload.email))?;
    match state.find_by_email(&payload.email) {
        Some(account) => {
            let code = state.issue_recovery_code(account.id);
            log::info!("Recovery code for {}: {}", account.email, code);
        },
        None => log::info!("Recovery requested for unknown email {}", payload.email),
    }
    Ok(ok_message("Recovery code sent"))
}

pub async fn new_password(
    state: web::Data<MockAccountState>,
    payload: web::Json<PasswordResetRequest>,
) -> Result<HttpResponse, MockError> {
    require_password_format(&payload.password)?;
    let account_id = state
        .redeem_recovery_code(payload.code.trim())
        .ok_or_else(|| MockError::BadRequest("Invalid or expired code".to_string()))?;

    let hash = hash_password(&payload.password)?;
    state.with_account(account_id, |account| account.password_hash = hash)?;
    Ok(ok_message("Password updated"))
}

pub async fn get_profile(
    req: HttpRequest,
    state: web::Data<MockAccountState>,
) -> Result<HttpResponse, MockError> {
    let id = state.authenticate(&req)?;
    let profile = state.with_account(id, |account| account.profile())?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn update_email(
    req: HttpRequest,
    state: web::Data<MockAccountState>,
    payload: web::Json<UserProfile>,
) -> Result<HttpResponse, MockError> {
    let id = state.authenticate(&req)?;
    let email = require_email(payload.email.as_deref())?.to_string();
    state.change_email(id, email)?;
    Ok(ok_message("Email updated"))
}

pub async fn update_email_recovery(
    req: HttpRequest,
    state: web::Data<MockAccountState>,
    payload: web::Json<UserProfile>,
) -> Result<HttpResponse, MockError> {
    let id = state.authenticate(&req)?;
    let email = require_email(payload.email_recovery.as_deref())?.to_string();
    state.with_account(id, |account| account.email_recovery = email)?;
    Ok(ok_message("Recovery email updated"))
}

pub async fn update_password(
    req: HttpRequest,
    state: web::Data<MockAccountState>,
    payload: web::Json<PasswordUpdate>,
) -> Result<HttpResponse, MockError> {
    let id = state.authenticate(&req)?;
    require_password_format(&payload.password)?;
    let hash = hash_password(&payload.password)?;
    state.with_account(id, |account| account.password_hash = hash)?;
    Ok(ok_message("Password updated"))
}

pub async fn validate_password(
    req: HttpRequest,
    state: web::Data<MockAccountState>,
    payload: web::Json<PasswordCheckRequest>,
) -> Result<HttpResponse, MockError> {
    let id = state.authenticate(&req)?;
    let hash = state.with_account(id, |account| account.password_hash.clone())?;
    Ok(HttpResponse::Ok().json(PasswordCheck {
        is_valid_password: verify_password(&payload.password, &hash),
    }))
}

pub async fn get_remember_password_flag(
    req: HttpRequest,
    state: web::Data<MockAccountState>,
) -> Result<HttpResponse, MockError> {
    let id = state.authenticate(&req)?;
    let flag = state.with_account(id, |account| account.remember_password_change)?;
    Ok(HttpResponse::Ok().json(FlagState {
        is_flag_enable: flag,
    }))
}

pub async fn set_remember_password_flag(
    req: HttpRequest,
    state: web::Data<MockAccountState>,
    payload: web::Json<FlagUpdate>,
) -> Result<HttpResponse, MockError> {
    let id = state.authenticate(&req)?;
    let value = payload.flag_value;
    state.with_account(id, |account| account.remember_password_change = value)?;
    Ok(HttpResponse::Ok().json(FlagState {
        is_flag_enable: value,
    }))
}

pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": crate::SERVICE_NAME,
        "version": crate::VERSION,
        "timestamp": Utc::now().to_rfc3339()
    }))
}

/// Every route of the account API, mounted under `/api/v1`
pub fn configure_mock_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check)).service(
        web::scope("/api/v1")
            .service(
                web::scope("/auth")
                    .route("/login", web::post().to(login))
                    .route("/forgot-password", web::post().to(forgot_password))
                    .route("/new-password", web::post().to(new_password)),
            )
            .service(
                web::scope("/user")
                    .route("/register", web::post().to(register))
                    .route("/profile", web::get().to(get_profile))
                    .route("/email", web::put().to(update_email))
                    .route("/email-recovery", web::put().to(update_email_recovery))
                    .route("/password", web::put().to(update_password))
                    .route("/validate-password", web::post().to(validate_password))
                    .route(
                        "/flag/remember-password-change",
                        web::get().to(get_remember_password_flag),
                    )
                    .route(
                        "/flag/remember-password-change",
                        web::put().to(set_remember_password_flag),
                    ),
            ),
    );
}
