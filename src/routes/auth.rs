use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::AppError;
use crate::models::{CompanySummary, Role, User};
use crate::services::auth::{
    Account, AuthError, CompanyRegistration, RegisteredCompany, Session, SwitchedCompany, TokenPair,
};
use crate::state::SharedState;
use crate::validation;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct SwitchCompanyRequest {
    pub company_id: Uuid,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: User,
    pub role: Role,
    pub company_id: Option<Uuid>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn validate_account(email: &str, password: &str, first_name: &str, last_name: &str) -> Result<(), AppError> {
    validation::email(email)?;
    validation::password(password)?;
    validation::required("first_name", first_name)?;
    validation::required("last_name", last_name)
}

pub(crate) fn validate_registration(req: &CompanyRegistration) -> Result<(), AppError> {
    validation::required("company_name", &req.company_name)?;
    validation::slug(&req.company_slug)?;
    validate_account(&req.admin_email, &req.admin_password, &req.admin_first_name, &req.admin_last_name)
}

/// Deprecated single-user sign-up. The account has no company until invited.
pub async fn register(
    State(state): State<SharedState>,
    Json(req): Json<Account>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    validate_account(&req.email, &req.password, &req.first_name, &req.last_name)?;
    let session = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn register_company(
    State(state): State<SharedState>,
    Json(req): Json<CompanyRegistration>,
) -> Result<(StatusCode, Json<RegisteredCompany>), AppError> {
    validate_registration(&req)?;
    let registered = state.auth.register_company(req).await?;
    Ok((StatusCode::CREATED, Json(registered)))
}

/// Shared throttle around the two password logins.
async fn throttled<F, Fut>(state: &SharedState, email: &str, attempt: F) -> Result<Session, AppError>
where
    F: FnOnce() -> Fut,
    Fut: std::future::Future<Output = Result<Session, AuthError>>,
{
    if state.login_limiter.check(email).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    match attempt().await {
        Ok(session) => {
            state.login_limiter.reset(email);
            Ok(session)
        }
        Err(err @ (AuthError::InvalidCredentials | AuthError::NotSuperAdmin)) => {
            tracing::warn!(email = %email.trim().to_lowercase(), "login rejected: {err}");
            state.login_limiter.record_failure(email);
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    let session = throttled(&state, &req.email, || state.auth.login(&req.email, &req.password)).await?;
    Ok(Json(session))
}

pub async fn superadmin_login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<Session>, AppError> {
    let session = throttled(&state, &req.email, || {
        state.auth.superadmin_login(&req.email, &req.password)
    })
    .await?;
    Ok(Json(session))
}

pub async fn refresh(
    State(state): State<SharedState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, AppError> {
    let pair = state.auth.refresh(&req.refresh_token).await?;
    Ok(Json(pair))
}

pub async fn me(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<MeResponse>, AppError> {
    let user = state.auth.me(auth.user_id).await?;
    Ok(Json(MeResponse {
        user,
        role: auth.role,
        company_id: auth.tenant.company_id(),
    }))
}

pub async fn change_password(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    validation::password(&req.new_password)?;
    state
        .auth
        .change_password(auth.user_id, &req.old_password, &req.new_password)
        .await?;
    Ok(Json(MessageResponse {
        message: "Password changed".to_string(),
    }))
}

pub async fn switch_company(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<SwitchCompanyRequest>,
) -> Result<Json<SwitchedCompany>, AppError> {
    let switched = state.auth.switch_company(auth.user_id, req.company_id).await?;
    Ok(Json(switched))
}

pub async fn my_companies(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<CompanySummary>>, AppError> {
    let companies = state.auth.user_companies(auth.user_id).await?;
    Ok(Json(companies))
}
