use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::SuperAdmin;
use crate::error::AppError;
use crate::models::{Company, User};
use crate::routes::auth::validate_registration;
use crate::services::admin::{Analytics, CompanyPage};
use crate::services::auth::CompanyRegistration;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CompanyQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub plan_tier: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePlan {
    pub plan_slug: String,
}

#[derive(Deserialize)]
pub struct Suspend {
    #[serde(default)]
    pub reason: String,
}

#[derive(Serialize)]
pub struct CreatedCompany {
    pub company: Company,
    pub admin: User,
}

pub async fn list_companies(
    _admin: SuperAdmin,
    State(state): State<SharedState>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<CompanyPage>, AppError> {
    let page = state
        .admin
        .list_companies(
            query.page.unwrap_or(1),
            query.limit.unwrap_or(20),
            query.search,
            query.plan_tier,
        )
        .await?;
    Ok(Json(page))
}

/// Same provisioning as self-service registration, without issuing tokens.
pub async fn create_company(
    SuperAdmin(admin): SuperAdmin,
    State(state): State<SharedState>,
    Json(req): Json<CompanyRegistration>,
) -> Result<(StatusCode, Json<CreatedCompany>), AppError> {
    validate_registration(&req)?;
    let (company, user) = state.auth.create_company_with_admin(req).await?;
    tracing::info!(company_id = %company.id, created_by = %admin.user_id, "company created by super admin");
    Ok((StatusCode::CREATED, Json(CreatedCompany { company, admin: user })))
}

pub async fn change_plan(
    _admin: SuperAdmin,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangePlan>,
) -> Result<Json<Company>, AppError> {
    Ok(Json(state.admin.change_plan(id, &req.plan_slug).await?))
}

pub async fn suspend(
    _admin: SuperAdmin,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<Suspend>,
) -> Result<Json<Company>, AppError> {
    Ok(Json(state.admin.suspend(id, &req.reason).await?))
}

pub async fn reactivate(
    _admin: SuperAdmin,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Company>, AppError> {
    Ok(Json(state.admin.reactivate(id).await?))
}

pub async fn company_users(
    _admin: SuperAdmin,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.admin.company_users(id).await?))
}

pub async fn analytics(
    _admin: SuperAdmin,
    State(state): State<SharedState>,
) -> Result<Json<Analytics>, AppError> {
    Ok(Json(state.admin.analytics().await?))
}
