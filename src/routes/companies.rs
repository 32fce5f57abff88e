use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{AuthUser, TenantUser};
use crate::db::CompanyRepository;
use crate::error::AppError;
use crate::models::{Company, Role};
use crate::state::SharedState;
use crate::validation;

#[derive(Deserialize)]
pub struct UpdateCompany {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub timezone: Option<String>,
}

async fn load(state: &SharedState, auth: &AuthUser, id: Uuid) -> Result<Company, AppError> {
    let company = state
        .store
        .find_company(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Company not found".to_string()))?;
    auth.ensure_can_access(Some(company.id))?;
    Ok(company)
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Company>>, AppError> {
    let companies = match auth.list_scope()?.company_id() {
        None => state.store.list_companies().await?,
        Some(id) => state.store.find_company(id).await?.into_iter().collect(),
    };
    Ok(Json(companies))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Company>, AppError> {
    Ok(Json(load(&state, &auth, id).await?))
}

/// The company the caller's token is bound to.
pub async fn current(
    tenant: TenantUser,
    State(state): State<SharedState>,
) -> Result<Json<Company>, AppError> {
    Ok(Json(load(&state, &tenant.user, tenant.company_id).await?))
}

/// Plan and status changes go through the admin routes.
pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCompany>,
) -> Result<Json<Company>, AppError> {
    let mut company = load(&state, &auth, id).await?;
    auth.require_level(Role::Admin)?;

    if let Some(name) = req.name {
        validation::length("name", &name, 2, 255)?;
        company.name = name.trim().to_string();
    }
    if let Some(slug) = req.slug {
        validation::slug(&slug)?;
        company.slug = slug;
    }
    if let Some(timezone) = req.timezone {
        validation::required("timezone", &timezone)?;
        company.timezone = timezone;
    }
    company.updated_at = Utc::now();

    Ok(Json(state.store.update_company(&company).await?))
}
