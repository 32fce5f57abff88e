use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::SystemValueRepository;
use crate::error::AppError;
use crate::models::{Role, SystemValue};
use crate::state::SharedState;
use crate::validation;

#[derive(Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateSystemValue {
    /// Super-admins may omit this to create a global value.
    pub company_id: Option<Uuid>,
    pub category: String,
    pub value: String,
    pub label: String,
    pub description: Option<String>,
    #[serde(default)]
    pub display_order: i32,
    pub is_active: Option<bool>,
}

#[derive(Deserialize)]
pub struct UpdateSystemValue {
    pub value: Option<String>,
    pub label: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i32>,
    pub is_active: Option<bool>,
}

async fn find(state: &SharedState, id: Uuid) -> Result<SystemValue, AppError> {
    state
        .store
        .find_system_value(id)
        .await?
        .ok_or_else(|| AppError::NotFound("System value not found".to_string()))
}

/// Global values and the caller's own company values.
pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<SystemValue>>, AppError> {
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    let values = state.store.list_system_values(auth.list_scope()?, category).await?;
    Ok(Json(values))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SystemValue>, AppError> {
    let value = find(&state, id).await?;
    if value.company_id.is_some() {
        auth.ensure_can_access(value.company_id)?;
    }
    Ok(Json(value))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateSystemValue>,
) -> Result<(StatusCode, Json<SystemValue>), AppError> {
    auth.require_level(Role::Admin)?;
    validation::required("category", &req.category)?;
    validation::required("value", &req.value)?;
    validation::required("label", &req.label)?;

    let company_id = if auth.is_superadmin() { req.company_id } else { Some(auth.company_id()?) };

    let value = SystemValue {
        id: Uuid::now_v7(),
        company_id,
        category: req.category.trim().to_string(),
        value: req.value.trim().to_string(),
        label: req.label.trim().to_string(),
        description: req.description,
        display_order: req.display_order,
        is_active: req.is_active.unwrap_or(true),
        created_at: Utc::now(),
    };

    let value = state.store.create_system_value(&value).await?;
    Ok((StatusCode::CREATED, Json(value)))
}

/// Global values are only writable by super-admins.
pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateSystemValue>,
) -> Result<Json<SystemValue>, AppError> {
    let mut value = find(&state, id).await?;
    auth.ensure_can_access(value.company_id)?;
    auth.require_level(Role::Admin)?;

    if let Some(v) = req.value {
        validation::required("value", &v)?;
        value.value = v.trim().to_string();
    }
    if let Some(label) = req.label {
        validation::required("label", &label)?;
        value.label = label.trim().to_string();
    }
    if req.description.is_some() {
        value.description = req.description;
    }
    if let Some(order) = req.display_order {
        value.display_order = order;
    }
    if let Some(active) = req.is_active {
        value.is_active = active;
    }

    Ok(Json(state.store.update_system_value(&value).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let value = find(&state, id).await?;
    auth.ensure_can_access(value.company_id)?;
    auth.require_level(Role::Admin)?;
    state.store.delete_system_value(id).await?;
    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}
