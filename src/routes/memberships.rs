use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{AuthUser, SuperAdmin};
use crate::db::{CompanyRepository, MembershipRepository, UserRepository};
use crate::error::AppError;
use crate::models::{Membership, MembershipStatus, Role};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateMembership {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub role: Role,
    pub status: Option<MembershipStatus>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Deserialize)]
pub struct UpdateMembership {
    pub role: Option<Role>,
    pub status: Option<MembershipStatus>,
    pub is_default: Option<bool>,
}

async fn load(state: &SharedState, auth: &AuthUser, id: Uuid) -> Result<Membership, AppError> {
    let membership = state
        .store
        .find_membership(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;
    auth.ensure_can_access(membership.company_id)?;
    Ok(membership)
}

/// Roles a caller may hand out: company roles up to their own level.
fn ensure_grantable(auth: &AuthUser, role: Role) -> Result<(), AppError> {
    if role == Role::Superadmin {
        return Err(AppError::BadRequest(
            "Company memberships cannot carry the superadmin role".to_string(),
        ));
    }
    if role.level() > auth.role.level() {
        return Err(AppError::Forbidden("Cannot grant a role above your own".to_string()));
    }
    Ok(())
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Membership>>, AppError> {
    let memberships = state.store.list_memberships(auth.list_scope()?).await?;
    Ok(Json(memberships))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Membership>, AppError> {
    Ok(Json(load(&state, &auth, id).await?))
}

pub async fn create(
    SuperAdmin(auth): SuperAdmin,
    State(state): State<SharedState>,
    Json(req): Json<CreateMembership>,
) -> Result<(StatusCode, Json<Membership>), AppError> {
    ensure_grantable(&auth, req.role)?;
    if state.store.find_user(req.user_id).await?.is_none() {
        return Err(AppError::BadRequest("User not found".to_string()));
    }
    if state.store.find_company(req.company_id).await?.is_none() {
        return Err(AppError::BadRequest("Company not found".to_string()));
    }

    let mut membership = Membership::invited(req.user_id, req.company_id, req.role, auth.user_id);
    membership.is_default = req.is_default;
    if let Some(status) = req.status {
        membership.status = status;
        if status == MembershipStatus::Active {
            membership.joined_at = Some(Utc::now());
        }
    }

    let membership = state.store.create_membership(&membership).await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateMembership>,
) -> Result<Json<Membership>, AppError> {
    let mut membership = load(&state, &auth, id).await?;
    auth.require_level(Role::Admin)?;

    if let Some(role) = req.role {
        if membership.company_id.is_some() {
            ensure_grantable(&auth, role)?;
        }
        membership.role = role;
    }
    if let Some(status) = req.status {
        if status == MembershipStatus::Active && membership.joined_at.is_none() {
            membership.joined_at = Some(Utc::now());
        }
        membership.status = status;
    }
    if let Some(is_default) = req.is_default {
        membership.is_default = is_default;
    }

    Ok(Json(state.store.update_membership(&membership).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    load(&state, &auth, id).await?;
    auth.require_level(Role::Admin)?;
    state.store.delete_membership(id).await?;
    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}

/// The invited user accepts their own pending membership.
pub async fn accept(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Membership>, AppError> {
    let mut membership = state
        .store
        .find_membership(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Membership not found".to_string()))?;
    if membership.user_id != auth.user_id {
        return Err(AppError::Forbidden("Access denied".to_string()));
    }

    membership.accept().map_err(AppError::BadRequest)?;
    Ok(Json(state.store.update_membership(&membership).await?))
}
