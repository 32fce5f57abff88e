use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::password;
use crate::auth::AuthUser;
use crate::db::{MembershipRepository, Provisioner, Provisioning, UserRepository};
use crate::error::AppError;
use crate::models::{Membership, Role, User};
use crate::state::SharedState;
use crate::validation;

#[derive(Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Option<Role>,
    /// Super-admins may attach the new user to a company; tenant admins always use their own.
    pub company_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
}

/// Tenant callers only see users that hold a membership in their company.
async fn ensure_visible(state: &SharedState, auth: &AuthUser, user_id: Uuid) -> Result<(), AppError> {
    if auth.is_superadmin() {
        return Ok(());
    }
    let company_id = auth.company_id()?;
    match state.store.find_user_membership(user_id, company_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::Forbidden("Access denied".to_string())),
    }
}

/// Whether the user holds a membership anywhere other than `company_id`, including the global one.
async fn belongs_elsewhere(state: &SharedState, user_id: Uuid, company_id: Uuid) -> Result<bool, AppError> {
    let memberships = state.store.list_user_memberships(user_id).await?;
    Ok(memberships.iter().any(|m| m.company_id != Some(company_id)))
}

async fn find(state: &SharedState, id: Uuid) -> Result<User, AppError> {
    state
        .store
        .find_user(id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = match auth.list_scope()?.company_id() {
        None => state.store.list_users().await?,
        Some(company_id) => state.store.list_company_users(company_id).await?,
    };
    Ok(Json(users))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let user = find(&state, id).await?;
    ensure_visible(&state, &auth, user.id).await?;
    Ok(Json(user))
}

/// Create a user and, when a company applies, their membership in one step.
pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    auth.require_level(Role::Admin)?;
    validation::email(&req.email)?;
    validation::password(&req.password)?;
    validation::required("first_name", &req.first_name)?;
    validation::required("last_name", &req.last_name)?;

    let company_id = if auth.is_superadmin() { req.company_id } else { Some(auth.company_id()?) };
    let role = req.role.unwrap_or(Role::User);
    if role == Role::Superadmin || role.level() > auth.role.level() {
        return Err(AppError::Forbidden("Cannot grant a role above your own".to_string()));
    }

    let hash = password::hash(&req.password).map_err(AppError::Internal)?;
    let user = User::new(&req.email, hash, &req.first_name, &req.last_name);
    let membership = company_id.map(|company_id| Membership::active(user.id, company_id, role, true));

    state
        .store
        .provision(&Provisioning { company: None, user: user.clone(), membership })
        .await?;

    tracing::info!(user_id = %user.id, created_by = %auth.user_id, "user created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// Account fields are shared by every company the user belongs to, so tenant admins
/// may only edit users that belong to their company alone.
pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUser>,
) -> Result<Json<User>, AppError> {
    let mut user = find(&state, id).await?;
    ensure_visible(&state, &auth, id).await?;
    auth.require_level(Role::Admin)?;
    if !auth.is_superadmin() && belongs_elsewhere(&state, id, auth.company_id()?).await? {
        return Err(AppError::Forbidden("User belongs to other companies".to_string()));
    }

    if let Some(first_name) = req.first_name {
        validation::required("first_name", &first_name)?;
        user.first_name = first_name.trim().to_string();
    }
    if let Some(last_name) = req.last_name {
        validation::required("last_name", &last_name)?;
        user.last_name = last_name.trim().to_string();
    }
    if let Some(active) = req.is_active {
        if !active && id == auth.user_id {
            return Err(AppError::BadRequest("You cannot deactivate your own account".to_string()));
        }
        user.is_active = active;
    }

    let user = state.store.update_user(&user).await?;
    tracing::info!(user_id = %user.id, updated_by = %auth.user_id, "user updated");
    Ok(Json(user))
}

/// Soft delete. A tenant admin removing a user who also belongs to other companies only
/// drops the membership in their own company; the account stays.
pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    find(&state, id).await?;
    ensure_visible(&state, &auth, id).await?;
    auth.require_level(Role::Admin)?;
    if id == auth.user_id {
        return Err(AppError::BadRequest("You cannot delete your own account".to_string()));
    }

    if !auth.is_superadmin() {
        let company_id = auth.company_id()?;
        if belongs_elsewhere(&state, id, company_id).await? {
            if let Some(membership) = state.store.find_user_membership(id, company_id).await? {
                state.store.delete_membership(membership.id).await?;
            }
            tracing::info!(user_id = %id, %company_id, removed_by = %auth.user_id, "user removed from company");
            return Ok(Json(serde_json::json!({ "message": "Deleted" })));
        }
    }

    state.store.soft_delete_user(id).await?;
    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}
