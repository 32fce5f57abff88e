use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::CandidateRepository;
use crate::error::AppError;
use crate::models::{Candidate, CandidateSource};
use crate::state::SharedState;
use crate::validation;

#[derive(Deserialize)]
pub struct CreateCandidate {
    pub company_id: Option<Uuid>,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub resume_url: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub source: Option<CandidateSource>,
}

#[derive(Deserialize)]
pub struct UpdateCandidate {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub resume_url: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub source: Option<CandidateSource>,
}

fn validate(candidate: &Candidate) -> Result<(), AppError> {
    validation::email(&candidate.email)?;
    validation::required("first_name", &candidate.first_name)?;
    validation::required("last_name", &candidate.last_name)
}

async fn load(state: &SharedState, auth: &AuthUser, id: Uuid) -> Result<Candidate, AppError> {
    let candidate = state
        .store
        .find_candidate(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Candidate not found".to_string()))?;
    auth.ensure_can_access(Some(candidate.company_id))?;
    Ok(candidate)
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Candidate>>, AppError> {
    let candidates = state.store.list_candidates(auth.list_scope()?).await?;
    Ok(Json(candidates))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Candidate>, AppError> {
    Ok(Json(load(&state, &auth, id).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateCandidate>,
) -> Result<(StatusCode, Json<Candidate>), AppError> {
    let company_id = auth.owning_company(req.company_id)?;
    let now = Utc::now();
    let candidate = Candidate {
        id: Uuid::now_v7(),
        company_id,
        email: req.email.trim().to_lowercase(),
        first_name: req.first_name.trim().to_string(),
        last_name: req.last_name.trim().to_string(),
        phone: req.phone,
        resume_url: req.resume_url,
        github_url: req.github_url,
        linkedin_url: req.linkedin_url,
        source: req.source,
        created_at: now,
        updated_at: now,
    };
    validate(&candidate)?;

    let candidate = state.store.create_candidate(&candidate).await?;
    Ok((StatusCode::CREATED, Json(candidate)))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCandidate>,
) -> Result<Json<Candidate>, AppError> {
    let mut candidate = load(&state, &auth, id).await?;

    if let Some(email) = req.email {
        candidate.email = email.trim().to_lowercase();
    }
    if let Some(first_name) = req.first_name {
        candidate.first_name = first_name.trim().to_string();
    }
    if let Some(last_name) = req.last_name {
        candidate.last_name = last_name.trim().to_string();
    }
    candidate.phone = req.phone.or(candidate.phone);
    candidate.resume_url = req.resume_url.or(candidate.resume_url);
    candidate.github_url = req.github_url.or(candidate.github_url);
    candidate.linkedin_url = req.linkedin_url.or(candidate.linkedin_url);
    candidate.source = req.source.or(candidate.source);
    validate(&candidate)?;

    Ok(Json(state.store.update_candidate(&candidate).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    load(&state, &auth, id).await?;
    state.store.delete_candidate(id).await?;
    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}
