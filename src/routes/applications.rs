use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::{ApplicationRepository, CandidateRepository, JobRepository};
use crate::error::AppError;
use crate::models::{Application, ApplicationStage};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct CreateApplication {
    pub company_id: Option<Uuid>,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub stage: Option<ApplicationStage>,
    pub rating: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateApplication {
    pub stage: Option<ApplicationStage>,
    pub rating: Option<i32>,
}

fn validate_rating(rating: Option<i32>) -> Result<(), AppError> {
    match rating {
        Some(r) if !(1..=5).contains(&r) => {
            Err(AppError::BadRequest("rating must be between 1 and 5".to_string()))
        }
        _ => Ok(()),
    }
}

async fn load(state: &SharedState, auth: &AuthUser, id: Uuid) -> Result<Application, AppError> {
    let application = state
        .store
        .find_application(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".to_string()))?;
    auth.ensure_can_access(Some(application.company_id))?;
    Ok(application)
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Application>>, AppError> {
    let applications = state.store.list_applications(auth.list_scope()?).await?;
    Ok(Json(applications))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    Ok(Json(load(&state, &auth, id).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateApplication>,
) -> Result<(StatusCode, Json<Application>), AppError> {
    let company_id = auth.owning_company(req.company_id)?;
    validate_rating(req.rating)?;

    // Both referenced rows must live in the application's company.
    let job = state.store.find_job(req.job_id).await?;
    let candidate = state.store.find_candidate(req.candidate_id).await?;
    match (job, candidate) {
        (Some(job), Some(candidate)) if job.company_id == company_id && candidate.company_id == company_id => {}
        _ => {
            return Err(AppError::BadRequest(
                "Job and candidate must belong to the same company".to_string(),
            ));
        }
    }

    let now = Utc::now();
    let mut application = Application {
        id: Uuid::now_v7(),
        company_id,
        job_id: req.job_id,
        candidate_id: req.candidate_id,
        stage: ApplicationStage::Applied,
        rating: req.rating,
        applied_at: now,
        rejected_at: None,
        hired_at: None,
        updated_at: now,
    };
    if let Some(stage) = req.stage {
        application.move_to(stage);
    }

    let application = state.store.create_application(&application).await?;
    Ok((StatusCode::CREATED, Json(application)))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateApplication>,
) -> Result<Json<Application>, AppError> {
    let mut application = load(&state, &auth, id).await?;
    validate_rating(req.rating)?;

    if let Some(stage) = req.stage {
        application.move_to(stage);
    }
    application.rating = req.rating.or(application.rating);

    Ok(Json(state.store.update_application(&application).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    load(&state, &auth, id).await?;
    state.store.delete_application(id).await?;
    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}
