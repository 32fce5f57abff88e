use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::JobRepository;
use crate::error::AppError;
use crate::models::{Job, JobStatus};
use crate::state::SharedState;
use crate::validation;

#[derive(Deserialize)]
pub struct CreateJob {
    /// Only read for super-admin callers.
    pub company_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub status: Option<JobStatus>,
    pub location_type: Option<String>,
    pub assigned_recruiter: Option<Uuid>,
    pub hiring_manager: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdateJob {
    pub title: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<String>,
    pub benefits: Option<String>,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub status: Option<JobStatus>,
    pub location_type: Option<String>,
    pub assigned_recruiter: Option<Uuid>,
    pub hiring_manager: Option<Uuid>,
}

fn validate(job: &Job) -> Result<(), AppError> {
    validation::length("title", &job.title, 3, 255)?;
    validation::required("description", &job.description)?;
    if let (Some(min), Some(max)) = (job.salary_min, job.salary_max) {
        if min > max {
            return Err(AppError::BadRequest("salary_min cannot exceed salary_max".to_string()));
        }
    }
    Ok(())
}

async fn load(state: &SharedState, auth: &AuthUser, id: Uuid) -> Result<Job, AppError> {
    let job = state
        .store
        .find_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found".to_string()))?;
    auth.ensure_can_access(Some(job.company_id))?;
    Ok(job)
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Job>>, AppError> {
    let jobs = state.store.list_jobs(auth.list_scope()?).await?;
    Ok(Json(jobs))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, AppError> {
    Ok(Json(load(&state, &auth, id).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateJob>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let company_id = auth.owning_company(req.company_id)?;
    let now = Utc::now();
    let job = Job {
        id: Uuid::now_v7(),
        company_id,
        title: req.title.trim().to_string(),
        description: req.description,
        requirements: req.requirements,
        benefits: req.benefits,
        salary_min: req.salary_min,
        salary_max: req.salary_max,
        status: req.status.unwrap_or(JobStatus::Draft),
        location_type: req.location_type.unwrap_or_else(|| "onsite".to_string()),
        assigned_recruiter: req.assigned_recruiter,
        hiring_manager: req.hiring_manager,
        created_at: now,
        updated_at: now,
    };
    validate(&job)?;

    let job = state.store.create_job(&job).await?;
    Ok((StatusCode::CREATED, Json(job)))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateJob>,
) -> Result<Json<Job>, AppError> {
    let mut job = load(&state, &auth, id).await?;

    if let Some(title) = req.title {
        job.title = title.trim().to_string();
    }
    if let Some(description) = req.description {
        job.description = description;
    }
    job.requirements = req.requirements.or(job.requirements);
    job.benefits = req.benefits.or(job.benefits);
    job.salary_min = req.salary_min.or(job.salary_min);
    job.salary_max = req.salary_max.or(job.salary_max);
    job.status = req.status.unwrap_or(job.status);
    job.location_type = req.location_type.unwrap_or(job.location_type);
    job.assigned_recruiter = req.assigned_recruiter.or(job.assigned_recruiter);
    job.hiring_manager = req.hiring_manager.or(job.hiring_manager);
    validate(&job)?;

    Ok(Json(state.store.update_job(&job).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    load(&state, &auth, id).await?;
    state.store.delete_job(id).await?;
    Ok(Json(serde_json::json!({ "message": "Deleted" })))
}
