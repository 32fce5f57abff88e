use axum::extract::State;
use axum::Json;

use crate::db::PlanRepository;
use crate::error::AppError;
use crate::models::Plan;
use crate::state::SharedState;

/// Public plan catalogue, active plans only.
pub async fn list(State(state): State<SharedState>) -> Result<Json<Vec<Plan>>, AppError> {
    let plans = state.store.list_plans().await?;
    Ok(Json(plans.into_iter().filter(|p| p.is_active).collect()))
}
