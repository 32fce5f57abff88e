use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A configurable lookup value. `company_id = None` marks a global value visible to every tenant.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct SystemValue {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub category: String,
    pub value: String,
    pub label: String,
    pub description: Option<String>,
    pub display_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
