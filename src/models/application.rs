use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_stage", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStage {
    Applied,
    Screening,
    Technical,
    Offer,
    Hired,
    Rejected,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub company_id: Uuid,
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub stage: ApplicationStage,
    pub rating: Option<i32>,
    pub applied_at: DateTime<Utc>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub hired_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Move to `stage`, stamping the terminal timestamps the first time they are reached.
    pub fn move_to(&mut self, stage: ApplicationStage) {
        let now = Utc::now();
        match stage {
            ApplicationStage::Hired if self.hired_at.is_none() => self.hired_at = Some(now),
            ApplicationStage::Rejected if self.rejected_at.is_none() => self.rejected_at = Some(now),
            _ => {}
        }
        self.stage = stage;
        self.updated_at = now;
    }
}
