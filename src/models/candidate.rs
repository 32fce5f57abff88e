use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "candidate_source", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    Linkedin,
    Referral,
    DirectApply,
    Agency,
}

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Candidate {
    pub id: Uuid,
    pub company_id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub resume_url: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub source: Option<CandidateSource>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
