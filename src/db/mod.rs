//! Persistence seams. Handlers and services only ever see the [`Store`] trait object;
//! `PgStore` backs production and `MemoryStore` backs tests and local development.

pub mod memory;
pub mod pg;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::scope::Scope;
use crate::models::{
    Application, Candidate, Company, Job, Membership, Plan, SystemValue, User,
};

pub use memory::MemoryStore;
pub use pg::PgStore;

#[derive(Debug)]
pub enum StoreError {
    /// A uniqueness constraint was violated; carries the constraint name.
    Conflict(String),
    /// A check or foreign-key constraint was violated.
    Constraint(String),
    NotFound,
    Poisoned,
    Database(sqlx::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict(c) => write!(f, "unique constraint violated: {c}"),
            StoreError::Constraint(c) => write!(f, "constraint violated: {c}"),
            StoreError::NotFound => write!(f, "row not found"),
            StoreError::Poisoned => write!(f, "store lock poisoned"),
            StoreError::Database(err) => write!(f, "database error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict(db_err.constraint().unwrap_or("unique").to_string())
            }
            sqlx::Error::Database(ref db_err)
                if db_err.is_check_violation() || db_err.is_foreign_key_violation() =>
            {
                StoreError::Constraint(db_err.constraint().unwrap_or("check").to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Filter for the super-admin company listing.
#[derive(Debug, Clone, Default)]
pub struct CompanyFilter {
    pub search: Option<String>,
    pub plan_tier: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

/// Rows that must be created together or not at all: company, then user, then membership.
#[derive(Debug, Clone)]
pub struct Provisioning {
    pub company: Option<Company>,
    pub user: User,
    pub membership: Option<Membership>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn create_user(&self, user: &User) -> Result<User, StoreError>;
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;
    async fn list_company_users(&self, company_id: Uuid) -> Result<Vec<User>, StoreError>;
    /// Writes the profile fields (names and `is_active`) of a live user.
    async fn update_user(&self, user: &User) -> Result<User, StoreError>;
    async fn update_user_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError>;
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError>;
    async fn mark_superadmin(&self, id: Uuid) -> Result<(), StoreError>;
    async fn soft_delete_user(&self, id: Uuid) -> Result<(), StoreError>;
    async fn count_users(&self) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait CompanyRepository: Send + Sync {
    async fn find_company(&self, id: Uuid) -> Result<Option<Company>, StoreError>;
    async fn list_companies(&self) -> Result<Vec<Company>, StoreError>;
    async fn search_companies(&self, filter: &CompanyFilter) -> Result<(Vec<Company>, i64), StoreError>;
    async fn update_company(&self, company: &Company) -> Result<Company, StoreError>;
    async fn count_company_members(&self, company_id: Uuid) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    async fn find_membership(&self, id: Uuid) -> Result<Option<Membership>, StoreError>;
    async fn find_default_membership(&self, user_id: Uuid) -> Result<Option<Membership>, StoreError>;
    async fn find_user_membership(
        &self,
        user_id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Membership>, StoreError>;
    async fn list_memberships(&self, scope: Scope) -> Result<Vec<Membership>, StoreError>;
    async fn list_user_memberships(&self, user_id: Uuid) -> Result<Vec<Membership>, StoreError>;
    /// Companies in which the user holds an active membership.
    async fn list_user_companies(&self, user_id: Uuid) -> Result<Vec<Company>, StoreError>;
    /// Inserts; when the row is default, the user's previous default is cleared in the same step.
    async fn create_membership(&self, membership: &Membership) -> Result<Membership, StoreError>;
    /// Updates; when the row is default, the user's other default is cleared in the same step.
    async fn update_membership(&self, membership: &Membership) -> Result<Membership, StoreError>;
    async fn delete_membership(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PlanRepository: Send + Sync {
    async fn list_plans(&self) -> Result<Vec<Plan>, StoreError>;
    async fn find_active_plan(&self, slug: &str) -> Result<Option<Plan>, StoreError>;
}

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn list_jobs(&self, scope: Scope) -> Result<Vec<Job>, StoreError>;
    async fn find_job(&self, id: Uuid) -> Result<Option<Job>, StoreError>;
    async fn create_job(&self, job: &Job) -> Result<Job, StoreError>;
    async fn update_job(&self, job: &Job) -> Result<Job, StoreError>;
    async fn delete_job(&self, id: Uuid) -> Result<(), StoreError>;
    async fn count_jobs(&self, scope: Scope) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait CandidateRepository: Send + Sync {
    async fn list_candidates(&self, scope: Scope) -> Result<Vec<Candidate>, StoreError>;
    async fn find_candidate(&self, id: Uuid) -> Result<Option<Candidate>, StoreError>;
    async fn create_candidate(&self, candidate: &Candidate) -> Result<Candidate, StoreError>;
    async fn update_candidate(&self, candidate: &Candidate) -> Result<Candidate, StoreError>;
    async fn delete_candidate(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn list_applications(&self, scope: Scope) -> Result<Vec<Application>, StoreError>;
    async fn find_application(&self, id: Uuid) -> Result<Option<Application>, StoreError>;
    async fn create_application(&self, application: &Application) -> Result<Application, StoreError>;
    async fn update_application(&self, application: &Application) -> Result<Application, StoreError>;
    async fn delete_application(&self, id: Uuid) -> Result<(), StoreError>;
    async fn count_applications(&self, scope: Scope) -> Result<i64, StoreError>;
}

#[async_trait]
pub trait SystemValueRepository: Send + Sync {
    /// `Scope::Company` yields that company's values plus the global ones.
    async fn list_system_values(
        &self,
        scope: Scope,
        category: Option<&str>,
    ) -> Result<Vec<SystemValue>, StoreError>;
    async fn find_system_value(&self, id: Uuid) -> Result<Option<SystemValue>, StoreError>;
    async fn create_system_value(&self, value: &SystemValue) -> Result<SystemValue, StoreError>;
    async fn update_system_value(&self, value: &SystemValue) -> Result<SystemValue, StoreError>;
    async fn delete_system_value(&self, id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait Provisioner: Send + Sync {
    /// Inserts every row of `rows` in one transaction.
    async fn provision(&self, rows: &Provisioning) -> Result<(), StoreError>;
}

pub trait Store:
    UserRepository
    + CompanyRepository
    + MembershipRepository
    + PlanRepository
    + JobRepository
    + CandidateRepository
    + ApplicationRepository
    + SystemValueRepository
    + Provisioner
{
}

impl<T> Store for T where
    T: UserRepository
        + CompanyRepository
        + MembershipRepository
        + PlanRepository
        + JobRepository
        + CandidateRepository
        + ApplicationRepository
        + SystemValueRepository
        + Provisioner
{
}

pub type SharedStore = Arc<dyn Store>;
