//! Postgres backend. Each submodule holds the queries for one table as free functions over a
//! `PgExecutor`, so the same query runs against the pool or inside a transaction.

pub mod applications;
pub mod candidates;
pub mod companies;
pub mod jobs;
pub mod memberships;
pub mod plans;
pub mod system_values;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::scope::Scope;
use crate::db::{
    ApplicationRepository, CandidateRepository, CompanyFilter, CompanyRepository, JobRepository,
    MembershipRepository, PlanRepository, Provisioner, Provisioning, StoreError,
    SystemValueRepository, UserRepository,
};
use crate::models::{
    Application, Candidate, Company, Job, Membership, Plan, SystemValue, User,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn affected(rows: u64) -> Result<(), StoreError> {
    if rows == 0 { Err(StoreError::NotFound) } else { Ok(()) }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(users::find_by_id(&self.pool, id).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(users::find_by_email(&self.pool, email).await?)
    }

    async fn create_user(&self, user: &User) -> Result<User, StoreError> {
        Ok(users::insert(&self.pool, user).await?)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(users::list_all(&self.pool).await?)
    }

    async fn list_company_users(&self, company_id: Uuid) -> Result<Vec<User>, StoreError> {
        Ok(users::list_by_company(&self.pool, company_id).await?)
    }

    async fn update_user(&self, user: &User) -> Result<User, StoreError> {
        Ok(users::update_profile(&self.pool, user).await?)
    }

    async fn update_user_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        affected(users::update_password(&self.pool, id, password_hash).await?)
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        Ok(users::update_last_login(&self.pool, id, at).await?)
    }

    async fn mark_superadmin(&self, id: Uuid) -> Result<(), StoreError> {
        affected(users::set_superadmin(&self.pool, id).await?)
    }

    async fn soft_delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        affected(users::soft_delete(&self.pool, id).await?)
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        Ok(users::count_all(&self.pool).await?)
    }
}

#[async_trait]
impl CompanyRepository for PgStore {
    async fn find_company(&self, id: Uuid) -> Result<Option<Company>, StoreError> {
        Ok(companies::find_by_id(&self.pool, id).await?)
    }

    async fn list_companies(&self) -> Result<Vec<Company>, StoreError> {
        Ok(companies::list(&self.pool).await?)
    }

    async fn search_companies(&self, filter: &CompanyFilter) -> Result<(Vec<Company>, i64), StoreError> {
        let rows = companies::search(&self.pool, filter).await?;
        let total = companies::count_matching(&self.pool, filter).await?;
        Ok((rows, total))
    }

    async fn update_company(&self, company: &Company) -> Result<Company, StoreError> {
        Ok(companies::update(&self.pool, company).await?)
    }

    async fn count_company_members(&self, company_id: Uuid) -> Result<i64, StoreError> {
        Ok(companies::count_members(&self.pool, company_id).await?)
    }
}

#[async_trait]
impl MembershipRepository for PgStore {
    async fn find_membership(&self, id: Uuid) -> Result<Option<Membership>, StoreError> {
        Ok(memberships::find_by_id(&self.pool, id).await?)
    }

    async fn find_default_membership(&self, user_id: Uuid) -> Result<Option<Membership>, StoreError> {
        Ok(memberships::find_default(&self.pool, user_id).await?)
    }

    async fn find_user_membership(
        &self,
        user_id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Membership>, StoreError> {
        Ok(memberships::find_for_company(&self.pool, user_id, company_id).await?)
    }

    async fn list_memberships(&self, scope: Scope) -> Result<Vec<Membership>, StoreError> {
        Ok(memberships::list(&self.pool, scope.company_id()).await?)
    }

    async fn list_user_memberships(&self, user_id: Uuid) -> Result<Vec<Membership>, StoreError> {
        Ok(memberships::list_by_user(&self.pool, user_id).await?)
    }

    async fn list_user_companies(&self, user_id: Uuid) -> Result<Vec<Company>, StoreError> {
        Ok(memberships::list_active_companies(&self.pool, user_id).await?)
    }

    async fn create_membership(&self, membership: &Membership) -> Result<Membership, StoreError> {
        let mut tx = self.pool.begin().await?;
        if membership.is_default {
            memberships::clear_default(&mut *tx, membership.user_id, membership.id).await?;
        }
        let created = memberships::insert(&mut *tx, membership).await?;
        tx.commit().await?;
        Ok(created)
    }

    async fn update_membership(&self, membership: &Membership) -> Result<Membership, StoreError> {
        let mut tx = self.pool.begin().await?;
        if membership.is_default {
            memberships::clear_default(&mut *tx, membership.user_id, membership.id).await?;
        }
        let updated = memberships::update(&mut *tx, membership).await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_membership(&self, id: Uuid) -> Result<(), StoreError> {
        affected(memberships::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl PlanRepository for PgStore {
    async fn list_plans(&self) -> Result<Vec<Plan>, StoreError> {
        Ok(plans::list(&self.pool).await?)
    }

    async fn find_active_plan(&self, slug: &str) -> Result<Option<Plan>, StoreError> {
        Ok(plans::find_active_by_slug(&self.pool, slug).await?)
    }
}

#[async_trait]
impl JobRepository for PgStore {
    async fn list_jobs(&self, scope: Scope) -> Result<Vec<Job>, StoreError> {
        Ok(jobs::list(&self.pool, scope.company_id()).await?)
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        Ok(jobs::find_by_id(&self.pool, id).await?)
    }

    async fn create_job(&self, job: &Job) -> Result<Job, StoreError> {
        Ok(jobs::insert(&self.pool, job).await?)
    }

    async fn update_job(&self, job: &Job) -> Result<Job, StoreError> {
        Ok(jobs::update(&self.pool, job).await?)
    }

    async fn delete_job(&self, id: Uuid) -> Result<(), StoreError> {
        affected(jobs::delete(&self.pool, id).await?)
    }

    async fn count_jobs(&self, scope: Scope) -> Result<i64, StoreError> {
        Ok(jobs::count(&self.pool, scope.company_id()).await?)
    }
}

#[async_trait]
impl CandidateRepository for PgStore {
    async fn list_candidates(&self, scope: Scope) -> Result<Vec<Candidate>, StoreError> {
        Ok(candidates::list(&self.pool, scope.company_id()).await?)
    }

    async fn find_candidate(&self, id: Uuid) -> Result<Option<Candidate>, StoreError> {
        Ok(candidates::find_by_id(&self.pool, id).await?)
    }

    async fn create_candidate(&self, candidate: &Candidate) -> Result<Candidate, StoreError> {
        Ok(candidates::insert(&self.pool, candidate).await?)
    }

    async fn update_candidate(&self, candidate: &Candidate) -> Result<Candidate, StoreError> {
        Ok(candidates::update(&self.pool, candidate).await?)
    }

    async fn delete_candidate(&self, id: Uuid) -> Result<(), StoreError> {
        affected(candidates::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl ApplicationRepository for PgStore {
    async fn list_applications(&self, scope: Scope) -> Result<Vec<Application>, StoreError> {
        Ok(applications::list(&self.pool, scope.company_id()).await?)
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>, StoreError> {
        Ok(applications::find_by_id(&self.pool, id).await?)
    }

    async fn create_application(&self, application: &Application) -> Result<Application, StoreError> {
        Ok(applications::insert(&self.pool, application).await?)
    }

    async fn update_application(&self, application: &Application) -> Result<Application, StoreError> {
        Ok(applications::update(&self.pool, application).await?)
    }

    async fn delete_application(&self, id: Uuid) -> Result<(), StoreError> {
        affected(applications::delete(&self.pool, id).await?)
    }

    async fn count_applications(&self, scope: Scope) -> Result<i64, StoreError> {
        Ok(applications::count(&self.pool, scope.company_id()).await?)
    }
}

#[async_trait]
impl SystemValueRepository for PgStore {
    async fn list_system_values(
        &self,
        scope: Scope,
        category: Option<&str>,
    ) -> Result<Vec<SystemValue>, StoreError> {
        Ok(system_values::list(&self.pool, scope.company_id(), category).await?)
    }

    async fn find_system_value(&self, id: Uuid) -> Result<Option<SystemValue>, StoreError> {
        Ok(system_values::find_by_id(&self.pool, id).await?)
    }

    async fn create_system_value(&self, value: &SystemValue) -> Result<SystemValue, StoreError> {
        Ok(system_values::insert(&self.pool, value).await?)
    }

    async fn update_system_value(&self, value: &SystemValue) -> Result<SystemValue, StoreError> {
        Ok(system_values::update(&self.pool, value).await?)
    }

    async fn delete_system_value(&self, id: Uuid) -> Result<(), StoreError> {
        affected(system_values::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl Provisioner for PgStore {
    async fn provision(&self, rows: &Provisioning) -> Result<(), StoreError> {
        // Dropping `tx` on any early return rolls the whole bootstrap back.
        let mut tx = self.pool.begin().await?;
        if let Some(company) = &rows.company {
            companies::insert(&mut *tx, company).await?;
        }
        users::insert(&mut *tx, &rows.user).await?;
        if let Some(membership) = &rows.membership {
            if membership.is_default {
                memberships::clear_default(&mut *tx, membership.user_id, membership.id).await?;
            }
            memberships::insert(&mut *tx, membership).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}
