//! In-process backend over `RwLock`ed tables. Enforces the same unique, check and
//! foreign-key rules as the SQL schema so services behave identically on both stores.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::auth::scope::Scope;
use crate::db::{
    ApplicationRepository, CandidateRepository, CompanyFilter, CompanyRepository, JobRepository,
    MembershipRepository, PlanRepository, Provisioner, Provisioning, StoreError,
    SystemValueRepository, UserRepository,
};
use crate::models::{
    Application, Candidate, Company, Job, Membership, MembershipStatus, Plan, SystemValue, User,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    plans: Vec<Plan>,
    users: BTreeMap<Uuid, User>,
    companies: BTreeMap<Uuid, Company>,
    memberships: BTreeMap<Uuid, Membership>,
    jobs: BTreeMap<Uuid, Job>,
    candidates: BTreeMap<Uuid, Candidate>,
    applications: BTreeMap<Uuid, Application>,
    system_values: BTreeMap<Uuid, SystemValue>,
}

fn conflict(constraint: &str) -> StoreError {
    StoreError::Conflict(constraint.to_string())
}

fn violated(constraint: &str) -> StoreError {
    StoreError::Constraint(constraint.to_string())
}

fn in_scope(scope: Scope, company_id: Uuid) -> bool {
    match scope {
        Scope::All => true,
        Scope::Company(id) => id == company_id,
    }
}

fn newest_first<T: Clone>(rows: impl Iterator<Item = T>, key: impl Fn(&T) -> DateTime<Utc>) -> Vec<T> {
    let mut rows: Vec<T> = rows.collect();
    rows.sort_by_key(|r| std::cmp::Reverse(key(r)));
    rows
}

impl Tables {
    fn live_user(&self, id: Uuid) -> Option<&User> {
        self.users.get(&id).filter(|u| u.deleted_at.is_none())
    }

    fn insert_user(&mut self, user: &User) -> Result<User, StoreError> {
        let email = user.email.to_lowercase();
        let taken = self
            .users
            .values()
            .any(|u| u.deleted_at.is_none() && u.email.to_lowercase() == email);
        if taken || self.users.contains_key(&user.id) {
            return Err(conflict("users_email_key"));
        }
        self.users.insert(user.id, user.clone());
        Ok(user.clone())
    }

    fn insert_company(&mut self, company: &Company) -> Result<Company, StoreError> {
        if self.companies.values().any(|c| c.slug == company.slug) {
            return Err(conflict("companies_slug_key"));
        }
        self.companies.insert(company.id, company.clone());
        Ok(company.clone())
    }

    fn check_membership(&self, m: &Membership) -> Result<(), StoreError> {
        if !m.has_consistent_scope() {
            return Err(violated("memberships_global_scope_check"));
        }
        if !self.users.contains_key(&m.user_id) {
            return Err(violated("memberships_user_id_fkey"));
        }
        if let Some(company_id) = m.company_id {
            if !self.companies.contains_key(&company_id) {
                return Err(violated("memberships_company_id_fkey"));
            }
        }
        let others = self
            .memberships
            .values()
            .filter(|o| o.id != m.id && o.user_id == m.user_id);
        for other in others {
            if other.company_id == m.company_id {
                return Err(match m.company_id {
                    Some(_) => conflict("memberships_user_company_key"),
                    None => conflict("memberships_user_global_key"),
                });
            }
            if m.is_default && other.is_default {
                return Err(conflict("memberships_user_default_key"));
            }
        }
        Ok(())
    }

    fn clear_default(&mut self, user_id: Uuid, keep: Uuid) {
        for m in self.memberships.values_mut() {
            if m.user_id == user_id && m.id != keep {
                m.is_default = false;
            }
        }
    }

    fn upsert_membership(&mut self, m: &Membership) -> Result<Membership, StoreError> {
        if m.is_default {
            self.clear_default(m.user_id, m.id);
        }
        self.check_membership(m)?;
        self.memberships.insert(m.id, m.clone());
        Ok(m.clone())
    }

    fn check_candidate(&self, c: &Candidate) -> Result<(), StoreError> {
        if !self.companies.contains_key(&c.company_id) {
            return Err(violated("candidates_company_id_fkey"));
        }
        let duplicate = self
            .candidates
            .values()
            .any(|o| o.id != c.id && o.company_id == c.company_id && o.email == c.email);
        if duplicate {
            return Err(conflict("candidates_company_email_key"));
        }
        Ok(())
    }

    fn check_application(&self, a: &Application) -> Result<(), StoreError> {
        if let Some(rating) = a.rating {
            if !(1..=5).contains(&rating) {
                return Err(violated("applications_rating_check"));
            }
        }
        if !self.jobs.contains_key(&a.job_id) {
            return Err(violated("applications_job_id_fkey"));
        }
        if !self.candidates.contains_key(&a.candidate_id) {
            return Err(violated("applications_candidate_id_fkey"));
        }
        Ok(())
    }

    fn check_system_value(&self, v: &SystemValue) -> Result<(), StoreError> {
        if let Some(company_id) = v.company_id {
            if !self.companies.contains_key(&company_id) {
                return Err(violated("system_values_company_id_fkey"));
            }
        }
        let duplicate = self.system_values.values().any(|o| {
            o.id != v.id && o.company_id == v.company_id && o.category == v.category && o.value == v.value
        });
        if duplicate {
            return Err(match v.company_id {
                Some(_) => conflict("system_values_company_key"),
                None => conflict("system_values_global_key"),
            });
        }
        Ok(())
    }
}

/// A store that lives and dies with the process.
#[derive(Debug)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let tables = Tables {
            plans: Plan::catalogue(),
            ..Tables::default()
        };
        Self { tables: RwLock::new(tables) }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.live_user(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = email.trim().to_lowercase();
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.deleted_at.is_none() && u.email.to_lowercase() == email)
            .cloned())
    }

    async fn create_user(&self, user: &User) -> Result<User, StoreError> {
        self.write()?.insert_user(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let t = self.read()?;
        Ok(newest_first(
            t.users.values().filter(|u| u.deleted_at.is_none()).cloned(),
            |u| u.created_at,
        ))
    }

    async fn list_company_users(&self, company_id: Uuid) -> Result<Vec<User>, StoreError> {
        let t = self.read()?;
        let members = t.users.values().filter(|u| {
            u.deleted_at.is_none()
                && t.memberships
                    .values()
                    .any(|m| m.user_id == u.id && m.company_id == Some(company_id))
        });
        Ok(newest_first(members.cloned(), |u| u.created_at))
    }

    async fn update_user(&self, user: &User) -> Result<User, StoreError> {
        let mut t = self.write()?;
        let stored = t
            .users
            .get_mut(&user.id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or(StoreError::NotFound)?;
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.is_active = user.is_active;
        Ok(stored.clone())
    }

    async fn update_user_password(&self, id: Uuid, password_hash: &str) -> Result<(), StoreError> {
        let mut t = self.write()?;
        let user = t
            .users
            .get_mut(&id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or(StoreError::NotFound)?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(user) = self.write()?.users.get_mut(&id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }

    async fn mark_superadmin(&self, id: Uuid) -> Result<(), StoreError> {
        let mut t = self.write()?;
        let user = t
            .users
            .get_mut(&id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or(StoreError::NotFound)?;
        user.is_superadmin = true;
        Ok(())
    }

    async fn soft_delete_user(&self, id: Uuid) -> Result<(), StoreError> {
        let mut t = self.write()?;
        let user = t
            .users
            .get_mut(&id)
            .filter(|u| u.deleted_at.is_none())
            .ok_or(StoreError::NotFound)?;
        user.deleted_at = Some(Utc::now());
        user.is_active = false;
        Ok(())
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        Ok(self.read()?.users.values().filter(|u| u.deleted_at.is_none()).count() as i64)
    }
}

#[async_trait]
impl CompanyRepository for MemoryStore {
    async fn find_company(&self, id: Uuid) -> Result<Option<Company>, StoreError> {
        Ok(self.read()?.companies.get(&id).cloned())
    }

    async fn list_companies(&self) -> Result<Vec<Company>, StoreError> {
        let t = self.read()?;
        Ok(newest_first(t.companies.values().cloned(), |c| c.created_at))
    }

    async fn search_companies(&self, filter: &CompanyFilter) -> Result<(Vec<Company>, i64), StoreError> {
        let t = self.read()?;
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let matching = t.companies.values().filter(|c| {
            let text = needle.as_deref().is_none_or(|n| {
                c.name.to_lowercase().contains(n) || c.slug.to_lowercase().contains(n)
            });
            let tier = filter.plan_tier.as_deref().is_none_or(|p| c.plan_tier == p);
            text && tier
        });
        let all = newest_first(matching.cloned(), |c| c.created_at);
        let total = all.len() as i64;
        let page = all
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn update_company(&self, company: &Company) -> Result<Company, StoreError> {
        let mut t = self.write()?;
        if !t.companies.contains_key(&company.id) {
            return Err(StoreError::NotFound);
        }
        if t.companies.values().any(|c| c.id != company.id && c.slug == company.slug) {
            return Err(conflict("companies_slug_key"));
        }
        let mut updated = company.clone();
        updated.updated_at = Utc::now();
        t.companies.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn count_company_members(&self, company_id: Uuid) -> Result<i64, StoreError> {
        let t = self.read()?;
        Ok(t.memberships.values().filter(|m| m.company_id == Some(company_id)).count() as i64)
    }
}

#[async_trait]
impl MembershipRepository for MemoryStore {
    async fn find_membership(&self, id: Uuid) -> Result<Option<Membership>, StoreError> {
        Ok(self.read()?.memberships.get(&id).cloned())
    }

    async fn find_default_membership(&self, user_id: Uuid) -> Result<Option<Membership>, StoreError> {
        Ok(self
            .read()?
            .memberships
            .values()
            .find(|m| m.user_id == user_id && m.is_default)
            .cloned())
    }

    async fn find_user_membership(
        &self,
        user_id: Uuid,
        company_id: Uuid,
    ) -> Result<Option<Membership>, StoreError> {
        Ok(self
            .read()?
            .memberships
            .values()
            .find(|m| m.user_id == user_id && m.company_id == Some(company_id))
            .cloned())
    }

    async fn list_memberships(&self, scope: Scope) -> Result<Vec<Membership>, StoreError> {
        let t = self.read()?;
        let rows = t.memberships.values().filter(|m| match scope {
            Scope::All => true,
            Scope::Company(id) => m.company_id == Some(id),
        });
        Ok(newest_first(rows.cloned(), |m| m.created_at))
    }

    async fn list_user_memberships(&self, user_id: Uuid) -> Result<Vec<Membership>, StoreError> {
        let t = self.read()?;
        Ok(t.memberships.values().filter(|m| m.user_id == user_id).cloned().collect())
    }

    async fn list_user_companies(&self, user_id: Uuid) -> Result<Vec<Company>, StoreError> {
        let t = self.read()?;
        Ok(t.memberships
            .values()
            .filter(|m| m.user_id == user_id && m.status == MembershipStatus::Active)
            .filter_map(|m| m.company_id.and_then(|id| t.companies.get(&id)))
            .cloned()
            .collect())
    }

    async fn create_membership(&self, membership: &Membership) -> Result<Membership, StoreError> {
        let mut t = self.write()?;
        if t.memberships.contains_key(&membership.id) {
            return Err(conflict("memberships_pkey"));
        }
        // Stage on a copy so a rejected row leaves the other defaults untouched.
        let mut staged = t.clone();
        let created = staged.upsert_membership(membership)?;
        *t = staged;
        Ok(created)
    }

    async fn update_membership(&self, membership: &Membership) -> Result<Membership, StoreError> {
        let mut t = self.write()?;
        if !t.memberships.contains_key(&membership.id) {
            return Err(StoreError::NotFound);
        }
        let mut staged = t.clone();
        let updated = staged.upsert_membership(membership)?;
        *t = staged;
        Ok(updated)
    }

    async fn delete_membership(&self, id: Uuid) -> Result<(), StoreError> {
        self.write()?.memberships.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl PlanRepository for MemoryStore {
    async fn list_plans(&self) -> Result<Vec<Plan>, StoreError> {
        let mut plans: Vec<Plan> = self.read()?.plans.iter().filter(|p| p.is_active).cloned().collect();
        plans.sort_by_key(|p| p.display_order);
        Ok(plans)
    }

    async fn find_active_plan(&self, slug: &str) -> Result<Option<Plan>, StoreError> {
        Ok(self.read()?.plans.iter().find(|p| p.is_active && p.slug == slug).cloned())
    }
}

#[async_trait]
impl JobRepository for MemoryStore {
    async fn list_jobs(&self, scope: Scope) -> Result<Vec<Job>, StoreError> {
        let t = self.read()?;
        let rows = t.jobs.values().filter(|j| in_scope(scope, j.company_id));
        Ok(newest_first(rows.cloned(), |j| j.created_at))
    }

    async fn find_job(&self, id: Uuid) -> Result<Option<Job>, StoreError> {
        Ok(self.read()?.jobs.get(&id).cloned())
    }

    async fn create_job(&self, job: &Job) -> Result<Job, StoreError> {
        let mut t = self.write()?;
        if !t.companies.contains_key(&job.company_id) {
            return Err(violated("jobs_company_id_fkey"));
        }
        t.jobs.insert(job.id, job.clone());
        Ok(job.clone())
    }

    async fn update_job(&self, job: &Job) -> Result<Job, StoreError> {
        let mut t = self.write()?;
        let existing = t.jobs.get(&job.id).ok_or(StoreError::NotFound)?;
        let mut updated = job.clone();
        updated.company_id = existing.company_id;
        updated.created_at = existing.created_at;
        updated.updated_at = Utc::now();
        t.jobs.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete_job(&self, id: Uuid) -> Result<(), StoreError> {
        let mut t = self.write()?;
        t.jobs.remove(&id).ok_or(StoreError::NotFound)?;
        t.applications.retain(|_, a| a.job_id != id);
        Ok(())
    }

    async fn count_jobs(&self, scope: Scope) -> Result<i64, StoreError> {
        let t = self.read()?;
        Ok(t.jobs.values().filter(|j| in_scope(scope, j.company_id)).count() as i64)
    }
}

#[async_trait]
impl CandidateRepository for MemoryStore {
    async fn list_candidates(&self, scope: Scope) -> Result<Vec<Candidate>, StoreError> {
        let t = self.read()?;
        let rows = t.candidates.values().filter(|c| in_scope(scope, c.company_id));
        Ok(newest_first(rows.cloned(), |c| c.created_at))
    }

    async fn find_candidate(&self, id: Uuid) -> Result<Option<Candidate>, StoreError> {
        Ok(self.read()?.candidates.get(&id).cloned())
    }

    async fn create_candidate(&self, candidate: &Candidate) -> Result<Candidate, StoreError> {
        let mut t = self.write()?;
        t.check_candidate(candidate)?;
        t.candidates.insert(candidate.id, candidate.clone());
        Ok(candidate.clone())
    }

    async fn update_candidate(&self, candidate: &Candidate) -> Result<Candidate, StoreError> {
        let mut t = self.write()?;
        let existing = t.candidates.get(&candidate.id).ok_or(StoreError::NotFound)?;
        let mut updated = candidate.clone();
        updated.company_id = existing.company_id;
        updated.created_at = existing.created_at;
        updated.updated_at = Utc::now();
        t.check_candidate(&updated)?;
        t.candidates.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete_candidate(&self, id: Uuid) -> Result<(), StoreError> {
        let mut t = self.write()?;
        t.candidates.remove(&id).ok_or(StoreError::NotFound)?;
        t.applications.retain(|_, a| a.candidate_id != id);
        Ok(())
    }
}

#[async_trait]
impl ApplicationRepository for MemoryStore {
    async fn list_applications(&self, scope: Scope) -> Result<Vec<Application>, StoreError> {
        let t = self.read()?;
        let rows = t.applications.values().filter(|a| in_scope(scope, a.company_id));
        Ok(newest_first(rows.cloned(), |a| a.applied_at))
    }

    async fn find_application(&self, id: Uuid) -> Result<Option<Application>, StoreError> {
        Ok(self.read()?.applications.get(&id).cloned())
    }

    async fn create_application(&self, application: &Application) -> Result<Application, StoreError> {
        let mut t = self.write()?;
        if !t.companies.contains_key(&application.company_id) {
            return Err(violated("applications_company_id_fkey"));
        }
        t.check_application(application)?;
        t.applications.insert(application.id, application.clone());
        Ok(application.clone())
    }

    async fn update_application(&self, application: &Application) -> Result<Application, StoreError> {
        let mut t = self.write()?;
        let existing = t.applications.get(&application.id).ok_or(StoreError::NotFound)?.clone();
        let mut updated = existing;
        updated.stage = application.stage;
        updated.rating = application.rating;
        updated.rejected_at = application.rejected_at;
        updated.hired_at = application.hired_at;
        updated.updated_at = Utc::now();
        t.check_application(&updated)?;
        t.applications.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete_application(&self, id: Uuid) -> Result<(), StoreError> {
        self.write()?.applications.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }

    async fn count_applications(&self, scope: Scope) -> Result<i64, StoreError> {
        let t = self.read()?;
        Ok(t.applications.values().filter(|a| in_scope(scope, a.company_id)).count() as i64)
    }
}

#[async_trait]
impl SystemValueRepository for MemoryStore {
    async fn list_system_values(
        &self,
        scope: Scope,
        category: Option<&str>,
    ) -> Result<Vec<SystemValue>, StoreError> {
        let t = self.read()?;
        let mut rows: Vec<SystemValue> = t
            .system_values
            .values()
            .filter(|v| match (scope, v.company_id) {
                (Scope::All, _) | (_, None) => true,
                (Scope::Company(id), Some(owner)) => id == owner,
            })
            .filter(|v| category.is_none_or(|c| v.category == c))
            .cloned()
            .collect();
        rows.sort_by(|a, b| {
            (&a.category, a.display_order, &a.value).cmp(&(&b.category, b.display_order, &b.value))
        });
        Ok(rows)
    }

    async fn find_system_value(&self, id: Uuid) -> Result<Option<SystemValue>, StoreError> {
        Ok(self.read()?.system_values.get(&id).cloned())
    }

    async fn create_system_value(&self, value: &SystemValue) -> Result<SystemValue, StoreError> {
        let mut t = self.write()?;
        t.check_system_value(value)?;
        t.system_values.insert(value.id, value.clone());
        Ok(value.clone())
    }

    async fn update_system_value(&self, value: &SystemValue) -> Result<SystemValue, StoreError> {
        let mut t = self.write()?;
        let mut updated = t.system_values.get(&value.id).ok_or(StoreError::NotFound)?.clone();
        updated.value = value.value.clone();
        updated.label = value.label.clone();
        updated.description = value.description.clone();
        updated.display_order = value.display_order;
        updated.is_active = value.is_active;
        t.check_system_value(&updated)?;
        t.system_values.insert(updated.id, updated.clone());
        Ok(updated)
    }

    async fn delete_system_value(&self, id: Uuid) -> Result<(), StoreError> {
        self.write()?.system_values.remove(&id).map(|_| ()).ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl Provisioner for MemoryStore {
    async fn provision(&self, rows: &Provisioning) -> Result<(), StoreError> {
        let mut t = self.write()?;
        let mut staged = t.clone();
        if let Some(company) = &rows.company {
            staged.insert_company(company)?;
        }
        staged.insert_user(&rows.user)?;
        if let Some(membership) = &rows.membership {
            staged.upsert_membership(membership)?;
        }
        *t = staged;
        Ok(())
    }
}
