use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::auth::Scope;
use crate::db::{
    ApplicationRepository, CompanyFilter, CompanyRepository, JobRepository, PlanRepository,
    SharedStore, UserRepository,
};
use crate::error::AppError;
use crate::models::{Company, CompanyStatus, User};

pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Serialize)]
pub struct CompanyStats {
    #[serde(flatten)]
    pub company: Company,
    pub user_count: i64,
    pub job_count: i64,
}

#[derive(Debug, Serialize)]
pub struct CompanyPage {
    pub companies: Vec<CompanyStats>,
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

#[derive(Debug, Default, PartialEq, Serialize)]
pub struct Analytics {
    pub total_companies: i64,
    pub active_companies: i64,
    pub suspended_companies: i64,
    pub total_users: i64,
    pub total_jobs: i64,
    pub total_applications: i64,
    /// Sum of plan prices over active companies.
    pub monthly_revenue_cents: i64,
}

/// Cross-tenant company management for super-admins.
#[derive(Clone)]
pub struct AdminService {
    store: SharedStore,
}

impl AdminService {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    async fn company(&self, id: Uuid) -> Result<Company, AppError> {
        self.store
            .find_company(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Company not found".to_string()))
    }

    pub async fn list_companies(
        &self,
        page: i64,
        limit: i64,
        search: Option<String>,
        plan_tier: Option<String>,
    ) -> Result<CompanyPage, AppError> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or_else(|| AppError::BadRequest("Page out of range".to_string()))?;
        let filter = CompanyFilter {
            search: search.filter(|s| !s.trim().is_empty()),
            plan_tier: plan_tier.filter(|s| !s.is_empty()),
            offset,
            limit,
        };

        let (rows, total) = self.store.search_companies(&filter).await?;
        let mut companies = Vec::with_capacity(rows.len());
        for company in rows {
            let scope = Scope::Company(company.id);
            companies.push(CompanyStats {
                user_count: self.store.count_company_members(company.id).await?,
                job_count: self.store.count_jobs(scope).await?,
                company,
            });
        }

        Ok(CompanyPage { companies, page, limit, total })
    }

    pub async fn change_plan(&self, id: Uuid, plan_slug: &str) -> Result<Company, AppError> {
        let plan = self
            .store
            .find_active_plan(plan_slug)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Plan '{plan_slug}' is not available or inactive")))?;

        let mut company = self.company(id).await?;
        company.plan_tier = plan.slug;
        let company = self.store.update_company(&company).await?;
        tracing::info!(company_id = %id, plan = %company.plan_tier, "company plan changed");
        Ok(company)
    }

    pub async fn suspend(&self, id: Uuid, reason: &str) -> Result<Company, AppError> {
        let mut company = self.company(id).await?;
        company.status = CompanyStatus::Suspended;
        company.suspended_reason = Some(reason.trim().to_string()).filter(|r| !r.is_empty());
        let company = self.store.update_company(&company).await?;
        tracing::warn!(company_id = %id, reason = %reason, "company suspended");
        Ok(company)
    }

    pub async fn reactivate(&self, id: Uuid) -> Result<Company, AppError> {
        let mut company = self.company(id).await?;
        company.status = CompanyStatus::Active;
        company.suspended_reason = None;
        let company = self.store.update_company(&company).await?;
        tracing::info!(company_id = %id, "company reactivated");
        Ok(company)
    }

    pub async fn company_users(&self, id: Uuid) -> Result<Vec<User>, AppError> {
        self.company(id).await?;
        Ok(self.store.list_company_users(id).await?)
    }

    pub async fn analytics(&self) -> Result<Analytics, AppError> {
        let companies = self.store.list_companies().await?;
        let prices: HashMap<String, i64> = self
            .store
            .list_plans()
            .await?
            .into_iter()
            .map(|p| (p.slug, p.price_cents))
            .collect();

        let suspended = companies.iter().filter(|c| c.is_suspended()).count() as i64;
        let monthly_revenue_cents = companies
            .iter()
            .filter(|c| !c.is_suspended())
            .filter_map(|c| prices.get(&c.plan_tier))
            .sum();

        Ok(Analytics {
            total_companies: companies.len() as i64,
            active_companies: companies.len() as i64 - suspended,
            suspended_companies: suspended,
            total_users: self.store.count_users().await?,
            total_jobs: self.store.count_jobs(Scope::All).await?,
            total_applications: self.store.count_applications(Scope::All).await?,
            monthly_revenue_cents,
        })
    }
}
