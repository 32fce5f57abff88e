use uuid::Uuid;

use crate::db::CompanyFilter;
use crate::models::Company;

pub async fn insert<'e, E: sqlx::PgExecutor<'e>>(executor: E, company: &Company) -> Result<Company, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "INSERT INTO companies (id, name, slug, plan_tier, status, trial_ends_at, timezone, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
    )
    .bind(company.id)
    .bind(&company.name)
    .bind(&company.slug)
    .bind(&company.plan_tier)
    .bind(company.status)
    .bind(company.trial_ends_at)
    .bind(&company.timezone)
    .bind(company.created_at)
    .bind(company.updated_at)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn list<'e, E: sqlx::PgExecutor<'e>>(executor: E) -> Result<Vec<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>("SELECT * FROM companies ORDER BY created_at DESC")
        .fetch_all(executor)
        .await
}

pub async fn search<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    filter: &CompanyFilter,
) -> Result<Vec<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "SELECT * FROM companies
         WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%' OR slug ILIKE '%' || $1 || '%')
           AND ($2::text IS NULL OR plan_tier = $2)
         ORDER BY created_at DESC
         OFFSET $3 LIMIT $4",
    )
    .bind(filter.search.as_deref())
    .bind(filter.plan_tier.as_deref())
    .bind(filter.offset)
    .bind(filter.limit)
    .fetch_all(executor)
    .await
}

pub async fn count_matching<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    filter: &CompanyFilter,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM companies
         WHERE ($1::text IS NULL OR name ILIKE '%' || $1 || '%' OR slug ILIKE '%' || $1 || '%')
           AND ($2::text IS NULL OR plan_tier = $2)",
    )
    .bind(filter.search.as_deref())
    .bind(filter.plan_tier.as_deref())
    .fetch_one(executor)
    .await?;
    Ok(row.0)
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(executor: E, company: &Company) -> Result<Company, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "UPDATE companies
         SET name = $2, slug = $3, plan_tier = $4, status = $5, suspended_reason = $6,
             trial_ends_at = $7, timezone = $8, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(company.id)
    .bind(&company.name)
    .bind(&company.slug)
    .bind(&company.plan_tier)
    .bind(company.status)
    .bind(company.suspended_reason.as_deref())
    .bind(company.trial_ends_at)
    .bind(&company.timezone)
    .fetch_one(executor)
    .await
}

pub async fn count_members<'e, E: sqlx::PgExecutor<'e>>(executor: E, company_id: Uuid) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM memberships WHERE company_id = $1")
        .bind(company_id)
        .fetch_one(executor)
        .await?;
    Ok(row.0)
}
