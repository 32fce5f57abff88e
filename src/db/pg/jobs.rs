use uuid::Uuid;

use crate::models::Job;

pub async fn list<'e, E: sqlx::PgExecutor<'e>>(executor: E, company_id: Option<Uuid>) -> Result<Vec<Job>, sqlx::Error> {
    sqlx::query_as::<_, Job>(
        "SELECT * FROM jobs WHERE ($1::uuid IS NULL OR company_id = $1) ORDER BY created_at DESC",
    )
    .bind(company_id)
    .fetch_all(executor)
    .await
}

pub async fn count<'e, E: sqlx::PgExecutor<'e>>(executor: E, company_id: Option<Uuid>) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs WHERE ($1::uuid IS NULL OR company_id = $1)")
        .bind(company_id)
        .fetch_one(executor)
        .await?;
    Ok(row.0)
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
    sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn insert<'e, E: sqlx::PgExecutor<'e>>(executor: E, job: &Job) -> Result<Job, sqlx::Error> {
    sqlx::query_as::<_, Job>(
        "INSERT INTO jobs (id, company_id, title, description, requirements, benefits, salary_min, salary_max,
                           status, location_type, assigned_recruiter, hiring_manager, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) RETURNING *",
    )
    .bind(job.id)
    .bind(job.company_id)
    .bind(&job.title)
    .bind(&job.description)
    .bind(job.requirements.as_deref())
    .bind(job.benefits.as_deref())
    .bind(job.salary_min)
    .bind(job.salary_max)
    .bind(job.status)
    .bind(&job.location_type)
    .bind(job.assigned_recruiter)
    .bind(job.hiring_manager)
    .bind(job.created_at)
    .bind(job.updated_at)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(executor: E, job: &Job) -> Result<Job, sqlx::Error> {
    sqlx::query_as::<_, Job>(
        "UPDATE jobs SET title = $2, description = $3, requirements = $4, benefits = $5, salary_min = $6,
                         salary_max = $7, status = $8, location_type = $9, assigned_recruiter = $10,
                         hiring_manager = $11, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(job.id)
    .bind(&job.title)
    .bind(&job.description)
    .bind(job.requirements.as_deref())
    .bind(job.benefits.as_deref())
    .bind(job.salary_min)
    .bind(job.salary_max)
    .bind(job.status)
    .bind(&job.location_type)
    .bind(job.assigned_recruiter)
    .bind(job.hiring_manager)
    .fetch_one(executor)
    .await
}

pub async fn delete<'e, E: sqlx::PgExecutor<'e>>(executor: E, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
