use uuid::Uuid;

use crate::models::Application;

pub async fn list<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    company_id: Option<Uuid>,
) -> Result<Vec<Application>, sqlx::Error> {
    sqlx::query_as::<_, Application>(
        "SELECT * FROM applications WHERE ($1::uuid IS NULL OR company_id = $1) ORDER BY applied_at DESC",
    )
    .bind(company_id)
    .fetch_all(executor)
    .await
}

pub async fn count<'e, E: sqlx::PgExecutor<'e>>(executor: E, company_id: Option<Uuid>) -> Result<i64, sqlx::Error> {
    let row: (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM applications WHERE ($1::uuid IS NULL OR company_id = $1)")
            .bind(company_id)
            .fetch_one(executor)
            .await?;
    Ok(row.0)
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Application>, sqlx::Error> {
    sqlx::query_as::<_, Application>("SELECT * FROM applications WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn insert<'e, E: sqlx::PgExecutor<'e>>(executor: E, a: &Application) -> Result<Application, sqlx::Error> {
    sqlx::query_as::<_, Application>(
        "INSERT INTO applications (id, company_id, job_id, candidate_id, stage, rating, applied_at,
                                   rejected_at, hired_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
    )
    .bind(a.id)
    .bind(a.company_id)
    .bind(a.job_id)
    .bind(a.candidate_id)
    .bind(a.stage)
    .bind(a.rating)
    .bind(a.applied_at)
    .bind(a.rejected_at)
    .bind(a.hired_at)
    .bind(a.updated_at)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(executor: E, a: &Application) -> Result<Application, sqlx::Error> {
    sqlx::query_as::<_, Application>(
        "UPDATE applications SET stage = $2, rating = $3, rejected_at = $4, hired_at = $5, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(a.id)
    .bind(a.stage)
    .bind(a.rating)
    .bind(a.rejected_at)
    .bind(a.hired_at)
    .fetch_one(executor)
    .await
}

pub async fn delete<'e, E: sqlx::PgExecutor<'e>>(executor: E, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM applications WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
