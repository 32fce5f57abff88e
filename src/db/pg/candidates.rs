use uuid::Uuid;

use crate::models::Candidate;

pub async fn list<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    company_id: Option<Uuid>,
) -> Result<Vec<Candidate>, sqlx::Error> {
    sqlx::query_as::<_, Candidate>(
        "SELECT * FROM candidates WHERE ($1::uuid IS NULL OR company_id = $1) ORDER BY created_at DESC",
    )
    .bind(company_id)
    .fetch_all(executor)
    .await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<Candidate>, sqlx::Error> {
    sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn insert<'e, E: sqlx::PgExecutor<'e>>(executor: E, c: &Candidate) -> Result<Candidate, sqlx::Error> {
    sqlx::query_as::<_, Candidate>(
        "INSERT INTO candidates (id, company_id, email, first_name, last_name, phone, resume_url, github_url,
                                 linkedin_url, source, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
    )
    .bind(c.id)
    .bind(c.company_id)
    .bind(&c.email)
    .bind(&c.first_name)
    .bind(&c.last_name)
    .bind(c.phone.as_deref())
    .bind(c.resume_url.as_deref())
    .bind(c.github_url.as_deref())
    .bind(c.linkedin_url.as_deref())
    .bind(c.source)
    .bind(c.created_at)
    .bind(c.updated_at)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(executor: E, c: &Candidate) -> Result<Candidate, sqlx::Error> {
    sqlx::query_as::<_, Candidate>(
        "UPDATE candidates SET email = $2, first_name = $3, last_name = $4, phone = $5, resume_url = $6,
                               github_url = $7, linkedin_url = $8, source = $9, updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(c.id)
    .bind(&c.email)
    .bind(&c.first_name)
    .bind(&c.last_name)
    .bind(c.phone.as_deref())
    .bind(c.resume_url.as_deref())
    .bind(c.github_url.as_deref())
    .bind(c.linkedin_url.as_deref())
    .bind(c.source)
    .fetch_one(executor)
    .await
}

pub async fn delete<'e, E: sqlx::PgExecutor<'e>>(executor: E, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM candidates WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
