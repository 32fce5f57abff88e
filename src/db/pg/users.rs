use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::User;

pub async fn insert<'e, E: sqlx::PgExecutor<'e>>(executor: E, user: &User) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (id, email, password_hash, first_name, last_name, is_active, is_superadmin, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.is_active)
    .bind(user.is_superadmin)
    .bind(user.created_at)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(executor: E, id: Uuid) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_email<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    email: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE lower(email) = lower($1) AND deleted_at IS NULL",
    )
    .bind(email.trim())
    .fetch_optional(executor)
    .await
}

pub async fn list_all<'e, E: sqlx::PgExecutor<'e>>(executor: E) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT * FROM users WHERE deleted_at IS NULL ORDER BY created_at DESC",
    )
    .fetch_all(executor)
    .await
}

pub async fn list_by_company<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    company_id: Uuid,
) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT u.* FROM users u
         WHERE u.deleted_at IS NULL
           AND EXISTS (SELECT 1 FROM memberships m WHERE m.user_id = u.id AND m.company_id = $1)
         ORDER BY u.created_at DESC",
    )
    .bind(company_id)
    .fetch_all(executor)
    .await
}

pub async fn update_profile<'e, E: sqlx::PgExecutor<'e>>(executor: E, user: &User) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET first_name = $2, last_name = $3, is_active = $4
         WHERE id = $1 AND deleted_at IS NULL RETURNING *",
    )
    .bind(user.id)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.is_active)
    .fetch_one(executor)
    .await
}

pub async fn update_password<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    password_hash: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1 AND deleted_at IS NULL")
        .bind(id)
        .bind(password_hash)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn update_last_login<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
    at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET last_login_at = $2 WHERE id = $1")
        .bind(id)
        .bind(at)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn set_superadmin<'e, E: sqlx::PgExecutor<'e>>(executor: E, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET is_superadmin = true WHERE id = $1 AND deleted_at IS NULL")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn soft_delete<'e, E: sqlx::PgExecutor<'e>>(executor: E, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE users SET deleted_at = now(), is_active = false WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn count_all<'e, E: sqlx::PgExecutor<'e>>(executor: E) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
        .fetch_one(executor)
        .await?;
    Ok(row.0)
}
