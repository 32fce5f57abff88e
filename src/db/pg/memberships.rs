use uuid::Uuid;

use crate::models::{Company, Membership};

pub async fn insert<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    membership: &Membership,
) -> Result<Membership, sqlx::Error> {
    sqlx::query_as::<_, Membership>(
        "INSERT INTO memberships
             (id, user_id, company_id, role, status, is_default, invited_by, invited_at, joined_at, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *",
    )
    .bind(membership.id)
    .bind(membership.user_id)
    .bind(membership.company_id)
    .bind(membership.role)
    .bind(membership.status)
    .bind(membership.is_default)
    .bind(membership.invited_by)
    .bind(membership.invited_at)
    .bind(membership.joined_at)
    .bind(membership.created_at)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    membership: &Membership,
) -> Result<Membership, sqlx::Error> {
    sqlx::query_as::<_, Membership>(
        "UPDATE memberships SET role = $2, status = $3, is_default = $4, joined_at = $5
         WHERE id = $1 RETURNING *",
    )
    .bind(membership.id)
    .bind(membership.role)
    .bind(membership.status)
    .bind(membership.is_default)
    .bind(membership.joined_at)
    .fetch_one(executor)
    .await
}

/// Drop the default flag from every membership of `user_id` except `keep`.
pub async fn clear_default<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    keep: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE memberships SET is_default = false WHERE user_id = $1 AND id <> $2 AND is_default")
        .bind(user_id)
        .bind(keep)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Membership>, sqlx::Error> {
    sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_default<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> Result<Option<Membership>, sqlx::Error> {
    sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE user_id = $1 AND is_default")
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

pub async fn find_for_company<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
    company_id: Uuid,
) -> Result<Option<Membership>, sqlx::Error> {
    sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE user_id = $1 AND company_id = $2")
        .bind(user_id)
        .bind(company_id)
        .fetch_optional(executor)
        .await
}

/// `None` lists every membership, including global ones.
pub async fn list<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    company_id: Option<Uuid>,
) -> Result<Vec<Membership>, sqlx::Error> {
    sqlx::query_as::<_, Membership>(
        "SELECT * FROM memberships WHERE ($1::uuid IS NULL OR company_id = $1) ORDER BY created_at DESC",
    )
    .bind(company_id)
    .fetch_all(executor)
    .await
}

pub async fn list_by_user<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> Result<Vec<Membership>, sqlx::Error> {
    sqlx::query_as::<_, Membership>("SELECT * FROM memberships WHERE user_id = $1 ORDER BY created_at")
        .bind(user_id)
        .fetch_all(executor)
        .await
}

pub async fn list_active_companies<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    user_id: Uuid,
) -> Result<Vec<Company>, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        "SELECT c.* FROM companies c
         JOIN memberships m ON m.company_id = c.id
         WHERE m.user_id = $1 AND m.status = 'active'
         ORDER BY m.created_at",
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn delete<'e, E: sqlx::PgExecutor<'e>>(executor: E, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM memberships WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
