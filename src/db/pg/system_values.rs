use uuid::Uuid;

use crate::models::SystemValue;

/// `visible_to = None` lists everything; `Some(company)` lists that company's values plus the global ones.
pub async fn list<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    visible_to: Option<Uuid>,
    category: Option<&str>,
) -> Result<Vec<SystemValue>, sqlx::Error> {
    sqlx::query_as::<_, SystemValue>(
        "SELECT * FROM system_values
         WHERE ($1::uuid IS NULL OR company_id IS NULL OR company_id = $1)
           AND ($2::text IS NULL OR category = $2)
         ORDER BY category, display_order, value",
    )
    .bind(visible_to)
    .bind(category)
    .fetch_all(executor)
    .await
}

pub async fn find_by_id<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<SystemValue>, sqlx::Error> {
    sqlx::query_as::<_, SystemValue>("SELECT * FROM system_values WHERE id = $1")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn insert<'e, E: sqlx::PgExecutor<'e>>(executor: E, v: &SystemValue) -> Result<SystemValue, sqlx::Error> {
    sqlx::query_as::<_, SystemValue>(
        "INSERT INTO system_values (id, company_id, category, value, label, description, display_order,
                                    is_active, created_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
    )
    .bind(v.id)
    .bind(v.company_id)
    .bind(&v.category)
    .bind(&v.value)
    .bind(&v.label)
    .bind(v.description.as_deref())
    .bind(v.display_order)
    .bind(v.is_active)
    .bind(v.created_at)
    .fetch_one(executor)
    .await
}

pub async fn update<'e, E: sqlx::PgExecutor<'e>>(executor: E, v: &SystemValue) -> Result<SystemValue, sqlx::Error> {
    sqlx::query_as::<_, SystemValue>(
        "UPDATE system_values SET value = $2, label = $3, description = $4, display_order = $5, is_active = $6
         WHERE id = $1 RETURNING *",
    )
    .bind(v.id)
    .bind(&v.value)
    .bind(&v.label)
    .bind(v.description.as_deref())
    .bind(v.display_order)
    .bind(v.is_active)
    .fetch_one(executor)
    .await
}

pub async fn delete<'e, E: sqlx::PgExecutor<'e>>(executor: E, id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM system_values WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
