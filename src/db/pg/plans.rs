use crate::models::Plan;

pub async fn list<'e, E: sqlx::PgExecutor<'e>>(executor: E) -> Result<Vec<Plan>, sqlx::Error> {
    sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE is_active ORDER BY display_order")
        .fetch_all(executor)
        .await
}

pub async fn find_active_by_slug<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    slug: &str,
) -> Result<Option<Plan>, sqlx::Error> {
    sqlx::query_as::<_, Plan>("SELECT * FROM plans WHERE slug = $1 AND is_active")
        .bind(slug)
        .fetch_optional(executor)
        .await
}
