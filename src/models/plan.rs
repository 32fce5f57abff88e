use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct Plan {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub price_cents: i64,
    pub is_active: bool,
    pub display_order: i32,
}

impl Plan {
    /// The catalogue the schema migration seeds.
    pub fn catalogue() -> Vec<Plan> {
        [
            ("01900000-0000-7000-8000-000000000001", "free", "Free", 0),
            ("01900000-0000-7000-8000-000000000002", "starter", "Starter", 3999),
            ("01900000-0000-7000-8000-000000000003", "professional", "Professional", 7999),
            ("01900000-0000-7000-8000-000000000004", "enterprise", "Enterprise", 15999),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (id, slug, name, price_cents))| Plan {
            id: Uuid::parse_str(id).unwrap_or_else(|_| Uuid::now_v7()),
            slug: slug.to_string(),
            name: name.to_string(),
            price_cents,
            is_active: true,
            display_order: i as i32 + 1,
        })
        .collect()
    }
}
