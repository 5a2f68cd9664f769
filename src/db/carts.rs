// Cart persistence: one row per user holding a comma-joined list of product ids

use serde::Serialize;
use sqlx::SqlitePool;

use super::RepoError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "productos")]
    #[sqlx(rename = "productos")]
    pub item_ids: String,
}

impl Cart {
    pub fn items(&self) -> Vec<String> {
        split_item_ids(&self.item_ids)
    }
}

/// Split a stored list, dropping empty segments
pub fn split_item_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Get the item ids in a user's cart; an empty cart counts as no cart
    pub async fn get(&self, user_id: &str) -> Result<Vec<String>, RepoError> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT productos FROM carrito WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let items = stored.map(|raw| split_item_ids(&raw)).unwrap_or_default();
        if items.is_empty() {
            return Err(RepoError::NotFound("cart"));
        }

        Ok(items)
    }

    /// Replace the user's cart wholesale, creating it on first write.
    pub async fn upsert(&self, user_id: &str, item_ids: &str) -> Result<Cart, RepoError> {
        let cart = sqlx::query_as::<_, Cart>(
            "INSERT INTO carrito (id, user_id, productos) VALUES (?, ?, ?)
             ON CONFLICT(user_id) DO UPDATE SET productos = excluded.productos
             RETURNING id, user_id, productos",
        )
        .bind(uuid::Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(item_ids)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepoError::from_write(e, "user"))?;

        tracing::info!(%user_id, cart_id = %cart.id, items = cart.items().len(), "saved cart");

        Ok(cart)
    }
}
