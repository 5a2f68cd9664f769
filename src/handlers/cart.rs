// Cart handlers: /cart?id=USER_ID[&ids=1,2,3]

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{db::Cart, error::AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct CartQuery {
    id: Option<String>,
    ids: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CartItemsResponse {
    status: &'static str,
    message: &'static str,
    products: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CartResponse {
    status: &'static str,
    message: &'static str,
    cart: Cart,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// GET /cart?id=USER_ID
pub async fn get_cart(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CartQuery>, QueryRejection>,
) -> Result<Json<CartItemsResponse>, AppError> {
    let Query(query) = query?;
    let user_id =
        present(query.id).ok_or_else(|| AppError::BadRequest("missing id in query".to_string()))?;

    let products = state.carts.get(&user_id).await?;

    Ok(Json(CartItemsResponse {
        status: "ok",
        message: "ok",
        products,
    }))
}

// PUT /cart?id=USER_ID&ids=55,48,65 - Replaces the whole cart
pub async fn put_cart(
    State(state): State<Arc<AppState>>,
    query: Result<Query<CartQuery>, QueryRejection>,
) -> Result<Json<CartResponse>, AppError> {
    let Query(query) = query?;
    let (Some(user_id), Some(ids)) = (present(query.id), present(query.ids)) else {
        return Err(AppError::BadRequest("missing ids or id parameter".to_string()));
    };

    let cart = state.carts.upsert(&user_id, &ids).await?;

    Ok(Json(CartResponse {
        status: "ok",
        message: "ok",
        cart,
    }))
}
