// Catalog handlers: products, categories and comments from the static store

use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::{
    catalog::{parse_id, parse_id_list},
    error::{AppError, InternalResultExt},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    ids: Option<String>,
}

fn route_id(raw: &str) -> Result<u64, AppError> {
    parse_id(raw).ok_or_else(|| AppError::BadRequest(format!("invalid id: {}", raw)))
}

fn found(record: Option<Value>, what: &str) -> Result<Json<Value>, AppError> {
    record
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("{} not found", what)))
}

// GET /products/{id}
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(raw_id) = raw_id?;
    let id = route_id(&raw_id)?;
    let product = state.catalog.get_product(id).await.internal("Catalog read")?;
    found(product, "product")
}

// GET /products?ids=1,2,3 - Unknown ids are left out of the result
pub async fn get_products(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ProductsQuery>, QueryRejection>,
) -> Result<Json<Vec<Value>>, AppError> {
    let Query(query) = query?;
    let raw = query
        .ids
        .filter(|ids| !ids.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("missing ids in query".to_string()))?;

    let ids = parse_id_list(&raw);
    let products = state.catalog.get_products(&ids).await.internal("Catalog read")?;

    tracing::debug!(requested = ids.len(), found = products.len(), "batch product lookup");
    Ok(Json(products))
}

// GET /categories
pub async fn get_categories(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let categories = state.catalog.get_categories().await.internal("Catalog read")?;
    found(categories, "category list")
}

// GET /categories/{id}
pub async fn get_category(
    State(state): State<Arc<AppState>>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(raw_id) = raw_id?;
    let id = route_id(&raw_id)?;
    let category = state.catalog.get_category(id).await.internal("Catalog read")?;
    found(category, "category")
}

// GET /comments/{id}
pub async fn get_comments(
    State(state): State<Arc<AppState>>,
    raw_id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(raw_id) = raw_id?;
    let id = route_id(&raw_id)?;
    let comments = state.catalog.get_comments(id).await.internal("Catalog read")?;
    found(comments, "comments")
}
