pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod security;

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use auth::{token::TokenService, PasswordHasher};
use catalog::{CatalogStore, JsonFileCatalog};
use config::{Config, RouteProtection};
use db::{CartRepository, UserRepository};

// Application state
pub struct AppState {
    pub pool: SqlitePool,
    pub users: UserRepository,
    pub carts: CartRepository,
    pub catalog: Arc<dyn CatalogStore>,
    pub tokens: TokenService,
    pub hasher: PasswordHasher,
    pub route_protection: RouteProtection,
}

impl AppState {
    pub fn new(
        pool: SqlitePool,
        catalog: Arc<dyn CatalogStore>,
        tokens: TokenService,
        hasher: PasswordHasher,
        route_protection: RouteProtection,
    ) -> Self {
        Self {
            users: UserRepository::new(pool.clone(), hasher),
            carts: CartRepository::new(pool.clone()),
            pool,
            catalog,
            tokens,
            hasher,
            route_protection,
        }
    }
}

/// Open the database and wire every service from the configuration
pub async fn build_state(config: &Config) -> Result<Arc<AppState>> {
    let pool = db::init_db(&config.database).await?;

    if !config.catalog_dir.is_dir() {
        tracing::warn!(
            catalog = %config.catalog_dir.display(),
            "catalog directory does not exist; every catalog lookup will be a 404"
        );
    }

    Ok(Arc::new(AppState::new(
        pool,
        Arc::new(JsonFileCatalog::new(config.catalog_dir.clone())),
        TokenService::new(config.jwt_secret_or_default()),
        PasswordHasher::new(config.bcrypt_cost),
        config.route_protection,
    )))
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // Routes that always require a bearer token
    let protected = Router::new()
        .route(
            "/usuarios/{id}",
            get(handlers::users::get_user).put(handlers::users::update_user),
        )
        .route("/products/{id}", get(handlers::catalog::get_product))
        .route("/categories", get(handlers::catalog::get_categories))
        .route("/categories/{id}", get(handlers::catalog::get_category))
        .route("/comments/{id}", get(handlers::catalog::get_comments));

    // Routes whose protection depends on the configured policy
    let storefront = Router::new()
        .route("/products", get(handlers::catalog::get_products))
        .route(
            "/cart",
            get(handlers::cart::get_cart).put(handlers::cart::put_cart),
        );

    let (protected, open) = match state.route_protection {
        RouteProtection::CatalogAndProfile => (protected, storefront),
        RouteProtection::All => (protected.merge(storefront), Router::new()),
    };

    let require_bearer =
        middleware::from_fn_with_state(state.clone(), auth::middleware::require_bearer);

    Router::new()
        // Account routes, always open
        .route("/sign-up", post(handlers::auth::sign_up))
        .route("/login", post(handlers::auth::login))
        .merge(open)
        .merge(protected.route_layer(require_bearer))
        .fallback(handlers::not_found)
        // Must follow every route so each method router picks it up
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .layer(middleware::from_fn(security::security_headers))
        // Enforced by the body extractors, so an oversized body surfaces as a JSON 413
        .layer(DefaultBodyLimit::max(security::MAX_BODY_BYTES))
        .layer(security::cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
