// Common test utilities shared across test files

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::{path::Path, sync::Arc};
use tienda::{
    auth::{token::TokenService, PasswordHasher, LOWEST_COST},
    catalog::JsonFileCatalog,
    config::RouteProtection,
    AppState,
};
use tower::ServiceExt;

#[allow(dead_code)]
pub const TEST_SECRET: &str = "integration-test-secret";

/// A router over an in-memory database and a throwaway catalog directory.
/// Keep the `TempDir` alive for as long as the router is used.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub catalog_dir: tempfile::TempDir,
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// Seed the catalog with products 0 and 1, one category and comments for product 1
fn seed_catalog(root: &Path) {
    write(root, "products/0.json", r#"{"id": 0, "name": "Gift card", "cost": 10}"#);
    write(root, "products/1.json", r#"{"id": 1, "name": "Chevrolet Onix", "cost": 13500}"#);
    write(root, "cats/cat.json", r#"[{"id": 101, "name": "Autos", "productCount": 2}]"#);
    write(root, "cats_products/101.json", r#"{"catID": 101, "catName": "Autos", "products": [{"id": 0}, {"id": 1}]}"#);
    write(root, "products_comments/1.json", r#"[{"product": 1, "score": 4, "user": "ana"}]"#);
}

#[allow(dead_code)]
pub async fn create_test_app() -> TestApp {
    create_test_app_with(RouteProtection::CatalogAndProfile).await
}

#[allow(dead_code)]
pub async fn create_test_app_with(protection: RouteProtection) -> TestApp {
    let pool = tienda::db::init_db(tienda::db::MEMORY_DB)
        .await
        .expect("Failed to create in-memory database");

    let catalog_dir = tempfile::tempdir().expect("Failed to create catalog dir");
    seed_catalog(catalog_dir.path());

    let state = Arc::new(AppState::new(
        pool,
        Arc::new(JsonFileCatalog::new(catalog_dir.path())),
        TokenService::new(TEST_SECRET),
        PasswordHasher::new(LOWEST_COST),
        protection,
    ));

    TestApp {
        router: tienda::create_router(state.clone()),
        state,
        catalog_dir,
    }
}

impl TestApp {
    /// Send a request and return the status with the decoded JSON body (Null if empty)
    #[allow(dead_code)]
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let (status, _, json) = self.send_request(request).await;
        (status, json)
    }

    /// Send a prebuilt request; returns status, headers and the JSON body (Null if empty).
    /// Panics if a non-empty body is not JSON.
    #[allow(dead_code)]
    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|e| panic!("body is not JSON ({}): {:?}", e, bytes))
        };

        (status, headers, json)
    }

    /// Register a user and return its id
    #[allow(dead_code)]
    pub async fn sign_up(&self, user_name: &str, mail: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/sign-up",
                None,
                Some(serde_json::json!({
                    "user_name": user_name,
                    "mail": mail,
                    "user_password": password,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "sign-up failed: {}", body);
        body["insertedId"].as_str().unwrap().to_string()
    }

    /// Log in and return the session token
    #[allow(dead_code)]
    pub async fn login(&self, user_name: &str, password: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/login",
                None,
                Some(serde_json::json!({
                    "user_name": user_name,
                    "user_password": password,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().unwrap().to_string()
    }
}
