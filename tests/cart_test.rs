// Integration tests for the cart endpoints and the route protection policy

mod common;

use axum::http::{Method, StatusCode};
use tienda::config::RouteProtection;

#[tokio::test]
async fn test_cart_round_trip() {
    let app = common::create_test_app().await;
    let user_id = app.sign_up("ana", "ana@x.com", "secret").await;

    let (status, body) = app
        .send(Method::PUT, &format!("/cart?id={}&ids=55,48,65", user_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["cart"]["user_id"], user_id.as_str());
    assert_eq!(body["cart"]["productos"], "55,48,65");

    let (status, body) = app
        .send(Method::GET, &format!("/cart?id={}", user_id), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["products"], serde_json::json!(["55", "48", "65"]));
}

#[tokio::test]
async fn test_cart_put_replaces() {
    let app = common::create_test_app().await;
    let user_id = app.sign_up("ana", "ana@x.com", "secret").await;

    let (_, first) = app
        .send(Method::PUT, &format!("/cart?id={}&ids=1,2,3", user_id), None, None)
        .await;
    let (_, second) = app
        .send(Method::PUT, &format!("/cart?id={}&ids=4,5", user_id), None, None)
        .await;
    assert_eq!(first["cart"]["id"], second["cart"]["id"]);

    let (_, body) = app
        .send(Method::GET, &format!("/cart?id={}", user_id), None, None)
        .await;
    assert_eq!(body["products"], serde_json::json!(["4", "5"]));

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM carrito WHERE user_id = ?")
        .bind(&user_id)
        .fetch_one(&app.state.pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_cart_missing_params() {
    let app = common::create_test_app().await;

    let (status, _) = app.send(Method::GET, "/cart", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::PUT, "/cart?id=abc", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.send(Method::PUT, "/cart?ids=1,2", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_query_is_json_400() {
    let app = common::create_test_app().await;

    let (status, body) = app.send(Method::GET, "/cart?id=a&id=b", None, None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().starts_with("invalid query string"));
}

#[tokio::test]
async fn test_unsupported_method_is_json_405() {
    let app = common::create_test_app().await;

    let (status, body) = app.send(Method::DELETE, "/cart?id=a", None, None).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "method not allowed");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = common::create_test_app().await;

    let (status, body) = app.send(Method::GET, "/nowhere", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "route not found");
}

#[tokio::test]
async fn test_cart_not_found() {
    let app = common::create_test_app().await;
    let user_id = app.sign_up("ana", "ana@x.com", "secret").await;

    let (status, body) = app
        .send(Method::GET, &format!("/cart?id={}", user_id), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "cart not found");
}

#[tokio::test]
async fn test_cart_for_unknown_user() {
    let app = common::create_test_app().await;

    let (status, _) = app
        .send(Method::PUT, "/cart?id=ghost&ids=1,2", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_protect_all_routes_policy() {
    let app = common::create_test_app_with(RouteProtection::All).await;
    let user_id = app.sign_up("ana", "ana@x.com", "secret").await;
    let cart_uri = format!("/cart?id={}&ids=1", user_id);

    let (status, _) = app.send(Method::PUT, &cart_uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(Method::GET, "/products?ids=1", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.login("ana", "secret").await;
    let (status, _) = app.send(Method::PUT, &cart_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(Method::GET, "/products?ids=1", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_security_headers_present() {
    let app = common::create_test_app().await;
    let response = tower::ServiceExt::oneshot(
        app.router.clone(),
        axum::http::Request::builder()
            .uri("/products?ids=1")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await
    .unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["cache-control"], "no-store");
}
