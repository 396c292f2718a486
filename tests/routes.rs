mod common;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode, header},
};
use serde_json::json;
use tower::ServiceExt;

use common::{api_path, spawn_app, token_of};

#[tokio::test]
async fn health_reports_ok() {
    let app = spawn_app().await;

    let (status, body) = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() {
    let app = spawn_app().await;

    for path in ["/orders", "/stores", "/users/me", "/customers"] {
        let (status, body) = app.send(Method::GET, path, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{path} should be protected");
        assert_eq!(body["status"], 401);
        assert_eq!(body["message"], "Missing/invalid Authorization header");
    }

    let (status, _) = app
        .send(Method::GET, "/orders", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn workers_cannot_manage_the_catalog_or_users() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let (status, created) = app
        .send(
            Method::POST,
            "/users",
            Some(&admin),
            Some(json!({
                "full_name": "Counter Staff",
                "email": "worker@shop.test",
                "password": "worker-pass",
                "role": "worker",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create user failed: {created}");
    assert_eq!(created["data"]["role"], "worker");

    let worker = app.login("worker@shop.test", "worker-pass").await;
    let worker_token = token_of(&worker, "access_token");

    for path in ["/orders", "/products", "/users"] {
        let (status, body) = app.send(Method::GET, path, Some(&worker_token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{path} should be forbidden");
        assert_eq!(body["message"], "Missing required role");
    }

    let (status, _) = app
        .send(Method::GET, "/users/me", Some(&worker_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_user_creation_rejects_unknown_roles() {
    let app = spawn_app().await;
    let admin = app.admin_token().await;

    let (status, body) = app
        .send(
            Method::POST,
            "/users",
            Some(&admin),
            Some(json!({
                "full_name": "Someone",
                "email": "someone@shop.test",
                "password": "secret-pass",
                "role": "superuser",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["data"][0]["field"], "role");
}

#[tokio::test]
async fn catalog_crud_round_trip_with_filters() {
    let app = spawn_app().await;
    let session = app.register("catalog@shop.test").await;
    let token = token_of(&session, "access_token");

    let (status, store) = app
        .send(
            Method::POST,
            "/stores",
            Some(&token),
            Some(json!({ "name": "Main", "code": "MAIN", "address": "2 High St" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "store failed: {store}");
    let store_id = store["data"]["id"].as_str().expect("store id").to_string();

    let (status, mine) = app.send(Method::GET, "/stores/mine", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine["data"]["total"], 1);
    assert_eq!(mine["data"]["data"][0]["code"], "MAIN");

    for name in ["Shirt", "Trousers", "Silk Shirt"] {
        let (status, _) = app
            .send(
                Method::POST,
                "/products",
                Some(&token),
                Some(json!({ "name": name, "store_id": store_id })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, shirts) = app
        .send(Method::GET, "/products?name=*Shirt*", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(shirts["data"]["total"], 2);

    let (status, exact) = app
        .send(
            Method::GET,
            &format!("/products?name=Trousers&store_id={store_id}"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exact["data"]["total"], 1);
    let product_id = exact["data"]["data"][0]["id"]
        .as_str()
        .expect("product id")
        .to_string();

    let (status, body) = app
        .send(Method::GET, "/products?colour=red", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid filter: colour");

    let (status, renamed) = app
        .send(
            Method::PUT,
            &format!("/products/{product_id}"),
            Some(&token),
            Some(json!({ "name": "Slacks", "store_id": store_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(renamed["data"]["name"], "Slacks");

    let (status, _) = app
        .send(Method::DELETE, &format!("/products/{product_id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .send(Method::GET, &format!("/products/{product_id}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "product not found");
}

#[tokio::test]
async fn duplicate_store_code_is_a_conflict() {
    let app = spawn_app().await;
    let session = app.register("codes@shop.test").await;
    let token = token_of(&session, "access_token");
    let store = json!({ "name": "Main", "code": "DUPE", "address": "2 High St" });

    let (status, _) = app
        .send(Method::POST, "/stores", Some(&token), Some(store.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(Method::POST, "/stores", Some(&token), Some(store.clone()))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "store code already in use");

    let (status, other) = app
        .send(
            Method::POST,
            "/stores",
            Some(&token),
            Some(json!({ "name": "Annex", "code": "ANNEX", "address": "4 High St" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let other_id = other["data"]["id"].as_str().expect("store id").to_string();

    let (status, body) = app
        .send(Method::PUT, &format!("/stores/{other_id}"), Some(&token), Some(store))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "store code already in use");
}

#[tokio::test]
async fn body_that_does_not_deserialize_is_a_validation_error() {
    let app = spawn_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri(api_path("/auth/login"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "email": "x@shop.test" }).to_string()))
        .expect("request should build");
    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("router should respond");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json: serde_json::Value = serde_json::from_slice(&bytes).expect("body should be json");
    assert_eq!(json["status"], 422);
    assert_eq!(json["data"][0]["field"], "password");
}

#[tokio::test]
async fn unknown_routes_get_the_json_envelope() {
    let app = spawn_app().await;

    let (status, body) = app.send(Method::GET, "/nowhere", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}
