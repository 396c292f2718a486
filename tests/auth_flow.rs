mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use serde_json::json;

use pos_core::{
    db::dao::{DaoBase, RefreshTokenDao, RefreshTokenStore},
    services::auth_service::RefreshRequest,
};

use common::{spawn_app, start_time, token_of};

#[tokio::test]
async fn register_then_login_returns_a_bearer_session() {
    let app = spawn_app().await;

    let registered = app.register("Owner@Shop.test").await;
    assert_eq!(registered["token_type"], "Bearer");
    assert_eq!(registered["expires_in"], 900);
    assert_eq!(registered["user"]["email"], "owner@shop.test");
    assert_eq!(registered["user"]["role"], "owner");
    assert_eq!(registered["user"]["provider"], "local");

    let session = app.login("owner@shop.test", "secret-pass").await;
    let access = token_of(&session, "access_token");

    let (status, me) = app.send(Method::GET, "/users/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["email"], "owner@shop.test");
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let app = spawn_app().await;
    app.register("dup@shop.test").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({
                "username": "second",
                "email": "DUP@shop.test",
                "password": "secret-pass",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "email already registered");
}

#[tokio::test]
async fn wrong_password_and_unknown_email_look_the_same() {
    let app = spawn_app().await;
    app.register("known@shop.test").await;

    for (email, password) in [
        ("known@shop.test", "not-the-password"),
        ("missing@shop.test", "secret-pass"),
    ] {
        let (status, body) = app
            .send(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "invalid credentials");
    }
}

#[tokio::test]
async fn refresh_rotates_and_the_old_token_is_single_use() {
    let app = spawn_app().await;
    let session = app.register("rotate@shop.test").await;
    let access = token_of(&session, "access_token");
    let first = token_of(&session, "refresh_token");

    let (status, rotated) = app
        .send(
            Method::POST,
            "/auth/refresh",
            Some(&access),
            Some(json!({ "refresh_token": first })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "refresh failed: {rotated}");
    let second = token_of(&rotated["data"], "refresh_token");
    assert_ne!(first, second);
    assert_eq!(rotated["data"]["user"]["email"], "rotate@shop.test");

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/refresh",
            Some(&access),
            Some(json!({ "refresh_token": first })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid refresh token");

    let (status, _) = app
        .send(
            Method::POST,
            "/auth/refresh",
            Some(&access),
            Some(json!({ "refresh_token": second })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn login_revokes_earlier_sessions() {
    let app = spawn_app().await;
    let first = app.register("single@shop.test").await;
    let first_refresh = token_of(&first, "refresh_token");

    app.login("single@shop.test", "secret-pass").await;

    let err = app
        .state
        .auth
        .refresh(RefreshRequest {
            refresh_token: first_refresh,
        })
        .await
        .expect_err("earlier refresh token should be revoked");
    assert_eq!(err.message(), "invalid refresh token");
}

#[tokio::test]
async fn logout_revokes_only_the_callers_token() {
    let app = spawn_app().await;
    let alice = app.register("alice@shop.test").await;
    let bob = app.register("bob@shop.test").await;
    let alice_access = token_of(&alice, "access_token");
    let bob_access = token_of(&bob, "access_token");
    let alice_refresh = token_of(&alice, "refresh_token");

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/logout",
            Some(&bob_access),
            Some(json!({ "refresh_token": alice_refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "invalid refresh token");

    let (status, _) = app
        .send(
            Method::POST,
            "/auth/logout",
            Some(&alice_access),
            Some(json!({ "refresh_token": alice_refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(
            Method::POST,
            "/auth/refresh",
            Some(&alice_access),
            Some(json!({ "refresh_token": alice_refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn access_tokens_expire_on_the_injected_clock() {
    let app = spawn_app().await;
    let session = app.register("clock@shop.test").await;
    let access = token_of(&session, "access_token");

    app.clock.advance(Duration::minutes(14));
    let (status, _) = app.send(Method::GET, "/users/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);

    app.clock.advance(Duration::minutes(2));
    let (status, body) = app.send(Method::GET, "/users/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn refresh_works_once_the_access_token_has_expired() {
    let app = spawn_app().await;
    let session = app.register("late@shop.test").await;
    let access = token_of(&session, "access_token");
    let refresh = token_of(&session, "refresh_token");

    app.clock.advance(Duration::seconds(901));
    let (status, _) = app.send(Method::GET, "/users/me", Some(&access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, rotated) = app
        .send(
            Method::POST,
            "/auth/refresh",
            None,
            Some(json!({ "refresh_token": refresh })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "refresh failed: {rotated}");

    let fresh = token_of(&rotated["data"], "access_token");
    let (status, me) = app.send(Method::GET, "/users/me", Some(&fresh), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["data"]["email"], "late@shop.test");
}

#[tokio::test]
async fn refresh_token_rows_are_stamped_by_the_injected_clock() {
    let app = spawn_app().await;
    app.clock.advance(Duration::days(3));
    let session = app.register("stamped@shop.test").await;
    let refresh = token_of(&session, "refresh_token");

    let issued_at = (start_time() + Duration::days(3)).fixed_offset();
    let row = RefreshTokenDao::new(&app.state.db)
        .find_active(&refresh, issued_at)
        .await
        .expect("lookup should succeed")
        .expect("token should be active");
    assert_eq!(row.created_at, issued_at);
    assert_eq!(row.updated_at, issued_at);
    assert_eq!(row.expires_at, issued_at + Duration::days(7));
}

#[tokio::test]
async fn refresh_tokens_expire_after_the_configured_days() {
    let app = spawn_app().await;
    let session = app.register("stale@shop.test").await;
    let refresh = token_of(&session, "refresh_token");

    app.clock.advance(Duration::days(7) + Duration::seconds(1));
    let err = app
        .state
        .auth
        .refresh(RefreshRequest {
            refresh_token: refresh,
        })
        .await
        .expect_err("expired refresh token should be rejected");
    assert_eq!(err.message(), "invalid refresh token");
}

#[tokio::test]
async fn google_login_creates_an_owner_once_and_reuses_it() {
    let app = spawn_app().await;

    let (status, first) = app
        .send(
            Method::POST,
            "/auth/google-login",
            None,
            Some(json!({ "id_token": "google:g@shop.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "google login failed: {first}");
    assert_eq!(first["data"]["user"]["provider"], "google");
    assert_eq!(first["data"]["user"]["role"], "owner");
    let user_id = first["data"]["user"]["id"].clone();

    let (status, second) = app
        .send(
            Method::POST,
            "/auth/google-login",
            None,
            Some(json!({ "id_token": "google:g@shop.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["data"]["user"]["id"], user_id);

    // a google-only account has no local password
    let (status, _) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "g@shop.test", "password": "anything" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Method::POST,
            "/auth/google-login",
            None,
            Some(json!({ "id_token": "forged" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn google_login_links_an_existing_local_account() {
    let app = spawn_app().await;
    let registered = app.register("local@shop.test").await;
    let user_id = registered["user"]["id"].clone();
    assert!(registered["user"]["google_id"].is_null());

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/google-login",
            None,
            Some(json!({ "id_token": "google:local@shop.test" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "google login failed: {body}");
    assert_eq!(body["data"]["user"]["id"], user_id);
    assert_eq!(body["data"]["user"]["provider"], "local");
    assert_eq!(body["data"]["user"]["google_id"], "sub-local@shop.test");

    // the local password keeps working after linking
    let session = app.login("local@shop.test", "secret-pass").await;
    assert_eq!(session["user"]["id"], user_id);
}

#[tokio::test]
async fn seeding_the_admin_twice_keeps_one_account() {
    let app = spawn_app().await;
    app.state
        .auth
        .seed_admin(common::ADMIN_EMAIL, "a-different-password")
        .await
        .expect("second seed should be a no-op");

    let session = app
        .login(common::ADMIN_EMAIL, common::ADMIN_PASSWORD)
        .await;
    assert_eq!(session["user"]["role"], "admin");
}
