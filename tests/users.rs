mod common;

use actix_web::{http::StatusCode, test, App};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use taskgate::auth::TokenCodec;
use taskgate::repository::{MemoryStore, Repositories, UserRepository};

use common::{error_fields, error_messages, send, SECRET};

fn signup(payload: Value) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/users/signup")
        .set_json(payload)
        .to_request()
}

fn login(payload: Value) -> actix_http::Request {
    test::TestRequest::post()
        .uri("/users/login")
        .set_json(payload)
        .to_request()
}

#[actix_rt::test]
async fn test_signup_hides_password() {
    let store = Arc::new(MemoryStore::new());
    let state = common::state_with(true, Repositories::from_store(store.clone()));
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let (status, body) = send(&app, signup(json!({ "username": "alice", "password": "s3cret" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({
            "message": "User created successfully",
            "user": { "username": "alice" }
        })
    );

    let stored = store.find_by_username("alice").await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "s3cret");
    assert!(stored.password_hash.starts_with("$2"));
}

#[actix_rt::test]
async fn test_signup_rejects_taken_username() {
    let state = common::state(true);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let (status, _) = send(&app, signup(json!({ "username": "alice", "password": "one" }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, signup(json!({ "username": "alice", "password": "two" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Username already exists");
}

#[actix_rt::test]
async fn test_signup_and_login_require_both_fields() {
    let state = common::state(true);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let (status, body) = send(&app, signup(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["username", "password"]);
    assert_eq!(
        error_messages(&body),
        vec!["Username is required", "Password is required"]
    );

    let (status, body) = send(&app, login(json!({ "username": "alice", "password": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["password"]);

    let (status, body) = send(&app, signup(json!({ "username": "alice", "password": 1234 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_messages(&body), vec!["Password is required"]);

    let (status, body) = send(
        &app,
        test::TestRequest::post().uri("/users/login").to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_fields(&body), vec!["username", "password"]);
}

#[actix_rt::test]
async fn test_login_issues_token_for_user_id() {
    let store = Arc::new(MemoryStore::new());
    let state = common::state_with(true, Repositories::from_store(store.clone()));
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    send(&app, signup(json!({ "username": "bob", "password": "hunter2" }))).await;

    let (status, body) = send(&app, login(json!({ "username": "bob", "password": "hunter2" }))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"], json!({ "username": "bob", "user_status": false }));

    let token = body["token"].as_str().unwrap();
    let claims = TokenCodec::new(SECRET, chrono::Duration::hours(1))
        .verify(token)
        .unwrap();
    let user = store.find_by_username("bob").await.unwrap().unwrap();
    assert_eq!(claims.sub, user.id.to_hex());
    assert_eq!(claims.exp - claims.iat, 3600);

    // the issued token opens the gated task routes
    let (status, _) = send(
        &app,
        test::TestRequest::get()
            .uri("/tasks")
            .insert_header(common::bearer(token))
            .to_request(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[actix_rt::test]
async fn test_login_rejects_bad_credentials() {
    let state = common::state(true);
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    send(&app, signup(json!({ "username": "carol", "password": "right" }))).await;

    let (status, body) = send(&app, login(json!({ "username": "carol", "password": "wrong" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "Invalid credentials" }));

    let (status, body) = send(&app, login(json!({ "username": "nobody", "password": "right" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "message": "Invalid credentials" }));
}
