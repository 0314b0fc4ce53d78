#![allow(dead_code)]

use actix_web::{
    body::{to_bytes, MessageBody},
    dev::{Service, ServiceResponse},
    http::{header, StatusCode},
    test,
};
use serde_json::Value;
use taskgate::{repository::Repositories, AppState, Config};

pub const SECRET: &str = "integration_secret";

pub fn test_config(require_auth: bool) -> Config {
    Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("memory://".to_string()),
        "JWT_SECRET" => Some(SECRET.to_string()),
        // bcrypt's minimum work factor keeps signup/login tests fast
        "BCRYPT_COST" => Some("4".to_string()),
        "REQUIRE_AUTH" => Some(require_auth.to_string()),
        _ => None,
    })
    .expect("test config should be valid")
}

pub fn state(require_auth: bool) -> AppState {
    AppState::new(test_config(require_auth), Repositories::in_memory())
}

pub fn state_with(require_auth: bool, repositories: Repositories) -> AppState {
    AppState::new(test_config(require_auth), repositories)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Calls the service and returns the status with the body parsed as JSON
/// (`Value::Null` for an empty or non-JSON body).
///
/// Errors raised by middleware never reach a handler, so they are rendered
/// here the way the server would render them.
pub async fn send<S, B>(app: &S, req: actix_http::Request) -> (StatusCode, Value)
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let (status, bytes) = match test::try_call_service(app, req).await {
        Ok(resp) => (resp.status(), test::read_body(resp).await),
        Err(err) => {
            let resp = err.error_response();
            let status = resp.status();
            (status, to_bytes(resp.into_body()).await.unwrap_or_default())
        }
    };
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn error_messages(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["message"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn error_fields(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
