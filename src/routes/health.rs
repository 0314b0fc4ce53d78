use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::config::Config;
use crate::repository::MEMORY_URL_SCHEME;

fn store_kind(config: &Config) -> &'static str {
    if config.database_url.starts_with(MEMORY_URL_SCHEME) {
        "memory"
    } else {
        "mongodb"
    }
}

/// Liveness check for load balancers. Never gated.
///
/// Reports the crate version, the configured store backend and whether the
/// task routes require a token.
#[get("/health")]
pub async fn health(config: web::Data<Config>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "store": store_kind(&config),
        "authRequired": config.require_auth,
        "timestamp": Utc::now()
    }))
}
