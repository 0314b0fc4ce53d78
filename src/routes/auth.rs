use crate::{
    auth::{TokenCodec, TokenResponse, DEMO_IDENTITY},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};

/// Issue a demo token
///
/// Unauthenticated. Signs a token for the fixed demo identity so clients can
/// reach the protected task routes without an account.
#[post("/auth")]
pub async fn issue_token(tokens: web::Data<TokenCodec>) -> Result<impl Responder, AppError> {
    let token = tokens.issue(DEMO_IDENTITY)?;
    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
