use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;

/// The caller's verified claims, taken from request extensions.
///
/// Only populated on routes behind `AuthMiddleware`. Handlers on scopes where the
/// gate is optional take `Option<Identity>`, which resolves to `None` when the
/// gate did not run.
#[derive(Debug, Clone)]
pub struct Identity(pub Claims);

impl Identity {
    pub fn subject(&self) -> &str {
        &self.0.sub
    }
}

impl FromRequest for Identity {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>().cloned() {
            Some(claims) => ready(Ok(Identity(claims))),
            None => ready(Err(AppError::MissingToken.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::dev::Payload;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_rt::test]
    async fn test_identity_extractor_success() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(Claims {
            sub: "demoUser".into(),
            iat: 0,
            exp: 3600,
        });

        let mut payload = Payload::None;
        let identity = Identity::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(identity.subject(), "demoUser");
    }

    #[actix_rt::test]
    async fn test_identity_extractor_failure() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let err = Identity::from_request(&req, &mut payload).await.unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_optional_identity_is_none_without_claims() {
        let req = test::TestRequest::default().to_http_request();

        let mut payload = Payload::None;
        let identity = Option::<Identity>::from_request(&req, &mut payload).await.unwrap();
        assert!(identity.is_none());
    }
}
