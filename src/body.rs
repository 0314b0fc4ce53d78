use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use serde::de::DeserializeOwned;
use std::ops::Deref;

use crate::error::AppError;

/// JSON request body that reads a missing or blank body as `T::default()`.
///
/// Field types are left to the rule set, so request types built for it keep
/// loosely typed fields as `serde_json::Value`. Only syntactically broken JSON
/// is rejected here. The content type is not checked.
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

impl<T> JsonBody<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for JsonBody<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> FromRequest for JsonBody<T>
where
    T: DeserializeOwned + Default + 'static,
{
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let bytes = web::Bytes::from_request(req, payload);
        Box::pin(async move {
            let bytes = bytes.await?;
            if bytes.iter().all(u8::is_ascii_whitespace) {
                return Ok(JsonBody(T::default()));
            }
            serde_json::from_slice(&bytes)
                .map(JsonBody)
                .map_err(|e| AppError::BadRequest(format!("Invalid JSON body: {}", e)).into())
        })
    }
}
