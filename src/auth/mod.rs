pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::validation::{into_text, validate_password, validate_username, FieldOrder};

// Re-export necessary items
pub use extractors::Identity;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenCodec};

/// Identity embedded in tokens issued by the unauthenticated `POST /auth` route.
pub const DEMO_IDENTITY: &str = "demoUser";

/// Credentials payload shared by signup and login.
///
/// Both fields are optional and untyped so that a missing or non-string field
/// is reported as a rule violation rather than a JSON parse failure.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct Credentials {
    #[validate(required(message = "Username is required"), custom = "validate_username")]
    pub username: Option<Value>,
    #[validate(required(message = "Password is required"), custom = "validate_password")]
    pub password: Option<Value>,
}

impl FieldOrder for Credentials {
    const FIELDS: &'static [&'static str] = &["username", "password"];
}

impl Credentials {
    /// Splits validated credentials into `(username, password)`.
    pub fn into_parts(self) -> (String, String) {
        (
            self.username.and_then(into_text).unwrap_or_default(),
            self.password.and_then(into_text).unwrap_or_default(),
        )
    }
}

/// Body of `POST /auth`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
