use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A registered account. `password_hash` is a bcrypt hash, never plaintext.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub id: ObjectId,
    pub username: String,
    pub password_hash: String,
    pub user_status: bool,
    pub created_at: DateTime<Utc>,
}

/// An account about to be inserted; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

/// What signup echoes back: the username only.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedUser {
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: CreatedUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoggedInUser {
    pub username: String,
    pub user_status: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: LoggedInUser,
}

impl LoginResponse {
    pub fn new(token: String, user: &UserRecord) -> Self {
        Self {
            message: "Login successful".into(),
            token,
            user: LoggedInUser {
                username: user.username.clone(),
                user_status: user.user_status,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_response_never_carries_hash() {
        let user = UserRecord {
            id: ObjectId::new(),
            username: "alice".into(),
            password_hash: "$2b$04$abcdefghijklmnopqrstuv".into(),
            user_status: false,
            created_at: Utc::now(),
        };
        let body = serde_json::to_value(LoginResponse::new("tok".into(), &user)).unwrap();
        assert_eq!(
            body,
            json!({
                "message": "Login successful",
                "token": "tok",
                "user": { "username": "alice", "user_status": false }
            })
        );
    }
}
