use crate::{
    auth::{hash_password, verify_password, Credentials, TokenCodec},
    body::JsonBody,
    config::Config,
    error::AppError,
    models::{CreatedUser, LoginResponse, NewUser, SignupResponse},
    repository::{StoreError, UserRepository},
    validation::RuleSet,
};
use actix_web::{post, web, HttpResponse, Responder};

const SIGNUP_FAILED: &str = "Error creating user. Please try again later.";
const LOGIN_FAILED: &str = "Error logging in. Please try again later.";

/// Register a new user
///
/// Hashes the password before storage and echoes back only the username.
///
/// ## Responses:
/// - `201 Created`: `{ message, user: { username } }`.
/// - `400 Bad Request`: missing fields, or the username is already taken.
/// - `500 Internal Server Error`: store or hashing failure.
#[post("/signup")]
pub async fn signup(
    users: web::Data<dyn UserRepository>,
    config: web::Data<Config>,
    body: JsonBody<Credentials>,
) -> Result<impl Responder, AppError> {
    RuleSet::new().check(&*body).finish()?;
    let (username, password) = body.into_inner().into_parts();

    let existing = users
        .find_by_username(&username)
        .await
        .map_err(|e| AppError::internal(SIGNUP_FAILED, e))?;
    if existing.is_some() {
        return Err(AppError::BadRequest("Username already exists".into()));
    }

    let password_hash = hash_password(&password, config.bcrypt_cost)?;

    // the store's unique index still guards against a concurrent signup
    let user = users
        .create(NewUser {
            username,
            password_hash,
        })
        .await
        .map_err(|e| match e {
            StoreError::Duplicate(_) => AppError::BadRequest("Username already exists".into()),
            other => AppError::internal(SIGNUP_FAILED, other),
        })?;

    log::info!("User '{}' signed up", user.username);

    Ok(HttpResponse::Created().json(SignupResponse {
        message: "User created successfully".into(),
        user: CreatedUser {
            username: user.username,
        },
    }))
}

/// Login user
///
/// Verifies the password against the stored hash and issues a token whose
/// subject is the user's id.
///
/// ## Responses:
/// - `200 OK`: `{ message, token, user: { username, user_status } }`.
/// - `400 Bad Request`: missing fields.
/// - `401 Unauthorized`: unknown username or wrong password.
/// - `500 Internal Server Error`: store failure.
#[post("/login")]
pub async fn login(
    users: web::Data<dyn UserRepository>,
    tokens: web::Data<TokenCodec>,
    body: JsonBody<Credentials>,
) -> Result<impl Responder, AppError> {
    RuleSet::new().check(&*body).finish()?;
    let (username, password) = body.into_inner().into_parts();

    let user = users
        .find_by_username(&username)
        .await
        .map_err(|e| AppError::internal(LOGIN_FAILED, e))?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

    if !verify_password(&password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let token = tokens.issue(&user.id.to_hex())?;

    Ok(HttpResponse::Ok().json(LoginResponse::new(token, &user)))
}
