#![doc = "The `taskgate` library crate."]
#![doc = ""]
#![doc = "A task-tracking REST API: CRUD and filtering over tasks, user signup/login with"]
#![doc = "bcrypt-hashed passwords, and a JWT authorization gate in front of the task routes."]
#![doc = "Every mutating request runs the same pipeline: authorize, validate, persist, normalize."]
#![doc = "The binary (`main.rs`) only reads configuration, connects the store and serves `AppState`."]

pub mod app;
pub mod auth;
pub mod body;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod validation;

pub use app::AppState;
pub use config::Config;
pub use error::AppError;
