//! Persistence seam.
//!
//! Handlers talk to the store only through [`TaskRepository`] and
//! [`UserRepository`]. Both traits are pass-through: "not found" comes back as
//! `None`/`false`, never as an error, and the only errors are store failures.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use std::fmt;
use std::sync::Arc;

use crate::config::Config;
use crate::models::{NewTask, NewUser, TaskFilter, TaskPatch, TaskRecord, UserRecord};

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// URL scheme selecting the in-process store.
pub const MEMORY_URL_SCHEME: &str = "memory://";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    Duplicate(String),
    /// Any other failure reported by the backend.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::Duplicate(msg) => write!(f, "duplicate key: {}", msg),
            StoreError::Backend(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn find_all(&self) -> StoreResult<Vec<TaskRecord>>;

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<TaskRecord>>;

    /// Inserts the task, assigning its id and both timestamps.
    async fn create(&self, task: NewTask) -> StoreResult<TaskRecord>;

    /// Changes only the fields set in `patch` and bumps `updated_at`.
    async fn update_by_id(&self, id: &ObjectId, patch: TaskPatch) -> StoreResult<Option<TaskRecord>>;

    /// Returns `true` if a task existed and was removed.
    async fn delete_by_id(&self, id: &ObjectId) -> StoreResult<bool>;

    async fn filter(&self, filter: &TaskFilter) -> StoreResult<Vec<TaskRecord>>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>>;

    /// Inserts the user. Fails with `StoreError::Duplicate` if the username is taken.
    async fn create(&self, user: NewUser) -> StoreResult<UserRecord>;
}

/// Repositories selected from `Config::database_url`.
#[derive(Clone)]
pub struct Repositories {
    pub tasks: Arc<dyn TaskRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: TaskRepository + UserRepository + 'static,
    {
        Self {
            tasks: store.clone(),
            users: store,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_store(Arc::new(MemoryStore::new()))
    }

    pub async fn connect(config: &Config) -> StoreResult<Self> {
        if config.database_url.starts_with(MEMORY_URL_SCHEME) {
            log::warn!("Using the in-memory store; data is lost on restart");
            return Ok(Self::in_memory());
        }

        let store = MongoStore::connect(&config.database_url, &config.database_name).await?;
        Ok(Self::from_store(Arc::new(store)))
    }
}
