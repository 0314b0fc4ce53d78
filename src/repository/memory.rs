use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use super::{StoreError, StoreResult, TaskRepository, UserRepository};
use crate::models::{NewTask, NewUser, TaskFilter, TaskPatch, TaskRecord, UserRecord};

/// In-process store with the same observable behaviour as `MongoStore`:
/// ObjectId identities, store-managed timestamps, unique usernames.
/// Tasks are returned in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: RwLock<Vec<TaskRecord>>,
    users: RwLock<Vec<UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record as-is, bypassing `create`. Lets callers seed tasks
    /// with fields missing, as a schema-flexible store may hold them.
    pub async fn insert_raw(&self, record: TaskRecord) {
        self.tasks.write().await.push(record);
    }
}

#[async_trait]
impl TaskRepository for MemoryStore {
    async fn find_all(&self) -> StoreResult<Vec<TaskRecord>> {
        Ok(self.tasks.read().await.clone())
    }

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<TaskRecord>> {
        Ok(self.tasks.read().await.iter().find(|t| &t.id == id).cloned())
    }

    async fn create(&self, task: NewTask) -> StoreResult<TaskRecord> {
        let now = Utc::now();
        let record = TaskRecord {
            id: ObjectId::new(),
            title: Some(task.title),
            description: task.description,
            completed: Some(task.completed),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.tasks.write().await.push(record.clone());
        Ok(record)
    }

    async fn update_by_id(&self, id: &ObjectId, patch: TaskPatch) -> StoreResult<Option<TaskRecord>> {
        let mut tasks = self.tasks.write().await;
        Ok(tasks.iter_mut().find(|t| &t.id == id).map(|task| {
            patch.apply(task);
            task.updated_at = Some(Utc::now());
            task.clone()
        }))
    }

    async fn delete_by_id(&self, id: &ObjectId) -> StoreResult<bool> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| &t.id != id);
        Ok(tasks.len() != before)
    }

    async fn filter(&self, filter: &TaskFilter) -> StoreResult<Vec<TaskRecord>> {
        Ok(self
            .tasks
            .read()
            .await
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, user: NewUser) -> StoreResult<UserRecord> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.username == user.username) {
            return Err(StoreError::Duplicate(format!("username {}", user.username)));
        }
        let record = UserRecord {
            id: ObjectId::new(),
            username: user.username,
            password_hash: user.password_hash,
            user_status: false,
            created_at: Utc::now(),
        };
        users.push(record.clone());
        Ok(record)
    }
}
