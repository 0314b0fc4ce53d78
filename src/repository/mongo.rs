//! MongoDB-backed repositories.
//!
//! Tasks live in the `tasks` collection and users in `users`. Documents use
//! the camelCase timestamp names (`createdAt`, `updatedAt`) the collections
//! were created with.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document},
    error::{ErrorKind, WriteFailure},
    options::{IndexOptions, ReturnDocument},
    Client, Collection, IndexModel,
};
use serde::{Deserialize, Serialize};

use super::{StoreError, StoreResult, TaskRepository, UserRepository};
use crate::models::{NewTask, NewUser, TaskFilter, TaskPatch, TaskRecord, UserRecord};

const TASKS: &str = "tasks";
const USERS: &str = "users";
const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Serialize, Deserialize)]
struct TaskDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    created_at: Option<BsonDateTime>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<BsonDateTime>,
}

#[derive(Debug, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    username: String,
    /// bcrypt hash
    password: String,
    #[serde(default)]
    user_status: bool,
    #[serde(rename = "createdAt")]
    created_at: BsonDateTime,
}

fn to_chrono(value: BsonDateTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(value.to_system_time())
}

impl From<TaskDocument> for TaskRecord {
    fn from(document: TaskDocument) -> Self {
        Self {
            id: document.id,
            title: document.title,
            description: document.description,
            completed: document.completed,
            created_at: document.created_at.map(to_chrono),
            updated_at: document.updated_at.map(to_chrono),
        }
    }
}

impl From<UserDocument> for UserRecord {
    fn from(document: UserDocument) -> Self {
        Self {
            id: document.id,
            username: document.username,
            password_hash: document.password,
            user_status: document.user_status,
            created_at: to_chrono(document.created_at),
        }
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(error: mongodb::error::Error) -> Self {
        match error.kind.as_ref() {
            ErrorKind::Write(WriteFailure::WriteError(write)) if write.code == DUPLICATE_KEY => {
                StoreError::Duplicate(write.message.clone())
            }
            _ => StoreError::Backend(error.to_string()),
        }
    }
}

/// Builds the `$set` document for a patch. `updatedAt` is always refreshed.
fn patch_document(patch: &TaskPatch) -> Document {
    let mut set = doc! { "updatedAt": BsonDateTime::now() };
    if let Some(title) = &patch.title {
        set.insert("title", title.as_str());
    }
    if let Some(description) = &patch.description {
        set.insert("description", description.as_str());
    }
    if let Some(completed) = patch.completed {
        set.insert("completed", completed);
    }
    doc! { "$set": set }
}

fn filter_document(filter: &TaskFilter) -> Document {
    let mut query = Document::new();
    if let Some(completed) = filter.completed {
        query.insert("completed", completed);
    }
    if let Some(title) = &filter.title {
        query.insert(
            "title",
            doc! { "$regex": regex::escape(title), "$options": "i" },
        );
    }
    query
}

#[derive(Clone)]
pub struct MongoStore {
    tasks: Collection<TaskDocument>,
    users: Collection<UserDocument>,
}

impl MongoStore {
    /// Connects to `url`, selects `database`, and ensures the username index exists.
    pub async fn connect(url: &str, database: &str) -> StoreResult<Self> {
        let client = Client::with_uri_str(url).await?;
        let db = client.database(database);
        let store = Self {
            tasks: db.collection(TASKS),
            users: db.collection(USERS),
        };
        store.ensure_indexes().await?;
        log::info!("Connected to MongoDB database '{}'", database);
        Ok(store)
    }

    async fn ensure_indexes(&self) -> StoreResult<()> {
        let unique_username = IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.users.create_index(unique_username).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for MongoStore {
    async fn find_all(&self) -> StoreResult<Vec<TaskRecord>> {
        let documents: Vec<TaskDocument> = self.tasks.find(doc! {}).await?.try_collect().await?;
        Ok(documents.into_iter().map(TaskRecord::from).collect())
    }

    async fn find_by_id(&self, id: &ObjectId) -> StoreResult<Option<TaskRecord>> {
        let document = self.tasks.find_one(doc! { "_id": *id }).await?;
        Ok(document.map(TaskRecord::from))
    }

    async fn create(&self, task: NewTask) -> StoreResult<TaskRecord> {
        let now = BsonDateTime::now();
        let document = TaskDocument {
            id: ObjectId::new(),
            title: Some(task.title),
            description: task.description,
            completed: Some(task.completed),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.tasks.insert_one(&document).await?;
        Ok(document.into())
    }

    async fn update_by_id(&self, id: &ObjectId, patch: TaskPatch) -> StoreResult<Option<TaskRecord>> {
        let document = self
            .tasks
            .find_one_and_update(doc! { "_id": *id }, patch_document(&patch))
            .return_document(ReturnDocument::After)
            .await?;
        Ok(document.map(TaskRecord::from))
    }

    async fn delete_by_id(&self, id: &ObjectId) -> StoreResult<bool> {
        let result = self.tasks.delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn filter(&self, filter: &TaskFilter) -> StoreResult<Vec<TaskRecord>> {
        let documents: Vec<TaskDocument> = self
            .tasks
            .find(filter_document(filter))
            .await?
            .try_collect()
            .await?;
        Ok(documents.into_iter().map(TaskRecord::from).collect())
    }
}

#[async_trait]
impl UserRepository for MongoStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let document = self.users.find_one(doc! { "username": username }).await?;
        Ok(document.map(UserRecord::from))
    }

    async fn create(&self, user: NewUser) -> StoreResult<UserRecord> {
        let document = UserDocument {
            id: ObjectId::new(),
            username: user.username,
            password: user.password_hash,
            user_status: false,
            created_at: BsonDateTime::now(),
        };
        self.users.insert_one(&document).await?;
        Ok(document.into())
    }
}
