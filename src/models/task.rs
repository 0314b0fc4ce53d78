use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::validation::{
    coerce_boolean, into_text, validate_boolean, validate_description, validate_title_not_empty,
    validate_title_required, FieldOrder, OBJECT_ID_REGEX,
};

/// A task as held by a repository.
///
/// The store is schema-flexible, so every field except the identity may be
/// missing from a record read back from it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    /// Identity assigned by the store at creation. Never changes.
    pub id: ObjectId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields of a task about to be inserted. Identity and timestamps are set by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Sparse set of fields to change on an existing task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// Applies the supplied fields to `record`, leaving the rest untouched.
    pub fn apply(&self, record: &mut TaskRecord) {
        if let Some(title) = &self.title {
            record.title = Some(title.clone());
        }
        if let Some(description) = &self.description {
            record.description = Some(description.clone());
        }
        if let Some(completed) = self.completed {
            record.completed = Some(completed);
        }
    }
}

/// Predicate for the filter operation: exact `completed` match and a
/// case-insensitive substring match on `title`. Unset constraints match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub title: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, record: &TaskRecord) -> bool {
        let completed_ok = match self.completed {
            Some(wanted) => record.completed == Some(wanted),
            None => true,
        };
        let title_ok = match &self.title {
            Some(needle) => record
                .title
                .as_deref()
                .map(|title| title.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            None => true,
        };
        completed_ok && title_ok
    }
}

/// External representation of a task.
///
/// Every key is always present; fields missing from the record serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<TaskRecord> for TaskDto {
    fn from(record: TaskRecord) -> Self {
        Self {
            id: record.id.to_hex(),
            title: record.title,
            description: record.description,
            completed: record.completed,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

pub fn normalize(record: TaskRecord) -> TaskDto {
    TaskDto::from(record)
}

pub fn normalize_all(records: Vec<TaskRecord>) -> Vec<TaskDto> {
    records.into_iter().map(normalize).collect()
}

/// Path parameter of the id-addressed task routes.
#[derive(Debug, Deserialize, Validate)]
pub struct TaskIdPath {
    #[validate(regex(path = "OBJECT_ID_REGEX", message = "Invalid task ID"))]
    pub id: String,
}

impl FieldOrder for TaskIdPath {
    const FIELDS: &'static [&'static str] = &["id"];
}

impl TaskIdPath {
    /// Parses the id once its syntax rule has passed.
    pub fn object_id(&self) -> Option<ObjectId> {
        ObjectId::parse_str(&self.id).ok()
    }
}

/// Body of `POST /tasks`.
///
/// Fields are kept untyped so that a value of the wrong kind is reported as a
/// rule violation alongside the others.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(required(message = "Title is required"), custom = "validate_title_required")]
    pub title: Option<Value>,

    #[validate(custom = "validate_description")]
    pub description: Option<Value>,

    #[validate(required(message = "Completed must be a boolean"), custom = "validate_boolean")]
    pub completed: Option<Value>,
}

impl FieldOrder for CreateTaskRequest {
    const FIELDS: &'static [&'static str] = &["title", "description", "completed"];
}

impl CreateTaskRequest {
    /// Converts a validated request into the insert payload.
    pub fn into_new_task(self) -> NewTask {
        NewTask {
            title: self.title.and_then(into_text).unwrap_or_default(),
            description: self.description.and_then(into_text),
            completed: self.completed.as_ref().and_then(coerce_boolean).unwrap_or(false),
        }
    }
}

/// Body of `PUT /tasks/{id}`. Every field is optional; present ones are type-checked.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(custom = "validate_title_not_empty")]
    pub title: Option<Value>,

    #[validate(custom = "validate_description")]
    pub description: Option<Value>,

    #[validate(custom = "validate_boolean")]
    pub completed: Option<Value>,
}

impl FieldOrder for UpdateTaskRequest {
    const FIELDS: &'static [&'static str] = &["title", "description", "completed"];
}

impl UpdateTaskRequest {
    /// Keeps only the fields the caller supplied.
    pub fn into_patch(self) -> TaskPatch {
        TaskPatch {
            title: self.title.and_then(into_text),
            description: self.description.and_then(into_text),
            completed: self.completed.as_ref().and_then(coerce_boolean),
        }
    }
}

/// Predicate of `GET|POST /tasks/filter`, read from the query string or the body.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct FilterQuery {
    #[validate(custom = "validate_boolean")]
    pub completed: Option<Value>,
    pub title: Option<String>,
}

impl FieldOrder for FilterQuery {
    const FIELDS: &'static [&'static str] = &["completed", "title"];
}

impl FilterQuery {
    /// Fills the constraints missing from `self` with those of `fallback`.
    pub fn or(self, fallback: FilterQuery) -> FilterQuery {
        FilterQuery {
            completed: self.completed.or(fallback.completed),
            title: self.title.or(fallback.title),
        }
    }

    pub fn into_filter(self) -> TaskFilter {
        TaskFilter {
            completed: self.completed.as_ref().and_then(coerce_boolean),
            title: self.title.filter(|title| !title.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, validation::RuleSet};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn record() -> TaskRecord {
        TaskRecord {
            id: ObjectId::parse_str("666f6f2d6261722d71757578").unwrap(),
            title: Some("Test Task".into()),
            description: Some("This is a test task".into()),
            completed: Some(false),
            created_at: Some(Utc.with_ymd_and_hms(2024, 6, 10, 10, 0, 0).unwrap()),
            updated_at: Some(Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap()),
        }
    }

    fn violations(result: Result<(), AppError>) -> Vec<(String, String)> {
        match result {
            Err(AppError::Validation(errors)) => {
                errors.into_iter().map(|e| (e.field, e.message)).collect()
            }
            Ok(()) => vec![],
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_normalize_renames_identity() {
        let dto = normalize(record());
        assert_eq!(
            serde_json::to_value(&dto).unwrap(),
            json!({
                "id": "666f6f2d6261722d71757578",
                "title": "Test Task",
                "description": "This is a test task",
                "completed": false,
                "createdAt": "2024-06-10T10:00:00Z",
                "updatedAt": "2024-06-10T12:00:00Z"
            })
        );
    }

    #[test]
    fn test_normalize_keeps_missing_fields_as_null() {
        let incomplete = TaskRecord {
            description: None,
            created_at: None,
            updated_at: None,
            completed: Some(true),
            title: Some("Incomplete Task".into()),
            ..record()
        };
        let value = serde_json::to_value(normalize(incomplete)).unwrap();
        let object = value.as_object().unwrap();

        for key in ["id", "title", "description", "completed", "createdAt", "updatedAt"] {
            assert!(object.contains_key(key), "missing key {}", key);
        }
        assert!(object["description"].is_null());
        assert!(object["createdAt"].is_null());
        assert!(object["updatedAt"].is_null());
    }

    #[test]
    fn test_normalize_all_maps_every_record() {
        let second = TaskRecord {
            id: ObjectId::new(),
            ..record()
        };
        let dtos = normalize_all(vec![record(), second.clone()]);
        assert_eq!(dtos.len(), 2);
        assert_eq!(dtos[1].id, second.id.to_hex());
    }

    #[test]
    fn test_task_id_rule() {
        let bad = TaskIdPath { id: "not-a-valid-id".into() };
        assert_eq!(
            violations(RuleSet::new().check(&bad).finish()),
            vec![("id".to_string(), "Invalid task ID".to_string())]
        );

        let good = TaskIdPath { id: "666f6f2d6261722d71757578".into() };
        assert!(RuleSet::new().check(&good).finish().is_ok());
        assert!(good.object_id().is_some());
    }

    #[test]
    fn test_create_rules() {
        let request: CreateTaskRequest =
            serde_json::from_value(json!({ "description": "", "completed": "nope" })).unwrap();
        assert_eq!(
            violations(RuleSet::new().check(&request).finish()),
            vec![
                ("title".to_string(), "Title is required".to_string()),
                ("description".to_string(), "Description cannot be empty".to_string()),
                ("completed".to_string(), "Completed must be a boolean".to_string()),
            ]
        );

        let request: CreateTaskRequest =
            serde_json::from_value(json!({ "title": "Ship it", "completed": "true" })).unwrap();
        assert!(RuleSet::new().check(&request).finish().is_ok());
        assert_eq!(
            request.into_new_task(),
            NewTask {
                title: "Ship it".into(),
                description: None,
                completed: true,
            }
        );
    }

    #[test]
    fn test_create_requires_completed() {
        let request: CreateTaskRequest =
            serde_json::from_value(json!({ "title": "No flag" })).unwrap();
        assert_eq!(
            violations(RuleSet::new().check(&request).finish()),
            vec![("completed".to_string(), "Completed must be a boolean".to_string())]
        );
    }

    #[test]
    fn test_create_reports_wrong_kinds_as_violations() {
        let request: CreateTaskRequest =
            serde_json::from_value(json!({ "title": 5, "description": 7, "completed": 1 })).unwrap();
        assert_eq!(
            violations(RuleSet::new().check(&request).finish()),
            vec![
                ("title".to_string(), "Title is required".to_string()),
                ("description".to_string(), "Description cannot be empty".to_string()),
            ]
        );
        assert!(RuleSet::new().check(&CreateTaskRequest::default()).finish().is_err());
    }

    #[test]
    fn test_update_rules_and_patch() {
        let request: UpdateTaskRequest =
            serde_json::from_value(json!({ "title": "", "completed": 3 })).unwrap();
        assert_eq!(
            violations(RuleSet::new().check(&request).finish()),
            vec![
                ("title".to_string(), "Title cannot be empty".to_string()),
                ("completed".to_string(), "Completed must be a boolean".to_string()),
            ]
        );

        let request: UpdateTaskRequest =
            serde_json::from_value(json!({ "completed": false })).unwrap();
        let patch = request.into_patch();
        assert_eq!(patch.completed, Some(false));
        assert!(patch.title.is_none());
        assert!(!patch.is_empty());

        assert!(UpdateTaskRequest::default().into_patch().is_empty());
    }

    #[test]
    fn test_patch_apply_is_sparse() {
        let mut task = record();
        TaskPatch {
            completed: Some(true),
            ..TaskPatch::default()
        }
        .apply(&mut task);
        assert_eq!(task.completed, Some(true));
        assert_eq!(task.title.as_deref(), Some("Test Task"));
        assert_eq!(task.description.as_deref(), Some("This is a test task"));
    }

    #[test]
    fn test_filter_matching() {
        let task = record();
        let by_title = TaskFilter {
            title: Some("test".into()),
            ..TaskFilter::default()
        };
        assert!(by_title.matches(&task));

        let by_completed = TaskFilter {
            completed: Some(true),
            ..TaskFilter::default()
        };
        assert!(!by_completed.matches(&task));
        assert!(TaskFilter::default().matches(&task));
    }

    #[test]
    fn test_filter_query() {
        let query = FilterQuery {
            completed: Some(json!("maybe")),
            title: None,
        };
        assert_eq!(
            violations(RuleSet::new().check(&query).finish()),
            vec![("completed".to_string(), "Completed must be a boolean".to_string())]
        );

        let query = FilterQuery {
            completed: Some(json!("false")),
            title: Some("".into()),
        };
        assert_eq!(
            query.into_filter(),
            TaskFilter {
                completed: Some(false),
                title: None,
            }
        );
    }

    #[test]
    fn test_filter_query_prefers_query_string() {
        let from_query = FilterQuery {
            completed: None,
            title: Some("milk".into()),
        };
        let from_body = FilterQuery {
            completed: Some(json!(true)),
            title: Some("bread".into()),
        };
        assert_eq!(
            from_query.or(from_body).into_filter(),
            TaskFilter {
                completed: Some(true),
                title: Some("milk".into()),
            }
        );
    }
}
