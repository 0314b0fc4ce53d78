use crate::{
    auth::Identity,
    body::JsonBody,
    error::AppError,
    models::{
        normalize, normalize_all, CreateTaskRequest, FilterQuery, TaskIdPath, UpdateTaskRequest,
    },
    repository::TaskRepository,
    validation::RuleSet,
};
use actix_web::{delete, get, post, put, route, web, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;
use serde_json::json;

fn caller(identity: &Option<Identity>) -> &str {
    identity.as_ref().map(Identity::subject).unwrap_or("anonymous")
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Task with ID {} not found.", id))
}

/// Parses an id that already passed its syntax rule.
fn parse_id(path: &TaskIdPath) -> Result<ObjectId, AppError> {
    path.object_id()
        .ok_or_else(|| AppError::BadRequest("Invalid task ID".into()))
}

/// Retrieves every task.
///
/// ## Responses:
/// - `200 OK`: JSON array of task DTOs, in store order.
/// - `500 Internal Server Error`: store failure.
#[get("")]
pub async fn get_tasks(
    tasks: web::Data<dyn TaskRepository>,
    identity: Option<Identity>,
) -> Result<impl Responder, AppError> {
    log::debug!("Listing tasks for {}", caller(&identity));

    let records = tasks
        .find_all()
        .await
        .map_err(|e| AppError::internal("Error fetching tasks. Please try again later.", e))?;

    Ok(HttpResponse::Ok().json(normalize_all(records)))
}

/// Retrieves tasks matching a predicate.
///
/// The predicate is read from the query string, the JSON body, or both; a
/// constraint given in the query string wins over the same one in the body.
///
/// ## Parameters:
/// - `completed` (optional): exact match; `true`/`false`/`1`/`0`.
/// - `title` (optional): case-insensitive substring of the title.
///
/// ## Responses:
/// - `200 OK`: JSON array of task DTOs, empty if nothing matches.
/// - `400 Bad Request`: `completed` is not a boolean.
/// - `500 Internal Server Error`: store failure.
#[route("/filter", method = "GET", method = "POST")]
pub async fn filter_tasks(
    tasks: web::Data<dyn TaskRepository>,
    query: web::Query<FilterQuery>,
    body: JsonBody<FilterQuery>,
) -> Result<impl Responder, AppError> {
    let query = query.into_inner().or(body.into_inner());
    RuleSet::new().check(&query).finish()?;
    let filter = query.into_filter();

    let records = tasks
        .filter(&filter)
        .await
        .map_err(|e| AppError::internal("Error filtering tasks. Please try again later.", e))?;

    Ok(HttpResponse::Ok().json(normalize_all(records)))
}

/// Creates a new task.
///
/// ## Request Body:
/// - `title`: required, non-empty.
/// - `description` (optional): non-empty if given.
/// - `completed`: required boolean.
///
/// ## Responses:
/// - `201 Created`: the created task DTO, with its store-assigned id.
/// - `400 Bad Request`: rule violations, listed in field order.
/// - `500 Internal Server Error`: store failure.
#[post("")]
pub async fn create_task(
    tasks: web::Data<dyn TaskRepository>,
    body: JsonBody<CreateTaskRequest>,
    identity: Option<Identity>,
) -> Result<impl Responder, AppError> {
    RuleSet::new().check(&*body).finish()?;

    let record = tasks
        .create(body.into_inner().into_new_task())
        .await
        .map_err(|e| AppError::internal("Error creating task. Please try again later.", e))?;

    log::info!("Task {} created by {}", record.id, caller(&identity));

    Ok(HttpResponse::Created().json(normalize(record)))
}

/// Retrieves a task by its id.
///
/// ## Responses:
/// - `200 OK`: the task DTO.
/// - `400 Bad Request`: the id is not a valid store identifier.
/// - `404 Not Found`: no task has that id.
/// - `500 Internal Server Error`: store failure.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<dyn TaskRepository>,
    path: web::Path<TaskIdPath>,
) -> Result<impl Responder, AppError> {
    RuleSet::new().check(&*path).finish()?;
    let id = parse_id(&path)?;

    let record = tasks
        .find_by_id(&id)
        .await
        .map_err(|e| {
            AppError::internal(
                format!("Error fetching task with ID {}. Please try again later.", path.id),
                e,
            )
        })?
        .ok_or_else(|| not_found(&path.id))?;

    Ok(HttpResponse::Ok().json(normalize(record)))
}

/// Updates the supplied fields of a task.
///
/// Fields left out of the body are not touched. A missing body counts as empty.
///
/// ## Responses:
/// - `200 OK`: the updated task DTO.
/// - `400 Bad Request`: invalid id, rule violations, or no updatable field supplied.
/// - `404 Not Found`: no task has that id.
/// - `500 Internal Server Error`: store failure.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<dyn TaskRepository>,
    path: web::Path<TaskIdPath>,
    body: JsonBody<UpdateTaskRequest>,
    identity: Option<Identity>,
) -> Result<impl Responder, AppError> {
    RuleSet::new().check(&*path).check(&*body).finish()?;
    let id = parse_id(&path)?;

    let patch = body.into_inner().into_patch();
    if patch.is_empty() {
        return Err(AppError::BadRequest("No data provided to update.".into()));
    }

    let record = tasks
        .update_by_id(&id, patch)
        .await
        .map_err(|e| {
            AppError::internal(
                format!("Error updating task with ID {}. Please try again later.", path.id),
                e,
            )
        })?
        .ok_or_else(|| not_found(&path.id))?;

    log::info!("Task {} updated by {}", record.id, caller(&identity));

    Ok(HttpResponse::Ok().json(normalize(record)))
}

/// Deletes a task by its id.
///
/// ## Responses:
/// - `200 OK`: `{ message }` confirming the deletion.
/// - `400 Bad Request`: the id is not a valid store identifier.
/// - `404 Not Found`: no task has that id.
/// - `500 Internal Server Error`: store failure.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<dyn TaskRepository>,
    path: web::Path<TaskIdPath>,
    identity: Option<Identity>,
) -> Result<impl Responder, AppError> {
    RuleSet::new().check(&*path).finish()?;
    let id = parse_id(&path)?;

    let deleted = tasks.delete_by_id(&id).await.map_err(|e| {
        AppError::internal(
            format!("Error deleting task with ID {}. Please try again later.", path.id),
            e,
        )
    })?;
    if !deleted {
        return Err(not_found(&path.id));
    }

    log::info!("Task {} deleted by {}", path.id, caller(&identity));

    Ok(HttpResponse::Ok().json(json!({
        "message": format!("Task with ID {} deleted successfully.", path.id)
    })))
}
