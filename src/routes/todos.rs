use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{NewTask, TaskPatch},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Retrieves every task owned by the authenticated user.
///
/// Tasks are ordered by creation date, newest first. An owner without tasks gets
/// an empty array.
///
/// ## Responses:
/// - `200 OK`: a JSON array of `Task` objects.
/// - `401 Unauthorized`: missing or invalid bearer token.
/// - `500 Internal Server Error`: storage failure or timeout.
#[get("")]
pub async fn list_todos(
    state: web::Data<AppState>,
    owner: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list(&owner).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task for the authenticated user.
///
/// The owner is always the principal from the token; the body cannot name one.
///
/// ## Request Body:
/// - `title`: non-blank, at most 200 characters (required).
/// - `completed` (optional): defaults to `false`.
///
/// ## Responses:
/// - `201 Created`: the newly created `Task`.
/// - `400 Bad Request`: malformed body or invalid title.
/// - `401 Unauthorized`: missing or invalid bearer token.
/// - `500 Internal Server Error`: storage failure or timeout.
#[post("")]
pub async fn create_todo(
    state: web::Data<AppState>,
    owner: AuthenticatedUser,
    task_data: web::Json<NewTask>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task = state.tasks.create(&owner, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its ID.
///
/// ## Path Parameters:
/// - `id`: The UUID of the task.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `400 Bad Request`: `id` is not a UUID.
/// - `401 Unauthorized`: missing or invalid bearer token.
/// - `404 Not Found`: no such task for this owner. A task that exists under
///   another owner answers exactly the same way.
/// - `500 Internal Server Error`: storage failure or timeout.
#[get("/{id}")]
pub async fn get_todo(
    state: web::Data<AppState>,
    owner: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.get(&owner, task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task.
///
/// Only the supplied fields change; `updated_at` is refreshed. The owner of a task
/// cannot be changed.
///
/// ## Path Parameters:
/// - `id`: The UUID of the task to update.
///
/// ## Request Body:
/// - `title` (optional): non-blank, at most 200 characters.
/// - `completed` (optional): new completion flag.
///
/// At least one of the two must be present.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `400 Bad Request`: bad id, malformed body, invalid title or no fields.
/// - `401 Unauthorized`: missing or invalid bearer token.
/// - `404 Not Found`: no such task for this owner.
/// - `500 Internal Server Error`: storage failure or timeout.
#[put("/{id}")]
pub async fn update_todo(
    state: web::Data<AppState>,
    owner: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    patch: web::Json<TaskPatch>,
) -> Result<impl Responder, AppError> {
    patch.validate()?;
    let task = state
        .tasks
        .update(&owner, task_id.into_inner(), patch.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its ID.
///
/// ## Path Parameters:
/// - `id`: The UUID of the task to delete.
///
/// ## Responses:
/// - `200 OK`: confirmation message.
/// - `400 Bad Request`: `id` is not a UUID.
/// - `401 Unauthorized`: missing or invalid bearer token.
/// - `404 Not Found`: no such task for this owner.
/// - `500 Internal Server Error`: storage failure or timeout.
#[delete("/{id}")]
pub async fn delete_todo(
    state: web::Data<AppState>,
    owner: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let id = task_id.into_inner();
    state.tasks.delete(&owner, id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Task deleted",
        "id": id
    })))
}

#[cfg(test)]
mod tests {
    use crate::models::{NewTask, TaskPatch};
    use validator::Validate;

    #[test]
    fn test_task_input_validation() {
        let empty_title = NewTask {
            title: "".to_string(),
            completed: false,
        };
        assert!(
            empty_title.validate().is_err(),
            "Validation should fail for empty title."
        );

        let long_title = NewTask {
            title: "a".repeat(201),
            completed: false,
        };
        assert!(
            long_title.validate().is_err(),
            "Validation should fail for overly long title."
        );

        let long_patch = TaskPatch {
            title: Some("b".repeat(201)),
            completed: None,
        };
        assert!(
            long_patch.validate().is_err(),
            "Validation should fail for overly long patched title."
        );
    }
}
