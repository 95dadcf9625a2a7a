//! The todo REST API.
//!
//! # Endpoints
//!
//! ```text
//! GET     /api/todo        list, ascending by order
//! POST    /api/todo        create; 201 with the stored record
//! DELETE  /api/todo        remove every todo; returns the (empty) list
//! GET     /api/todo/:id    one todo
//! PATCH   /api/todo/:id    partial update; returns the stored record
//! PUT     /api/todo/:id    full replace; returns the stored record
//! DELETE  /api/todo/:id    remove; 204
//! ```
//!
//! Records are serialized with their identifier as `"url": "/<id>"`. Unknown ids
//! answer 404, blank titles and orders outside `0..=MAX_ORDER` 422, malformed bodies
//! 400. CORS preflights are answered by the router's CORS layer before they reach
//! these handlers.

use crate::error::AppError;
use crate::metrics::{record_request, record_todo_count};
use crate::state::AppState;
use crate::WebResult;
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use todo_sync_core::{MAX_ORDER, TodoAttributes, TodoId, TodoPatch, TodoRecord};

fn require_title(title: &str) -> WebResult<()> {
    if title.trim().is_empty() {
        return Err(AppError::validation("Title must not be blank"));
    }
    Ok(())
}

fn require_order(order: i64) -> WebResult<()> {
    if !(0..=MAX_ORDER).contains(&order) {
        return Err(AppError::validation(format!(
            "Order must be between 0 and {MAX_ORDER}"
        )));
    }
    Ok(())
}

fn require_attributes(attributes: &TodoAttributes) -> WebResult<()> {
    require_title(&attributes.title)?;
    require_order(attributes.order)
}

/// Record the outcome of `op` and pass the result through.
fn tally<T>(op: &'static str, result: WebResult<T>) -> WebResult<T> {
    record_request(op, result.is_ok());
    result
}

async fn refresh_count(state: &AppState) {
    if let Ok(count) = state.repository.count().await {
        record_todo_count(count);
    }
}

/// `GET /api/todo`
///
/// # Errors
///
/// 500 if the repository fails.
#[tracing::instrument(skip(state))]
pub async fn list_todos(State(state): State<AppState>) -> WebResult<Json<Vec<TodoRecord>>> {
    let result = state.repository.list().await.map(Json).map_err(AppError::from);
    tally("list", result)
}

/// `POST /api/todo`
///
/// # Errors
///
/// 400 for a malformed body, 422 for a blank title or an out-of-range order.
#[tracing::instrument(skip(state, payload))]
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<TodoAttributes>, JsonRejection>,
) -> WebResult<(StatusCode, Json<TodoRecord>)> {
    let result = async {
        let Json(attributes) = payload?;
        require_attributes(&attributes)?;
        let record = state.repository.create(attributes).await?;
        tracing::info!(id = %record.id, "todo created");
        Ok::<_, AppError>((StatusCode::CREATED, Json(record)))
    }
    .await;
    refresh_count(&state).await;
    tally("create", result)
}

/// `DELETE /api/todo`
///
/// # Errors
///
/// 500 if the repository fails.
#[tracing::instrument(skip(state))]
pub async fn clear_todos(State(state): State<AppState>) -> WebResult<Json<Vec<TodoRecord>>> {
    let result = async {
        state.repository.clear().await?;
        tracing::info!("todo list cleared");
        Ok::<_, AppError>(Json(state.repository.list().await?))
    }
    .await;
    refresh_count(&state).await;
    tally("clear", result)
}

/// `GET /api/todo/:id`
///
/// # Errors
///
/// 404 if the id is unknown.
#[tracing::instrument(skip(state))]
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<Json<TodoRecord>> {
    let result = state
        .repository
        .get(TodoId::new(id))
        .await
        .map(Json)
        .map_err(AppError::from);
    tally("get", result)
}

/// `PATCH /api/todo/:id`
///
/// # Errors
///
/// 400 for a malformed body, 404 if the id is unknown, 422 for a blank title or an
/// out-of-range order.
#[tracing::instrument(skip(state, payload))]
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TodoPatch>, JsonRejection>,
) -> WebResult<Json<TodoRecord>> {
    let result = async {
        let Json(patch) = payload?;
        if let Some(title) = &patch.title {
            require_title(title)?;
        }
        if let Some(order) = patch.order {
            require_order(order)?;
        }
        Ok::<_, AppError>(Json(state.repository.update(TodoId::new(id), patch).await?))
    }
    .await;
    tally("update", result)
}

/// `PUT /api/todo/:id`
///
/// # Errors
///
/// 400 for a malformed body, 404 if the id is unknown, 422 for a blank title or an
/// out-of-range order.
#[tracing::instrument(skip(state, payload))]
pub async fn replace_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TodoAttributes>, JsonRejection>,
) -> WebResult<Json<TodoRecord>> {
    let result = async {
        let Json(attributes) = payload?;
        require_attributes(&attributes)?;
        Ok::<_, AppError>(Json(
            state.repository.replace(TodoId::new(id), attributes).await?,
        ))
    }
    .await;
    tally("replace", result)
}

/// `DELETE /api/todo/:id`
///
/// # Errors
///
/// 404 if the id is unknown.
#[tracing::instrument(skip(state))]
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<StatusCode> {
    let result = async {
        let id = TodoId::new(id);
        state.repository.delete(id.clone()).await?;
        tracing::info!(%id, "todo deleted");
        Ok::<_, AppError>(StatusCode::NO_CONTENT)
    }
    .await;
    refresh_count(&state).await;
    tally("delete", result)
}
