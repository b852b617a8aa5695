//! Axum handlers for every route. Payload shape errors from the extractors are
//! turned into `Error::InvalidInput` before any store call is made.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{Method, StatusCode, Uri},
    BoxError, Json,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{NewTodo, NewUser, Todo, UpdateStatus, User};
use crate::store::Store;

pub type SharedStore = Arc<dyn Store>;

/// Liveness check. Never consults the store.
pub async fn health() -> Json<Value> {
    debug!("health check");
    Json(json!({ "status": "ok" }))
}

pub async fn create_user(
    State(store): State<SharedStore>,
    payload: std::result::Result<Json<NewUser>, JsonRejection>,
) -> Result<(StatusCode, Json<User>)> {
    let Json(input) = payload?;
    let user = store.create_user(input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn list_users(State(store): State<SharedStore>) -> Result<Json<Vec<User>>> {
    Ok(Json(store.list_users().await?))
}

pub async fn get_user(
    State(store): State<SharedStore>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Json<User>> {
    let Path(id) = id?;
    Ok(Json(store.get_user(id).await?))
}

pub async fn delete_user(
    State(store): State<SharedStore>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Json<User>> {
    let Path(id) = id?;
    Ok(Json(store.delete_user(id).await?))
}

pub async fn create_todo(
    State(store): State<SharedStore>,
    payload: std::result::Result<Json<NewTodo>, JsonRejection>,
) -> Result<(StatusCode, Json<Todo>)> {
    let Json(input) = payload?;
    let todo = store.create_todo(input).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn list_todos(State(store): State<SharedStore>) -> Result<Json<Vec<Todo>>> {
    Ok(Json(store.list_todos().await?))
}

pub async fn get_todo(
    State(store): State<SharedStore>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Json<Todo>> {
    let Path(id) = id?;
    Ok(Json(store.get_todo(id).await?))
}

pub async fn update_todo_status(
    State(store): State<SharedStore>,
    id: std::result::Result<Path<u64>, PathRejection>,
    payload: std::result::Result<Json<UpdateStatus>, JsonRejection>,
) -> Result<Json<Todo>> {
    let Path(id) = id?;
    let Json(update) = payload?;
    Ok(Json(store.set_todo_status(id, update.completed).await?))
}

pub async fn delete_todo(
    State(store): State<SharedStore>,
    id: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Json<Todo>> {
    let Path(id) = id?;
    Ok(Json(store.delete_todo(id).await?))
}

/// Fallback for paths that match no route.
pub async fn route_not_found(uri: Uri) -> Error {
    Error::RouteNotFound {
        path: uri.path().to_string(),
    }
}

/// Fallback for a known path hit with a method it does not serve.
pub async fn method_not_allowed(method: Method, uri: Uri) -> Error {
    Error::MethodNotAllowed {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
}

/// Maps failures from the tower middleware (timeouts included) onto the
/// structured error body.
pub async fn middleware_error(err: BoxError) -> Error {
    if err.is::<tower::timeout::error::Elapsed>() {
        Error::Timeout
    } else {
        Error::internal(err.to_string())
    }
}
