//! Wire types for the users and todos API.
//!
//! # Design
//! These mirror the server's schema but are defined independently so the
//! client never links against Axum. The end-to-end test catches drift.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Request payload for `POST /users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
}

/// Request payload for `POST /todos`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub user_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Request payload for `PUT /todos/{id}/status`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpdateTodoStatus {
    pub completed: bool,
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
