//! Stored entities and the validated inputs used to create them.
//!
//! Field order matters on the wire: `id` is declared first so it is the first
//! key in every serialized entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for `POST /users`.
#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

/// Payload for `POST /todos`. `description` may be omitted.
#[derive(Clone, Debug, Deserialize)]
pub struct NewTodo {
    pub user_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Payload for `PUT /todos/{id}/status`. Nothing but `completed` is accepted.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatus {
    pub completed: bool,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), Error> {
        require_text("name", &self.name)?;
        require_text("email", &self.email)
    }
}

impl NewTodo {
    pub fn validate(&self) -> Result<(), Error> {
        require_text("title", &self.title)
    }
}

fn require_text(field: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(Error::invalid_input(format!("`{field}` must not be empty")));
    }
    Ok(())
}
