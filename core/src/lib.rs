//! Synchronous, I/O-free client for the users and todos API.
//!
//! # Overview
//! `ApiClient` builds `HttpRequest` values and parses `HttpResponse` values;
//! the caller executes the round-trip. Every route has a `build_*` / `parse_*`
//! pair, so the I/O boundary stays explicit and the core stays deterministic.

pub mod client;
pub mod error;
pub mod http;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, CreateUser, ErrorBody, Todo, UpdateTodoStatus, User};
