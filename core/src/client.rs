//! Stateless request builder and response parser for the users and todos API.
//!
//! # Design
//! `ApiClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes the matching `HttpResponse`.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, CreateUser, ErrorBody, Todo, UpdateTodoStatus, User};

/// Client for one server, identified by its base URL.
///
/// Callers build a request, send it with whatever HTTP stack they own, then
/// hand the response back to the matching `parse_*` method:
///
/// ```
/// use todo_core::{ApiClient, CreateUser, HttpMethod, HttpResponse};
///
/// let client = ApiClient::new("http://localhost:3000/");
/// let input = CreateUser {
///     name: "Alice".to_string(),
///     email: "alice@example.com".to_string(),
/// };
/// let request = client.build_create_user(&input).unwrap();
/// assert_eq!(request.method, HttpMethod::Post);
/// assert_eq!(request.path, "http://localhost:3000/users");
///
/// let response = HttpResponse {
///     status: 201,
///     headers: Vec::new(),
///     body: r#"{"id":1,"name":"Alice","email":"alice@example.com","created_at":"2024-01-01T00:00:00Z"}"#.to_string(),
/// };
/// let user = client.parse_create_user(response).unwrap();
/// assert_eq!(user.id, 1);
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    /// A trailing slash on `base_url` is ignored.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest::json(method, self.url(path), body))
    }

    // --- health ---

    pub fn build_health(&self) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Get, self.url("/health"))
    }

    pub fn parse_health(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 200)
    }

    // --- users ---

    pub fn build_create_user(&self, input: &CreateUser) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/users", input)
    }

    pub fn build_list_users(&self) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Get, self.url("/users"))
    }

    pub fn build_get_user(&self, id: u64) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Get, self.url(&format!("/users/{id}")))
    }

    pub fn build_delete_user(&self, id: u64) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Delete, self.url(&format!("/users/{id}")))
    }

    pub fn parse_create_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_body(response, 201)
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<Vec<User>, ApiError> {
        parse_body(response, 200)
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_body(response, 200)
    }

    /// Returns the removed user.
    pub fn parse_delete_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_body(response, 200)
    }

    // --- todos ---

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/todos", input)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Get, self.url("/todos"))
    }

    pub fn build_get_todo(&self, id: u64) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Get, self.url(&format!("/todos/{id}")))
    }

    pub fn build_update_todo_status(
        &self,
        id: u64,
        input: &UpdateTodoStatus,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/todos/{id}/status"), input)
    }

    pub fn build_delete_todo(&self, id: u64) -> HttpRequest {
        HttpRequest::bare(HttpMethod::Delete, self.url(&format!("/todos/{id}")))
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_body(response, 201)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_body(response, 200)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_body(response, 200)
    }

    pub fn parse_update_todo_status(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_body(response, 200)
    }

    /// Returns the removed todo.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_body(response, 200)
    }
}

fn parse_body<T: DeserializeOwned>(response: HttpResponse, expected: u16) -> Result<T, ApiError> {
    check_status(&response, expected)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map a non-success status to an `ApiError`, using the error body's kind
/// when the server sent one.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    let body: Option<ErrorBody> = serde_json::from_str(&response.body).ok();
    match (response.status, body) {
        (400, Some(body)) => Err(ApiError::InvalidInput(body.message)),
        (404, Some(body)) if body.error == "user_not_found" => {
            Err(ApiError::UserNotFound(body.message))
        }
        (404, _) => Err(ApiError::NotFound),
        (status, _) => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_JSON: &str =
        r#"{"id":1,"name":"Alice","email":"alice@example.com","created_at":"2024-01-01T00:00:00Z"}"#;
    const TODO_JSON: &str = r#"{"id":3,"user_id":1,"title":"Buy groceries","description":"","completed":true,"created_at":"2024-01-01T00:00:00Z"}"#;

    fn client() -> ApiClient {
        ApiClient::new("http://localhost:3000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_health_produces_correct_request() {
        let req = client().build_health();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/health");
        assert!(req.body.is_none());
    }

    #[test]
    fn build_create_user_produces_correct_request() {
        let input = CreateUser {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
        };
        let req = client().build_create_user(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/users");
        assert_eq!(
            req.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "Alice");
        assert_eq!(body["email"], "alice@example.com");
    }

    #[test]
    fn build_user_paths_embed_id() {
        let c = client();
        assert_eq!(c.build_get_user(4).path, "http://localhost:3000/users/4");
        let req = c.build_delete_user(4);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:3000/users/4");
        assert_eq!(c.build_list_users().path, "http://localhost:3000/users");
    }

    #[test]
    fn build_create_todo_produces_correct_request() {
        let input = CreateTodo {
            user_id: 1,
            title: "Buy groceries".to_string(),
            description: String::new(),
        };
        let req = client().build_create_todo(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/todos");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["user_id"], 1);
        assert_eq!(body["title"], "Buy groceries");
    }

    #[test]
    fn build_update_todo_status_targets_status_path() {
        let req = client()
            .build_update_todo_status(3, &UpdateTodoStatus { completed: true })
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/todos/3/status");
        assert_eq!(req.body.as_deref(), Some(r#"{"completed":true}"#));
    }

    #[test]
    fn build_todo_paths_embed_id() {
        let c = client();
        assert_eq!(c.build_get_todo(3).path, "http://localhost:3000/todos/3");
        assert_eq!(c.build_delete_todo(3).method, HttpMethod::Delete);
        assert!(c.build_list_todos().body.is_none());
    }

    #[test]
    fn parse_create_user_success() {
        let user = client().parse_create_user(response(201, USER_JSON)).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.name, "Alice");
    }

    #[test]
    fn parse_list_users_success() {
        let body = format!("[{USER_JSON}]");
        let users = client().parse_list_users(response(200, &body)).unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email, "alice@example.com");
    }

    #[test]
    fn parse_get_user_not_found() {
        let body = r#"{"error":"not_found","message":"user 9 not found"}"#;
        let err = client().parse_get_user(response(404, body)).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_create_todo_reports_missing_user() {
        let body = r#"{"error":"user_not_found","message":"user 9 referenced by todo does not exist"}"#;
        let err = client().parse_create_todo(response(404, body)).unwrap_err();
        assert!(matches!(err, ApiError::UserNotFound(msg) if msg.contains("user 9")));
    }

    #[test]
    fn parse_create_todo_reports_invalid_input() {
        let body = r#"{"error":"invalid_input","message":"invalid input: `title` must not be empty"}"#;
        let err = client().parse_create_todo(response(400, body)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[test]
    fn parse_update_todo_status_success() {
        let todo = client()
            .parse_update_todo_status(response(200, TODO_JSON))
            .unwrap();
        assert_eq!(todo.id, 3);
        assert!(todo.completed);
    }

    #[test]
    fn parse_delete_todo_returns_removed_record() {
        let todo = client().parse_delete_todo(response(200, TODO_JSON)).unwrap();
        assert_eq!(todo.title, "Buy groceries");
    }

    #[test]
    fn unexpected_status_keeps_raw_body() {
        let err = client()
            .parse_create_user(response(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, ref body } if body == "internal error"));
    }

    #[test]
    fn bad_json_is_a_deserialization_error() {
        let err = client()
            .parse_list_todos(response(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = ApiClient::new("http://localhost:3000/");
        assert_eq!(client.build_list_todos().path, "http://localhost:3000/todos");
    }

    #[test]
    fn response_header_lookup_ignores_case() {
        let resp = HttpResponse {
            status: 200,
            headers: vec![("X-Request-Id".to_string(), "abc".to_string())],
            body: String::new(),
        };
        assert_eq!(resp.header("x-request-id"), Some("abc"));
        assert_eq!(resp.header("missing"), None);
    }

    #[test]
    fn methods_render_as_http_verbs() {
        assert_eq!(HttpMethod::Put.as_str(), "PUT");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
    }
}
