//! REST server for users and the todos they own.
//!
//! # Overview
//! `app()` builds an Axum router over a fresh [`MemoryStore`];
//! [`app_with_store`] accepts any [`Store`] so tests and embedders can inject
//! their own. Handlers hold no state of their own: the store is the only
//! shared mutable resource.
//!
//! # Routes
//! - `GET /health`
//! - `POST /users`, `GET /users`, `GET /users/{id}`, `DELETE /users/{id}`
//! - `POST /todos`, `GET /todos`, `GET /todos/{id}`, `DELETE /todos/{id}`
//! - `PUT /todos/{id}/status`
//!
//! Unknown paths, unsupported methods and timed-out requests answer with the
//! same `{"error", "message"}` body as handler failures.

pub mod config;
pub mod error;
pub mod handlers;
pub mod model;
pub mod store;
pub mod trace;

use std::future::Future;
use std::sync::Arc;

use axum::{
    error_handling::HandleErrorLayer,
    routing::{get, put},
    Router,
};
use tokio::net::TcpListener;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::info;

pub use config::ServerConfig;
pub use error::{Entity, Error};
pub use model::{NewTodo, NewUser, Todo, UpdateStatus, User};
pub use store::{MemoryStore, Store};

use handlers::SharedStore;

pub fn app() -> Router {
    app_with_store(Arc::new(MemoryStore::new()), &ServerConfig::default())
}

pub fn app_with_store(store: SharedStore, config: &ServerConfig) -> Router {
    info!(backend = store.backend_name(), "building router");
    with_middleware(routes(store), config)
}

fn routes(store: SharedStore) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/users/{id}",
            get(handlers::get_user).delete(handlers::delete_user),
        )
        .route("/todos", get(handlers::list_todos).post(handlers::create_todo))
        .route(
            "/todos/{id}",
            get(handlers::get_todo).delete(handlers::delete_todo),
        )
        .route("/todos/{id}/status", put(handlers::update_todo_status))
        .fallback(handlers::route_not_found)
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .with_state(store)
}

/// Wrap `router` in the request-id, tracing and timeout stack. The request id
/// is set and propagated outermost so it reaches every response, including
/// ones produced by the timeout.
pub fn with_middleware(router: Router, config: &ServerConfig) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            trace::request_id_header(),
            trace::MakeTraceId,
        ))
        .layer(PropagateRequestIdLayer::new(trace::request_id_header()))
        .layer(trace::trace_layer())
        .layer(HandleErrorLayer::new(handlers::middleware_error))
        .layer(TimeoutLayer::new(config.timeout()));

    router.layer(middleware)
}

/// Serve on `listener` with a fresh in-memory store until the process exits.
pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve `router` until `shutdown` resolves, then finish in-flight requests.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    router: Router,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(address = %addr, "server listening");
    }
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
}

/// Install the global `tracing` subscriber. `RUST_LOG` takes precedence over
/// `level`.
pub fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("todo_server={level},tower_http=debug")));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}
