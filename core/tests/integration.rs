//! Replays the users-and-todos scenario against a live server.
//!
//! Starts the server on a random port, then drives every client operation
//! over real HTTP using ureq, so request building and response parsing are
//! checked against the actual wire format.

use todo_core::{
    ApiClient, ApiError, CreateTodo, CreateUser, HttpMethod, HttpRequest, HttpResponse,
    UpdateTodoStatus,
};

/// Execute an `HttpRequest` with ureq, returning 4xx/5xx as data.
fn execute(req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => {
            agent.post(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
        (HttpMethod::Put, Some(body)) => {
            agent.put(&req.path).content_type("application/json").send(body.as_bytes())
        }
        (HttpMethod::Put, None) => agent.put(&req.path).send_empty(),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers,
        body,
    }
}

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            todo_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn user(name: &str, email: &str) -> CreateUser {
    CreateUser {
        name: name.to_string(),
        email: email.to_string(),
    }
}

fn todo(user_id: u64, title: &str) -> CreateTodo {
    CreateTodo {
        user_id,
        title: title.to_string(),
        description: String::new(),
    }
}

#[test]
fn users_and_todos_scenario() {
    let client = ApiClient::new(&start_server());

    // Step 1: health.
    let resp = execute(client.build_health());
    assert!(resp.header("x-request-id").is_some());
    client.parse_health(resp).unwrap();

    // Step 2: two users with distinct ids.
    let req = client.build_create_user(&user("Alice", "alice@example.com")).unwrap();
    let alice = client.parse_create_user(execute(req)).unwrap();
    let req = client.build_create_user(&user("Bob", "bob@example.com")).unwrap();
    let bob = client.parse_create_user(execute(req)).unwrap();
    assert_ne!(alice.id, bob.id);

    let fetched = client.parse_get_user(execute(client.build_get_user(alice.id))).unwrap();
    assert_eq!(fetched, alice);

    // Step 3: one todo each.
    let req = client.build_create_todo(&todo(alice.id, "Buy groceries")).unwrap();
    let t1 = client.parse_create_todo(execute(req)).unwrap();
    let req = client.build_create_todo(&todo(bob.id, "Write documentation")).unwrap();
    let t2 = client.parse_create_todo(execute(req)).unwrap();
    assert!(!t1.completed && !t2.completed);

    // Step 4: both listed.
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    let ids: Vec<u64> = todos.iter().map(|t| t.id).collect();
    assert_eq!(ids, [t1.id, t2.id]);

    // Step 5: complete T1.
    let req = client
        .build_update_todo_status(t1.id, &UpdateTodoStatus { completed: true })
        .unwrap();
    let updated = client.parse_update_todo_status(execute(req)).unwrap();
    assert!(updated.completed);
    assert_eq!(updated.title, "Buy groceries");

    // Step 6: delete T2, then B.
    let removed = client.parse_delete_todo(execute(client.build_delete_todo(t2.id))).unwrap();
    assert_eq!(removed.id, t2.id);
    let removed = client.parse_delete_user(execute(client.build_delete_user(bob.id))).unwrap();
    assert_eq!(removed.id, bob.id);

    // Step 7: only Alice and T1 remain.
    let users = client.parse_list_users(execute(client.build_list_users())).unwrap();
    assert_eq!(users, vec![alice.clone()]);
    let todos = client.parse_list_todos(execute(client.build_list_todos())).unwrap();
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, t1.id);
    assert!(todos[0].completed);

    // Step 8: errors map to typed variants.
    let err = client.parse_get_todo(execute(client.build_get_todo(t2.id))).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
    let err = client.parse_get_user(execute(client.build_get_user(bob.id))).unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    let req = client.build_create_todo(&todo(bob.id, "Too late")).unwrap();
    let err = client.parse_create_todo(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::UserNotFound(_)));

    let req = client.build_create_user(&user("", "nobody@example.com")).unwrap();
    let err = client.parse_create_user(execute(req)).unwrap_err();
    assert!(matches!(err, ApiError::InvalidInput(_)));
}
