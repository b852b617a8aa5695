//! Authoritative holder of users and todos, and sole id allocator.
//!
//! # Locking
//! `MemoryStore` keeps one `RwLock` per collection. Each lock guards both the
//! rows and the collection's id counter, so concurrent creates serialize on
//! allocation while reads proceed in parallel. When both locks are needed
//! they are always taken users first, then todos.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{NewTodo, NewUser, Todo, User};

/// Storage backend behind the HTTP handlers.
///
/// Every operation is atomic with respect to concurrent callers. Listings are
/// returned in insertion order.
#[async_trait]
pub trait Store: Send + Sync {
    fn backend_name(&self) -> &'static str;

    async fn create_user(&self, input: NewUser) -> Result<User>;
    async fn get_user(&self, id: u64) -> Result<User>;
    async fn list_users(&self) -> Result<Vec<User>>;
    /// Removes the user. Todos that reference it are left as they are.
    async fn delete_user(&self, id: u64) -> Result<User>;

    /// Fails with `UserNotFound` unless `input.user_id` exists at call time.
    async fn create_todo(&self, input: NewTodo) -> Result<Todo>;
    async fn get_todo(&self, id: u64) -> Result<Todo>;
    async fn list_todos(&self) -> Result<Vec<Todo>>;
    async fn set_todo_status(&self, id: u64, completed: bool) -> Result<Todo>;
    async fn delete_todo(&self, id: u64) -> Result<Todo>;
}

/// Rows keyed by id plus the next id to hand out. Ids only grow, so key
/// order is insertion order and deleted ids are never reissued.
#[derive(Debug)]
struct Table<T> {
    next_id: u64,
    rows: BTreeMap<u64, T>,
}

impl<T: Clone> Table<T> {
    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn snapshot(&self) -> Vec<T> {
        self.rows.values().cloned().collect()
    }
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

/// Process-lifetime store. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Table<User>>,
    todos: RwLock<Table<Todo>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create_user(&self, input: NewUser) -> Result<User> {
        input.validate()?;
        let mut users = self.users.write().await;
        let user = User {
            id: users.allocate(),
            name: input.name,
            email: input.email,
            created_at: Utc::now(),
        };
        users.rows.insert(user.id, user.clone());
        info!(user_id = user.id, "user created");
        Ok(user)
    }

    async fn get_user(&self, id: u64) -> Result<User> {
        let users = self.users.read().await;
        users
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::missing_user(id))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let users = self.users.read().await;
        debug!(count = users.rows.len(), "listing users");
        Ok(users.snapshot())
    }

    async fn delete_user(&self, id: u64) -> Result<User> {
        let mut users = self.users.write().await;
        let user = users
            .rows
            .remove(&id)
            .ok_or_else(|| Error::missing_user(id))?;
        info!(user_id = id, "user deleted");
        Ok(user)
    }

    async fn create_todo(&self, input: NewTodo) -> Result<Todo> {
        input.validate()?;
        // Held until the insert so the user cannot vanish in between.
        let users = self.users.read().await;
        if !users.rows.contains_key(&input.user_id) {
            return Err(Error::UserNotFound {
                user_id: input.user_id,
            });
        }
        let mut todos = self.todos.write().await;
        let todo = Todo {
            id: todos.allocate(),
            user_id: input.user_id,
            title: input.title,
            description: input.description,
            completed: false,
            created_at: Utc::now(),
        };
        todos.rows.insert(todo.id, todo.clone());
        info!(todo_id = todo.id, user_id = todo.user_id, "todo created");
        Ok(todo)
    }

    async fn get_todo(&self, id: u64) -> Result<Todo> {
        let todos = self.todos.read().await;
        todos
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::missing_todo(id))
    }

    async fn list_todos(&self) -> Result<Vec<Todo>> {
        let todos = self.todos.read().await;
        debug!(count = todos.rows.len(), "listing todos");
        Ok(todos.snapshot())
    }

    async fn set_todo_status(&self, id: u64, completed: bool) -> Result<Todo> {
        let mut todos = self.todos.write().await;
        let todo = todos
            .rows
            .get_mut(&id)
            .ok_or_else(|| Error::missing_todo(id))?;
        todo.completed = completed;
        info!(todo_id = id, completed, "todo status set");
        Ok(todo.clone())
    }

    async fn delete_todo(&self, id: u64) -> Result<Todo> {
        let mut todos = self.todos.write().await;
        let todo = todos
            .rows
            .remove(&id)
            .ok_or_else(|| Error::missing_todo(id))?;
        info!(todo_id = id, "todo deleted");
        Ok(todo)
    }
}
