use std::collections::BTreeSet;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::form::{FieldErrors, FormValues};
use crate::storage::{Persisted, SharedStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i64,
    pub task: String,
    pub completed: bool,
}

/// Todo shape served by the demo API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTodo {
    pub id: i64,
    pub title: String,
    pub completed: bool,
    #[serde(default, rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl From<&RemoteTodo> for Todo {
    fn from(remote: &RemoteTodo) -> Self {
        Self {
            id: remote.id,
            task: remote.title.clone(),
            completed: remote.completed,
        }
    }
}

/// Creation-time id: the timestamp in milliseconds, moved past the current
/// maximum when two todos land in the same millisecond. When the maximum is
/// already `i64::MAX` the first free id from `now_millis` is used.
pub fn next_id(existing: &[Todo], now_millis: i64) -> i64 {
    match existing.iter().map(|t| t.id).max() {
        Some(max) if max >= now_millis => max
            .checked_add(1)
            .unwrap_or_else(|| first_free_id(existing, now_millis)),
        _ => now_millis,
    }
}

fn first_free_id(existing: &[Todo], from: i64) -> i64 {
    let taken: BTreeSet<i64> = existing.iter().map(|t| t.id).collect();
    (from..=i64::MAX)
        .find(|id| !taken.contains(id))
        .or_else(|| (i64::MIN..from).rev().find(|id| !taken.contains(id)))
        .unwrap_or(from)
}

#[derive(Debug)]
pub struct TodoList {
    todos: Persisted<Vec<Todo>>,
}

impl TodoList {
    pub fn load(store: SharedStore, key: &str) -> Self {
        let todos = Persisted::load(store, key, Vec::new());
        debug!(count = todos.get().len(), "loaded todos");
        Self { todos }
    }

    pub fn todos(&self) -> &[Todo] {
        self.todos.get()
    }

    pub fn len(&self) -> usize {
        self.todos.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.get().is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&Todo> {
        self.todos.get().iter().find(|t| t.id == id)
    }

    pub fn add(&mut self, task: impl Into<String>) -> Todo {
        self.add_at(task, Utc::now().timestamp_millis())
    }

    #[tracing::instrument(skip(self, task))]
    pub fn add_at(&mut self, task: impl Into<String>, now_millis: i64) -> Todo {
        let todo = Todo {
            id: next_id(self.todos.get(), now_millis),
            task: task.into(),
            completed: false,
        };
        let added = todo.clone();
        self.todos.update(move |prev| {
            let mut next = prev.clone();
            next.push(todo);
            next
        });
        info!(id = added.id, "added todo");
        added
    }

    /// Flips `completed` on the matching todo. Returns false for unknown ids.
    #[tracing::instrument(skip(self))]
    pub fn toggle(&mut self, id: i64) -> bool {
        if self.get(id).is_none() {
            debug!("toggle ignored; no such todo");
            return false;
        }
        self.todos.update(|prev| {
            prev.iter()
                .map(|t| {
                    if t.id == id {
                        Todo {
                            completed: !t.completed,
                            ..t.clone()
                        }
                    } else {
                        t.clone()
                    }
                })
                .collect()
        });
        true
    }

    #[tracing::instrument(skip(self))]
    pub fn delete(&mut self, id: i64) -> bool {
        if self.get(id).is_none() {
            debug!("delete ignored; no such todo");
            return false;
        }
        self.todos
            .update(|prev| prev.iter().filter(|t| t.id != id).cloned().collect());
        info!("deleted todo");
        true
    }

    /// Replaces an empty list with the remote todos. A non-empty list is
    /// never overwritten.
    #[tracing::instrument(skip(self, remote), fields(remote = remote.len()))]
    pub fn seed_from_remote(&mut self, remote: &[RemoteTodo]) -> bool {
        if !self.is_empty() {
            debug!("list already populated; skipping seed");
            return false;
        }
        self.todos.set(remote.iter().map(Todo::from).collect());
        info!(count = remote.len(), "seeded todos from remote");
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TodoField {
    Task,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoDraft {
    pub task: String,
}

impl FormValues for TodoDraft {
    type Field = TodoField;

    fn field(&self, field: TodoField) -> &str {
        match field {
            TodoField::Task => &self.task,
        }
    }

    fn set_field(&mut self, field: TodoField, value: String) {
        match field {
            TodoField::Task => self.task = value,
        }
    }
}

pub fn validate_todo(values: &TodoDraft) -> FieldErrors<TodoField> {
    let mut errors = FieldErrors::new();
    if values.task.is_empty() {
        errors.insert(TodoField::Task, "Task is required");
    }
    errors
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginDraft {
    pub username: String,
    pub password: String,
}

impl FormValues for LoginDraft {
    type Field = LoginField;

    fn field(&self, field: LoginField) -> &str {
        match field {
            LoginField::Username => &self.username,
            LoginField::Password => &self.password,
        }
    }

    fn set_field(&mut self, field: LoginField, value: String) {
        match field {
            LoginField::Username => self.username = value,
            LoginField::Password => self.password = value,
        }
    }
}

pub fn validate_login(values: &LoginDraft) -> FieldErrors<LoginField> {
    let mut errors = FieldErrors::new();
    if values.username.is_empty() {
        errors.insert(LoginField::Username, "Username is required");
    }
    if values.password.is_empty() {
        errors.insert(LoginField::Password, "Password is required");
    }
    errors
}
