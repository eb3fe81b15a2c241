//! State services behind the todo frontend.
//!
//! Everything here is single-threaded: stores are shared through `Rc` handles
//! and mutated from UI event handlers, with [`watch::Listeners`] standing in
//! for reactive re-rendering.

pub mod auth;
pub mod config;
pub mod error;
pub mod fetch;
pub mod form;
pub mod page;
pub mod profile;
pub mod storage;
pub mod theme;
pub mod todo;
pub mod watch;

pub use auth::{AuthState, AuthStore, CredentialVerifier, StaticCredentials, User};
pub use config::AppConfig;
pub use error::{AuthError, FetchError, PersistenceError};
pub use fetch::{FetchState, HttpClient, RemoteResource};
pub use form::{FieldErrors, Form, FormValues, ValidationError};
pub use page::{Screen, TodoPage};
pub use storage::{FileStore, KeyValueStore, MemoryStore, Persisted, SharedStore};
pub use theme::{Theme, ThemeStore};
pub use todo::{RemoteTodo, Todo, TodoList};
