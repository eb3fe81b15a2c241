use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AuthError;
use crate::storage::{Persisted, SharedStore};
use crate::watch::{Listeners, Subscription};

pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "12345";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    LoggedOut,
    LoggedIn(User),
}

impl AuthState {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::LoggedIn(user) => Some(user),
            Self::LoggedOut => None,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self, Self::LoggedIn(_))
    }
}

impl From<Option<User>> for AuthState {
    fn from(user: Option<User>) -> Self {
        user.map_or(Self::LoggedOut, Self::LoggedIn)
    }
}

pub trait CredentialVerifier {
    fn verify(&self, username: &str, password: &str) -> bool;
}

impl<F> CredentialVerifier for F
where
    F: Fn(&str, &str) -> bool,
{
    fn verify(&self, username: &str, password: &str) -> bool {
        self(username, password)
    }
}

/// A single fixed username/password pair. A placeholder, not a security
/// mechanism.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

struct AuthInner {
    user: RefCell<Persisted<Option<User>>>,
    verifier: Box<dyn CredentialVerifier>,
    listeners: Listeners<AuthState>,
}

/// Session-wide login state, persisted as `null` or `{"username": ..}`.
#[derive(Clone)]
pub struct AuthStore {
    inner: Rc<AuthInner>,
}

impl PartialEq for AuthStore {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl std::fmt::Debug for AuthStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl AuthStore {
    pub fn new<V>(store: SharedStore, key: &str, verifier: V) -> Self
    where
        V: CredentialVerifier + 'static,
    {
        Self {
            inner: Rc::new(AuthInner {
                user: RefCell::new(Persisted::load(store, key, None)),
                verifier: Box::new(verifier),
                listeners: Listeners::new(),
            }),
        }
    }

    pub fn state(&self) -> AuthState {
        self.inner.user.borrow().get().clone().into()
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.user.borrow().get().is_some()
    }

    /// Logs in when the verifier accepts the pair. A rejected attempt leaves
    /// the current state alone.
    #[tracing::instrument(skip(self, password))]
    pub fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        if !self.inner.verifier.verify(username, password) {
            warn!("rejected login attempt");
            return Err(AuthError::InvalidCredentials);
        }

        let user = User {
            username: username.to_string(),
        };
        self.inner.user.borrow_mut().set(Some(user.clone()));
        info!("logged in");
        self.publish();
        Ok(user)
    }

    pub fn logout(&self) {
        self.inner.user.borrow_mut().set(None);
        info!("logged out");
        self.publish();
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&AuthState) + 'static,
    {
        self.inner.listeners.subscribe(callback)
    }

    fn publish(&self) {
        let state = self.state();
        self.inner.listeners.notify(&state);
    }
}
