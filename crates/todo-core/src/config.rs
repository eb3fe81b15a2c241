use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::theme::Theme;

pub const DEFAULT_TODOS_URL: &str = "https://jsonplaceholder.typicode.com/todos?_limit=5";
pub const DEFAULT_USERS_URL: &str = "https://jsonplaceholder.typicode.com/users";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub todos: String,
    pub user: String,
    pub theme: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            todos: "todos".to_string(),
            user: "user".to_string(),
            theme: "theme".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub todos_url: String,
    pub users_url: String,
    pub default_theme: Theme,
    pub storage: StorageKeys,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            todos_url: DEFAULT_TODOS_URL.to_string(),
            users_url: DEFAULT_USERS_URL.to_string(),
            default_theme: Theme::Light,
            storage: StorageKeys::default(),
        }
    }
}

impl AppConfig {
    /// Parses a TOML document; keys it leaves out keep their defaults.
    #[tracing::instrument(skip(text))]
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        let cfg: Self = toml::from_str(text).context("failed to parse app config")?;
        anyhow::ensure!(!cfg.todos_url.trim().is_empty(), "todos_url cannot be empty");
        debug!(todos_url = %cfg.todos_url, "loaded app config");
        Ok(cfg)
    }

    pub fn user_url(&self, id: u64) -> String {
        format!("{}/{id}", self.users_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DEFAULT_TODOS_URL};
    use crate::theme::Theme;

    #[test]
    fn partial_document_keeps_defaults() {
        let cfg = AppConfig::from_toml_str(
            r#"
default_theme = "dark"

[storage]
todos = "todos-v2"
"#,
        )
        .expect("parse");

        assert_eq!(cfg.default_theme, Theme::Dark);
        assert_eq!(cfg.storage.todos, "todos-v2");
        assert_eq!(cfg.storage.user, "user");
        assert_eq!(cfg.todos_url, DEFAULT_TODOS_URL);
        assert_eq!(cfg.user_url(3), "https://jsonplaceholder.typicode.com/users/3");
    }

    #[test]
    fn rejects_bad_documents() {
        assert!(AppConfig::from_toml_str("default_theme = \"sepia\"").is_err());
        assert!(AppConfig::from_toml_str("todos_url = \"  \"").is_err());
    }
}
