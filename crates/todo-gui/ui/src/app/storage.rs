use todo_core::{
  KeyValueStore,
  PersistenceError
};

/// `window.localStorage`, looked up on every call so a storage that
/// becomes unavailable mid-session degrades to errors instead of panics.
#[derive(Debug, Default)]
pub struct LocalStore;

fn local_storage()
-> Result<web_sys::Storage, PersistenceError> {
  web_sys::window()
    .and_then(|window| {
      window
        .local_storage()
        .ok()
        .flatten()
    })
    .ok_or_else(|| {
      PersistenceError::Unavailable(
        "localStorage is not available"
          .to_string()
      )
    })
}

impl KeyValueStore for LocalStore {
  fn read(
    &self,
    key: &str
  ) -> Result<Option<String>, PersistenceError>
  {
    local_storage()?
      .get_item(key)
      .map_err(|error| {
        PersistenceError::Backend {
          key:     key.to_string(),
          message: format!("{error:?}")
        }
      })
  }

  fn write(
    &self,
    key: &str,
    raw: &str
  ) -> Result<(), PersistenceError> {
    local_storage()?
      .set_item(key, raw)
      .map_err(|error| {
        tracing::error!(
          key,
          ?error,
          "localStorage rejected write"
        );
        PersistenceError::Backend {
          key:     key.to_string(),
          message: format!("{error:?}")
        }
      })
  }
}
