use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::storage::{Persisted, SharedStore};
use crate::watch::{Listeners, Subscription};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct ThemeInner {
    theme: RefCell<Persisted<Theme>>,
    listeners: Listeners<Theme>,
}

#[derive(Clone)]
pub struct ThemeStore {
    inner: Rc<ThemeInner>,
}

impl PartialEq for ThemeStore {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ThemeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeStore")
            .field("theme", &self.theme())
            .finish_non_exhaustive()
    }
}

impl ThemeStore {
    pub fn new(store: SharedStore, key: &str, default: Theme) -> Self {
        Self {
            inner: Rc::new(ThemeInner {
                theme: RefCell::new(Persisted::load(store, key, default)),
                listeners: Listeners::new(),
            }),
        }
    }

    pub fn theme(&self) -> Theme {
        *self.inner.theme.borrow().get()
    }

    pub fn toggle(&self) -> Theme {
        self.inner.theme.borrow_mut().update(|current| current.toggled());
        let theme = self.theme();
        debug!(%theme, "toggled theme");
        self.inner.listeners.notify(&theme);
        theme
    }

    pub fn set(&self, theme: Theme) {
        self.inner.theme.borrow_mut().set(theme);
        self.inner.listeners.notify(&theme);
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&Theme) + 'static,
    {
        self.inner.listeners.subscribe(callback)
    }
}
