//! The todo page: login gate, seeded todo list and the two forms driving it.

use std::cell::RefCell;

use tracing::{debug, info};

use crate::auth::{AuthState, AuthStore, User};
use crate::config::AppConfig;
use crate::error::{AuthError, FetchError};
use crate::fetch::{FetchState, HttpClient, RemoteResource};
use crate::form::Form;
use crate::storage::SharedStore;
use crate::theme::{Theme, ThemeStore};
use crate::todo::{
    LoginDraft, LoginField, RemoteTodo, Todo, TodoDraft, TodoField, TodoList, validate_login,
    validate_todo,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Todos,
}

pub struct TodoPage {
    auth: AuthStore,
    theme: ThemeStore,
    todos: TodoList,
    remote: RemoteResource<Vec<RemoteTodo>>,
    todo_form: Form<TodoDraft>,
    login_form: Form<LoginDraft>,
    login_error: Option<AuthError>,
}

impl TodoPage {
    pub fn new(config: &AppConfig, store: SharedStore, auth: AuthStore, theme: ThemeStore) -> Self {
        Self {
            auth,
            theme,
            todos: TodoList::load(store, &config.storage.todos),
            remote: RemoteResource::new(config.todos_url.clone()),
            todo_form: Form::new(TodoDraft::default(), validate_todo),
            login_form: Form::new(LoginDraft::default(), validate_login),
            login_error: None,
        }
    }

    pub fn screen(&self) -> Screen {
        if self.auth.is_logged_in() {
            Screen::Todos
        } else {
            Screen::Login
        }
    }

    pub fn auth_state(&self) -> AuthState {
        self.auth.state()
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    pub fn todos(&self) -> &[Todo] {
        self.todos.todos()
    }

    pub fn remote(&self) -> &RemoteResource<Vec<RemoteTodo>> {
        &self.remote
    }

    pub fn remote_state(&self) -> FetchState<Vec<RemoteTodo>> {
        self.remote.state()
    }

    pub fn todo_form(&self) -> &Form<TodoDraft> {
        &self.todo_form
    }

    pub fn login_form(&self) -> &Form<LoginDraft> {
        &self.login_form
    }

    pub fn login_error(&self) -> Option<AuthError> {
        self.login_error
    }

    /// True when the "no todos yet" hint should replace the list.
    pub fn show_empty_hint(&self) -> bool {
        let remote = self.remote.state();
        self.todos.is_empty() && !remote.loading && remote.error.is_none()
    }

    pub fn change_login_field(&mut self, field: LoginField, value: impl Into<String>) {
        self.login_form.handle_change(field, value);
    }

    /// Submits the login form. Bad credentials leave the fixed message in
    /// [`TodoPage::login_error`] until the next attempt.
    #[tracing::instrument(skip(self))]
    pub fn submit_login(&mut self) -> Option<User> {
        let Ok(values) = self.login_form.begin_submit() else {
            return None;
        };

        let outcome = match self.auth.login(&values.username, &values.password) {
            Ok(user) => {
                self.login_error = None;
                self.login_form.reset(LoginDraft::default());
                Some(user)
            }
            Err(error) => {
                self.login_error = Some(error);
                None
            }
        };
        self.login_form.finish_submit();
        outcome
    }

    pub fn logout(&mut self) {
        self.auth.logout();
    }

    pub fn toggle_theme(&self) -> Theme {
        self.theme.toggle()
    }

    pub fn change_task(&mut self, value: impl Into<String>) {
        self.todo_form.handle_change(TodoField::Task, value);
    }

    /// Appends the drafted task and clears the field. `None` when the draft
    /// does not validate.
    #[tracing::instrument(skip(self))]
    pub fn submit_todo(&mut self) -> Option<Todo> {
        let Ok(values) = self.todo_form.begin_submit() else {
            return None;
        };
        let todo = self.todos.add(values.task);
        self.todo_form.reset(TodoDraft::default());
        Some(todo)
    }

    pub fn toggle_todo(&mut self, id: i64) -> bool {
        self.todos.toggle(id)
    }

    pub fn delete_todo(&mut self, id: i64) -> bool {
        self.todos.delete(id)
    }

    /// Seeds the list from freshly arrived remote data when it is empty.
    pub fn seed_from_remote(&mut self, data: &[RemoteTodo]) -> bool {
        self.todos.seed_from_remote(data)
    }
}

/// Fetches the remote todos and seeds the page with them. The page is only
/// borrowed before and after the request, never across it.
pub async fn refresh<C: HttpClient>(
    page: &RefCell<TodoPage>,
    client: &C,
) -> Result<bool, FetchError> {
    let remote = page.borrow().remote().clone();
    let data = remote.refetch(client).await?;
    let seeded = page.borrow_mut().seed_from_remote(&data);
    if seeded {
        info!(count = data.len(), "todo list seeded");
    } else {
        debug!("remote todos arrived; keeping local list");
    }
    Ok(seeded)
}

#[cfg(test)]
mod tests {
    use super::{Screen, TodoPage};
    use crate::auth::{AuthStore, StaticCredentials};
    use crate::config::AppConfig;
    use crate::error::AuthError;
    use crate::storage::{MemoryStore, SharedStore};
    use crate::theme::ThemeStore;
    use crate::todo::{LoginField, TodoField};

    fn page() -> TodoPage {
        let cfg = AppConfig::default();
        let store: SharedStore = MemoryStore::shared();
        let auth = AuthStore::new(store.clone(), &cfg.storage.user, StaticCredentials::default());
        let theme = ThemeStore::new(store.clone(), &cfg.storage.theme, cfg.default_theme);
        TodoPage::new(&cfg, store, auth, theme)
    }

    #[test]
    fn login_gate_and_fixed_error_message() {
        let mut page = page();
        assert_eq!(page.screen(), Screen::Login);

        page.change_login_field(LoginField::Username, "admin");
        page.change_login_field(LoginField::Password, "nope");
        assert!(page.submit_login().is_none());
        assert_eq!(page.login_error(), Some(AuthError::InvalidCredentials));
        assert_eq!(page.screen(), Screen::Login);
        assert!(!page.login_form().is_submitting());

        page.change_login_field(LoginField::Password, "12345");
        let user = page.submit_login().expect("logged in");
        assert_eq!(user.username, "admin");
        assert_eq!(page.login_error(), None);
        assert_eq!(page.screen(), Screen::Todos);

        page.logout();
        assert_eq!(page.screen(), Screen::Login);
    }

    #[test]
    fn empty_login_form_never_reaches_auth() {
        let mut page = page();
        assert!(page.submit_login().is_none());
        assert_eq!(page.login_error(), None);
        assert_eq!(
            page.login_form().visible_error(LoginField::Username),
            Some("Username is required")
        );
    }

    #[test]
    fn empty_task_is_rejected() {
        let mut page = page();
        assert!(page.submit_todo().is_none());
        assert_eq!(
            page.todo_form().errors().get(TodoField::Task),
            Some("Task is required")
        );
        assert!(page.todos().is_empty());
    }

    #[test]
    fn added_task_clears_the_draft() {
        let mut page = page();
        page.change_task("water plants");
        let todo = page.submit_todo().expect("valid");
        assert_eq!(todo.task, "water plants");
        assert!(!todo.completed);
        assert_eq!(page.todo_form().values().task, "");
        assert!(page.todo_form().errors().is_empty());
    }

    #[test]
    fn empty_hint_tracks_list_and_fetch_state() {
        let mut page = page();
        assert!(page.show_empty_hint());

        page.remote().begin();
        assert!(!page.show_empty_hint());

        page.remote().complete(Ok(vec![]));
        assert!(page.show_empty_hint());

        page.change_task("x");
        page.submit_todo();
        assert!(!page.show_empty_hint());
    }
}
