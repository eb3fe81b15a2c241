mod profile;
mod storage;
mod todo_page;

use std::rc::Rc;

use todo_core::profile::ProfileAction;
use todo_core::{
  AppConfig,
  AuthStore,
  SharedStore,
  StaticCredentials,
  ThemeStore
};
use yew::{
  ContextProvider,
  Html,
  function_component,
  hook,
  html,
  use_context,
  use_state
};
use yew_router::{
  BrowserRouter,
  Routable,
  Switch
};

use self::profile::{
  UserForm,
  UserProfile
};
use self::storage::LocalStore;
use self::todo_page::TodoPageView;

const APP_CONFIG_TOML: &str =
  include_str!("../app.toml");

#[derive(
  Clone, Routable, PartialEq, Debug,
)]
pub enum Route {
  #[at("/")]
  Home,
  #[at("/add")]
  AddUser,
  #[at("/edit/:id")]
  EditUser { id: u64 },
  #[at("/user/:id")]
  UserProfile { id: u64 },
  #[not_found]
  #[at("/404")]
  NotFound
}

/// Process-wide stores shared through a Yew context.
#[derive(Clone)]
pub struct Services {
  pub config: Rc<AppConfig>,
  pub store:  SharedStore,
  pub auth:   AuthStore,
  pub theme:  ThemeStore
}

impl PartialEq for Services {
  fn eq(
    &self,
    other: &Self
  ) -> bool {
    Rc::ptr_eq(
      &self.config,
      &other.config
    ) && self.auth == other.auth
      && self.theme == other.theme
  }
}

impl Services {
  fn init() -> Self {
    let config = load_config();
    let store: SharedStore =
      Rc::new(LocalStore);
    let auth = AuthStore::new(
      store.clone(),
      &config.storage.user,
      StaticCredentials::default()
    );
    let theme = ThemeStore::new(
      store.clone(),
      &config.storage.theme,
      config.default_theme
    );

    tracing::debug!(
      logged_in = auth.is_logged_in(),
      theme = %theme.theme(),
      "initialized stores"
    );

    Self {
      config: Rc::new(config),
      store,
      auth,
      theme
    }
  }
}

fn load_config() -> AppConfig {
  match AppConfig::from_toml_str(
    APP_CONFIG_TOML
  ) {
    | Ok(config) => config,
    | Err(error) => {
      tracing::error!(
        error = %format!("{error:#}"),
        "bad embedded config; using \
         defaults"
      );
      AppConfig::default()
    }
  }
}

#[hook]
pub fn use_services() -> Services {
  use_context::<Services>()
    .unwrap_or_else(|| {
      tracing::error!(
        "services context missing; \
         creating detached stores"
      );
      Services::init()
    })
}

fn switch(route: Route) -> Html {
  match route {
    | Route::Home => {
      html! { <TodoPageView /> }
    }
    | Route::AddUser => {
      html! { <UserForm action={ProfileAction::Add} /> }
    }
    | Route::EditUser {
      id
    } => {
      html! { <UserForm action={ProfileAction::Edit(id)} /> }
    }
    | Route::UserProfile {
      id
    } => {
      html! { <UserProfile id={id} /> }
    }
    | Route::NotFound => {
      html! { <h1>{ "Not found" }</h1> }
    }
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let services =
    use_state(Services::init);

  html! {
    <ContextProvider<Services> context={(*services).clone()}>
      <BrowserRouter>
        <div class="App">
          <Switch<Route> render={switch} />
        </div>
      </BrowserRouter>
    </ContextProvider<Services>>
  }
}

#[cfg(test)]
mod app_tests {
  use yew_router::Routable;

  use super::*;

  #[test]
  fn embedded_config_parses() {
    let config =
      AppConfig::from_toml_str(
        APP_CONFIG_TOML
      )
      .expect("embedded app.toml");
    assert_eq!(
      config,
      AppConfig::default()
    );
  }

  #[test]
  fn profile_routes_carry_ids() {
    assert_eq!(
      Route::recognize("/edit/7"),
      Some(Route::EditUser {
        id: 7
      })
    );
    assert_eq!(
      Route::recognize("/user/3"),
      Some(Route::UserProfile {
        id: 3
      })
    );
    assert_eq!(
      Route::recognize("/add"),
      Some(Route::AddUser)
    );
  }
}
