use std::cell::RefCell;
use std::rc::Rc;

use todo_core::page::{
  Screen,
  TodoPage,
  refresh
};
use todo_core::todo::{
  LoginField,
  TodoField
};
use yew::functional::UseForceUpdateHandle;
use yew::{
  Callback,
  Html,
  SubmitEvent,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_mut_ref
};

use super::use_services;
use crate::api::BrowserHttp;
use crate::components::{
  FieldError,
  LoginPanel,
  PageHeader,
  TodoItem,
  on_value
};

async fn reload_todos(
  page: Rc<RefCell<TodoPage>>,
  force: UseForceUpdateHandle
) {
  match refresh(&page, &BrowserHttp)
    .await
  {
    | Ok(seeded) => {
      tracing::debug!(
        seeded,
        "remote todos refreshed"
      );
    }
    | Err(error) => {
      tracing::warn!(
        %error,
        "failed refreshing todos"
      );
    }
  }
  force.force_update();
}

#[function_component(TodoPageView)]
pub fn todo_page_view() -> Html {
  let services = use_services();
  let force = use_force_update();
  let page = {
    let services = services.clone();
    use_mut_ref(move || {
      TodoPage::new(
        &services.config,
        services.store.clone(),
        services.auth.clone(),
        services.theme.clone()
      )
    })
  };

  {
    let force = force.clone();
    use_effect_with(
      services.auth.clone(),
      move |auth| {
        let subscription = auth
          .subscribe(move |_| {
            force.force_update()
          });
        move || drop(subscription)
      }
    );
  }

  {
    let force = force.clone();
    use_effect_with(
      services.theme.clone(),
      move |theme| {
        let subscription = theme
          .subscribe(move |_| {
            force.force_update()
          });
        move || drop(subscription)
      }
    );
  }

  {
    let force = force.clone();
    let remote =
      page.borrow().remote().clone();
    use_effect_with(
      remote,
      move |remote| {
        let subscription = remote
          .subscribe(move |_| {
            force.force_update()
          });
        move || drop(subscription)
      }
    );
  }

  {
    let page = page.clone();
    let force = force.clone();
    use_effect_with((), move |_| {
      wasm_bindgen_futures::spawn_local(
        reload_todos(page, force)
      );
      || ()
    });
  }

  if page.borrow().screen()
    == Screen::Login
  {
    return render_login(&page, &force);
  }

  render_todos(&page, &force)
}

fn render_login(
  page: &Rc<RefCell<TodoPage>>,
  force: &UseForceUpdateHandle
) -> Html {
  let on_change = {
    let page = page.clone();
    let force = force.clone();
    Callback::from(
      move |(field, value): (
        LoginField,
        String
      )| {
        page
          .borrow_mut()
          .change_login_field(
            field, value
          );
        force.force_update();
      }
    )
  };
  let on_submit = {
    let page = page.clone();
    let force = force.clone();
    Callback::from(move |()| {
      page.borrow_mut().submit_login();
      force.force_update();
    })
  };

  let current = page.borrow();
  let form = current.login_form();
  html! {
    <LoginPanel
      username={form.values().username.clone()}
      password={form.values().password.clone()}
      username_error={form.visible_error(LoginField::Username).map(str::to_string)}
      password_error={form.visible_error(LoginField::Password).map(str::to_string)}
      login_error={current.login_error().map(|error| error.to_string())}
      submitting={form.is_submitting()}
      {on_change}
      {on_submit}
    />
  }
}

fn render_todos(
  page: &Rc<RefCell<TodoPage>>,
  force: &UseForceUpdateHandle
) -> Html {
  let on_task = {
    let page = page.clone();
    let force = force.clone();
    on_value(Callback::from(
      move |value: String| {
        page
          .borrow_mut()
          .change_task(value);
        force.force_update();
      }
    ))
  };
  let on_add = {
    let page = page.clone();
    let force = force.clone();
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        page.borrow_mut().submit_todo();
        force.force_update();
      }
    )
  };
  let on_toggle = {
    let page = page.clone();
    let force = force.clone();
    Callback::from(move |id: i64| {
      page.borrow_mut().toggle_todo(id);
      force.force_update();
    })
  };
  let on_delete = {
    let page = page.clone();
    let force = force.clone();
    Callback::from(move |id: i64| {
      page.borrow_mut().delete_todo(id);
      force.force_update();
    })
  };
  let on_toggle_theme = {
    let page = page.clone();
    Callback::from(move |()| {
      page.borrow().toggle_theme();
    })
  };
  let on_logout = {
    let page = page.clone();
    Callback::from(move |()| {
      page.borrow_mut().logout();
    })
  };
  let on_refresh = {
    let page = page.clone();
    let force = force.clone();
    Callback::from(
      move |_: yew::MouseEvent| {
        wasm_bindgen_futures::spawn_local(
          reload_todos(
            page.clone(),
            force.clone()
          )
        );
      }
    )
  };

  let current = page.borrow();
  let theme = current.theme();
  let username = current
    .auth_state()
    .user()
    .map(|user| user.username.clone())
    .unwrap_or_default();
  let form = current.todo_form();
  let remote = current.remote_state();

  html! {
    <div class={format!("TodoApp-container {theme}")}>
      <PageHeader
        theme={theme.to_string()}
        {username}
        {on_toggle_theme}
        {on_logout}
      />

      <form onsubmit={on_add} class="TodoApp-form">
        <div class="TodoApp-form-field">
          <input
            type="text"
            name="task"
            value={form.values().task.clone()}
            oninput={on_task}
            placeholder="Add a new task"
            class="TodoApp-input"
          />
          <FieldError message={form.visible_error(TodoField::Task).map(str::to_string)} />
        </div>
        <button
          type="submit"
          disabled={form.is_submitting()}
          class="TodoApp-button TodoApp-submit-button"
        >
          { if form.is_submitting() { "Adding..." } else { "Add Todo" } }
        </button>
      </form>

      if remote.loading {
        <div class="TodoApp-loading">{ "Loading todos..." }</div>
      }
      if let Some(error) = &remote.error {
        <div class="TodoApp-error">{ format!("Error: {error}") }</div>
      }

      <div class="TodoApp-todo-list">
        if current.show_empty_hint() {
          <p class="TodoApp-no-todos">{ "No todos yet. Add one!" }</p>
        }
        {
          for current.todos().iter().map(|todo| html! {
            <TodoItem
              key={todo.id}
              todo={todo.clone()}
              on_toggle={on_toggle.clone()}
              on_delete={on_delete.clone()}
            />
          })
        }
      </div>

      <button
        onclick={on_refresh}
        class="TodoApp-button TodoApp-refresh-button"
      >
        { "Refresh Todos from API" }
      </button>
    </div>
  }
}
