use todo_core::form::Form;
use todo_core::profile::{
  ProfileAction,
  ProfileDraft,
  ProfileField,
  RemoteUser,
  handle_profile_submit,
  validate_profile
};
use todo_core::{
  FetchState,
  RemoteResource
};
use yew::{
  Callback,
  Html,
  Properties,
  SubmitEvent,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_mut_ref,
  use_state
};
use yew_router::hooks::use_navigator;
use yew_router::Routable;

use super::{
  Route,
  use_services
};
use crate::api::BrowserHttp;
use crate::components::{
  FieldError,
  on_value
};

#[derive(Properties, PartialEq)]
pub struct UserFormProps {
  pub action: ProfileAction
}

#[function_component(UserForm)]
pub fn user_form(
  props: &UserFormProps
) -> Html {
  let services = use_services();
  let navigator = use_navigator();
  let force = use_force_update();
  let form = use_mut_ref(|| {
    Form::new(
      ProfileDraft::default(),
      validate_profile
    )
  });

  {
    let form = form.clone();
    let force = force.clone();
    let config = services.config.clone();
    use_effect_with(
      props.action,
      move |action| {
        if let ProfileAction::Edit(id) =
          *action
        {
          let remote = RemoteResource::<
            RemoteUser
          >::new(
            config.user_url(id)
          );
          wasm_bindgen_futures::spawn_local(async move {
            match remote.fetch(&BrowserHttp).await {
              | Ok(user) => {
                form.borrow_mut().reset(ProfileDraft::from(&user));
                force.force_update();
              }
              | Err(error) => {
                tracing::warn!(id, %error, "failed loading user for edit");
              }
            }
          });
        }
        || ()
      }
    );
  }

  let field_input =
    |field: ProfileField| {
      let form = form.clone();
      let force = force.clone();
      on_value(Callback::from(
        move |value: String| {
          form
            .borrow_mut()
            .handle_change(field, value);
          force.force_update();
        }
      ))
    };

  let onsubmit = {
    let form = form.clone();
    let force = force.clone();
    let action = props.action;
    Callback::from(
      move |e: SubmitEvent| {
        e.prevent_default();
        let submitted =
          form.borrow_mut().begin_submit();
        match submitted {
          | Ok(values) => {
            let path =
              handle_profile_submit(
                action, &values
              );
            form
              .borrow_mut()
              .finish_submit();
            if let (
              Some(navigator),
              Some(route)
            ) = (
              navigator.as_ref(),
              Route::recognize(path)
            ) {
              navigator.push(&route);
            }
          }
          | Err(error) => {
            tracing::debug!(
              %error,
              "profile form rejected"
            );
          }
        }
        force.force_update();
      }
    )
  };

  let title = match props.action {
    | ProfileAction::Add => {
      "Add User".to_string()
    }
    | ProfileAction::Edit(id) => {
      format!("Edit User #{id}")
    }
  };

  let current = form.borrow();
  let input = |field: ProfileField,
               label: &'static str| {
    html! {
      <div class="TodoApp-form-field">
        <input
          type="text"
          value={current.value(field).to_string()}
          oninput={field_input(field)}
          placeholder={label}
          class="TodoApp-input"
        />
        <FieldError message={current.visible_error(field).map(str::to_string)} />
      </div>
    }
  };

  html! {
    <div class="UserForm">
      <h2>{ title }</h2>
      <form {onsubmit} class="TodoApp-form">
        { input(ProfileField::Name, "Name") }
        { input(ProfileField::Username, "Username") }
        { input(ProfileField::Email, "Email") }
        <button
          type="submit"
          disabled={current.is_submitting()}
          class="TodoApp-button"
        >
          { "Save" }
        </button>
      </form>
    </div>
  }
}

#[derive(Properties, PartialEq)]
pub struct UserProfileProps {
  pub id: u64
}

#[function_component(UserProfile)]
pub fn user_profile(
  props: &UserProfileProps
) -> Html {
  let services = use_services();
  let state = use_state(
    FetchState::<RemoteUser>::default
  );

  {
    let state = state.clone();
    let config = services.config.clone();
    use_effect_with(
      props.id,
      move |id| {
        let remote = RemoteResource::<
          RemoteUser
        >::new(
          config.user_url(*id)
        );
        let subscription = remote
          .subscribe(move |snapshot| {
            state.set(snapshot.clone())
          });
        wasm_bindgen_futures::spawn_local(async move {
          if let Err(error) = remote.fetch(&BrowserHttp).await {
            tracing::warn!(%error, "failed loading user profile");
          }
        });
        move || drop(subscription)
      }
    );
  }

  let details = match (
    &state.data,
    &state.error
  ) {
    | (Some(user), _) => html! {
      <dl>
        <dt>{ "Name" }</dt><dd>{ &user.name }</dd>
        <dt>{ "Username" }</dt><dd>{ &user.username }</dd>
        <dt>{ "Email" }</dt><dd>{ &user.email }</dd>
        if let Some(phone) = &user.phone {
          <dt>{ "Phone" }</dt><dd>{ phone }</dd>
        }
        if let Some(website) = &user.website {
          <dt>{ "Website" }</dt><dd>{ website }</dd>
        }
      </dl>
    },
    | (None, Some(error)) => html! {
      <div class="TodoApp-error">{ format!("Error: {error}") }</div>
    },
    | (None, None) => html! {
      <div class="TodoApp-loading">{ "Loading user..." }</div>
    }
  };

  html! {
    <div class="UserProfile">
      <h2>{ format!("User #{}", props.id) }</h2>
      { details }
    </div>
  }
}
