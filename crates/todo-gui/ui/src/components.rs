use todo_core::Todo;
use todo_core::todo::LoginField;
use web_sys::HtmlInputElement;
use yew::{Callback, Html, InputEvent, Properties, SubmitEvent, TargetCast, classes, function_component, html};

#[derive(Properties, PartialEq)]
pub struct FieldErrorProps {
    pub message: Option<String>,
}

#[function_component(FieldError)]
pub fn field_error(props: &FieldErrorProps) -> Html {
    match &props.message {
        Some(message) => html! { <div class="TodoApp-error">{ message }</div> },
        None => html! {},
    }
}

/// `oninput` handler that forwards the input's current value.
pub fn on_value(callback: Callback<String>) -> Callback<InputEvent> {
    Callback::from(move |e: InputEvent| {
        let input: HtmlInputElement = e.target_unchecked_into();
        callback.emit(input.value());
    })
}

#[derive(Properties, PartialEq)]
pub struct LoginPanelProps {
    pub username: String,
    pub password: String,
    pub username_error: Option<String>,
    pub password_error: Option<String>,
    pub login_error: Option<String>,
    pub submitting: bool,
    pub on_change: Callback<(LoginField, String)>,
    pub on_submit: Callback<()>,
}

#[function_component(LoginPanel)]
pub fn login_panel(props: &LoginPanelProps) -> Html {
    let field_input = |field: LoginField| {
        let on_change = props.on_change.clone();
        on_value(Callback::from(move |value| on_change.emit((field, value))))
    };
    let onsubmit = {
        let on_submit = props.on_submit.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            on_submit.emit(());
        })
    };

    html! {
        <div class="TodoApp-login">
            <h2>{ "Login to Access Todo App" }</h2>
            <form {onsubmit} class="TodoApp-form">
                <div class="TodoApp-form-field">
                    <input
                        type="text"
                        name="username"
                        value={props.username.clone()}
                        oninput={field_input(LoginField::Username)}
                        placeholder="Username"
                        class="TodoApp-input"
                    />
                    <FieldError message={props.username_error.clone()} />
                </div>
                <div class="TodoApp-form-field">
                    <input
                        type="password"
                        name="password"
                        value={props.password.clone()}
                        oninput={field_input(LoginField::Password)}
                        placeholder="Password"
                        class="TodoApp-input"
                    />
                    <FieldError message={props.password_error.clone()} />
                </div>
                <FieldError message={props.login_error.clone()} />
                <button
                    type="submit"
                    disabled={props.submitting}
                    class="TodoApp-button TodoApp-login-button"
                >
                    { if props.submitting { "Logging in..." } else { "Log In" } }
                </button>
            </form>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct TodoItemProps {
    pub todo: Todo,
    pub on_toggle: Callback<i64>,
    pub on_delete: Callback<i64>,
}

#[function_component(TodoItem)]
pub fn todo_item(props: &TodoItemProps) -> Html {
    let id = props.todo.id;
    let on_toggle = props.on_toggle.clone();
    let on_delete = props.on_delete.clone();

    html! {
        <div class="TodoApp-todo-item">
            <input
                type="checkbox"
                checked={props.todo.completed}
                onchange={move |_| on_toggle.emit(id)}
                class="TodoApp-todo-checkbox"
            />
            <span class={classes!("TodoApp-todo-text", props.todo.completed.then_some("completed"))}>
                { &props.todo.task }
            </span>
            <button
                onclick={move |_| on_delete.emit(id)}
                class="TodoApp-button TodoApp-delete-button"
            >
                { "Delete" }
            </button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct PageHeaderProps {
    pub theme: String,
    pub username: String,
    pub on_toggle_theme: Callback<()>,
    pub on_logout: Callback<()>,
}

#[function_component(PageHeader)]
pub fn page_header(props: &PageHeaderProps) -> Html {
    let on_toggle_theme = props.on_toggle_theme.clone();
    let on_logout = props.on_logout.clone();
    let (background, color) = if props.theme == "dark" {
        ("#333", "#fff")
    } else {
        ("#fff", "#333")
    };

    html! {
        <div class="TodoApp-header">
            <h1>{ "Todo App" }</h1>
            <div class="TodoApp-controls">
                <button
                    onclick={move |_| on_toggle_theme.emit(())}
                    class="TodoApp-button TodoApp-theme-button"
                    style={format!("background:{background};color:{color};")}
                >
                    { format!("Toggle Theme ({})", props.theme) }
                </button>
                <button
                    onclick={move |_| on_logout.emit(())}
                    class="TodoApp-button TodoApp-logout-button"
                >
                    { format!("Log Out ({})", props.username) }
                </button>
            </div>
        </div>
    }
}
