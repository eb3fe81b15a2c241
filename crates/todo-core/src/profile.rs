use serde::{Deserialize, Serialize};
use tracing::info;

use crate::form::{FieldErrors, FormValues};

pub const HOME_PATH: &str = "/";

/// User record served by the demo API's `/users/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteUser {
    pub id: u64,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProfileField {
    Name,
    Username,
    Email,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub username: String,
    pub email: String,
}

impl From<&RemoteUser> for ProfileDraft {
    fn from(user: &RemoteUser) -> Self {
        Self {
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

impl FormValues for ProfileDraft {
    type Field = ProfileField;

    fn field(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::Name => &self.name,
            ProfileField::Username => &self.username,
            ProfileField::Email => &self.email,
        }
    }

    fn set_field(&mut self, field: ProfileField, value: String) {
        match field {
            ProfileField::Name => self.name = value,
            ProfileField::Username => self.username = value,
            ProfileField::Email => self.email = value,
        }
    }
}

pub fn validate_profile(values: &ProfileDraft) -> FieldErrors<ProfileField> {
    let mut errors = FieldErrors::new();
    if values.name.trim().is_empty() {
        errors.insert(ProfileField::Name, "Name is required");
    }
    if values.username.trim().is_empty() {
        errors.insert(ProfileField::Username, "Username is required");
    }
    if values.email.trim().is_empty() {
        errors.insert(ProfileField::Email, "Email is required");
    } else if !values.email.contains('@') {
        errors.insert(ProfileField::Email, "Email is invalid");
    }
    errors
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileAction {
    Add,
    Edit(u64),
}

/// The demo API does not store profiles, so a submission is only logged.
/// Returns the path to navigate to afterwards.
pub fn handle_profile_submit(action: ProfileAction, values: &ProfileDraft) -> &'static str {
    match action {
        ProfileAction::Add => {
            info!(name = %values.name, username = %values.username, "adding user");
        }
        ProfileAction::Edit(id) => {
            info!(id, name = %values.name, username = %values.username, "editing user");
        }
    }
    HOME_PATH
}

#[cfg(test)]
mod tests {
    use super::{
        HOME_PATH, ProfileAction, ProfileDraft, ProfileField, RemoteUser, handle_profile_submit,
        validate_profile,
    };

    #[test]
    fn email_must_look_like_an_address() {
        let mut draft = ProfileDraft {
            name: "Leanne Graham".into(),
            username: "Bret".into(),
            email: "sincere.april.biz".into(),
        };
        assert_eq!(
            validate_profile(&draft).get(ProfileField::Email),
            Some("Email is invalid")
        );

        draft.email = "Sincere@april.biz".into();
        assert!(validate_profile(&draft).is_empty());
        assert_eq!(handle_profile_submit(ProfileAction::Edit(1), &draft), HOME_PATH);
    }

    #[test]
    fn remote_user_prefills_draft() {
        let body = r#"{"id":1,"name":"Leanne Graham","username":"Bret","email":"Sincere@april.biz","phone":"1-770-736-8031","address":{"city":"Gwenborough"}}"#;
        let user: RemoteUser = serde_json::from_str(body).expect("decode");
        assert_eq!(user.website, None);
        assert_eq!(ProfileDraft::from(&user).username, "Bret");
    }
}
