//! Client-side app state: local accounts, form toggling and the listing view.
//!
//! Everything the browser page keeps between events lives in [`ClientApp`].
//! Rendering produces HTML strings; attaching them to a document is left to
//! the embedder.

pub mod api;
pub mod render;
pub mod storage;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::models::{Property, Selection};
use api::GatewayClient;
use storage::{KeyValueStore, StorageError};

const USERS_KEY: &str = "users";
const CURRENT_USER_KEY: &str = "currentUser";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Please fill all fields!")]
    MissingFields,

    #[error("Passwords do not match!")]
    PasswordMismatch,

    #[error("Username already exists!")]
    UsernameTaken,

    #[error("Invalid credentials!")]
    InvalidCredentials,

    #[error("Please log in first!")]
    NotLoggedIn,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("stored {key} is not valid JSON: {source}")]
    CorruptState {
        key: &'static str,
        source: serde_json::Error,
    },

    #[error("gateway returned {status}: {message}")]
    Gateway { status: u16, message: String },

    #[error("gateway unreachable: {0}")]
    Http(#[from] reqwest::Error),
}

/// Locally registered account. The password never leaves the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub username: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthForm {
    #[default]
    Register,
    Login,
}

pub struct ClientApp<S: KeyValueStore> {
    storage: S,
    users: Vec<User>,
    current_user: Option<User>,
    visible_form: AuthForm,
    properties: Vec<Property>,
    location_filter: String,
}

fn load_json<T, S>(storage: &S, key: &'static str) -> Result<Option<T>, ClientError>
where
    T: for<'de> Deserialize<'de>,
    S: KeyValueStore,
{
    match storage.get_item(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| ClientError::CorruptState { key, source }),
        None => Ok(None),
    }
}

impl<S: KeyValueStore> ClientApp<S> {
    /// Hydrates `users` and `currentUser` once; later writes go straight through.
    pub fn load(storage: S) -> Result<Self, ClientError> {
        let users = load_json(&storage, USERS_KEY)?.unwrap_or_default();
        let current_user = load_json(&storage, CURRENT_USER_KEY)?;

        Ok(Self {
            storage,
            users,
            current_user,
            visible_form: AuthForm::default(),
            properties: Vec::new(),
            location_filter: render::ALL_LOCATIONS.to_string(),
        })
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn visible_form(&self) -> AuthForm {
        self.visible_form
    }

    pub fn show_register(&mut self) {
        self.visible_form = AuthForm::Register;
    }

    pub fn show_login(&mut self) {
        self.visible_form = AuthForm::Login;
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn register(&mut self, form: &Registration) -> Result<&User, ClientError> {
        let username = form.username.trim();
        let phone = form.phone.trim();

        if username.is_empty()
            || phone.is_empty()
            || form.password.is_empty()
            || form.confirm_password.is_empty()
        {
            return Err(ClientError::MissingFields);
        }
        if form.password != form.confirm_password {
            return Err(ClientError::PasswordMismatch);
        }
        if self.users.iter().any(|u| u.username == username) {
            return Err(ClientError::UsernameTaken);
        }

        let mut users = self.users.clone();
        users.push(User {
            username: username.to_string(),
            phone: phone.to_string(),
            password: form.password.clone(),
        });
        let encoded = serde_json::to_string(&users).map_err(StorageError::from)?;
        self.storage.set_item(USERS_KEY, &encoded)?;
        self.users = users;

        tracing::debug!(username, "account registered");
        self.visible_form = AuthForm::Login;

        let index = self.users.len() - 1;
        Ok(&self.users[index])
    }

    pub fn login(&mut self, username: &str, password: &str) -> Result<&User, ClientError> {
        let username = username.trim();
        let user = self
            .users
            .iter()
            .find(|u| u.username == username && u.password == password)
            .cloned()
            .ok_or(ClientError::InvalidCredentials)?;

        let encoded = serde_json::to_string(&user).map_err(StorageError::from)?;
        self.storage.set_item(CURRENT_USER_KEY, &encoded)?;

        Ok(&*self.current_user.insert(user))
    }

    pub fn welcome_banner(&self) -> String {
        render::welcome_banner(self.current_user.as_ref().map(|u| u.username.as_str()))
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn set_properties(&mut self, properties: Vec<Property>) {
        self.properties = properties;
    }

    pub fn set_location_filter(&mut self, location: impl Into<String>) {
        self.location_filter = location.into();
    }

    pub fn visible_properties(&self) -> Vec<&Property> {
        render::filter_by_location(&self.properties, &self.location_filter)
    }

    /// Container HTML for the current list under the current filter.
    pub fn render_properties(&self) -> String {
        render::render_properties(self.visible_properties())
    }

    pub async fn refresh_properties(&mut self, gateway: &GatewayClient) -> Result<(), ClientError> {
        self.properties = gateway.list_properties().await?;
        Ok(())
    }

    /// "Select House" card action on behalf of the logged-in user.
    pub async fn select_property(
        &self,
        gateway: &GatewayClient,
        property_id: i64,
    ) -> Result<Selection, ClientError> {
        let user = self.current_user.as_ref().ok_or(ClientError::NotLoggedIn)?;
        gateway.select_property(&user.username, property_id).await
    }
}
