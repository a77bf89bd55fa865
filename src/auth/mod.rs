//! Authentication against the Git hosting backend

pub mod authenticator;
pub mod page;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::actions::{self, Action, Payload};
use crate::backend::Backend;
use crate::config::NotificationConfig;
use crate::notifications::{Notification, NotificationKind};
use crate::store::Dispatch;

pub use authenticator::{Authenticator, AuthenticatorConfig, EnvTokenAuthenticator, ProviderRequest};
pub use page::{AuthPageProps, AuthenticationPage, LoginView};

/// Token material returned by an authenticator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub provider: String,
    #[serde(default)]
    pub login: Option<String>,
}

/// The logged-in user as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub login: String,
    pub name: Option<String>,
    pub backend_name: String,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("no token found for {provider}; set one of: {}", .env_vars.join(", "))]
    TokenNotFound { provider: String, env_vars: Vec<String> },
    #[error("{0}")]
    Provider(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub is_fetching: bool,
    pub user: Option<User>,
    pub error: Option<String>,
    pub popup: bool,
}

pub fn reduce(state: &mut AuthState, action: &Action) {
    match &action.payload {
        Payload::AuthRequest => {
            *state = AuthState {
                is_fetching: true,
                ..AuthState::default()
            }
        }
        Payload::AuthSuccess(user) => {
            *state = AuthState {
                user: Some(user.clone()),
                ..AuthState::default()
            }
        }
        Payload::AuthFailure { error } => {
            *state = AuthState {
                error: Some(error.clone()),
                ..AuthState::default()
            }
        }
        Payload::AuthRequestDone => state.is_fetching = false,
        Payload::ShowAuthPopup => state.popup = true,
        Payload::Logout => {
            state.user = None;
            state.is_fetching = false;
        }
        _ => {}
    }
}

/// Exchange credentials from the login page for a backend user.
pub async fn login_user(
    backend: &dyn Backend,
    dispatch: &dyn Dispatch,
    notifications: &NotificationConfig,
    credentials: &Credentials,
) {
    dispatch.dispatch(actions::authenticating());
    match backend.authenticate(credentials).await {
        Ok(user) => {
            info!(login = %user.login, backend = backend.name(), "User authenticated");
            dispatch.dispatch(actions::authenticate(user));
        }
        Err(error) => {
            warn!(backend = backend.name(), error = %error, "Authentication failed");
            dispatch.dispatch(actions::auth_error(error.to_string()));
            dispatch.dispatch(actions::notif_send(Notification::new(
                error.to_string(),
                NotificationKind::Warning,
                notifications.danger_dismiss(),
            )));
        }
    }
}

pub fn logout_user(dispatch: &dyn Dispatch) {
    dispatch.dispatch(actions::logout());
}
