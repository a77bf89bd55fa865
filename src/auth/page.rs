use tracing::{info, warn};

use super::authenticator::{Authenticator, AuthenticatorConfig, ProviderRequest};
use super::Credentials;

/// Site id used when running against a local development host.
pub const LOCAL_DEVELOPMENT_SITE_ID: &str = "cms.netlify.com";

#[derive(Debug, Clone, PartialEq)]
pub struct AuthPageProps {
    pub base_url: Option<String>,
    pub site_id: Option<String>,
    pub provider: String,
    pub in_progress: bool,
}

/// What the login page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginView {
    pub error: Option<String>,
    pub button_label: String,
    pub button_disabled: bool,
}

/// Login page of a Git hosting backend. Holds only the last login error.
#[derive(Debug, Clone)]
pub struct AuthenticationPage {
    props: AuthPageProps,
    login_error: Option<String>,
}

impl AuthenticationPage {
    pub fn new(props: AuthPageProps) -> Self {
        Self {
            props,
            login_error: None,
        }
    }

    pub fn set_in_progress(&mut self, in_progress: bool) {
        self.props.in_progress = in_progress;
    }

    pub fn login_error(&self) -> Option<&str> {
        self.login_error.as_deref()
    }

    /// `host` is the page's `host[:port]`.
    pub fn authenticator_config(&self, host: &str) -> AuthenticatorConfig {
        let hostname = host.split(':').next().unwrap_or_default();
        let site_id = if hostname == "localhost" {
            Some(LOCAL_DEVELOPMENT_SITE_ID.to_string())
        } else {
            self.props.site_id.clone()
        };
        AuthenticatorConfig {
            base_url: self.props.base_url.clone(),
            site_id,
        }
    }

    pub fn provider_request(&self) -> ProviderRequest {
        ProviderRequest {
            provider: self.props.provider.clone(),
            scope: "repo".to_string(),
        }
    }

    /// Run the login flow; `on_login` only fires on success.
    pub async fn handle_login<F>(&mut self, host: &str, authenticator: &dyn Authenticator, on_login: F)
    where
        F: FnOnce(Credentials),
    {
        let config = self.authenticator_config(host);
        let request = self.provider_request();

        match authenticator.authenticate(&config, &request).await {
            Ok(credentials) => {
                info!(provider = %request.provider, "Login flow completed");
                self.login_error = None;
                on_login(credentials);
            }
            Err(err) => {
                warn!(provider = %request.provider, error = %err, "Login flow failed");
                self.login_error = Some(err.to_string());
            }
        }
    }

    pub fn render(&self) -> LoginView {
        let button_label = if self.props.in_progress {
            "Logging in...".to_string()
        } else {
            format!("Login with {}", provider_display_name(&self.props.provider))
        };
        LoginView {
            error: self.login_error.clone(),
            button_label,
            button_disabled: self.props.in_progress,
        }
    }
}

fn provider_display_name(provider: &str) -> String {
    match provider {
        "gitlab" => "GitLab".to_string(),
        "github" => "GitHub".to_string(),
        "bitbucket" => "Bitbucket".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeAuthenticator {
        result: Result<Credentials, AuthError>,
        seen: Mutex<Vec<(AuthenticatorConfig, ProviderRequest)>>,
    }

    impl FakeAuthenticator {
        fn new(result: Result<Credentials, AuthError>) -> Self {
            Self {
                result,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Authenticator for FakeAuthenticator {
        async fn authenticate(
            &self,
            config: &AuthenticatorConfig,
            request: &ProviderRequest,
        ) -> Result<Credentials, AuthError> {
            self.seen.lock().unwrap().push((config.clone(), request.clone()));
            self.result.clone()
        }
    }

    fn page() -> AuthenticationPage {
        AuthenticationPage::new(AuthPageProps {
            base_url: Some("https://auth.example.com".into()),
            site_id: Some("example.com".into()),
            provider: "gitlab".into(),
            in_progress: false,
        })
    }

    fn credentials() -> Credentials {
        Credentials {
            token: "t0k3n".into(),
            provider: "gitlab".into(),
            login: None,
        }
    }

    #[test]
    fn test_localhost_overrides_site_id() {
        let page = page();
        assert_eq!(
            page.authenticator_config("localhost:8080").site_id.as_deref(),
            Some(LOCAL_DEVELOPMENT_SITE_ID)
        );
        let remote = page.authenticator_config("cms.example.com");
        assert_eq!(remote.site_id.as_deref(), Some("example.com"));
        assert_eq!(remote.base_url.as_deref(), Some("https://auth.example.com"));
    }

    #[tokio::test]
    async fn test_successful_login_invokes_callback() {
        let mut page = page();
        let authenticator = FakeAuthenticator::new(Ok(credentials()));
        let mut received = None;

        page.handle_login("example.com", &authenticator, |c| received = Some(c))
            .await;

        assert_eq!(received, Some(credentials()));
        assert!(page.render().error.is_none());
        let seen = authenticator.seen.lock().unwrap();
        assert_eq!(seen[0].1.provider, "gitlab");
        assert_eq!(seen[0].1.scope, "repo");
    }

    #[tokio::test]
    async fn test_failed_login_is_rendered_inline() {
        let mut page = page();
        let authenticator = FakeAuthenticator::new(Err(AuthError::Provider("popup blocked".into())));
        let mut called = false;

        page.handle_login("example.com", &authenticator, |_| called = true)
            .await;

        assert!(!called);
        assert_eq!(page.render().error.as_deref(), Some("popup blocked"));
    }

    #[test]
    fn test_button_reflects_progress() {
        let mut page = page();
        let view = page.render();
        assert_eq!(view.button_label, "Login with GitLab");
        assert!(!view.button_disabled);

        page.set_in_progress(true);
        let view = page.render();
        assert_eq!(view.button_label, "Logging in...");
        assert!(view.button_disabled);
    }
}
