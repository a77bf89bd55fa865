use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AuthError, Credentials};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthenticatorConfig {
    pub base_url: Option<String>,
    pub site_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRequest {
    pub provider: String,
    pub scope: String,
}

/// Performs the provider-specific login flow (popup, device flow, ...).
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(
        &self,
        config: &AuthenticatorConfig,
        request: &ProviderRequest,
    ) -> Result<Credentials, AuthError>;
}

/// Reads a personal access token from the environment instead of running a
/// browser flow. Checks `DRAFTLINE_TOKEN`, then `<PROVIDER>_TOKEN`.
#[derive(Debug, Clone, Default)]
pub struct EnvTokenAuthenticator;

impl EnvTokenAuthenticator {
    fn candidate_vars(provider: &str) -> Vec<String> {
        vec![
            "DRAFTLINE_TOKEN".to_string(),
            format!("{}_TOKEN", provider.to_ascii_uppercase()),
        ]
    }
}

#[async_trait]
impl Authenticator for EnvTokenAuthenticator {
    async fn authenticate(
        &self,
        config: &AuthenticatorConfig,
        request: &ProviderRequest,
    ) -> Result<Credentials, AuthError> {
        let env_vars = Self::candidate_vars(&request.provider);
        debug!(
            provider = %request.provider,
            site_id = ?config.site_id,
            "Looking up token in environment"
        );

        let token = env_vars
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|token| !token.trim().is_empty())
            .ok_or_else(|| AuthError::TokenNotFound {
                provider: request.provider.clone(),
                env_vars: env_vars.clone(),
            })?;

        Ok(Credentials {
            token,
            provider: request.provider.clone(),
            login: std::env::var("DRAFTLINE_LOGIN").ok(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_vars_follow_provider() {
        assert_eq!(
            EnvTokenAuthenticator::candidate_vars("gitlab"),
            vec!["DRAFTLINE_TOKEN".to_string(), "GITLAB_TOKEN".to_string()]
        );
    }

    #[tokio::test]
    async fn test_missing_token_lists_variables() {
        let request = ProviderRequest {
            provider: "nonexistent-provider-xyz".into(),
            scope: "repo".into(),
        };
        let config = AuthenticatorConfig {
            base_url: None,
            site_id: None,
        };
        // DRAFTLINE_TOKEN may be set in a developer shell
        if std::env::var("DRAFTLINE_TOKEN").is_ok() {
            return;
        }

        let err = EnvTokenAuthenticator.authenticate(&config, &request).await.unwrap_err();
        assert!(err.to_string().contains("NONEXISTENT-PROVIDER-XYZ_TOKEN"));
    }
}
