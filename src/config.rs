use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::workflow::{Collection, Field};

/// Main configuration structure for Draftline
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DraftlineConfig {
    /// `editorial_workflow` enables the draft → review → ready board
    pub publish_mode: PublishMode,
    /// Backend settings
    pub backend: BackendConfig,
    /// Toast durations
    pub notifications: NotificationConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Content collections managed by the CMS
    #[serde(default)]
    pub collections: Vec<Collection>,
    /// Third-party integrations handed to the backend on persist
    #[serde(default)]
    pub integrations: IntegrationsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishMode {
    Simple,
    EditorialWorkflow,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Backend implementation: `local` or `test-repo`
    pub name: String,
    /// Repository identifier on the hosting provider
    pub repo: Option<String>,
    pub branch: String,
    /// Authentication endpoint base URL
    pub base_url: Option<String>,
    /// Site identifier sent to the authenticator
    pub site_id: Option<String>,
    /// OAuth provider used by the login page
    pub auth_provider: String,
    /// Root directory of the local backend
    pub data_dir: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NotificationConfig {
    pub success_dismiss_ms: u64,
    pub danger_dismiss_ms: u64,
}

impl NotificationConfig {
    pub fn success_dismiss(&self) -> Duration {
        Duration::from_millis(self.success_dismiss_ms)
    }

    pub fn danger_dismiss(&self) -> Duration {
        Duration::from_millis(self.danger_dismiss_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct IntegrationsConfig {
    /// Provider name to provider settings
    #[serde(default)]
    pub providers: BTreeMap<String, serde_json::Value>,
}

impl Default for DraftlineConfig {
    fn default() -> Self {
        Self {
            publish_mode: PublishMode::EditorialWorkflow,
            backend: BackendConfig {
                name: "local".to_string(),
                repo: None,
                branch: "main".to_string(),
                base_url: None,
                site_id: None,
                auth_provider: "gitlab".to_string(),
                data_dir: ".draftline".to_string(),
            },
            notifications: NotificationConfig {
                success_dismiss_ms: 4000,
                danger_dismiss_ms: 8000,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
            collections: vec![Collection {
                name: "posts".to_string(),
                label: Some("Posts".to_string()),
                folder: Some("content/posts".to_string()),
                fields: vec![
                    Field::new("title", "string"),
                    Field::new("author", "string").optional(),
                    Field::new("body", "markdown"),
                ],
            }],
            integrations: IntegrationsConfig::default(),
        }
    }
}

impl DraftlineConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (draftline.toml, .draftline-rc)
    /// 3. Environment variables (prefixed with DRAFTLINE__)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&DraftlineConfig::default())?);

        if Path::new("draftline.toml").exists() {
            builder = builder.add_source(File::with_name("draftline"));
        }

        if Path::new(".draftline-rc").exists() {
            builder = builder.add_source(File::new(".draftline-rc", config::FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix("DRAFTLINE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }

    pub fn is_editorial_workflow(&self) -> bool {
        self.publish_mode == PublishMode::EditorialWorkflow
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.name == name)
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<DraftlineConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        // Load .env file first
        let _ = DraftlineConfig::load_env_file();
        DraftlineConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static DraftlineConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}
