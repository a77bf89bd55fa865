use anyhow::{anyhow, bail, Result};
use std::io::Write;
use std::sync::Arc;

use draftline::backend;
use draftline::config::DraftlineConfig;
use draftline::listing::UnpublishedListing;
use draftline::notifications::NotificationKind;
use draftline::store::{Dispatch, Store};
use draftline::workflow::{Collection, EditorialWorkflow};

pub mod board;
pub mod entry;
pub mod login;
pub mod review;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self, session: &Session) -> Result<()>;
}

/// Backend, store and workflow shared by one CLI invocation.
pub struct Session {
    pub config: Arc<DraftlineConfig>,
    pub store: Arc<Store>,
    pub workflow: EditorialWorkflow,
}

impl Session {
    pub fn new(config: DraftlineConfig) -> Result<Self> {
        let backend = backend::from_config(&config)?;
        let config = Arc::new(config);
        Ok(Self {
            workflow: EditorialWorkflow::new(backend, config.clone()),
            store: Arc::new(Store::default()),
            config,
        })
    }

    pub fn dispatch(&self) -> &dyn Dispatch {
        &*self.store
    }

    pub fn collection(&self, name: &str) -> Result<&Collection> {
        self.config.collection(name).ok_or_else(|| {
            let known: Vec<&str> = self.config.collections.iter().map(|c| c.name.as_str()).collect();
            anyhow!("Unknown collection '{name}' (configured: {})", known.join(", "))
        })
    }

    /// Load the board into the store and build its view.
    pub async fn listing(&self) -> Result<UnpublishedListing> {
        self.workflow
            .load_unpublished_entries(self.dispatch(), &self.config.collections)
            .await;
        let state = self.store.state();
        if let Some(error) = &state.editorial_workflow.error {
            bail!("Failed to load entries: {error}");
        }
        Ok(UnpublishedListing::from_state(&state.editorial_workflow))
    }

    /// Print the notifications raised so far; the first danger or warning
    /// becomes the command's error.
    pub fn report_notifications(&self) -> Result<()> {
        let notifications = self.store.state().notifications.items;
        for notification in &notifications {
            match notification.kind {
                NotificationKind::Success => println!("✅ {}", notification.message),
                NotificationKind::Info => println!("ℹ️  {}", notification.message),
                NotificationKind::Warning | NotificationKind::Danger => {
                    bail!("{}", notification.message)
                }
            }
        }
        Ok(())
    }
}

/// Interactive yes/no prompt, skipped when `assume_yes` is set.
pub fn confirm_prompt(assume_yes: bool) -> impl Fn(&str) -> bool {
    move |message: &str| {
        if assume_yes {
            return true;
        }
        print!("❓ {message} [y/N] ");
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if std::io::stdin().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

pub fn show_how_to_start() -> Result<()> {
    println!("📝 Draftline - Editorial workflow for Git-backed content");
    println!();
    println!("To get started:");
    println!("  📋 draftline board                          # See entries by status");
    println!("  💾 draftline save posts hello -f title=Hi   # Save a draft");
    println!("  🔀 draftline move posts hello review        # Send it to review");
    println!("  🚀 draftline publish posts hello            # Publish when ready");
    println!();
    println!("💡 Start with 'draftline board' to see what is waiting for review!");
    Ok(())
}
