use anyhow::{anyhow, bail, Result};

use draftline::listing::{ListingCard, UnpublishedListing};
use draftline::workflow::WorkflowStatus;

use super::{confirm_prompt, Command, Session};

fn find_card<'a>(listing: &'a UnpublishedListing, collection: &str, slug: &str) -> Result<&'a ListingCard> {
    listing
        .card(collection, slug)
        .ok_or_else(|| anyhow!("{collection}/{slug} is not under editorial workflow"))
}

pub struct MoveCommand {
    pub collection: String,
    pub slug: String,
    pub status: WorkflowStatus,
}

impl Command for MoveCommand {
    async fn execute(&self, session: &Session) -> Result<()> {
        let listing = session.listing().await?;
        let card = find_card(&listing, &self.collection, &self.slug)?;
        let column = listing
            .column(self.status)
            .ok_or_else(|| anyhow!("No column for status {}", self.status))?;

        let Some(intent) = listing.handle_drop(&column.target, &card.source) else {
            println!("ℹ️  {}/{} is already in {}", self.collection, self.slug, column.heading);
            return Ok(());
        };
        intent.execute(&session.workflow, session.dispatch()).await;

        let state = session.store.state();
        match state.editorial_workflow.entry(&self.collection, &self.slug) {
            Some(entry) if entry.status() == self.status => {
                println!(
                    "🔀 {}/{}: {} → {}",
                    self.collection,
                    self.slug,
                    card.source.own_status.description(),
                    column.heading
                );
                Ok(())
            }
            _ => bail!("Failed to move {}/{} to {}", self.collection, self.slug, self.status),
        }
    }
}

pub struct PublishCommand {
    pub collection: String,
    pub slug: String,
    pub yes: bool,
}

impl Command for PublishCommand {
    async fn execute(&self, session: &Session) -> Result<()> {
        let listing = session.listing().await?;
        let card = find_card(&listing, &self.collection, &self.slug)?;
        if !card.can_publish {
            bail!(
                "{}/{} must be {} before publishing (currently {})",
                self.collection,
                self.slug,
                WorkflowStatus::terminal().description(),
                card.source.own_status.description()
            );
        }

        let confirm = confirm_prompt(self.yes);
        let Some(intent) = listing.request_publish(&self.collection, &self.slug, &confirm) else {
            println!("🚫 Publish cancelled");
            return Ok(());
        };
        intent.execute(&session.workflow, session.dispatch()).await;
        session.report_notifications()?;

        println!("🚀 {}/{} published", self.collection, self.slug);
        Ok(())
    }
}

pub struct DeleteCommand {
    pub collection: String,
    pub slug: String,
    pub yes: bool,
}

impl Command for DeleteCommand {
    async fn execute(&self, session: &Session) -> Result<()> {
        let listing = session.listing().await?;
        find_card(&listing, &self.collection, &self.slug)?;

        let confirm = confirm_prompt(self.yes);
        let Some(intent) = listing.request_delete(&self.collection, &self.slug, &confirm) else {
            println!("🚫 Delete cancelled");
            return Ok(());
        };
        intent.execute(&session.workflow, session.dispatch()).await;
        session.report_notifications()?;

        println!("🗑️  {}/{} deleted", self.collection, self.slug);
        Ok(())
    }
}
