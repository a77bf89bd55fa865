use anyhow::Result;

use super::{Command, Session};

pub struct BoardCommand;

impl Command for BoardCommand {
    async fn execute(&self, session: &Session) -> Result<()> {
        if !session.config.is_editorial_workflow() {
            println!("ℹ️  Editorial workflow is disabled (publish_mode = simple)");
            return Ok(());
        }

        let listing = session.listing().await?;
        println!("📋 Editorial Workflow");
        for column in &listing.columns {
            println!();
            println!("{} ({})", column.heading, column.cards.len());
            if column.cards.is_empty() {
                println!("   (empty)");
            }
            for card in &column.cards {
                let label = if card.label.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", card.label)
                };
                println!(
                    "   • {} / {}{} {}",
                    card.meta,
                    card.source.slug,
                    label,
                    card.title.as_deref().unwrap_or("(untitled)")
                );
                println!("     {}", card.subtitle);
                println!("     {}", card.last_updated);
                println!("     ✏️  {}", card.edit_link);
                if card.can_publish {
                    println!("     🚀 draftline publish {} {}", card.source.collection, card.source.slug);
                }
            }
        }
        Ok(())
    }
}
