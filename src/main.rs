use anyhow::Result;
use clap::Parser;

mod cli;

use cli::commands::board::BoardCommand;
use cli::commands::entry::{SaveCommand, ShowCommand};
use cli::commands::login::LoginCommand;
use cli::commands::review::{DeleteCommand, MoveCommand, PublishCommand};
use cli::commands::{show_how_to_start, Command, Session};
use cli::{Cli, Commands};
use draftline::config::config;
use draftline::telemetry::init_telemetry;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = config()?.clone();
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }
    init_telemetry(&config.observability)?;

    let Some(command) = cli.command else {
        return show_how_to_start();
    };

    tokio::runtime::Runtime::new()?.block_on(async {
        let session = Session::new(config)?;
        match command {
            Commands::Board => BoardCommand.execute(&session).await,
            Commands::Show { collection, slug } => ShowCommand { collection, slug }.execute(&session).await,
            Commands::Save {
                collection,
                slug,
                fields,
                data,
                media,
            } => {
                SaveCommand {
                    collection,
                    slug,
                    fields,
                    data,
                    media,
                }
                .execute(&session)
                .await
            }
            Commands::Move {
                collection,
                slug,
                status,
            } => {
                MoveCommand {
                    collection,
                    slug,
                    status,
                }
                .execute(&session)
                .await
            }
            Commands::Publish { collection, slug, yes } => {
                PublishCommand { collection, slug, yes }.execute(&session).await
            }
            Commands::Delete { collection, slug, yes } => {
                DeleteCommand { collection, slug, yes }.execute(&session).await
            }
            Commands::Login { host } => LoginCommand { host }.execute(&session).await,
        }
    })
}
