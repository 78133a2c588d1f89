use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use linkshelf::app::AppContext;
use linkshelf::cli::{commands, Cli, Commands};
use linkshelf::config::Config;
use linkshelf::domain::ItemAction;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let config = Config::load()?;
    let ctx = AppContext::new(&config.api, cli.db.clone())?;

    let mut settings = config.view.settings();
    if let Some(view) = cli.view {
        settings.default_view = view;
    }
    let mut controller = ctx.controller(settings);

    match cli.command {
        Commands::Sync => {
            commands::sync(&mut controller).await?;
        }
        Commands::List { page } => {
            commands::list(&mut controller, page).await?;
        }
        Commands::Read { id } => {
            commands::read(&mut controller, &id).await?;
        }
        Commands::Favorite { id } => {
            commands::apply(&mut controller, &id, ItemAction::Favorite).await?;
        }
        Commands::Unfavorite { id } => {
            commands::apply(&mut controller, &id, ItemAction::Unfavorite).await?;
        }
        Commands::Delete { id } => {
            commands::apply(&mut controller, &id, ItemAction::Delete).await?;
        }
        Commands::Tag { id, tags } => {
            let tags = linkshelf::domain::parse_tags(&tags);
            commands::apply(&mut controller, &id, ItemAction::Tag(tags)).await?;
        }
        Commands::Add { url, tags } => {
            commands::add(&mut controller, &url, &tags).await?;
        }
        Commands::Logout => {
            commands::logout(&mut controller)?;
        }
        Commands::Tui => {
            linkshelf::tui::run(&ctx, &config).await?;
        }
    }

    Ok(())
}

/// Logs go to `--log` when given. Otherwise stderr, except under the TUI
/// where they would corrupt the screen.
fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(EnvFilter::from_default_env());

    match &cli.log {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        None if matches!(cli.command, Commands::Tui) => {
            registry.init();
        }
        None => {
            registry.with(fmt::layer().with_writer(std::io::stderr)).init();
        }
    }

    Ok(())
}
