use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storyreel::app::AppContext;
use storyreel::cli::{commands, Cli, Commands};
use storyreel::config::Config;
use storyreel::content::UserSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they stay out of the alternate screen and command output.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;

    let source = match cli.users.or_else(|| config.content.users_path.clone()) {
        Some(path) => UserSource::File(path),
        None => UserSource::Bundled,
    };
    let db_path = cli.db.or_else(|| config.content.database_path.clone());
    let ctx = AppContext::new(db_path, source)?;

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            storyreel::tui::run(Arc::new(ctx), Arc::new(config)).await?;
        }
        Commands::Users { page } => {
            commands::list_users(&ctx, page).await?;
        }
        Commands::Story { user_id } => {
            commands::show_story(&ctx, user_id).await?;
        }
        Commands::Like { item_id } => {
            commands::toggle_like(&ctx, &item_id)?;
        }
        Commands::Seen => {
            commands::list_seen(&ctx)?;
        }
        Commands::Liked => {
            commands::list_liked(&ctx)?;
        }
    }

    Ok(())
}
