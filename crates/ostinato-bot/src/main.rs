use anyhow::{Context as _, Result};
use clap::Parser;
use serenity::all::{Client, GatewayIntents};
use std::path::PathBuf;

use ostinato_chart::ChartRenderer;
use ostinato_core::Config;
use ostinato_fetch::{ChartFetcher, LastFmClient, SpotifyClient};

mod commands;
mod handler;
mod parse;

use commands::Bot;

#[derive(Debug, Parser)]
#[command(name = "ostinato", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the identity store (default: ~/.local/share/ostinato/links.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Inspect or initialize the configuration
    ///
    /// Configuration is read from ~/.config/ostinato/config.toml and
    /// OST_* environment variables. Running the bot needs at minimum a
    /// Discord bot token and a Last.fm API key; Spotify credentials are
    /// optional and only improve cover-art coverage.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the current effective configuration (secrets masked)
    Show,
    /// Print the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with defaults if it doesn't exist
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Some(Commands::Config { action }) = cli.command {
        return match action {
            ConfigAction::Show => commands::config::show_config(),
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config(),
        };
    }

    run_bot(cli.db).await
}

async fn run_bot(db: Option<PathBuf>) -> Result<()> {
    let config = match db {
        Some(path) => Config::load_with_db_path(path)?,
        None => Config::load()?,
    };

    let discord_token = config.discord_token.context(
        "discord_token is not configured (set OST_DISCORD_TOKEN or run `ostinato config init`)",
    )?;
    let lastfm_api_key = config.lastfm_api_key.context(
        "lastfm_api_key is not configured (set OST_LASTFM_API_KEY or run `ostinato config init`)",
    )?;

    let lastfm = LastFmClient::new(lastfm_api_key);

    let spotify = match (config.spotify_client_id, config.spotify_client_secret) {
        (Some(id), Some(secret)) => Some(SpotifyClient::new(id, secret)),
        (None, None) => None,
        _ => {
            log::warn!(
                "Spotify credentials are incomplete (need both client id and secret); \
                 falling back to Last.fm cover art"
            );
            None
        }
    };
    if spotify.is_none() {
        log::info!("No Spotify credentials; chart art will use Last.fm images");
    }

    let bot = Bot {
        fetcher: ChartFetcher::new(lastfm.clone(), spotify),
        lastfm,
        renderer: ChartRenderer::new()?,
        db_path: config.database_path,
    };

    let intents = GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&discord_token, intents)
        .event_handler(handler::Handler::new(bot))
        .await
        .context("Failed to create Discord client")?;

    log::info!("Starting ostinato");
    client.start().await.context("Discord client stopped")?;

    Ok(())
}
