//! Command handlers.
//!
//! Every handler produces a [`CommandResponse`], a plain value holding
//! the reply text plus optional embed and attachment. The Discord layer
//! only converts that value into a message, so everything up to and
//! including dispatch runs in tests without a gateway connection.

pub mod chart;
pub mod config;
pub mod link;
pub mod now_playing;

use std::path::{Path, PathBuf};

use ostinato_chart::ChartRenderer;
use ostinato_core::store::LinkStore;
use ostinato_fetch::{ChartFetcher, LastFmClient};

use crate::parse::Command;

/// Last.fm's brand red, used as the embed accent color.
pub const LASTFM_RED: u32 = 0x00D5_1007;

/// A rich-embed payload, kept Discord-agnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedData {
    pub title: String,
    pub description: String,
    pub url: Option<String>,
    pub thumbnail_url: Option<String>,
}

/// What a command handler wants sent back to the channel.
#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub text: String,
    pub embed: Option<EmbedData>,
    pub attachment: Option<(String, Vec<u8>)>,
}

impl CommandResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            embed: None,
            attachment: None,
        }
    }
}

/// Shared handler state: upstream clients, the renderer, and the path
/// to the identity store (opened per command, dropped when done).
#[derive(Debug)]
pub struct Bot {
    pub lastfm: LastFmClient,
    pub fetcher: ChartFetcher,
    pub renderer: ChartRenderer,
    pub db_path: PathBuf,
}

/// Route one parsed command to its handler.
pub async fn dispatch(bot: &Bot, discord_id: &str, command: Command) -> CommandResponse {
    match command {
        Command::Help => usage(),
        Command::Invalid(message) => CommandResponse::text(message),
        Command::Unknown(token) => CommandResponse::text(format!(
            "I don't know the command `{token}` — mention me with `help` to see what I can do"
        )),
        Command::SetUsername(name) => link::run(bot, discord_id, &name).await,
        Command::NowPlaying => match require_link(&bot.db_path, discord_id) {
            Linked::Username(username) => now_playing::run(bot, &username).await,
            Linked::Response(response) => response,
        },
        Command::Chart(request) => match require_link(&bot.db_path, discord_id) {
            Linked::Username(username) => chart::run(bot, &username, request).await,
            Linked::Response(response) => response,
        },
    }
}

enum Linked {
    Username(String),
    Response(CommandResponse),
}

/// Look up the caller's linked Last.fm username, turning "not linked"
/// and store failures into ready-made responses.
fn require_link(db_path: &Path, discord_id: &str) -> Linked {
    let lookup = LinkStore::open(db_path).and_then(|store| store.get(discord_id));

    match lookup {
        Ok(Some(username)) => Linked::Username(username),
        Ok(None) => Linked::Response(CommandResponse::text(
            "I don't know your Last.fm account yet — mention me with \
             `set username <your-lastfm-name>` first",
        )),
        Err(e) => {
            log::error!("Identity store lookup failed: {e}");
            Linked::Response(CommandResponse::text(
                "something went wrong on my end, try again in a moment",
            ))
        }
    }
}

fn usage() -> CommandResponse {
    CommandResponse::text(
        "Mention me with one of:\n\
         - nothing — what you're listening to right now\n\
         - `set username <name>` — link your Last.fm account\n\
         - `chart [week|month|year|all] [album|artist|track] [NxN]` — \
         render a chart of your top items (defaults: week, album, 3x3, \
         largest size 10x10)\n\
         - `help` — this message",
    )
}
