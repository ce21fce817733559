//! `set username` — link a Discord user to a Last.fm account.

use ostinato_core::store::LinkStore;

use super::{Bot, CommandResponse};

/// Verify the account exists on Last.fm, then upsert the link.
///
/// A typo'd username is the most common failure here, so "no such
/// Last.fm user" gets its own message instead of a generic error.
pub async fn run(bot: &Bot, discord_id: &str, username: &str) -> CommandResponse {
    match bot.lastfm.check_user_exists(username).await {
        Ok(true) => {}
        Ok(false) => {
            return CommandResponse::text(format!(
                "I couldn't find a Last.fm account called `{username}` — check the spelling?"
            ));
        }
        Err(e) => {
            log::warn!("Last.fm user lookup failed for {username}: {e}");
            return CommandResponse::text(
                "Last.fm isn't answering right now, try again in a moment",
            );
        }
    }

    let saved = LinkStore::open(&bot.db_path).and_then(|store| store.put(discord_id, username));

    match saved {
        Ok(()) => CommandResponse::text(format!(
            "got it, you're linked to <https://www.last.fm/user/{username}>"
        )),
        Err(e) => {
            log::error!("Failed to store link for {discord_id}: {e}");
            CommandResponse::text("something went wrong saving your link, try again in a moment")
        }
    }
}
