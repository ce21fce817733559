//! Bare mention — show the user's current (or most recent) track.

use ostinato_fetch::NowPlaying;

use super::{Bot, CommandResponse, EmbedData};

pub async fn run(bot: &Bot, username: &str) -> CommandResponse {
    let track = match bot.lastfm.now_playing(username).await {
        Ok(Some(track)) => track,
        Ok(None) => {
            return CommandResponse::text(format!(
                "`{username}` hasn't scrobbled anything yet"
            ));
        }
        Err(e) => {
            log::warn!("now-playing lookup failed for {username}: {e}");
            return CommandResponse::text(
                "Last.fm isn't answering right now, try again in a moment",
            );
        }
    };

    // Untagged tracks often carry no image at all; the user's profile
    // picture makes a better thumbnail than an empty box.
    let thumbnail_url = if track.image_url.is_empty() {
        bot.lastfm
            .user_avatar_url(username)
            .await
            .unwrap_or_default()
    } else {
        Some(track.image_url.clone())
    };

    CommandResponse {
        text: String::new(),
        embed: Some(embed_for(username, &track, thumbnail_url)),
        attachment: None,
    }
}

/// The embed links to the track's own Last.fm page when the API gave
/// one, otherwise to the user's profile.
fn embed_for(username: &str, track: &NowPlaying, thumbnail_url: Option<String>) -> EmbedData {
    let description = if track.album.is_empty() {
        String::new()
    } else {
        format!("from *{}*", track.album)
    };

    let url = if track.url.is_empty() {
        format!("https://www.last.fm/user/{username}")
    } else {
        track.url.clone()
    };

    EmbedData {
        title: format!("{} – {}", track.artist, track.title),
        description,
        url: Some(url),
        thumbnail_url,
    }
}
