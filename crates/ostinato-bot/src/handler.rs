//! Discord plumbing: the gateway event handler and reply delivery.
//!
//! Everything interesting happens in `parse` and `commands`; this
//! module only recognizes a mention, hands the stripped content to the
//! grammar, and converts the resulting [`CommandResponse`] into a
//! Discord message.

use serenity::all::{
    Context, CreateAttachment, CreateEmbed, CreateMessage, EventHandler, Message, Ready,
};
use serenity::async_trait;

use crate::commands::{self, Bot, CommandResponse, LASTFM_RED};
use crate::parse;

#[derive(Debug)]
pub struct Handler {
    bot: Bot,
}

impl Handler {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        log::info!("Connected to Discord as {}", ready.user.name);
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        match msg.mentions_me(&ctx).await {
            Ok(true) => {}
            Ok(false) => return,
            Err(e) => {
                log::warn!("Mention check failed: {e}");
                return;
            }
        }

        let content = parse::strip_mentions(&msg.content);
        let command = parse::parse(&content);
        log::debug!("Dispatching {command:?} for {}", msg.author.id);

        let response = commands::dispatch(&self.bot, &msg.author.id.to_string(), command).await;

        if let Err(e) = send_response(&ctx, &msg, response).await {
            log::warn!("Failed to send reply in {}: {e}", msg.channel_id);
        }
    }
}

async fn send_response(
    ctx: &Context,
    msg: &Message,
    response: CommandResponse,
) -> serenity::Result<()> {
    let mut builder = CreateMessage::new();

    if !response.text.is_empty() {
        builder = builder.content(response.text);
    }

    if let Some(embed) = response.embed {
        let mut e = CreateEmbed::new().title(embed.title).colour(LASTFM_RED);
        if !embed.description.is_empty() {
            e = e.description(embed.description);
        }
        if let Some(url) = embed.url {
            e = e.url(url);
        }
        if let Some(thumbnail) = embed.thumbnail_url {
            e = e.thumbnail(thumbnail);
        }
        builder = builder.embed(e);
    }

    if let Some((filename, bytes)) = response.attachment {
        builder = builder.add_file(CreateAttachment::bytes(bytes, filename));
    }

    msg.channel_id.send_message(&ctx.http, builder).await?;
    Ok(())
}
