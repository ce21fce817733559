//! `chart` — fetch top items, render the grid, attach the PNG.

use ostinato_chart::{decode_art, ChartEntry};
use ostinato_core::model::ChartRequest;
use ostinato_fetch::ChartData;

use super::{Bot, CommandResponse};

pub async fn run(bot: &Bot, username: &str, request: ChartRequest) -> CommandResponse {
    let data = match bot.fetcher.prepare(username, request).await {
        Ok(Some(data)) => data,
        Ok(None) => {
            return CommandResponse::text(format!(
                "`{username}` has no top {}s for {} — nothing to chart",
                request.kind.label(),
                request.period.describe()
            ));
        }
        Err(e) => {
            log::warn!("chart fetch failed for {username}: {e}");
            return CommandResponse::text(if e.is_transient() {
                "I couldn't fetch your listening data, try again in a moment"
            } else {
                "I couldn't make sense of what Last.fm sent back — if this keeps \
                 happening, something is wrong on my end"
            });
        }
    };

    let entries: Vec<ChartEntry> = data
        .items
        .iter()
        .map(|prepared| {
            ChartEntry::new(
                prepared.item.clone(),
                prepared.art_bytes.as_deref().and_then(decode_art),
            )
        })
        .collect();

    let png = match bot.renderer.render_png(&entries, request.grid, request.kind) {
        Ok(png) => png,
        Err(e) => {
            log::error!("chart render failed for {username}: {e}");
            return CommandResponse::text("something went wrong rendering your chart");
        }
    };

    CommandResponse {
        text: reply_text(username, request, &data),
        embed: None,
        attachment: Some(("chart.png".to_string(), png)),
    }
}

fn reply_text(username: &str, request: ChartRequest, data: &ChartData) -> String {
    format!(
        "top {}s of {} for `{}` — {} plays",
        request.kind.label(),
        request.period.describe(),
        username,
        data.total_plays
    )
}
