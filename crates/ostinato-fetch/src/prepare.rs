//! Chart item preparation.
//!
//! Bridges the command layer and the renderer: fetches the user's top
//! items (capped at the grid's cell count), upgrades art URLs through
//! the art catalog when one is configured, then downloads the art
//! concurrently. Per-item art failures degrade that one cell to
//! background-only; they never abort the chart.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use ostinato_core::model::{ChartItem, ChartRequest, ItemKind};

use crate::error::{FetchError, FetchResult};
use crate::lastfm::LastFmClient;
use crate::spotify::SpotifyClient;

/// How many art downloads may be in flight at once.
const ART_FETCH_CONCURRENCY: usize = 8;

/// One chart item together with its downloaded (but not yet decoded)
/// cover art.
#[derive(Debug, Clone)]
pub struct PreparedItem {
    pub item: ChartItem,
    pub art_bytes: Option<Vec<u8>>,
}

/// Everything the renderer and the reply message need for one chart.
#[derive(Debug, Clone)]
pub struct ChartData {
    pub items: Vec<PreparedItem>,
    pub total_plays: u64,
}

/// Assembles render-ready chart data from the upstream services.
#[derive(Debug, Clone)]
pub struct ChartFetcher {
    lastfm: LastFmClient,
    spotify: Option<SpotifyClient>,
    http: Client,
}

impl ChartFetcher {
    pub fn new(lastfm: LastFmClient, spotify: Option<SpotifyClient>) -> Self {
        Self {
            lastfm,
            spotify,
            http: Client::builder()
                .user_agent("ostinato/0.1.0 (https://github.com/oxur/ostinato)")
                .timeout(Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Fetch and assemble the data for one validated chart request.
    ///
    /// Returns `Ok(None)` when the user has no top items for the
    /// period, which the command layer reports as its own message.
    pub async fn prepare(
        &self,
        username: &str,
        request: ChartRequest,
    ) -> FetchResult<Option<ChartData>> {
        let top = self
            .lastfm
            .top_items(
                username,
                request.kind,
                request.period,
                request.grid.cells() as usize,
            )
            .await?;

        if top.items.is_empty() {
            return Ok(None);
        }

        let mut items = top.items;
        for item in &mut items {
            if let Some(better) = self.resolve_art(request.kind, item).await {
                item.art_url = better;
            }
        }

        let urls: Vec<String> = items.iter().map(|item| item.art_url.clone()).collect();
        let art = self.download_all(urls).await;

        let prepared = items
            .into_iter()
            .zip(art)
            .map(|(item, art_bytes)| PreparedItem { item, art_bytes })
            .collect();

        Ok(Some(ChartData {
            items: prepared,
            total_plays: top.total_plays,
        }))
    }

    /// Try to find a better art URL than the Last.fm-supplied one.
    ///
    /// Albums and artists go to the art catalog directly; tracks fall
    /// back from track art to artist art to the `track.getinfo` album
    /// image. `None` keeps whatever URL the item already carries.
    async fn resolve_art(&self, kind: ItemKind, item: &ChartItem) -> Option<String> {
        let artist = item.artist.as_deref().unwrap_or_default();

        if let Some(spotify) = &self.spotify {
            let query = match kind {
                ItemKind::Artist => item.name.clone(),
                ItemKind::Album | ItemKind::Track => {
                    format!("{} artist:{}", item.name, artist)
                }
            };

            match spotify.find_art(kind, &query).await {
                Ok(Some(url)) => return Some(url),
                Ok(None) => {}
                Err(e) => log::warn!("Spotify art search failed for {}: {e}", item.name),
            }

            if kind == ItemKind::Track {
                match spotify.find_art(ItemKind::Artist, artist).await {
                    Ok(Some(url)) => return Some(url),
                    Ok(None) => {}
                    Err(e) => log::warn!("Spotify artist-art fallback failed for {artist}: {e}"),
                }
            }
        }

        if kind == ItemKind::Track && item.art_url.is_empty() {
            match self.lastfm.track_art(&item.name, artist).await {
                Ok(found) => return found,
                Err(e) => log::warn!("track.getinfo art lookup failed for {}: {e}", item.name),
            }
        }

        None
    }

    /// Download all art URLs with bounded concurrency, preserving item
    /// order in the result. Empty URLs and failed downloads come back
    /// as `None`.
    async fn download_all(&self, urls: Vec<String>) -> Vec<Option<Vec<u8>>> {
        let semaphore = Arc::new(Semaphore::new(ART_FETCH_CONCURRENCY));
        let mut art: Vec<Option<Vec<u8>>> = vec![None; urls.len()];
        let mut set = JoinSet::new();

        for (idx, url) in urls.into_iter().enumerate() {
            if url.is_empty() {
                continue;
            }
            let http = self.http.clone();
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                // Only fails if the semaphore is closed, which we never do.
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("art-fetch semaphore unexpectedly closed");
                (idx, download(&http, &url).await)
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((idx, bytes)) => art[idx] = bytes,
                Err(e) => log::warn!("Art download task failed: {e}"),
            }
        }

        art
    }
}

async fn download(http: &Client, url: &str) -> Option<Vec<u8>> {
    match fetch_bytes(http, url).await {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::warn!("Falling back to background-only cell for {url}: {e}");
            None
        }
    }
}

async fn fetch_bytes(http: &Client, url: &str) -> FetchResult<Vec<u8>> {
    let response = http
        .get(url)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| FetchError::Http {
            source_name: "art host",
            message: e.to_string(),
        })?;

    Ok(response.bytes().await?.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher() -> ChartFetcher {
        ChartFetcher::new(LastFmClient::new("test-key".to_string()), None)
    }

    #[tokio::test]
    async fn test_download_all_skips_empty_urls() {
        // Empty URLs mean "no art available"; nothing is fetched and
        // the slots stay None, in order.
        let art = fetcher()
            .download_all(vec![String::new(), String::new(), String::new()])
            .await;
        assert_eq!(art.len(), 3);
        assert!(art.iter().all(Option::is_none));
    }

    #[tokio::test]
    async fn test_download_all_empty_input() {
        let art = fetcher().download_all(Vec::new()).await;
        assert!(art.is_empty());
    }

    #[test]
    fn test_fetcher_creation() {
        let f = fetcher();
        let debug = format!("{:?}", f);
        assert!(debug.contains("ChartFetcher"));
        assert!(debug.contains("LastFmClient"));
    }
}
