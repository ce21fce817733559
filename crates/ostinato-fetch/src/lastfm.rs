//! Last.fm API client.
//!
//! Covers the lookups the bot needs: user existence, the most recent
//! (now playing) track, paginated top albums/artists/tracks, and the
//! track-info art fallback. Every call builds its own immutable query
//! parameter list; nothing request-scoped is shared between calls.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use ostinato_core::model::{ChartItem, ItemKind, Period};

use crate::error::{FetchError, FetchResult};
use crate::resilience::RateLimiter;

const LASTFM_API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";

/// What a user is (or was last) listening to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    pub artist: String,
    pub title: String,
    pub album: String,
    pub image_url: String,
    pub url: String,
}

/// A page-capped top-items result. An empty `items` means the user has
/// no listens for the requested period, which handlers report
/// distinctly from fetch failures.
#[derive(Debug, Clone, Default)]
pub struct TopItems {
    pub items: Vec<ChartItem>,
    pub total_plays: u64,
}

/// Last.fm API client.
///
/// Wraps an HTTP client, an API key, and a rate limiter. The Last.fm
/// API allows up to 5 requests per second for non-commercial use.
#[derive(Debug, Clone)]
pub struct LastFmClient {
    http: Client,
    api_key: String,
    base_url: String,
    rate_limiter: RateLimiter,
}

impl LastFmClient {
    /// Create a new Last.fm API client.
    ///
    /// The `api_key` must be a valid Last.fm API key obtained from
    /// <https://www.last.fm/api/account/create>.
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, LASTFM_API_BASE.to_string())
    }

    /// Create a client against an alternate endpoint.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            http: Client::builder()
                .user_agent("ostinato/0.1.0 (https://github.com/oxur/ostinato)")
                .timeout(Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
            api_key,
            base_url,
            rate_limiter: RateLimiter::new(5),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> FetchResult<T> {
        self.rate_limiter.acquire().await;

        let response = self
            .http
            .get(&self.base_url)
            .query(params)
            .query(&[("api_key", self.api_key.as_str()), ("format", "json")])
            .send()
            .await?
            .error_for_status()
            .map_err(|e| FetchError::Http {
                source_name: "Last.fm",
                message: e.to_string(),
            })?;

        response.json().await.map_err(|e| FetchError::Parse {
            source_name: "Last.fm",
            message: e.to_string(),
        })
    }

    /// Whether a Last.fm account with this name exists.
    ///
    /// Used before linking, so a typo'd `set username` is caught
    /// immediately rather than at the first chart.
    pub async fn check_user_exists(&self, username: &str) -> FetchResult<bool> {
        self.rate_limiter.acquire().await;

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("method", "user.getinfo"),
                ("user", username),
                ("api_key", &self.api_key),
                ("format", "json"),
            ])
            .send()
            .await?;

        Ok(response.status().is_success())
    }

    /// The user's profile image URL, if they have one.
    pub async fn user_avatar_url(&self, username: &str) -> FetchResult<Option<String>> {
        let result: UserInfoResponse = self
            .get_json(&[("method", "user.getinfo"), ("user", username)])
            .await?;

        Ok(Some(largest_image(&result.user.image)).filter(|url| !url.is_empty()))
    }

    /// The user's most recent track, or `None` if they have no listens
    /// at all.
    pub async fn now_playing(&self, username: &str) -> FetchResult<Option<NowPlaying>> {
        let result: RecentTracksResponse = self
            .get_json(&[("method", "user.getrecenttracks"), ("user", username)])
            .await?;

        Ok(result
            .recenttracks
            .track
            .into_iter()
            .next()
            .map(|first| NowPlaying {
                artist: first.artist.text,
                title: first.name,
                album: first.album.text,
                image_url: largest_image(&first.image),
                url: first.url,
            }))
    }

    /// Fetch the user's top `count` items of `kind` over `period`.
    ///
    /// Last.fm pages its top lists; this accumulates pages iteratively
    /// until `count` items are collected or the pages run out,
    /// whichever comes first. The returned art URLs are the
    /// Last.fm-supplied images; callers may upgrade them via the art
    /// catalog before downloading.
    pub async fn top_items(
        &self,
        username: &str,
        kind: ItemKind,
        period: Period,
        count: usize,
    ) -> FetchResult<TopItems> {
        let mut items: Vec<ChartItem> = Vec::new();
        let mut page: u32 = 1;

        loop {
            let (batch, total_pages) = match kind {
                ItemKind::Album => self.top_albums_page(username, period, page).await?,
                ItemKind::Artist => self.top_artists_page(username, period, page).await?,
                ItemKind::Track => self.top_tracks_page(username, period, page).await?,
            };

            if batch.is_empty() {
                break;
            }

            let needed = count.saturating_sub(items.len());
            items.extend(batch.into_iter().take(needed));

            // Keep paging only while short of `count` with pages left.
            if items.len() >= count || page >= total_pages {
                break;
            }
            page += 1;
        }

        let total_plays = items.iter().map(|i| i.play_count).sum();
        Ok(TopItems { items, total_plays })
    }

    /// Album art for a single track via `track.getinfo`, used as a
    /// last-resort art source for track charts.
    pub async fn track_art(&self, title: &str, artist: &str) -> FetchResult<Option<String>> {
        let result: TrackInfoResponse = self
            .get_json(&[
                ("method", "track.getinfo"),
                ("track", title),
                ("artist", artist),
            ])
            .await?;

        Ok(result
            .track
            .album
            .map(|album| largest_image(&album.image))
            .filter(|url| !url.is_empty()))
    }

    async fn top_albums_page(
        &self,
        username: &str,
        period: Period,
        page: u32,
    ) -> FetchResult<(Vec<ChartItem>, u32)> {
        let page_str = page.to_string();
        let result: TopAlbumsResponse = self
            .get_json(&[
                ("method", "user.gettopalbums"),
                ("user", username),
                ("period", period.api_value()),
                ("page", &page_str),
            ])
            .await?;

        let total_pages = parse_count(&result.topalbums.attr.total_pages).max(1) as u32;
        let items = result
            .topalbums
            .album
            .into_iter()
            .map(TopAlbum::into_item)
            .collect();
        Ok((items, total_pages))
    }

    async fn top_artists_page(
        &self,
        username: &str,
        period: Period,
        page: u32,
    ) -> FetchResult<(Vec<ChartItem>, u32)> {
        let page_str = page.to_string();
        let result: TopArtistsResponse = self
            .get_json(&[
                ("method", "user.gettopartists"),
                ("user", username),
                ("period", period.api_value()),
                ("page", &page_str),
            ])
            .await?;

        let total_pages = parse_count(&result.topartists.attr.total_pages).max(1) as u32;
        let items = result
            .topartists
            .artist
            .into_iter()
            .map(TopArtist::into_item)
            .collect();
        Ok((items, total_pages))
    }

    async fn top_tracks_page(
        &self,
        username: &str,
        period: Period,
        page: u32,
    ) -> FetchResult<(Vec<ChartItem>, u32)> {
        let page_str = page.to_string();
        let result: TopTracksResponse = self
            .get_json(&[
                ("method", "user.gettoptracks"),
                ("user", username),
                ("period", period.api_value()),
                ("page", &page_str),
            ])
            .await?;

        let total_pages = parse_count(&result.toptracks.attr.total_pages).max(1) as u32;
        let items = result
            .toptracks
            .track
            .into_iter()
            .map(TopTrack::into_item)
            .collect();
        Ok((items, total_pages))
    }
}

/// Last.fm sends counts and page totals as JSON strings.
fn parse_count(value: &str) -> u64 {
    value.parse().unwrap_or(0)
}

/// Last.fm image lists run smallest to largest; take the largest.
fn largest_image(images: &[ApiImage]) -> String {
    images.last().map(|img| img.url.clone()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// API response types (private -- Last.fm nests JSON awkwardly)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiImage {
    #[serde(rename = "#text", default)]
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct TextWrapped {
    #[serde(rename = "#text", default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct PageAttr {
    #[serde(rename = "totalPages", default)]
    total_pages: String,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    user: UserInfo,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    image: Vec<ApiImage>,
}

#[derive(Debug, Deserialize)]
struct RecentTracksResponse {
    recenttracks: RecentTracks,
}

#[derive(Debug, Deserialize)]
struct RecentTracks {
    #[serde(default)]
    track: Vec<RecentTrack>,
}

#[derive(Debug, Deserialize)]
struct RecentTrack {
    name: String,
    #[serde(default)]
    url: String,
    artist: TextWrapped,
    #[serde(default)]
    album: TextWrapped,
    #[serde(default)]
    image: Vec<ApiImage>,
}

#[derive(Debug, Deserialize)]
struct TopAlbumsResponse {
    topalbums: TopAlbums,
}

#[derive(Debug, Deserialize)]
struct TopAlbums {
    #[serde(default)]
    album: Vec<TopAlbum>,
    #[serde(rename = "@attr", default)]
    attr: PageAttr,
}

#[derive(Debug, Deserialize)]
struct TopAlbum {
    name: String,
    #[serde(default)]
    playcount: String,
    artist: NamedRef,
    #[serde(default)]
    image: Vec<ApiImage>,
}

impl TopAlbum {
    fn into_item(self) -> ChartItem {
        ChartItem {
            name: self.name,
            artist: Some(self.artist.name),
            play_count: parse_count(&self.playcount),
            art_url: largest_image(&self.image),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TopArtistsResponse {
    topartists: TopArtists,
}

#[derive(Debug, Deserialize)]
struct TopArtists {
    #[serde(default)]
    artist: Vec<TopArtist>,
    #[serde(rename = "@attr", default)]
    attr: PageAttr,
}

#[derive(Debug, Deserialize)]
struct TopArtist {
    name: String,
    #[serde(default)]
    playcount: String,
    #[serde(default)]
    image: Vec<ApiImage>,
}

impl TopArtist {
    fn into_item(self) -> ChartItem {
        ChartItem {
            name: self.name,
            artist: None,
            play_count: parse_count(&self.playcount),
            art_url: largest_image(&self.image),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TopTracksResponse {
    toptracks: TopTracks,
}

#[derive(Debug, Deserialize)]
struct TopTracks {
    #[serde(default)]
    track: Vec<TopTrack>,
    #[serde(rename = "@attr", default)]
    attr: PageAttr,
}

#[derive(Debug, Deserialize)]
struct TopTrack {
    name: String,
    #[serde(default)]
    playcount: String,
    artist: NamedRef,
    #[serde(default)]
    image: Vec<ApiImage>,
}

impl TopTrack {
    fn into_item(self) -> ChartItem {
        ChartItem {
            name: self.name,
            artist: Some(self.artist.name),
            play_count: parse_count(&self.playcount),
            art_url: largest_image(&self.image),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TrackInfoResponse {
    track: TrackInfo,
}

#[derive(Debug, Deserialize)]
struct TrackInfo {
    #[serde(default)]
    album: Option<TrackAlbum>,
}

#[derive(Debug, Deserialize)]
struct TrackAlbum {
    #[serde(default)]
    image: Vec<ApiImage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = LastFmClient::new("test-key".to_string());
        let debug = format!("{:?}", client);
        assert!(debug.contains("LastFmClient"));
        assert!(debug.contains("RateLimiter"));
    }

    #[test]
    fn test_recent_tracks_deserialize() {
        let json = r##"{
            "recenttracks": {
                "track": [
                    {
                        "name": "Come Together",
                        "url": "https://www.last.fm/music/x",
                        "artist": {"#text": "The Beatles"},
                        "album": {"#text": "Abbey Road"},
                        "image": [
                            {"size": "small", "#text": "https://img/s.jpg"},
                            {"size": "extralarge", "#text": "https://img/xl.jpg"}
                        ]
                    }
                ]
            }
        }"##;
        let result: RecentTracksResponse = serde_json::from_str(json).unwrap();
        let first = &result.recenttracks.track[0];
        assert_eq!(first.name, "Come Together");
        assert_eq!(first.artist.text, "The Beatles");
        assert_eq!(largest_image(&first.image), "https://img/xl.jpg");
    }

    #[test]
    fn test_recent_tracks_empty() {
        let json = r#"{"recenttracks": {"track": []}}"#;
        let result: RecentTracksResponse = serde_json::from_str(json).unwrap();
        assert!(result.recenttracks.track.is_empty());
    }

    #[test]
    fn test_top_albums_deserialize() {
        let json = r##"{
            "topalbums": {
                "album": [
                    {
                        "name": "Abbey Road",
                        "playcount": "42",
                        "artist": {"name": "The Beatles"},
                        "image": [{"size": "large", "#text": "https://img/a.jpg"}]
                    }
                ],
                "@attr": {"user": "alice", "page": "1", "totalPages": "7"}
            }
        }"##;
        let result: TopAlbumsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parse_count(&result.topalbums.attr.total_pages), 7);

        let item = result
            .topalbums
            .album
            .into_iter()
            .next()
            .unwrap()
            .into_item();
        assert_eq!(item.name, "Abbey Road");
        assert_eq!(item.artist.as_deref(), Some("The Beatles"));
        assert_eq!(item.play_count, 42);
        assert_eq!(item.art_url, "https://img/a.jpg");
    }

    #[test]
    fn test_top_artists_have_no_secondary_artist() {
        let json = r#"{
            "topartists": {
                "artist": [
                    {"name": "Radiohead", "playcount": "10", "image": []}
                ],
                "@attr": {"totalPages": "1"}
            }
        }"#;
        let result: TopArtistsResponse = serde_json::from_str(json).unwrap();
        let item = result
            .topartists
            .artist
            .into_iter()
            .next()
            .unwrap()
            .into_item();
        assert_eq!(item.name, "Radiohead");
        assert!(item.artist.is_none());
        assert_eq!(item.play_count, 10);
        assert!(item.art_url.is_empty());
    }

    #[test]
    fn test_top_tracks_deserialize() {
        let json = r##"{
            "toptracks": {
                "track": [
                    {
                        "name": "Karma Police",
                        "playcount": "5",
                        "artist": {"name": "Radiohead"},
                        "image": [{"#text": "https://img/t.jpg"}]
                    }
                ],
                "@attr": {"totalPages": "3"}
            }
        }"##;
        let result: TopTracksResponse = serde_json::from_str(json).unwrap();
        let item = result
            .toptracks
            .track
            .into_iter()
            .next()
            .unwrap()
            .into_item();
        assert_eq!(item.artist.as_deref(), Some("Radiohead"));
        assert_eq!(item.play_count, 5);
    }

    #[test]
    fn test_missing_attr_defaults() {
        let json = r#"{"topalbums": {"album": []}}"#;
        let result: TopAlbumsResponse = serde_json::from_str(json).unwrap();
        assert!(result.topalbums.album.is_empty());
        // Missing totalPages clamps to one page so the loop terminates.
        assert_eq!(parse_count(&result.topalbums.attr.total_pages).max(1), 1);
    }

    #[test]
    fn test_track_info_without_album() {
        let json = r#"{"track": {"name": "Some Single"}}"#;
        let result: TrackInfoResponse = serde_json::from_str(json).unwrap();
        assert!(result.track.album.is_none());
    }

    #[test]
    fn test_track_info_with_album_art() {
        let json = r##"{
            "track": {
                "album": {
                    "image": [
                        {"#text": "https://img/s.jpg"},
                        {"#text": "https://img/xl.jpg"}
                    ]
                }
            }
        }"##;
        let result: TrackInfoResponse = serde_json::from_str(json).unwrap();
        let album = result.track.album.unwrap();
        assert_eq!(largest_image(&album.image), "https://img/xl.jpg");
    }

    #[test]
    fn test_parse_count_garbage_is_zero() {
        assert_eq!(parse_count("42"), 42);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("many"), 0);
    }

    #[test]
    fn test_user_info_avatar() {
        let json = r##"{
            "user": {
                "name": "alice",
                "image": [
                    {"size": "small", "#text": "https://img/s.png"},
                    {"size": "large", "#text": "https://img/l.png"}
                ]
            }
        }"##;
        let result: UserInfoResponse = serde_json::from_str(json).unwrap();
        assert_eq!(largest_image(&result.user.image), "https://img/l.png");
    }
}
