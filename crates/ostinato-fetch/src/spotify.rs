//! Spotify cover-art search.
//!
//! Optional art catalog: when client credentials are configured, chart
//! art is searched here first because Spotify's image coverage beats
//! the images Last.fm returns. Uses the client-credentials flow; an
//! expired token is refreshed once and the search retried.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::sync::RwLock;

use ostinato_core::model::ItemKind;

use crate::error::{FetchError, FetchResult};
use crate::resilience::RateLimiter;

const SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/api/token";
const SPOTIFY_SEARCH_URL: &str = "https://api.spotify.com/v1/search";

/// Spotify API client with a cached client-credentials token.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    client_id: String,
    client_secret: String,
    token: Arc<RwLock<Option<String>>>,
    rate_limiter: RateLimiter,
}

impl SpotifyClient {
    /// Create a new Spotify client. No network calls happen until the
    /// first search needs a token.
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            http: Client::builder()
                .user_agent("ostinato/0.1.0 (https://github.com/oxur/ostinato)")
                .timeout(Duration::from_secs(30))
                .build()
                .expect("failed to build HTTP client"),
            client_id,
            client_secret,
            token: Arc::new(RwLock::new(None)),
            rate_limiter: RateLimiter::new(5),
        }
    }

    /// Search for cover art for an item of `kind`.
    ///
    /// Returns the mid-sized image of the first match, or `None` when
    /// nothing matched or the match carries no images. Track searches
    /// return the track's album art, since Spotify only hosts art for
    /// albums and artists.
    pub async fn find_art(&self, kind: ItemKind, query: &str) -> FetchResult<Option<String>> {
        let mut refreshed = false;

        loop {
            let token = self.token().await?;
            self.rate_limiter.acquire().await;

            let response = self
                .http
                .get(SPOTIFY_SEARCH_URL)
                .bearer_auth(&token)
                .query(&[("type", search_type(kind)), ("q", query), ("limit", "5")])
                .send()
                .await?;

            // Expired token: drop it and retry the search once with
            // fresh credentials.
            if response.status() == StatusCode::UNAUTHORIZED && !refreshed {
                self.token.write().await.take();
                refreshed = true;
                continue;
            }

            let response = response.error_for_status().map_err(|e| FetchError::Http {
                source_name: "Spotify",
                message: e.to_string(),
            })?;

            return match kind {
                ItemKind::Artist => {
                    let result: ArtistSearchResponse = parse_json(response).await?;
                    Ok(result
                        .artists
                        .items
                        .into_iter()
                        .next()
                        .and_then(|artist| mid_image(artist.images)))
                }
                ItemKind::Album => {
                    let result: AlbumSearchResponse = parse_json(response).await?;
                    Ok(result
                        .albums
                        .items
                        .into_iter()
                        .next()
                        .and_then(|album| mid_image(album.images)))
                }
                ItemKind::Track => {
                    let result: TrackSearchResponse = parse_json(response).await?;
                    Ok(result
                        .tracks
                        .items
                        .into_iter()
                        .next()
                        .and_then(|track| mid_image(track.album.images)))
                }
            };
        }
    }

    /// The cached access token, fetching a fresh one when absent.
    async fn token(&self) -> FetchResult<String> {
        if let Some(token) = self.token.read().await.clone() {
            return Ok(token);
        }

        let response = self
            .http
            .post(SPOTIFY_AUTH_URL)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST
        ) {
            return Err(FetchError::Unauthorized {
                source_name: "Spotify",
            });
        }

        let response = response.error_for_status().map_err(|e| FetchError::Http {
            source_name: "Spotify",
            message: e.to_string(),
        })?;

        let grant: TokenResponse = response.json().await.map_err(|e| FetchError::Parse {
            source_name: "Spotify",
            message: e.to_string(),
        })?;

        *self.token.write().await = Some(grant.access_token.clone());
        Ok(grant.access_token)
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> FetchResult<T> {
    response.json().await.map_err(|e| FetchError::Parse {
        source_name: "Spotify",
        message: e.to_string(),
    })
}

const fn search_type(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::Artist => "artist",
        ItemKind::Album => "album",
        ItemKind::Track => "track",
    }
}

/// Spotify lists images largest first; the middle size fits chart
/// cells best, so prefer the second entry and fall back to the first.
fn mid_image(images: Vec<SpotifyImage>) -> Option<String> {
    let mut iter = images.into_iter();
    let first = iter.next()?;
    Some(iter.next().unwrap_or(first).url)
}

// ---------------------------------------------------------------------------
// API response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyImage {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct SearchPage<T> {
    #[serde(default)]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ArtistSearchResponse {
    artists: SearchPage<ArtistResult>,
}

#[derive(Debug, Default, Deserialize)]
struct ArtistResult {
    #[serde(default)]
    images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
struct AlbumSearchResponse {
    albums: SearchPage<AlbumResult>,
}

#[derive(Debug, Default, Deserialize)]
struct AlbumResult {
    #[serde(default)]
    images: Vec<SpotifyImage>,
}

#[derive(Debug, Deserialize)]
struct TrackSearchResponse {
    tracks: SearchPage<TrackResult>,
}

#[derive(Debug, Default, Deserialize)]
struct TrackResult {
    #[serde(default)]
    album: AlbumResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_type_values() {
        assert_eq!(search_type(ItemKind::Artist), "artist");
        assert_eq!(search_type(ItemKind::Album), "album");
        assert_eq!(search_type(ItemKind::Track), "track");
    }

    #[test]
    fn test_mid_image_prefers_second() {
        let images = vec![
            SpotifyImage {
                url: "https://img/640.jpg".to_string(),
            },
            SpotifyImage {
                url: "https://img/300.jpg".to_string(),
            },
            SpotifyImage {
                url: "https://img/64.jpg".to_string(),
            },
        ];
        assert_eq!(mid_image(images).as_deref(), Some("https://img/300.jpg"));
    }

    #[test]
    fn test_mid_image_single_entry() {
        let images = vec![SpotifyImage {
            url: "https://img/only.jpg".to_string(),
        }];
        assert_eq!(mid_image(images).as_deref(), Some("https://img/only.jpg"));
    }

    #[test]
    fn test_mid_image_empty() {
        assert!(mid_image(Vec::new()).is_none());
    }

    #[test]
    fn test_artist_search_deserialize() {
        let json = r#"{
            "artists": {
                "items": [
                    {"name": "Radiohead", "images": [
                        {"url": "https://img/640.jpg", "width": 640},
                        {"url": "https://img/300.jpg", "width": 300}
                    ]}
                ]
            }
        }"#;
        let result: ArtistSearchResponse = serde_json::from_str(json).unwrap();
        let first = result.artists.items.into_iter().next().unwrap();
        assert_eq!(mid_image(first.images).as_deref(), Some("https://img/300.jpg"));
    }

    #[test]
    fn test_artist_search_no_images() {
        let json = r#"{"artists": {"items": [{"name": "Obscure"}]}}"#;
        let result: ArtistSearchResponse = serde_json::from_str(json).unwrap();
        let first = result.artists.items.into_iter().next().unwrap();
        assert!(mid_image(first.images).is_none());
    }

    #[test]
    fn test_track_search_uses_album_art() {
        let json = r#"{
            "tracks": {
                "items": [
                    {"album": {"images": [{"url": "https://img/a.jpg"}]}}
                ]
            }
        }"#;
        let result: TrackSearchResponse = serde_json::from_str(json).unwrap();
        let first = result.tracks.items.into_iter().next().unwrap();
        assert_eq!(mid_image(first.album.images).as_deref(), Some("https://img/a.jpg"));
    }

    #[test]
    fn test_search_responses_tolerate_missing_items() {
        // Each result type must deserialize from a bare page object;
        // the items list defaults to empty.
        let artists: ArtistSearchResponse = serde_json::from_str(r#"{"artists": {}}"#).unwrap();
        assert!(artists.artists.items.is_empty());
        let albums: AlbumSearchResponse = serde_json::from_str(r#"{"albums": {}}"#).unwrap();
        assert!(albums.albums.items.is_empty());
        let tracks: TrackSearchResponse = serde_json::from_str(r#"{"tracks": {}}"#).unwrap();
        assert!(tracks.tracks.items.is_empty());
    }

    #[test]
    fn test_token_response_deserialize() {
        let json = r#"{"access_token": "abc123", "token_type": "Bearer", "expires_in": 3600}"#;
        let result: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(result.access_token, "abc123");
    }
}
