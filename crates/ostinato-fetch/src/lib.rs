//! Upstream clients for ostinato.
//!
//! Implements the Last.fm scrobble lookups (now playing, top items
//! with pagination), the optional Spotify cover-art search, and the
//! preparation step that assembles validated chart requests into
//! render-ready items.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod lastfm;
pub mod prepare;
pub mod resilience;
pub mod spotify;

pub use error::{FetchError, FetchResult};
pub use lastfm::{LastFmClient, NowPlaying, TopItems};
pub use prepare::{ChartData, ChartFetcher, PreparedItem};
pub use spotify::SpotifyClient;
