use serde::{Deserialize, Serialize};

/// Which entity type a chart enumerates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    Track,
    Album,
    Artist,
}

impl ItemKind {
    /// Parse a command token into an item kind.
    ///
    /// Returns `None` for tokens that are not one of `track`, `album`,
    /// or `artist`, so the caller can try the token against the other
    /// chart-grammar shapes.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "track" => Some(Self::Track),
            "album" => Some(Self::Album),
            "artist" => Some(Self::Artist),
            _ => None,
        }
    }

    /// The label used in user-facing messages ("album chart" etc).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Track => "track",
            Self::Album => "album",
            Self::Artist => "artist",
        }
    }
}

/// One entry to render in a grid cell of a chart.
///
/// Constructed fresh per chart request from scrobbling-service data,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartItem {
    /// Track, album, or artist title.
    pub name: String,
    /// Present for track/album items; artist items carry their name in
    /// `name` instead.
    pub artist: Option<String>,
    pub play_count: u64,
    /// Cover art URL. Empty means no art is available and the cell is
    /// drawn background-only.
    pub art_url: String,
}

impl ChartItem {
    #[must_use]
    pub fn new(name: impl Into<String>, play_count: u64) -> Self {
        Self {
            name: name.into(),
            artist: None,
            play_count,
            art_url: String::new(),
        }
    }

    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    #[must_use]
    pub fn with_art_url(mut self, url: impl Into<String>) -> Self {
        self.art_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!(ItemKind::parse("album"), Some(ItemKind::Album));
        assert_eq!(ItemKind::parse("track"), Some(ItemKind::Track));
        assert_eq!(ItemKind::parse("artist"), Some(ItemKind::Artist));
        assert_eq!(ItemKind::parse("albums"), None);
        assert_eq!(ItemKind::parse(""), None);
    }

    #[test]
    fn test_item_builder() {
        let item = ChartItem::new("Abbey Road", 42)
            .with_artist("The Beatles")
            .with_art_url("https://example.com/a.jpg");
        assert_eq!(item.name, "Abbey Road");
        assert_eq!(item.artist.as_deref(), Some("The Beatles"));
        assert_eq!(item.play_count, 42);
        assert_eq!(item.art_url, "https://example.com/a.jpg");
    }

    #[test]
    fn test_item_defaults_to_no_art() {
        let item = ChartItem::new("Radiohead", 10);
        assert!(item.artist.is_none());
        assert!(item.art_url.is_empty());
    }
}
