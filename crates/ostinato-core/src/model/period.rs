use serde::{Deserialize, Serialize};

/// The time window for aggregating top items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[default]
    Week,
    Month,
    Year,
    All,
}

impl Period {
    /// Parse a command token into a period.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    /// The value the Last.fm API expects for its `period` parameter.
    #[must_use]
    pub const fn api_value(self) -> &'static str {
        match self {
            Self::Week => "7day",
            Self::Month => "1month",
            Self::Year => "12month",
            Self::All => "overall",
        }
    }

    /// Human wording for reply messages ("your chart for the week").
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Week => "the past week",
            Self::Month => "the past month",
            Self::Year => "the past year",
            Self::All => "all time",
        }
    }
}
