use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ItemKind, Period};

/// Largest grid edge we will render. A 10x10 chart already pushes cells
/// down to 200px on the fixed canvas; anything denser is unreadable.
pub const MAX_GRID_EDGE: u32 = 10;

/// Why a `WxH` size token was rejected. Each variant carries its own
/// user-facing wording so the bot can report the precise problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridSizeError {
    #[error("chart sizes must be square, like 3x3 — {width}x{height} doesn't match")]
    Mismatched { width: u32, height: u32 },

    #[error("a chart needs at least one cell, so 0x0 won't work")]
    Zero,

    #[error("{edge}x{edge} is too big — the largest chart is {MAX_GRID_EDGE}x{MAX_GRID_EDGE}")]
    TooLarge { edge: u32 },

    #[error("chart sizes look like WxH, for example 3x3 or 5x5")]
    Malformed,
}

/// A validated square grid size in `[1, MAX_GRID_EDGE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize(u32);

impl Default for GridSize {
    fn default() -> Self {
        Self(3)
    }
}

impl GridSize {
    /// Validate an already-split width/height pair.
    pub fn new(width: u32, height: u32) -> Result<Self, GridSizeError> {
        if width != height {
            return Err(GridSizeError::Mismatched { width, height });
        }
        if width == 0 {
            return Err(GridSizeError::Zero);
        }
        if width > MAX_GRID_EDGE {
            return Err(GridSizeError::TooLarge { edge: width });
        }
        Ok(Self(width))
    }

    /// Parse a `WxH` command token, e.g. `"3x3"`.
    pub fn parse(token: &str) -> Result<Self, GridSizeError> {
        let (w, h) = token.split_once('x').ok_or(GridSizeError::Malformed)?;
        let width: u32 = w.parse().map_err(|_| GridSizeError::Malformed)?;
        let height: u32 = h.parse().map_err(|_| GridSizeError::Malformed)?;
        Self::new(width, height)
    }

    /// Whether a token has the `WxH` shape at all (digits around an
    /// `x`), used by the order-independent chart grammar to decide that
    /// a token was *meant* as a size before validating it.
    #[must_use]
    pub fn looks_like_size(token: &str) -> bool {
        token.split_once('x').is_some_and(|(w, h)| {
            !w.is_empty()
                && !h.is_empty()
                && w.chars().all(|c| c.is_ascii_digit())
                && h.chars().all(|c| c.is_ascii_digit())
        })
    }

    /// The grid edge length (the `N` of an NxN chart).
    #[must_use]
    pub const fn edge(self) -> u32 {
        self.0
    }

    /// Total cell count, which caps how many items are fetched.
    #[must_use]
    pub const fn cells(self) -> u32 {
        self.0 * self.0
    }
}

/// A fully parsed chart request, validated before any fetching happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub kind: ItemKind,
    pub grid: GridSize,
    pub period: Period,
}

impl Default for ChartRequest {
    fn default() -> Self {
        Self {
            kind: ItemKind::Album,
            grid: GridSize::default(),
            period: Period::Week,
        }
    }
}
