//! Embedded chart fonts.
//!
//! DejaVu Sans ships inside the binary so rendering never depends on
//! what the host has installed; see `assets/DEJAVU-LICENSE`.

use ab_glyph::FontArc;

use crate::error::{RenderError, RenderResult};

static REGULAR_BYTES: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
static BOLD_BYTES: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");

/// The regular/bold font pair used for chart text.
#[derive(Debug, Clone)]
pub struct FontSet {
    pub regular: FontArc,
    pub bold: FontArc,
}

impl FontSet {
    /// Parse the embedded DejaVu Sans faces.
    pub fn embedded() -> RenderResult<Self> {
        let regular = FontArc::try_from_slice(REGULAR_BYTES)
            .map_err(|e| RenderError::Font(e.to_string()))?;
        let bold =
            FontArc::try_from_slice(BOLD_BYTES).map_err(|e| RenderError::Font(e.to_string()))?;
        Ok(Self { regular, bold })
    }
}
