//! Chart compositing for ostinato.
//!
//! Turns a list of top items into a single square PNG: cover art tiled
//! into an NxN grid on a fixed-resolution canvas, a legibility overlay,
//! and up to three text lines per cell laid out by an adaptive fitting
//! algorithm that re-wraps and shrinks until the text stays inside its
//! cell.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod fonts;
pub mod layout;
pub mod text;

pub use error::{RenderError, RenderResult};
pub use fonts::FontSet;
pub use layout::{decode_art, ChartEntry, ChartRenderer, CANVAS_SIZE};
