//! Grid chart compositing.
//!
//! Places up to `n*n` items into a square canvas in row-major order:
//! cover art stretched to fill each cell, a translucent overlay for
//! legibility, then three stacked text lines fitted by [`crate::text`].

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, Blend};
use imageproc::rect::Rect;

use ostinato_core::model::{ChartItem, GridSize, ItemKind};

use crate::error::RenderResult;
use crate::fonts::FontSet;
use crate::text;

/// Canvas edge in pixels. Fixed regardless of grid size: large enough
/// that a 10x10 grid stays legible, small enough that the encoded PNG
/// stays under Discord's upload limit.
pub const CANVAS_SIZE: u32 = 2000;

/// Fraction of a cell's edge reserved as inset margin for text.
const SAFE_ZONE_RATIO: f32 = 0.075;

/// Rounding slack when deciding whether the running x-offset has
/// reached the canvas edge and the row should wrap.
const ROW_TOLERANCE: u32 = 4;

/// Cell overlay drawn over the art so white text reads on any cover.
const OVERLAY: Rgba<u8> = Rgba([0, 0, 0, 153]);

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

// Starting font sizes before the per-cell scale boost. The play-count
// line is the smallest, the primary (title) line the largest.
const PLAYS_BASE: f32 = 20.0;
const SECONDARY_BASE: f32 = 24.0;
const PRIMARY_BASE: f32 = 30.0;

/// Ratio of line spacing to font size inside a wrapped block.
const LINE_PUSH_RATIO: f32 = 1.2;

/// One grid cell's worth of data: the chart item plus its decoded
/// cover art, if any could be fetched.
#[derive(Debug, Clone)]
pub struct ChartEntry {
    pub item: ChartItem,
    pub art: Option<RgbaImage>,
}

impl ChartEntry {
    #[must_use]
    pub fn new(item: ChartItem, art: Option<RgbaImage>) -> Self {
        Self { item, art }
    }
}

/// Decode fetched art bytes, falling back to `None` (background-only
/// cell) when the payload is not a decodable image. Per-item art
/// failures never abort a chart.
#[must_use]
pub fn decode_art(bytes: &[u8]) -> Option<RgbaImage> {
    match image::load_from_memory(bytes) {
        Ok(img) => Some(img.to_rgba8()),
        Err(e) => {
            log::warn!("Discarding undecodable cover art: {e}");
            None
        }
    }
}

/// Renders chart grids with a fixed font set.
#[derive(Debug, Clone)]
pub struct ChartRenderer {
    fonts: FontSet,
}

impl ChartRenderer {
    /// Create a renderer using the embedded fonts.
    pub fn new() -> RenderResult<Self> {
        Ok(Self {
            fonts: FontSet::embedded()?,
        })
    }

    /// Render `entries` into an `n`x`n` grid on the fixed canvas.
    ///
    /// Entries beyond `grid.cells()` are ignored; fewer entries than
    /// cells leaves the remaining cells as plain background. The output
    /// depends only on the inputs, so equal requests produce
    /// pixel-identical images.
    pub fn render(&self, entries: &[ChartEntry], grid: GridSize, kind: ItemKind) -> RgbaImage {
        let edge = grid.edge();
        let item_size = ((CANVAS_SIZE as f32) / edge as f32).round() as u32;
        let safe_zone = item_size as f32 * SAFE_ZONE_RATIO;

        let mut canvas = Blend(RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, BACKGROUND));

        // Font sizes get a mild boost as cells grow.
        let scale_boost = item_size as f32 / edge as f32;
        let plays_size = PLAYS_BASE + scale_boost / (0.5 * PLAYS_BASE);
        let secondary_size = SECONDARY_BASE + scale_boost / (0.5 * SECONDARY_BASE);
        let primary_size = PRIMARY_BASE + scale_boost / (0.5 * PRIMARY_BASE);

        let mut x_off: u32 = 0;
        let mut y_off: u32 = 0;

        for entry in entries.iter().take(grid.cells() as usize) {
            if let Some(art) = &entry.art {
                let resized = imageops::resize(art, item_size, item_size, FilterType::CatmullRom);
                imageops::replace(&mut canvas.0, &resized, i64::from(x_off), i64::from(y_off));
            }

            draw_filled_rect_mut(
                &mut canvas,
                Rect::at(x_off as i32, y_off as i32).of_size(item_size, item_size),
                OVERLAY,
            );

            self.draw_cell_text(
                &mut canvas.0,
                entry,
                kind,
                CellGeometry {
                    left: x_off as f32,
                    top: y_off as f32,
                    size: item_size as f32,
                    safe_zone,
                },
                plays_size,
                secondary_size,
                primary_size,
            );

            x_off += item_size;
            if x_off + ROW_TOLERANCE >= CANVAS_SIZE {
                x_off = 0;
                y_off += item_size;
            }
        }

        canvas.0
    }

    /// Render and encode as PNG, ready to attach to a reply.
    pub fn render_png(
        &self,
        entries: &[ChartEntry],
        grid: GridSize,
        kind: ItemKind,
    ) -> RenderResult<Vec<u8>> {
        let image = self.render(entries, grid, kind);
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image).write_to(&mut buf, image::ImageFormat::Png)?;
        Ok(buf.into_inner())
    }

    /// Stack the cell's text lines bottom-up: play count, then the
    /// artist (skipped for artist charts, where the primary line is
    /// already the artist), then the bold primary line. Each line's
    /// baseline sits one push above the previous line's topmost drawn
    /// baseline so the blocks never collide.
    #[allow(clippy::too_many_arguments)]
    fn draw_cell_text(
        &self,
        canvas: &mut RgbaImage,
        entry: &ChartEntry,
        kind: ItemKind,
        cell: CellGeometry,
        plays_size: f32,
        secondary_size: f32,
        primary_size: f32,
    ) {
        let anchor_x = cell.left + cell.safe_zone;
        let max_width = cell.size - 2.0 * cell.safe_zone;

        let plays = format!("{} plays", entry.item.play_count);
        let mut top = text::fit_and_draw(
            canvas,
            &self.fonts.regular,
            &plays,
            anchor_x,
            cell.top + cell.size - cell.safe_zone,
            plays_size * LINE_PUSH_RATIO,
            max_width,
            cell.top,
            plays_size,
            TEXT_COLOR,
        );

        if kind != ItemKind::Artist {
            if let Some(artist) = &entry.item.artist {
                top = text::fit_and_draw(
                    canvas,
                    &self.fonts.regular,
                    artist,
                    anchor_x,
                    top - secondary_size * LINE_PUSH_RATIO,
                    secondary_size * LINE_PUSH_RATIO,
                    max_width,
                    cell.top,
                    secondary_size,
                    TEXT_COLOR,
                );
            }
        }

        text::fit_and_draw(
            canvas,
            &self.fonts.bold,
            &entry.item.name,
            anchor_x,
            top - primary_size * LINE_PUSH_RATIO,
            primary_size * LINE_PUSH_RATIO,
            max_width,
            cell.top,
            primary_size,
            TEXT_COLOR,
        );
    }
}

/// Pixel-space bounds of one cell, derived per render.
#[derive(Debug, Clone, Copy)]
struct CellGeometry {
    left: f32,
    top: f32,
    size: f32,
    safe_zone: f32,
}
