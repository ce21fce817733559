//! Adaptive text fitting.
//!
//! Draws a label inside a cell's safe zone, wrapping by whole words and
//! shrinking both the font size and the inter-line spacing until the
//! wrapped block provably stays below the cell's top edge. Wrapping is
//! whitespace-based, so this only reliably breaks left-to-right,
//! space-delimited text.

use std::borrow::Cow;

use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};

/// Labels longer than this are cut with an ellipsis before measuring,
/// which bounds how many wrap/shrink rounds a pathological title can
/// trigger.
pub const CHAR_CAP: usize = 80;

/// Both the font size and the line spacing shrink by this factor each
/// time the wrapped block fails the vertical fit check.
pub const SHRINK_FACTOR: f32 = 0.75;

/// Shrink floor. A single unbreakable word in a tiny cell would
/// otherwise shrink forever; at the floor the block is drawn as-is and
/// clipped by the canvas bounds.
pub const MIN_FONT_SIZE: f32 = 4.0;

/// Cut `text` to [`CHAR_CAP`] characters, replacing the tail with an
/// ellipsis when it was longer.
pub fn truncate(text: &str) -> Cow<'_, str> {
    if text.chars().count() <= CHAR_CAP {
        return Cow::Borrowed(text);
    }
    let mut cut: String = text.chars().take(CHAR_CAP - 1).collect();
    cut.push('…');
    Cow::Owned(cut)
}

/// Advance width of `text` at `font_size`, including kerning.
pub fn measure_width(font: &FontArc, font_size: f32, text: &str) -> f32 {
    let scale = PxScale::from(font_size);
    let scaled = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut prev: Option<GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, glyph_id);
        }
        width += scaled.h_advance(glyph_id);
        prev = Some(glyph_id);
    }

    width
}

/// Greedily pack words into lines no wider than `max_width`.
///
/// A word whose addition would meet or exceed `max_width` closes the
/// current line and opens the next. A single word that is wider than
/// `max_width` on its own is never split; it gets its own line and is
/// allowed to overflow horizontally.
pub fn wrap(font: &FontArc, font_size: f32, text: &str, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split(' ').filter(|w| !w.is_empty()) {
        let candidate = format!("{current}{word} ");
        if measure_width(font, font_size, &candidate) >= max_width && !current.is_empty() {
            lines.push(current.trim_end().to_string());
            current.clear();
        }
        current.push_str(word);
        current.push(' ');
    }

    let last = current.trim_end();
    if !last.is_empty() {
        lines.push(last.to_string());
    }

    lines
}

/// Draw `text` anchored at `(anchor_x, bottom_y)` so it fits between
/// `cell_top` and `bottom_y`, wrapping and shrinking as needed.
///
/// `bottom_y` is the baseline of the bottom (last) line; earlier lines
/// are placed `line_push` pixels further up, so rendering runs
/// bottom-up while reading order stays top-to-bottom. Before anything
/// is drawn, the baseline of the topmost line is computed; if the
/// glyphs there would cross above `cell_top`, the whole attempt is
/// discarded and retried with `font_size` and `line_push` shrunk by
/// [`SHRINK_FACTOR`], down to [`MIN_FONT_SIZE`].
///
/// Returns the baseline of the topmost line drawn, which the caller
/// uses as the lower bound for the next stacked label.
#[allow(clippy::too_many_arguments)]
pub fn fit_and_draw(
    canvas: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    anchor_x: f32,
    bottom_y: f32,
    line_push: f32,
    max_width: f32,
    cell_top: f32,
    font_size: f32,
    color: Rgba<u8>,
) -> f32 {
    let text = truncate(text);

    // Whole string fits on one line: no wrapping, no shrinking.
    if measure_width(font, font_size, &text) <= max_width {
        draw_line(canvas, font, font_size, color, anchor_x, bottom_y, &text);
        return bottom_y;
    }

    let lines = wrap(font, font_size, &text, max_width);
    let topmost = bottom_y - line_push * (lines.len() as f32 - 1.0);

    // The block would spill past the cell's top edge into the
    // neighboring cell: shrink and retry before drawing anything.
    if topmost - font_size < cell_top && font_size * SHRINK_FACTOR > MIN_FONT_SIZE {
        return fit_and_draw(
            canvas,
            font,
            &text,
            anchor_x,
            bottom_y,
            line_push * SHRINK_FACTOR,
            max_width,
            cell_top,
            font_size * SHRINK_FACTOR,
            color,
        );
    }

    // Bottom line first, each earlier line one push further up.
    for (idx, line) in lines.iter().enumerate().rev() {
        let y = bottom_y - line_push * (lines.len() - 1 - idx) as f32;
        draw_line(canvas, font, font_size, color, anchor_x, y, line);
    }

    topmost
}

/// Rasterize one line of text with its baseline at `baseline_y`.
pub fn draw_line(
    canvas: &mut RgbaImage,
    font: &FontArc,
    font_size: f32,
    color: Rgba<u8>,
    anchor_x: f32,
    baseline_y: f32,
    text: &str,
) {
    let scale = PxScale::from(font_size);
    let scaled = font.as_scaled(scale);

    let mut caret_x = anchor_x;
    let mut prev: Option<GlyphId> = None;

    for ch in text.chars() {
        let glyph_id = scaled.glyph_id(ch);
        if let Some(prev) = prev {
            caret_x += scaled.kern(prev, glyph_id);
        }

        let glyph = glyph_id.with_scale_and_position(scale, point(caret_x, baseline_y));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i32 + gx as i32;
                let py = bounds.min.y as i32 + gy as i32;
                blend_coverage(canvas, px, py, color, coverage);
            });
        }

        caret_x += scaled.h_advance(glyph_id);
        prev = Some(glyph_id);
    }
}

/// Alpha-blend `color` into the canvas at glyph coverage `coverage`,
/// ignoring out-of-bounds pixels (overwide words may overflow a cell).
fn blend_coverage(canvas: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= canvas.width() || y >= canvas.height() {
        return;
    }

    let alpha = (f32::from(color.0[3]) / 255.0) * coverage.clamp(0.0, 1.0);
    let dst = canvas.get_pixel_mut(x, y);
    for c in 0..3 {
        dst.0[c] =
            (f32::from(color.0[c]) * alpha + f32::from(dst.0[c]) * (1.0 - alpha)).round() as u8;
    }
    dst.0[3] = 255;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FontSet;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn regular() -> FontArc {
        FontSet::embedded().unwrap().regular
    }

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate("Abbey Road"), "Abbey Road");
    }

    #[test]
    fn test_truncate_caps_at_eighty_chars() {
        let long = "a".repeat(200);
        let cut = truncate(&long);
        assert_eq!(cut.chars().count(), CHAR_CAP);
        assert!(cut.ends_with('…'));
    }

    #[test]
    fn test_measure_empty_is_zero() {
        let font = regular();
        assert_eq!(measure_width(&font, 20.0, ""), 0.0);
    }

    #[test]
    fn test_measure_grows_with_text() {
        let font = regular();
        let short = measure_width(&font, 20.0, "hi");
        let long = measure_width(&font, 20.0, "hi there friend");
        assert!(long > short);
        assert!(short > 0.0);
    }

    #[test]
    fn test_wrap_preserves_reading_order() {
        let font = regular();
        let lines = wrap(&font, 20.0, "one two three four five six", 80.0);
        assert!(lines.len() > 1);
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, "one two three four five six");
    }

    #[test]
    fn test_wrap_never_splits_an_overwide_word() {
        let font = regular();
        let lines = wrap(&font, 20.0, "hi incomprehensibilities hi", 40.0);
        assert!(lines.contains(&"incomprehensibilities".to_string()));
    }

    #[test]
    fn test_wrap_single_fitting_word() {
        let font = regular();
        let lines = wrap(&font, 20.0, "hello", 500.0);
        assert_eq!(lines, vec!["hello".to_string()]);
    }

    #[test]
    fn test_fit_single_line_returns_bottom_y() {
        let font = regular();
        let mut canvas = RgbaImage::new(400, 400);
        let top = fit_and_draw(
            &mut canvas,
            &font,
            "short",
            20.0,
            380.0,
            24.0,
            360.0,
            0.0,
            20.0,
            WHITE,
        );
        assert_eq!(top, 380.0);
    }

    #[test]
    fn test_fit_converges_inside_cell() {
        let font = regular();
        let mut canvas = RgbaImage::new(400, 400);
        let long_title = "some very long album title with many many words that keeps going on";
        let top = fit_and_draw(
            &mut canvas,
            &font,
            long_title,
            20.0,
            380.0,
            48.0,
            360.0,
            0.0,
            40.0,
            WHITE,
        );
        // Convergence postcondition: the topmost baseline stays at or
        // below the cell top once the fit check passes.
        assert!(top >= 0.0);
        assert!(top <= 380.0);
    }

    #[test]
    fn test_fit_shrink_terminates_at_floor() {
        let font = regular();
        let mut canvas = RgbaImage::new(100, 100);
        // A cell only 10px tall with a huge starting font cannot fit;
        // the floor must stop the recursion rather than stalling.
        let words = vec!["word"; 50].join(" ");
        let top = fit_and_draw(
            &mut canvas, &font, &words, 2.0, 98.0, 50.0, 60.0, 88.0, 40.0, WHITE,
        );
        assert!(top.is_finite());
    }

    #[test]
    fn test_fit_draws_pixels() {
        let font = regular();
        let mut canvas = RgbaImage::new(200, 200);
        fit_and_draw(
            &mut canvas, &font, "hello", 10.0, 100.0, 24.0, 180.0, 0.0, 30.0, WHITE,
        );
        let lit = canvas.pixels().filter(|p| p.0[0] > 0).count();
        assert!(lit > 0);
    }

    #[test]
    fn test_draw_is_deterministic() {
        let font = regular();
        let mut a = RgbaImage::new(200, 200);
        let mut b = RgbaImage::new(200, 200);
        for canvas in [&mut a, &mut b] {
            fit_and_draw(
                canvas,
                &font,
                "the same text twice",
                10.0,
                180.0,
                24.0,
                120.0,
                0.0,
                22.0,
                WHITE,
            );
        }
        assert_eq!(a.as_raw(), b.as_raw());
    }
}
