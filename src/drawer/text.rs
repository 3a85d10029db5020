use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use fontdue::layout::{CoordinateSystem, GlyphRasterConfig, Layout, LayoutSettings, TextStyle};
use fontdue::{Font, FontSettings};
use once_cell::sync::Lazy;

use crate::drawer::buffer::RgbaBuffer;
use crate::drawer::model::{Color, PixelRect};

const ELLIPSIS: &str = "...";
const FALLBACK: char = '?';
/// Glyphs are never rasterized taller than this; larger text is clipped anyway.
const MAX_PIXEL_SIZE: f32 = 1024.0;
const GLYPH_CACHE_BYTES: usize = 32 * 1024 * 1024;

static FONT_BYTES: &[u8] = include_bytes!("../../assets/DejaVuSans.ttf");

static FONT: Lazy<Option<Font>> = Lazy::new(|| {
    match Font::from_bytes(FONT_BYTES, FontSettings::default()) {
        Ok(font) => Some(font),
        Err(err) => {
            tracing::error!("embedded font failed to load, text will not render: {err}");
            None
        }
    }
});

/// Rasterized coverage maps, keyed the way fontdue identifies a glyph at a size.
#[derive(Default)]
struct GlyphCache {
    bitmaps: HashMap<GlyphRasterConfig, Arc<Vec<u8>>>,
    bytes: usize,
}

static GLYPHS: Lazy<Mutex<GlyphCache>> = Lazy::new(|| Mutex::new(GlyphCache::default()));

fn glyph_bitmap(font: &Font, key: GlyphRasterConfig) -> Arc<Vec<u8>> {
    let mut cache = GLYPHS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(bitmap) = cache.bitmaps.get(&key) {
        return Arc::clone(bitmap);
    }
    let (_, coverage) = font.rasterize_config(key);
    if cache.bytes + coverage.len() > GLYPH_CACHE_BYTES {
        cache.bitmaps.clear();
        cache.bytes = 0;
    }
    cache.bytes += coverage.len();
    let bitmap = Arc::new(coverage);
    cache.bitmaps.insert(key, Arc::clone(&bitmap));
    bitmap
}

/// Pixel size for a point size at 96 dpi, capped at [`MAX_PIXEL_SIZE`].
pub fn pixel_size(point_size: f32) -> f32 {
    (point_size * 96.0 / 72.0).clamp(1.0, MAX_PIXEL_SIZE)
}

/// Drops line breaks and swaps characters the font lacks for `?`.
pub fn printable(text: &str) -> String {
    let Some(font) = FONT.as_ref() else {
        return String::new();
    };
    text.chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .map(|c| {
            if c.is_whitespace() || font.lookup_glyph_index(c) != 0 {
                c
            } else {
                FALLBACK
            }
        })
        .collect()
}

fn lay_out(font: &Font, text: &str, px: f32, x: f32, y: f32) -> Layout<()> {
    let mut layout = Layout::new(CoordinateSystem::PositiveYDown);
    layout.reset(&LayoutSettings {
        x,
        y,
        ..LayoutSettings::default()
    });
    layout.append(&[font], &TextStyle::new(text, px, 0));
    layout
}

/// Pen position after each glyph, relative to the start of the run.
fn pen_ends(font: &Font, layout: &Layout<()>, px: f32) -> Vec<f32> {
    let mut furthest = 0.0_f32;
    layout
        .glyphs()
        .iter()
        .map(|g| {
            let metrics = font.metrics_indexed(g.key.glyph_index, px);
            furthest = furthest.max(g.x - metrics.xmin as f32 + metrics.advance_width);
            furthest
        })
        .collect()
}

/// Width of `text` on one line at `px` pixels.
pub fn measure(text: &str, px: f32) -> f32 {
    let Some(font) = FONT.as_ref() else {
        return 0.0;
    };
    let layout = lay_out(font, text, px, 0.0, 0.0);
    pen_ends(font, &layout, px).last().copied().unwrap_or(0.0)
}

/// Text that fits `max_width`, cut with a trailing ellipsis when too long.
pub fn fit_line(text: &str, max_width: f32, px: f32) -> String {
    let Some(font) = FONT.as_ref() else {
        return String::new();
    };
    let line = printable(text);
    let layout = lay_out(font, &line, px, 0.0, 0.0);
    let ends = pen_ends(font, &layout, px);
    if ends.last().copied().unwrap_or(0.0) <= max_width {
        return line;
    }

    let ellipsis = measure(ELLIPSIS, px);
    let glyphs = layout.glyphs();
    for keep in (0..glyphs.len()).rev() {
        let kept = if keep == 0 { 0.0 } else { ends[keep - 1] };
        if kept + ellipsis <= max_width {
            let mut cut = line[..glyphs[keep].byte_offset].to_string();
            cut.push_str(ELLIPSIS);
            return cut;
        }
    }
    let mut dots = String::new();
    while dots.len() < ELLIPSIS.len() && measure(&format!("{dots}."), px) <= max_width {
        dots.push('.');
    }
    dots
}

/// Single line centered in `area`, clipped to `area` and `clip`.
pub fn draw_text(
    pixels: &mut RgbaBuffer,
    text: &str,
    point_size: f32,
    color: Color,
    area: PixelRect,
    clip: PixelRect,
) {
    let Some(font) = FONT.as_ref() else {
        return;
    };
    let Some(clip) = area.intersect(clip) else {
        return;
    };
    let px = pixel_size(point_size);
    let line = fit_line(text, area.width as f32, px);
    if line.is_empty() {
        return;
    }

    let width = measure(&line, px);
    let unplaced = lay_out(font, &line, px, 0.0, 0.0);
    let origin_x = area.x as f32 + (area.width as f32 - width) / 2.0;
    let origin_y = area.y as f32 + (area.height as f32 - unplaced.height()) / 2.0;
    let layout = lay_out(font, &line, px, origin_x.round(), origin_y.round());

    for glyph in layout.glyphs() {
        if !glyph.char_data.rasterize() || glyph.width == 0 || glyph.height == 0 {
            continue;
        }
        let left = glyph.x.round() as i32;
        let top = glyph.y.round() as i32;
        let bounds = PixelRect::new(left, top, glyph.width as i32, glyph.height as i32);
        let Some(visible) = bounds.intersect(clip) else {
            continue;
        };
        let bitmap = glyph_bitmap(font, glyph.key);
        for y in visible.y..visible.bottom() {
            let row = (y - top) as usize * glyph.width;
            for x in visible.x..visible.right() {
                if let Some(&coverage) = bitmap.get(row + (x - left) as usize) {
                    pixels.blend(x, y, color, coverage);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_bounds(pixels: &RgbaBuffer, background: Color) -> Option<PixelRect> {
        let mut found: Option<(i32, i32, i32, i32)> = None;
        for y in 0..pixels.height() as i32 {
            for x in 0..pixels.width() as i32 {
                if pixels.pixel(x, y) != Some(background) {
                    let (x0, y0, x1, y1) = found.unwrap_or((x, y, x, y));
                    found = Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y)));
                }
            }
        }
        found.map(|(x0, y0, x1, y1)| PixelRect::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1))
    }

    #[test]
    fn point_size_maps_to_pixels_at_96_dpi() {
        assert_eq!(pixel_size(12.0), 16.0);
        assert_eq!(pixel_size(0.5), 1.0);
        assert_eq!(pixel_size(1.0e9), MAX_PIXEL_SIZE);
    }

    #[test]
    fn every_point_size_changes_the_run_width() {
        let ten = measure("Hello world", pixel_size(10.0));
        let twelve = measure("Hello world", pixel_size(12.0));
        assert!(ten > 0.0);
        assert!(twelve > ten);
    }

    #[test]
    fn fitting_text_is_returned_unchanged() {
        assert_eq!(fit_line("hello", 500.0, 16.0), "hello");
    }

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        let fitted = fit_line("abcdefghijklmnop", 60.0, 16.0);
        assert!(fitted.ends_with(ELLIPSIS), "{fitted}");
        assert!(fitted.len() > ELLIPSIS.len());
        assert!(measure(&fitted, 16.0) <= 60.0);
    }

    #[test]
    fn tiny_area_keeps_partial_ellipsis() {
        let dot = measure(".", 16.0);
        assert_eq!(fit_line("abcdef", dot * 2.5, 16.0), "..");
        assert_eq!(fit_line("abcdef", 1.0, 16.0), "");
    }

    #[test]
    fn missing_glyphs_become_question_marks() {
        assert_eq!(printable("a\u{10FFFD}b\r\n"), "a?b");
    }

    #[test]
    fn text_is_centered_in_its_area() {
        let mut pixels = RgbaBuffer::new(100, 100, Color::WHITE);
        let clip = pixels.bounds();
        draw_text(&mut pixels, "HI", 18.0, Color::BLACK, PixelRect::new(0, 0, 100, 100), clip);
        let ink = lit_bounds(&pixels, Color::WHITE).unwrap();
        let centre_x = ink.x + ink.width / 2;
        let centre_y = ink.y + ink.height / 2;
        assert!((47..=53).contains(&centre_x), "{ink:?}");
        assert!((40..=60).contains(&centre_y), "{ink:?}");
    }

    #[test]
    fn text_never_leaves_its_area() {
        let mut pixels = RgbaBuffer::new(60, 60, Color::WHITE);
        let clip = pixels.bounds();
        let area = PixelRect::new(10, 10, 20, 4);
        draw_text(&mut pixels, "WWWWWW", 24.0, Color::BLACK, area, clip);
        for y in 0..60 {
            for x in 0..60 {
                if !area.contains(x, y) {
                    assert_eq!(pixels.pixel(x, y), Some(Color::WHITE), "leak at {x},{y}");
                }
            }
        }
    }

    #[test]
    fn enormous_point_size_is_clipped_not_fatal() {
        let mut pixels = RgbaBuffer::new(40, 40, Color::WHITE);
        let clip = pixels.bounds();
        draw_text(&mut pixels, "hi", 1.0e9, Color::BLACK, clip, clip);
        draw_text(&mut pixels, "hi", f32::MAX, Color::BLACK, clip, clip);
    }
}
