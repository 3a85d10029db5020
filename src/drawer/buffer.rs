use crate::drawer::error::{invalid, Result};
use crate::drawer::model::{Color, PixelRect};

/// Row-major RGBA pixels, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbaBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RgbaBuffer {
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        let mut buffer = Self {
            width,
            height,
            pixels: vec![0u8; (width as usize) * (height as usize) * 4],
        };
        buffer.fill(fill);
        buffer
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(invalid(format!(
                "expected {expected} bytes for {width}x{height} pixels, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn bounds(&self) -> PixelRect {
        PixelRect::new(0, 0, self.width as i32, self.height as i32)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let idx = self.index(x, y)?;
        Some(Color::rgba(
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ))
    }

    /// Writes one pixel; coordinates off the buffer are ignored.
    pub fn put(&mut self, x: i32, y: i32, color: Color) {
        if let Some(idx) = self.index(x, y) {
            self.pixels[idx] = color.r;
            self.pixels[idx + 1] = color.g;
            self.pixels[idx + 2] = color.b;
            self.pixels[idx + 3] = color.a;
        }
    }

    /// Blends `color` over one pixel, weighted by `coverage` (0..=255).
    pub fn blend(&mut self, x: i32, y: i32, color: Color, coverage: u8) {
        let Some(idx) = self.index(x, y) else {
            return;
        };
        let alpha = u32::from(coverage) * u32::from(color.a) / 255;
        if alpha == 0 {
            return;
        }
        let keep = 255 - alpha;
        for (offset, channel) in [color.r, color.g, color.b].into_iter().enumerate() {
            let dst = u32::from(self.pixels[idx + offset]);
            self.pixels[idx + offset] = ((u32::from(channel) * alpha + dst * keep + 127) / 255) as u8;
        }
        let dst_a = u32::from(self.pixels[idx + 3]);
        self.pixels[idx + 3] = (alpha + dst_a * keep / 255).min(255) as u8;
    }

    pub fn fill(&mut self, color: Color) {
        for chunk in self.pixels.chunks_exact_mut(4) {
            chunk[0] = color.r;
            chunk[1] = color.g;
            chunk[2] = color.b;
            chunk[3] = color.a;
        }
    }

    /// Fills the part of `rect` that lies on the buffer, one row slice at a time.
    pub fn fill_rect(&mut self, rect: PixelRect, color: Color) -> u64 {
        let Some(clip) = rect.clamp(self.width, self.height) else {
            return 0;
        };
        let stride = self.width as usize * 4;
        let pattern = [color.r, color.g, color.b, color.a];
        for y in clip.y..clip.bottom() {
            let start = y as usize * stride + clip.x as usize * 4;
            let end = start + clip.width as usize * 4;
            for chunk in self.pixels[start..end].chunks_exact_mut(4) {
                chunk.copy_from_slice(&pattern);
            }
        }
        clip.width as u64 * clip.height as u64
    }

    /// Horizontal span `[x0, x1]` on row `y`, clipped to `clip` and the buffer.
    pub fn fill_span(&mut self, y: i32, x0: i32, x1: i32, color: Color, clip: PixelRect) {
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        if y < clip.y || y >= clip.bottom() {
            return;
        }
        let x0 = x0.max(clip.x);
        let x1 = x1.min(clip.right().saturating_sub(1));
        if x1 < x0 {
            return;
        }
        let _ = self.fill_rect(PixelRect::new(x0, y, x1 - x0 + 1, 1), color);
    }

    /// Copies `source` over this buffer; both must share dimensions.
    pub fn copy_from(&mut self, source: &RgbaBuffer) -> Result<()> {
        if source.width != self.width || source.height != self.height {
            return Err(invalid(format!(
                "cannot copy {}x{} pixels onto {}x{}",
                source.width, source.height, self.width, self.height
            )));
        }
        self.pixels.copy_from_slice(&source.pixels);
        Ok(())
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some((y as usize * self.width as usize + x as usize) * 4)
    }
}

pub fn convert_rgba_to_dib_bgra(rgba: &[u8], dib_bgra: &mut [u8]) {
    for (src, dst) in rgba.chunks_exact(4).zip(dib_bgra.chunks_exact_mut(4)) {
        dst[0] = src[2];
        dst[1] = src[1];
        dst[2] = src[0];
        dst[3] = src[3];
    }
}
