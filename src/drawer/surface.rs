use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::drawer::buffer::RgbaBuffer;
use crate::drawer::error::{check_axis, DrawerError, Result};
use crate::drawer::model::{Color, PixelRect};

/// Persistent back-buffer composited beneath the queued shapes every frame.
#[derive(Debug)]
pub struct PixelSurface {
    width: u32,
    height: u32,
    pixels: Mutex<RgbaBuffer>,
}

impl PixelSurface {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            width,
            height,
            pixels: Mutex::new(RgbaBuffer::new(width, height, background)),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_pixel(&self, x: i32, y: i32, color: Color) -> Result<()> {
        check_axis("x", x, self.width as i32)?;
        check_axis("y", y, self.height as i32)?;
        self.lock().put(x, y, color);
        Ok(())
    }

    /// Fills `rect` (raw pixels); portions off the surface are dropped.
    pub fn fill_rect(&self, rect: PixelRect, color: Color) -> u64 {
        self.lock().fill_rect(rect, color)
    }

    pub fn fill_all(&self, color: Color) {
        self.lock().fill(color);
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.lock().pixel(x, y)
    }

    /// Copies the surface into `target` as the base layer of a frame.
    pub fn composite_onto(&self, target: &mut RgbaBuffer) -> Result<()> {
        target
            .copy_from(&self.lock())
            .map_err(|err| DrawerError::RenderFailure(err.to_string()))
    }

    /// Runs `f` with the surface locked once, for batches of writes.
    pub fn with_pixels_mut<R>(&self, f: impl FnOnce(&mut RgbaBuffer) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, RgbaBuffer> {
        self.pixels.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
