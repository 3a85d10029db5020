use std::sync::atomic::{AtomicI32, Ordering};

use crate::drawer::error::{invalid, Result};

/// Integer factor between caller coordinates and raw pixels, in `1..=max`.
#[derive(Debug)]
pub struct ScaleTransform {
    scale: AtomicI32,
    max: i32,
}

impl ScaleTransform {
    pub fn new(max: i32) -> Self {
        Self {
            scale: AtomicI32::new(1),
            max: max.max(1),
        }
    }

    pub fn get(&self) -> i32 {
        self.scale.load(Ordering::Acquire)
    }

    pub fn set(&self, scale: i32) -> Result<()> {
        if scale < 1 || scale > self.max {
            return Err(invalid(format!(
                "scale {scale} is outside 1..={}",
                self.max
            )));
        }
        self.scale.store(scale, Ordering::Release);
        Ok(())
    }

    /// Logical extent of `raw` pixels at the current scale.
    pub fn logical(&self, raw: u32) -> i32 {
        raw as i32 / self.get()
    }
}
