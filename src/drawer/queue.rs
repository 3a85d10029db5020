use std::panic::{self, AssertUnwindSafe};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::drawer::buffer::RgbaBuffer;
use crate::drawer::error::{panic_message, DrawerError, Result};
use crate::drawer::shape::Shape;

/// Ordered shape list shared between the caller and the presenter thread.
#[derive(Debug, Default)]
pub struct PrimitiveQueue {
    shapes: Mutex<Vec<Shape>>,
}

impl PrimitiveQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `shape` and appends it behind every shape already queued.
    pub fn append(&self, shape: Shape) -> Result<()> {
        shape.validate()?;
        self.lock().push(shape);
        Ok(())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn shapes(&self) -> Vec<Shape> {
        self.lock().clone()
    }

    /// Renders every queued shape in insertion order and returns how many were
    /// drawn. A shape that fails to render is skipped for this frame only.
    pub fn render_all(&self, target: &mut RgbaBuffer, scale: i32) -> usize {
        let shapes = self.lock();
        render_isolated(&shapes, |shape| shape.render(target, scale), |shape| shape.kind())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Shape>> {
        self.shapes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn render_isolated<T>(
    items: &[T],
    mut draw: impl FnMut(&T),
    describe: impl Fn(&T) -> &'static str,
) -> usize {
    let mut drawn = 0;
    for (index, item) in items.iter().enumerate() {
        match panic::catch_unwind(AssertUnwindSafe(|| draw(item))) {
            Ok(()) => drawn += 1,
            Err(payload) => {
                let err = DrawerError::RenderFailure(panic_message(payload.as_ref()));
                tracing::warn!(index, kind = describe(item), "skipping shape: {err}");
            }
        }
    }
    drawn
}
