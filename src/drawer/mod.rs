//! Double-buffered drawing window.
//!
//! The caller queues shapes and writes pixels on a [`Canvas`]; a presenter
//! thread owned by [`Drawer`] composites both onto the window on a fixed tick
//! and feeds pointer input back through the canvas mouse latch.

pub mod buffer;
pub mod canvas;
pub mod error;
pub mod font;
pub mod messages;
pub mod model;
pub mod mouse;
pub mod presenter;
pub mod queue;
pub mod raster;
pub mod scale;
pub mod service;
pub mod shape;
pub mod state;
pub mod stats;
pub mod surface;
pub mod text;
pub mod window;

pub use buffer::RgbaBuffer;
pub use canvas::Canvas;
pub use error::{DrawerError, Result};
pub use model::{Color, PixelRect, Point};
pub use mouse::{CoordSpace, MouseKind, MouseSample};
pub use service::Drawer;
pub use shape::{BoxStyle, LineGeometry, Shape, TextPlacement};
pub use state::PresenterState;
pub use stats::RenderSnapshot;
