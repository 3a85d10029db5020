use crate::drawer::buffer::RgbaBuffer;
use crate::drawer::error::Result;
use crate::drawer::model::{Color, Point};

pub mod headless;
#[cfg(windows)]
pub mod win32;

pub use headless::{headless_factory, HeadlessProbe, HeadlessWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    PointerMoved(Point),
    LeftButtonDown(Point),
    RightButtonDown(Point),
    /// The front buffer reached the screen.
    Painted,
    CloseRequested,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub background: Color,
}

/// Top-level surface owned by the presenter thread.
pub trait DrawerWindow {
    /// Drains pending input and paint notifications.
    fn pump_events(&mut self) -> Vec<WindowEvent>;

    /// Flips a finished frame to the visible surface.
    fn present(&mut self, frame: &RgbaBuffer) -> Result<()>;

    fn set_title(&mut self, title: &str);

    fn position(&self) -> Option<Point>;

    fn set_position(&mut self, position: Point) -> Result<()>;

    fn outer_size(&self) -> Option<(i32, i32)>;

    fn shutdown(&mut self);
}

/// Builds the window on the presenter thread.
pub type WindowFactory =
    Box<dyn FnOnce(&WindowConfig) -> Result<Box<dyn DrawerWindow>> + Send + 'static>;

/// Native window where one exists, an in-memory surface elsewhere.
pub fn default_window_factory() -> WindowFactory {
    #[cfg(windows)]
    {
        Box::new(|config: &WindowConfig| {
            let window = win32::Win32Window::create(config)?;
            Ok(Box::new(window) as Box<dyn DrawerWindow>)
        })
    }

    #[cfg(not(windows))]
    {
        tracing::info!("no native window backend on this platform; presenting headless");
        headless_factory().0
    }
}
