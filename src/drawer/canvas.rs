use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::drawer::buffer::RgbaBuffer;
use crate::drawer::error::{check_axis, invalid, Result};
use crate::drawer::messages::PresenterCommand;
use crate::drawer::model::{Color, PixelRect, Point};
use crate::drawer::mouse::{CoordSpace, MouseKind, MouseLatch, MouseSample};
use crate::drawer::queue::PrimitiveQueue;
use crate::drawer::scale::ScaleTransform;
use crate::drawer::shape::{BoxStyle, Shape};
use crate::drawer::state::{can_transition, PresenterState};
use crate::drawer::stats::RenderSnapshot;
use crate::drawer::surface::PixelSurface;
use crate::drawer::DrawerError;
use crate::settings::DrawerSettings;

/// Drawing state shared by the caller and the presenter thread.
///
/// Every method is callable from any thread. Pixel writes land on the
/// persistent back-buffer; `add_*` calls queue shapes that are redrawn on top
/// of it every frame until `clear`.
#[derive(Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    surface: PixelSurface,
    queue: PrimitiveQueue,
    scale: ScaleTransform,
    mouse: MouseLatch,
    continuous_update: AtomicBool,
    redundant_mouse: AtomicBool,
    state: Mutex<PresenterState>,
    stats: Mutex<RenderSnapshot>,
    commands: Mutex<Option<Sender<PresenterCommand>>>,
}

impl Canvas {
    /// Offscreen canvas with default settings and no presenter attached.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::from_settings(&DrawerSettings {
            width,
            height,
            ..DrawerSettings::default()
        })
    }

    pub fn from_settings(settings: &DrawerSettings) -> Result<Self> {
        if settings.width < 1 || settings.height < 1 || settings.width > i32::MAX as u32 {
            return Err(invalid(format!(
                "canvas size {}x{} is not drawable",
                settings.width, settings.height
            )));
        }
        let canvas = Self {
            width: settings.width,
            height: settings.height,
            surface: PixelSurface::new(settings.width, settings.height, settings.background),
            queue: PrimitiveQueue::new(),
            scale: ScaleTransform::new(settings.width as i32),
            mouse: MouseLatch::new(),
            continuous_update: AtomicBool::new(settings.continuous_update),
            redundant_mouse: AtomicBool::new(settings.redundant_mouse),
            state: Mutex::new(PresenterState::Uninitialized),
            stats: Mutex::new(RenderSnapshot::default()),
            commands: Mutex::new(None),
        };
        canvas.set_scale(settings.scale)?;
        Ok(canvas)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn scale(&self) -> i32 {
        self.scale.get()
    }

    /// Changes the scale and forgets every scaled mouse position.
    pub fn set_scale(&self, scale: i32) -> Result<()> {
        self.scale.set(scale)?;
        self.mouse.reset_scaled();
        Ok(())
    }

    pub fn scaled_width(&self) -> i32 {
        self.scale.logical(self.width)
    }

    pub fn scaled_height(&self) -> i32 {
        self.scale.logical(self.height)
    }

    pub fn continuous_update(&self) -> bool {
        self.continuous_update.load(Ordering::Acquire)
    }

    pub fn set_continuous_update(&self, enabled: bool) {
        self.continuous_update.store(enabled, Ordering::Release);
    }

    pub fn redundant_mouse(&self) -> bool {
        self.redundant_mouse.load(Ordering::Acquire)
    }

    pub fn set_redundant_mouse(&self, enabled: bool) {
        self.redundant_mouse.store(enabled, Ordering::Release);
    }

    /// Asks the presenter for one frame; a no-op on an offscreen canvas.
    pub fn render(&self) {
        if let Some(tx) = self.commands().as_ref() {
            let _ = tx.send(PresenterCommand::RenderNow);
        }
    }

    /// Drops every queued shape; the back-buffer is untouched.
    pub fn clear(&self) {
        self.queue.clear();
    }

    pub fn shape_count(&self) -> usize {
        self.queue.len()
    }

    pub fn shapes(&self) -> Vec<Shape> {
        self.queue.shapes()
    }

    pub fn set_background(&self, color: Color) {
        self.surface.fill_all(color);
    }

    pub fn set_pixel(&self, x: i32, y: i32, color: Color) -> Result<()> {
        self.surface.set_pixel(x, y, color)
    }

    /// Fills the `scale`x`scale` block behind logical pixel `(x, y)`.
    pub fn set_scaled_pixel(&self, x: i32, y: i32, color: Color) -> Result<()> {
        check_axis("x", x, self.scaled_width())?;
        check_axis("y", y, self.scaled_height())?;
        let scale = self.scale();
        let _ = self
            .surface
            .fill_rect(PixelRect::new(x, y, 1, 1).scaled(scale), color);
        Ok(())
    }

    /// Fills a raw pixel rectangle, clipped to the canvas.
    pub fn fill_rect(&self, x: i32, y: i32, width: i32, height: i32, color: Color) -> u64 {
        self.surface
            .fill_rect(PixelRect::new(x, y, width, height), color)
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.surface.pixel(x, y)
    }

    /// Batched back-buffer writes under a single lock acquisition.
    pub fn with_pixels<R>(&self, f: impl FnOnce(&mut RgbaBuffer) -> R) -> R {
        self.surface.with_pixels_mut(f)
    }

    pub fn add_shape(&self, shape: Shape) -> Result<()> {
        self.queue.append(shape)
    }

    pub fn add_rectangle(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        style: BoxStyle,
    ) -> Result<()> {
        self.add_shape(Shape::rectangle(x, y, width, height, style)?)
    }

    pub fn add_centered_rectangle(
        &self,
        cx: i32,
        cy: i32,
        width: i32,
        height: i32,
        style: BoxStyle,
    ) -> Result<()> {
        self.add_shape(Shape::centered_rectangle(cx, cy, width, height, style)?)
    }

    pub fn add_ellipse(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        style: BoxStyle,
    ) -> Result<()> {
        self.add_shape(Shape::ellipse(x, y, width, height, style)?)
    }

    pub fn add_centered_ellipse(
        &self,
        cx: i32,
        cy: i32,
        width: i32,
        height: i32,
        style: BoxStyle,
    ) -> Result<()> {
        self.add_shape(Shape::centered_ellipse(cx, cy, width, height, style)?)
    }

    pub fn add_polygon(
        &self,
        x: i32,
        y: i32,
        vertices: i32,
        radius: i32,
        rotation: f64,
        style: BoxStyle,
    ) -> Result<()> {
        self.add_shape(Shape::polygon(x, y, vertices, radius, rotation, style)?)
    }

    pub fn add_line(
        &self,
        start: Point,
        end: Point,
        color: Color,
        thickness: i32,
    ) -> Result<()> {
        self.add_shape(Shape::line(start, end, color, thickness)?)
    }

    /// Line from `start` of `length` at `rotation` radians clockwise from north.
    pub fn add_polar_line(
        &self,
        start: Point,
        length: f64,
        rotation: f64,
        color: Color,
        thickness: i32,
    ) -> Result<()> {
        self.add_shape(Shape::polar_line(start, length, rotation, color, thickness)?)
    }

    /// Cubic bezier in raw pixels; the scale is not applied.
    pub fn add_bezier(&self, points: [Point; 4], color: Color, thickness: i32) -> Result<()> {
        self.add_shape(Shape::bezier(points, color, thickness)?)
    }

    pub fn add_text(&self, text: &str, point_size: f32, color: Option<Color>) -> Result<()> {
        self.add_shape(Shape::text(text, point_size, color)?)
    }

    pub fn add_text_in(
        &self,
        text: &str,
        point_size: f32,
        bounds: PixelRect,
        color: Option<Color>,
    ) -> Result<()> {
        self.add_shape(Shape::bounded_text(text, point_size, bounds, color)?)
    }

    pub fn poll_mouse(&self, kind: MouseKind, space: CoordSpace) -> MouseSample {
        self.mouse.poll(kind, space)
    }

    pub fn last_mouse_move(&self) -> MouseSample {
        self.poll_mouse(MouseKind::Move, CoordSpace::Raw)
    }

    pub fn last_mouse_move_scaled(&self) -> MouseSample {
        self.poll_mouse(MouseKind::Move, CoordSpace::Scaled)
    }

    pub fn last_left_click(&self) -> MouseSample {
        self.poll_mouse(MouseKind::LeftClick, CoordSpace::Raw)
    }

    pub fn last_left_click_scaled(&self) -> MouseSample {
        self.poll_mouse(MouseKind::LeftClick, CoordSpace::Scaled)
    }

    pub fn last_right_click(&self) -> MouseSample {
        self.poll_mouse(MouseKind::RightClick, CoordSpace::Raw)
    }

    pub fn last_right_click_scaled(&self) -> MouseSample {
        self.poll_mouse(MouseKind::RightClick, CoordSpace::Scaled)
    }

    /// Registers `handler` for one of the six mouse slots. Handlers run on the
    /// presenter thread; a panicking handler is logged and skipped.
    pub fn on_mouse<F>(&self, kind: MouseKind, space: CoordSpace, handler: F)
    where
        F: Fn(Point, &Canvas) + Send + Sync + 'static,
    {
        self.mouse.subscribe(kind, space, Arc::new(handler));
    }

    pub fn clear_mouse_handlers(&self) {
        self.mouse.clear_subscribers();
    }

    /// Delivers a raw pointer event; events off the canvas are dropped.
    pub fn record_mouse(&self, kind: MouseKind, point: Point) -> bool {
        let inside = point.x >= 0
            && point.y >= 0
            && point.x < self.width as i32
            && point.y < self.height as i32;
        if !inside {
            return false;
        }
        self.mouse
            .record(kind, point, self.scale(), self.redundant_mouse(), self);
        true
    }

    /// Back-buffer plus every queued shape, rendered into `target`.
    pub fn render_frame(&self, target: &mut RgbaBuffer) -> Result<usize> {
        self.surface.composite_onto(target)?;
        Ok(self.queue.render_all(target, self.scale()))
    }

    pub fn snapshot_frame(&self) -> Result<RgbaBuffer> {
        let mut frame = RgbaBuffer::new(self.width, self.height, Color::BLACK);
        self.render_frame(&mut frame)?;
        Ok(frame)
    }

    pub fn presenter_state(&self) -> PresenterState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn render_stats(&self) -> RenderSnapshot {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn surface(&self) -> &PixelSurface {
        &self.surface
    }

    pub(crate) fn queue(&self) -> &PrimitiveQueue {
        &self.queue
    }

    pub(crate) fn attach_presenter(&self, commands: Sender<PresenterCommand>) {
        *self.commands() = Some(commands);
    }

    pub(crate) fn detach_presenter(&self) {
        *self.commands() = None;
    }

    pub(crate) fn publish_stats(&self, snapshot: RenderSnapshot) {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// Moves the presenter state machine, refusing transitions it does not allow.
    pub(crate) fn transition(&self, to: PresenterState) -> Result<()> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if !can_transition(*state, to) {
            return Err(DrawerError::InvalidTransition { from: *state, to });
        }
        *state = to;
        Ok(())
    }

    fn commands(&self) -> MutexGuard<'_, Option<Sender<PresenterCommand>>> {
        self.commands.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawer::error::DrawerError;

    #[test]
    fn scale_change_resets_scaled_mouse_slots() {
        let canvas = Canvas::new(800, 600).unwrap();
        assert!(canvas.record_mouse(MouseKind::LeftClick, Point::new(100, 100)));
        canvas.set_scale(10).unwrap();
        for kind in MouseKind::ALL {
            let sample = canvas.poll_mouse(kind, CoordSpace::Scaled);
            assert_eq!(sample, MouseSample { point: Point::NONE, is_new: false });
        }
        assert!(canvas.last_left_click().is_new);
    }

    #[test]
    fn events_off_canvas_are_dropped() {
        let canvas = Canvas::new(100, 50).unwrap();
        assert!(!canvas.record_mouse(MouseKind::Move, Point::new(100, 10)));
        assert!(!canvas.record_mouse(MouseKind::Move, Point::new(10, -1)));
        assert!(canvas.record_mouse(MouseKind::Move, Point::new(0, 0)));
        assert!(canvas.last_mouse_move().is_new);
    }

    #[test]
    fn scaled_pixel_fills_a_block() {
        let canvas = Canvas::new(100, 100).unwrap();
        canvas.set_scale(10).unwrap();
        canvas.set_scaled_pixel(2, 3, Color::RED).unwrap();
        assert_eq!(canvas.pixel(20, 30), Some(Color::RED));
        assert_eq!(canvas.pixel(29, 39), Some(Color::RED));
        assert_eq!(canvas.pixel(30, 39), Some(Color::BLACK));
        assert!(matches!(
            canvas.set_scaled_pixel(10, 0, Color::RED),
            Err(DrawerError::OutOfRange { .. })
        ));
    }

    #[test]
    fn invalid_scale_is_rejected() {
        let canvas = Canvas::new(80, 60).unwrap();
        assert!(canvas.set_scale(0).is_err());
        assert!(canvas.set_scale(81).is_err());
        assert_eq!(canvas.scale(), 1);
        assert_eq!(canvas.scaled_width(), 80);
    }

    #[test]
    fn zero_sized_canvas_is_rejected() {
        assert!(Canvas::new(0, 10).is_err());
        assert!(Canvas::new(10, 0).is_err());
    }

    #[test]
    fn offscreen_render_is_a_no_op() {
        let canvas = Canvas::new(10, 10).unwrap();
        canvas.render();
        assert_eq!(canvas.presenter_state(), PresenterState::Uninitialized);
    }

    #[test]
    fn subscriber_can_draw_on_the_canvas() {
        let canvas = Canvas::new(100, 100).unwrap();
        canvas.on_mouse(MouseKind::LeftClick, CoordSpace::Raw, |point, canvas| {
            let _ = canvas.set_pixel(point.x, point.y, Color::WHITE);
        });
        canvas.record_mouse(MouseKind::LeftClick, Point::new(7, 8));
        assert_eq!(canvas.pixel(7, 8), Some(Color::WHITE));
    }
}
