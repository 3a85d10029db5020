use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::drawer::buffer::RgbaBuffer;
use crate::drawer::error::{DrawerError, Result};
use crate::drawer::model::Point;
use crate::drawer::window::{DrawerWindow, WindowConfig, WindowEvent, WindowFactory};

#[derive(Debug, Default)]
struct HeadlessState {
    pending: VecDeque<WindowEvent>,
    last_frame: Option<RgbaBuffer>,
    presents: u64,
    title: String,
    position: Point,
    size: (i32, i32),
    fail_next_present: bool,
    shut_down: bool,
}

/// In-memory window; every successful present counts as a paint.
#[derive(Debug)]
pub struct HeadlessWindow {
    state: Arc<Mutex<HeadlessState>>,
}

/// Test-side handle onto a headless window's state.
#[derive(Debug, Clone)]
pub struct HeadlessProbe {
    state: Arc<Mutex<HeadlessState>>,
}

pub fn headless_factory() -> (WindowFactory, HeadlessProbe) {
    let state = Arc::new(Mutex::new(HeadlessState::default()));
    let probe = HeadlessProbe {
        state: Arc::clone(&state),
    };
    let factory: WindowFactory = Box::new(move |config: &WindowConfig| {
        {
            let mut guard = lock(&state);
            guard.title = config.title.clone();
            guard.size = (config.width as i32, config.height as i32);
        }
        Ok(Box::new(HeadlessWindow { state }) as Box<dyn DrawerWindow>)
    });
    (factory, probe)
}

impl DrawerWindow for HeadlessWindow {
    fn pump_events(&mut self) -> Vec<WindowEvent> {
        lock(&self.state).pending.drain(..).collect()
    }

    fn present(&mut self, frame: &RgbaBuffer) -> Result<()> {
        let mut state = lock(&self.state);
        if std::mem::take(&mut state.fail_next_present) {
            return Err(DrawerError::Window("headless surface lost".to_string()));
        }
        state.last_frame = Some(frame.clone());
        state.presents = state.presents.saturating_add(1);
        state.pending.push_back(WindowEvent::Painted);
        Ok(())
    }

    fn set_title(&mut self, title: &str) {
        lock(&self.state).title = title.to_string();
    }

    fn position(&self) -> Option<Point> {
        Some(lock(&self.state).position)
    }

    fn set_position(&mut self, position: Point) -> Result<()> {
        lock(&self.state).position = position;
        Ok(())
    }

    fn outer_size(&self) -> Option<(i32, i32)> {
        Some(lock(&self.state).size)
    }

    fn shutdown(&mut self) {
        lock(&self.state).shut_down = true;
    }
}

impl HeadlessProbe {
    pub fn push_event(&self, event: WindowEvent) {
        lock(&self.state).pending.push_back(event);
    }

    pub fn last_frame(&self) -> Option<RgbaBuffer> {
        lock(&self.state).last_frame.clone()
    }

    pub fn present_count(&self) -> u64 {
        lock(&self.state).presents
    }

    pub fn title(&self) -> String {
        lock(&self.state).title.clone()
    }

    pub fn fail_next_present(&self) {
        lock(&self.state).fail_next_present = true;
    }

    pub fn is_shut_down(&self) -> bool {
        lock(&self.state).shut_down
    }
}

fn lock(state: &Mutex<HeadlessState>) -> MutexGuard<'_, HeadlessState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
