use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::drawer::buffer::RgbaBuffer;
use crate::drawer::canvas::Canvas;
use crate::drawer::error::{panic_message, DrawerError, Result};
use crate::drawer::messages::{ExitReason, PresenterCommand};
use crate::drawer::model::Color;
use crate::drawer::mouse::MouseKind;
use crate::drawer::state::PresenterState;
use crate::drawer::stats::RenderStats;
use crate::drawer::window::{DrawerWindow, WindowConfig, WindowEvent, WindowFactory};

#[derive(Debug, Clone)]
pub struct PresenterConfig {
    pub tick_interval: Duration,
    pub title: String,
    pub stats_window: usize,
}

/// Presenter thread body: builds the window, then ticks until terminated.
pub(crate) fn run(
    canvas: Arc<Canvas>,
    config: PresenterConfig,
    window_config: WindowConfig,
    factory: WindowFactory,
    commands: Receiver<PresenterCommand>,
    startup: Sender<Result<()>>,
) {
    let window = match factory(&window_config) {
        Ok(window) => window,
        Err(err) => {
            tracing::error!("unable to create drawer window: {err}");
            let _ = startup.send(Err(DrawerError::StartFailure(err.to_string())));
            return;
        }
    };

    let mut presenter = Presenter {
        frame: RgbaBuffer::new(canvas.width(), canvas.height(), Color::BLACK),
        stats: RenderStats::new(config.stats_window),
        canvas,
        window,
        config,
        render_now: false,
        painted: false,
        startup: Some(startup),
    };
    let reason = presenter.run_loop(&commands);
    presenter.stop(reason);
}

struct Presenter {
    canvas: Arc<Canvas>,
    window: Box<dyn DrawerWindow>,
    frame: RgbaBuffer,
    stats: RenderStats,
    config: PresenterConfig,
    render_now: bool,
    painted: bool,
    startup: Option<Sender<Result<()>>>,
}

impl Presenter {
    fn run_loop(&mut self, commands: &Receiver<PresenterCommand>) -> ExitReason {
        // The first frame is drawn unconditionally so the window gets painted.
        self.render_frame();
        let mut next_tick = Instant::now() + self.config.tick_interval;

        loop {
            if let Some(reason) = self.handle_window_events() {
                return reason;
            }

            let wait = next_tick.saturating_duration_since(Instant::now());
            match commands.recv_timeout(wait) {
                Ok(PresenterCommand::Terminate) => return ExitReason::CloseRequested,
                Ok(command) => {
                    self.handle_command(command);
                    continue;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return ExitReason::CallerGone,
            }

            next_tick = Instant::now() + self.config.tick_interval;
            self.tick();
        }
    }

    fn handle_command(&mut self, command: PresenterCommand) {
        match command {
            PresenterCommand::RenderNow => self.render_now = true,
            PresenterCommand::Terminate => {}
            PresenterCommand::QueryPosition { reply } => {
                let _ = reply.send(self.window.position());
            }
            PresenterCommand::MoveTo { position } => {
                if let Err(err) = self.window.set_position(position) {
                    tracing::debug!("ignoring window move failure: {err}");
                }
            }
            PresenterCommand::QuerySize { reply } => {
                let _ = reply.send(self.window.outer_size());
            }
        }
    }

    fn handle_window_events(&mut self) -> Option<ExitReason> {
        for event in self.window.pump_events() {
            match event {
                WindowEvent::PointerMoved(point) => {
                    self.canvas.record_mouse(MouseKind::Move, point);
                }
                WindowEvent::LeftButtonDown(point) => {
                    self.canvas.record_mouse(MouseKind::LeftClick, point);
                }
                WindowEvent::RightButtonDown(point) => {
                    self.canvas.record_mouse(MouseKind::RightClick, point);
                }
                WindowEvent::Painted => self.mark_painted(),
                WindowEvent::CloseRequested => {
                    tracing::info!("drawer window closed by user");
                    return Some(ExitReason::WindowClosed);
                }
            }
        }
        None
    }

    fn tick(&mut self) {
        if !(self.canvas.continuous_update() || self.render_now) {
            return;
        }
        self.render_now = false;
        self.render_frame();
    }

    /// Composite, draw shapes, flip, then record stats. A failing stage is
    /// logged and the frame carries on to the stats update.
    fn render_frame(&mut self) {
        self.enter(PresenterState::Rendering);
        let started = Instant::now();

        if let Err(err) = self.canvas.surface().composite_onto(&mut self.frame) {
            tracing::warn!("back-buffer composite failed: {err}");
        }

        let scale = self.canvas.scale();
        let canvas = &self.canvas;
        let frame = &mut self.frame;
        let shapes = match panic::catch_unwind(AssertUnwindSafe(|| {
            canvas.queue().render_all(frame, scale)
        })) {
            Ok(shapes) => shapes,
            Err(payload) => {
                let err = DrawerError::RenderFailure(panic_message(payload.as_ref()));
                tracing::error!("shape rendering failed: {err}");
                0
            }
        };

        if let Err(err) = self.window.present(&self.frame) {
            tracing::warn!("frame flip failed: {err}");
        }

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        self.stats.finish_frame(elapsed_ms, shapes);
        self.canvas.publish_stats(self.stats.snapshot());
        self.window.set_title(&self.stats.title(&self.config.title));

        self.enter(if self.painted {
            PresenterState::Ready
        } else {
            PresenterState::Uninitialized
        });
    }

    fn mark_painted(&mut self) {
        if self.painted {
            return;
        }
        self.painted = true;
        if self.canvas.presenter_state() == PresenterState::Uninitialized {
            self.enter(PresenterState::Ready);
        }
        if let Some(startup) = self.startup.take() {
            let _ = startup.send(Ok(()));
        }
    }

    fn stop(&mut self, reason: ExitReason) {
        self.enter(PresenterState::Terminating);
        self.window.shutdown();
        self.canvas.detach_presenter();
        self.enter(PresenterState::Stopped);
        if let Some(startup) = self.startup.take() {
            let _ = startup.send(Err(DrawerError::StartFailure(
                "presenter stopped before the first paint".to_string(),
            )));
        }
        tracing::debug!(?reason, "drawer presenter stopped");
    }

    fn enter(&self, to: PresenterState) {
        if let Err(err) = self.canvas.transition(to) {
            tracing::warn!("{err}");
        }
    }
}
