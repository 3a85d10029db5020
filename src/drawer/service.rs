use std::ops::Deref;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::drawer::canvas::Canvas;
use crate::drawer::error::{panic_message, DrawerError, Result};
use crate::drawer::messages::PresenterCommand;
use crate::drawer::model::Point;
use crate::drawer::presenter::{self, PresenterConfig};
use crate::drawer::state::PresenterState;
use crate::drawer::window::{default_window_factory, WindowConfig, WindowFactory};
use crate::settings::DrawerSettings;

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const QUERY_TIMEOUT: Duration = Duration::from_millis(500);

/// A canvas with a live presenter thread and window.
///
/// Dereferences to [`Canvas`] for all drawing calls. Dropping the drawer
/// closes the window.
pub struct Drawer {
    canvas: Arc<Canvas>,
    commands: Sender<PresenterCommand>,
    presenter_thread: Mutex<Option<JoinHandle<()>>>,
    close_timeout: Duration,
}

impl Drawer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_settings(DrawerSettings {
            width,
            height,
            ..DrawerSettings::default()
        })
    }

    pub fn with_settings(settings: DrawerSettings) -> Result<Self> {
        Self::with_window(settings, default_window_factory())
    }

    /// Starts the presenter with a caller-chosen window backend and blocks
    /// until the window has been painted once.
    pub fn with_window(settings: DrawerSettings, factory: WindowFactory) -> Result<Self> {
        settings.validate()?;
        let canvas = Arc::new(Canvas::from_settings(&settings)?);
        let (commands_tx, commands_rx) = channel::<PresenterCommand>();
        let (startup_tx, startup_rx) = channel::<Result<()>>();
        canvas.attach_presenter(commands_tx.clone());

        let config = PresenterConfig {
            tick_interval: Duration::from_millis(settings.tick_interval_ms),
            title: settings.title.clone(),
            stats_window: settings.stats_window,
        };
        let window_config = WindowConfig {
            width: settings.width,
            height: settings.height,
            title: settings.title.clone(),
            background: settings.background,
        };

        let thread_canvas = Arc::clone(&canvas);
        let handle = std::thread::Builder::new()
            .name("drawer-presenter".to_string())
            .spawn(move || {
                let state_canvas = Arc::clone(&thread_canvas);
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                    presenter::run(
                        thread_canvas,
                        config,
                        window_config,
                        factory,
                        commands_rx,
                        startup_tx,
                    )
                }));
                if let Err(payload) = outcome {
                    tracing::error!(
                        "drawer presenter panicked: {}",
                        panic_message(payload.as_ref())
                    );
                    let _ = state_canvas.transition(PresenterState::Terminating);
                    let _ = state_canvas.transition(PresenterState::Stopped);
                    state_canvas.detach_presenter();
                }
            })
            .map_err(|err| {
                DrawerError::StartFailure(format!("failed to spawn presenter thread: {err}"))
            })?;

        let drawer = Self {
            canvas,
            commands: commands_tx,
            presenter_thread: Mutex::new(Some(handle)),
            close_timeout: Duration::from_millis(settings.close_timeout_ms),
        };

        let started = match startup_rx.recv_timeout(STARTUP_TIMEOUT) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(DrawerError::StartFailure(
                "window was not painted in time".to_string(),
            )),
            Err(RecvTimeoutError::Disconnected) => Err(DrawerError::StartFailure(
                "presenter exited during startup".to_string(),
            )),
        };
        match started {
            Ok(()) => {
                tracing::info!(
                    width = settings.width,
                    height = settings.height,
                    "drawer started"
                );
                Ok(drawer)
            }
            Err(err) => {
                drawer.close();
                Err(err)
            }
        }
    }

    pub fn canvas(&self) -> &Arc<Canvas> {
        &self.canvas
    }

    /// Whether the presenter thread is still presenting frames.
    pub fn is_running(&self) -> bool {
        self.canvas.presenter_state().is_running()
    }

    /// Stops the presenter and waits, bounded, for its thread. Idempotent.
    pub fn close(&self) {
        let handle = self
            .presenter_thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(handle) = handle else {
            return;
        };
        let _ = self.commands.send(PresenterCommand::Terminate);
        join_presenter_with_timeout(handle, self.close_timeout);
    }

    /// Window's top-left corner on screen, if the window can tell.
    pub fn position(&self) -> Option<Point> {
        let (reply, answer) = channel();
        self.commands
            .send(PresenterCommand::QueryPosition { reply })
            .ok()?;
        answer.recv_timeout(QUERY_TIMEOUT).ok().flatten()
    }

    /// Moves the window; failures are ignored.
    pub fn set_position(&self, position: Point) {
        let _ = self.commands.send(PresenterCommand::MoveTo { position });
    }

    /// Outer window size including decorations, if known.
    pub fn window_size(&self) -> Option<(i32, i32)> {
        let (reply, answer) = channel();
        self.commands.send(PresenterCommand::QuerySize { reply }).ok()?;
        answer.recv_timeout(QUERY_TIMEOUT).ok().flatten()
    }
}

impl Deref for Drawer {
    type Target = Canvas;

    fn deref(&self) -> &Canvas {
        &self.canvas
    }
}

impl Drop for Drawer {
    fn drop(&mut self) {
        self.close();
    }
}

fn join_presenter_with_timeout(handle: JoinHandle<()>, timeout: Duration) {
    let (done_tx, done_rx) = channel();
    std::thread::spawn(move || {
        let join_result = handle.join();
        let _ = done_tx.send(join_result);
    });

    match done_rx.recv_timeout(timeout) {
        Ok(Ok(())) => tracing::debug!("drawer presenter joined"),
        Ok(Err(_)) => tracing::error!("drawer presenter thread panicked while joining"),
        Err(RecvTimeoutError::Timeout) => {
            tracing::error!("drawer presenter join timed out after {timeout:?}")
        }
        Err(RecvTimeoutError::Disconnected) => {
            tracing::error!("drawer presenter join channel disconnected")
        }
    }
}
