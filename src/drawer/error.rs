use thiserror::Error;

use crate::drawer::state::PresenterState;

#[derive(Debug, Error)]
pub enum DrawerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("{what} {value} is outside 0..{max}")]
    OutOfRange {
        what: &'static str,
        value: i32,
        max: i32,
    },
    #[error("render failure: {0}")]
    RenderFailure(String),
    #[error("mouse subscriber failed: {0}")]
    SubscriberFailure(String),
    #[error("drawer failed to start: {0}")]
    StartFailure(String),
    #[error("invalid presenter transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: PresenterState,
        to: PresenterState,
    },
    #[error("window error: {0}")]
    Window(String),
}

pub type Result<T, E = DrawerError> = std::result::Result<T, E>;

pub(crate) fn invalid(message: impl Into<String>) -> DrawerError {
    DrawerError::InvalidArgument(message.into())
}

/// Readable text from a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

pub(crate) fn check_axis(what: &'static str, value: i32, max: i32) -> Result<()> {
    if value < 0 || value >= max {
        return Err(DrawerError::OutOfRange { what, value, max });
    }
    Ok(())
}
