use std::sync::mpsc::Sender;

use crate::drawer::model::Point;

/// Requests the caller side sends to the presenter thread.
#[derive(Debug, Clone)]
pub enum PresenterCommand {
    RenderNow,
    Terminate,
    QueryPosition { reply: Sender<Option<Point>> },
    MoveTo { position: Point },
    QuerySize { reply: Sender<Option<(i32, i32)>> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    CloseRequested,
    WindowClosed,
    CallerGone,
}
