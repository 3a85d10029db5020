use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::drawer::canvas::Canvas;
use crate::drawer::error::{panic_message, DrawerError};
use crate::drawer::model::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseKind {
    Move,
    LeftClick,
    RightClick,
}

impl MouseKind {
    pub const ALL: [MouseKind; 3] = [MouseKind::Move, MouseKind::LeftClick, MouseKind::RightClick];

    fn index(self) -> usize {
        match self {
            MouseKind::Move => 0,
            MouseKind::LeftClick => 1,
            MouseKind::RightClick => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordSpace {
    Raw,
    Scaled,
}

impl CoordSpace {
    fn index(self) -> usize {
        match self {
            CoordSpace::Raw => 0,
            CoordSpace::Scaled => 1,
        }
    }
}

/// Result of an edge-triggered poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseSample {
    pub point: Point,
    pub is_new: bool,
}

pub type MouseHandler = Arc<dyn Fn(Point, &Canvas) + Send + Sync>;

#[derive(Debug, Clone, Copy)]
struct Slot {
    point: Point,
    fresh: bool,
}

impl Default for Slot {
    fn default() -> Self {
        Self {
            point: Point::NONE,
            fresh: false,
        }
    }
}

type SlotGrid = [[Slot; 2]; 3];
type HandlerGrid = [[Vec<MouseHandler>; 2]; 3];

/// Last pointer position and new-data flag per event kind and coordinate space.
#[derive(Default)]
pub struct MouseLatch {
    slots: Mutex<SlotGrid>,
    handlers: Mutex<HandlerGrid>,
}

impl std::fmt::Debug for MouseLatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MouseLatch")
            .field("slots", &*self.slots())
            .finish_non_exhaustive()
    }
}

impl MouseLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latches a raw pointer event in both spaces and notifies subscribers.
    ///
    /// The scaled entry is skipped when its position has not changed, unless
    /// `redundant` is set.
    pub fn record(&self, kind: MouseKind, raw: Point, scale: i32, redundant: bool, canvas: &Canvas) {
        self.notify(kind, CoordSpace::Raw, raw, canvas);
        self.store(kind, CoordSpace::Raw, raw);

        let scaled = raw.scaled_down(scale);
        let previous = self.slots()[kind.index()][CoordSpace::Scaled.index()].point;
        if !redundant && previous == scaled {
            return;
        }
        self.notify(kind, CoordSpace::Scaled, scaled, canvas);
        self.store(kind, CoordSpace::Scaled, scaled);
    }

    /// Last position in `space` and whether it arrived since the previous poll.
    pub fn poll(&self, kind: MouseKind, space: CoordSpace) -> MouseSample {
        let mut slots = self.slots();
        let slot = &mut slots[kind.index()][space.index()];
        let sample = MouseSample {
            point: slot.point,
            is_new: slot.fresh,
        };
        slot.fresh = false;
        sample
    }

    /// Forgets every scaled position, which no longer matches a new scale.
    pub fn reset_scaled(&self) {
        let mut slots = self.slots();
        for kind in MouseKind::ALL {
            slots[kind.index()][CoordSpace::Scaled.index()] = Slot::default();
        }
    }

    pub fn subscribe(&self, kind: MouseKind, space: CoordSpace, handler: MouseHandler) {
        self.handlers()[kind.index()][space.index()].push(handler);
    }

    pub fn clear_subscribers(&self) {
        *self.handlers() = HandlerGrid::default();
    }

    fn store(&self, kind: MouseKind, space: CoordSpace, point: Point) {
        self.slots()[kind.index()][space.index()] = Slot { point, fresh: true };
    }

    fn notify(&self, kind: MouseKind, space: CoordSpace, point: Point, canvas: &Canvas) {
        let handlers = self.handlers()[kind.index()][space.index()].clone();
        for handler in handlers {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(point, canvas)));
            if let Err(payload) = outcome {
                let err = DrawerError::SubscriberFailure(panic_message(payload.as_ref()));
                tracing::warn!(?kind, ?space, "{err}");
            }
        }
    }

    fn slots(&self) -> MutexGuard<'_, SlotGrid> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn handlers(&self) -> MutexGuard<'_, HandlerGrid> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
