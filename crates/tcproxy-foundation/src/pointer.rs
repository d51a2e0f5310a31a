//! Pointer event types delivered to pointer-consuming tasks.

use crate::geometry::Point;
use smallvec::SmallVec;

/// Identity the host assigns to a finger or mouse pointer for the duration
/// of one contact.
pub type PointerId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    Press,
    Move,
    Release,
    /// Enter/exit/scroll and anything else the mapper ignores.
    Other,
}

/// State of one pointer within an event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerChange {
    pub id: PointerId,
    pub position: Point,
    pub pressed: bool,
    pub previous_pressed: bool,
}

impl PointerChange {
    pub fn down(id: PointerId, position: Point) -> Self {
        Self {
            id,
            position,
            pressed: true,
            previous_pressed: false,
        }
    }

    pub fn moved(id: PointerId, position: Point) -> Self {
        Self {
            id,
            position,
            pressed: true,
            previous_pressed: true,
        }
    }

    pub fn up(id: PointerId, position: Point) -> Self {
        Self {
            id,
            position,
            pressed: false,
            previous_pressed: true,
        }
    }

    pub fn changed_to_down(&self) -> bool {
        self.pressed && !self.previous_pressed
    }

    pub fn changed_to_up(&self) -> bool {
        !self.pressed && self.previous_pressed
    }
}

/// One input frame: the event kind plus every pointer that took part in it.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub changes: SmallVec<[PointerChange; 4]>,
}

impl PointerEvent {
    pub fn new(kind: PointerEventKind, changes: impl IntoIterator<Item = PointerChange>) -> Self {
        Self {
            kind,
            changes: changes.into_iter().collect(),
        }
    }

    pub fn single(kind: PointerEventKind, change: PointerChange) -> Self {
        Self::new(kind, [change])
    }
}
