// The paint state machine.
// Two states, Idle and Painting(last point). Every (state, transition) pair has
// a defined outcome, so any event sequence leaves the machine in one of them.

use crate::event::Transition;
use crate::types::Point;

/// A straight line the renderer should draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PaintState {
    #[default]
    Idle,
    Painting {
        last: Point,
    },
}

impl PaintState {
    pub fn is_painting(&self) -> bool {
        matches!(self, PaintState::Painting { .. })
    }

    pub fn last_point(&self) -> Option<Point> {
        match *self {
            PaintState::Painting { last } => Some(last),
            PaintState::Idle => None,
        }
    }

    /// Pure transition function: the next state plus the segment to render, if any.
    ///
    /// Start and move need a point; without one the event is dropped and the
    /// state is returned unchanged. End ignores the point and always goes Idle.
    pub fn step(
        self,
        transition: Transition,
        point: Option<Point>,
    ) -> (PaintState, Option<Segment>) {
        match (transition, point, self) {
            // Repeated starts just move the anchor.
            (Transition::Start, Some(p), _) => (PaintState::Painting { last: p }, None),
            (Transition::Move, Some(p), PaintState::Painting { last }) => (
                PaintState::Painting { last: p },
                Some(Segment { from: last, to: p }),
            ),
            (Transition::Move, _, PaintState::Idle) => (PaintState::Idle, None),
            (Transition::Start | Transition::Move, None, state) => (state, None),
            (Transition::End, _, _) => (PaintState::Idle, None),
        }
    }

    /// In-place variant of [`PaintState::step`].
    pub fn apply(&mut self, transition: Transition, point: Option<Point>) -> Option<Segment> {
        let (next, segment) = self.step(transition, point);
        *self = next;
        segment
    }
}
