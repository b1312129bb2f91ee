// Pointer events as the embedder delivers them.
// Mouse and touch arrive as separate variants but collapse onto the same three
// transitions (start, move, end) once they reach the paint state machine.

/// Native event kinds a surface can carry listeners for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MouseDown,
    MouseMove,
    MouseUp,
    MouseLeave,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
}

impl EventKind {
    pub const ALL: [EventKind; 8] = [
        EventKind::MouseDown,
        EventKind::MouseMove,
        EventKind::MouseUp,
        EventKind::MouseLeave,
        EventKind::TouchStart,
        EventKind::TouchMove,
        EventKind::TouchEnd,
        EventKind::TouchCancel,
    ];

    /// DOM-style event name, used in logs.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::MouseDown => "mousedown",
            EventKind::MouseMove => "mousemove",
            EventKind::MouseUp => "mouseup",
            EventKind::MouseLeave => "mouseleave",
            EventKind::TouchStart => "touchstart",
            EventKind::TouchMove => "touchmove",
            EventKind::TouchEnd => "touchend",
            EventKind::TouchCancel => "touchcancel",
        }
    }

    /// The paint transition this kind is bound to.
    pub fn transition(self) -> Transition {
        match self {
            EventKind::MouseDown | EventKind::TouchStart => Transition::Start,
            EventKind::MouseMove | EventKind::TouchMove => Transition::Move,
            EventKind::MouseUp
            | EventKind::MouseLeave
            | EventKind::TouchEnd
            | EventKind::TouchCancel => Transition::End,
        }
    }
}

/// Logical transition categories. Up, leave, touchend and touchcancel all end a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    Start,
    Move,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventKind {
    Down,
    Move,
    Up,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchEventKind {
    Start,
    Move,
    End,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    pub page_x: f32,
    pub page_y: f32,
}

/// One contact point of a touch event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Touch {
    pub identifier: u64,
    pub page_x: f32,
    pub page_y: f32,
}

impl Touch {
    pub fn new(identifier: u64, page_x: f32, page_y: f32) -> Self {
        Self { identifier, page_x, page_y }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TouchEvent {
    pub kind: TouchEventKind,
    /// Contacts that changed in this event. Only the first one is ever consulted.
    pub changed_touches: Vec<Touch>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Mouse(MouseEvent),
    Touch(TouchEvent),
}

impl PointerEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            PointerEvent::Mouse(m) => match m.kind {
                MouseEventKind::Down => EventKind::MouseDown,
                MouseEventKind::Move => EventKind::MouseMove,
                MouseEventKind::Up => EventKind::MouseUp,
                MouseEventKind::Leave => EventKind::MouseLeave,
            },
            PointerEvent::Touch(t) => match t.kind {
                TouchEventKind::Start => EventKind::TouchStart,
                TouchEventKind::Move => EventKind::TouchMove,
                TouchEventKind::End => EventKind::TouchEnd,
                TouchEventKind::Cancel => EventKind::TouchCancel,
            },
        }
    }

    fn mouse(kind: MouseEventKind, page_x: f32, page_y: f32) -> Self {
        PointerEvent::Mouse(MouseEvent { kind, page_x, page_y })
    }

    fn touch(kind: TouchEventKind, changed_touches: Vec<Touch>) -> Self {
        PointerEvent::Touch(TouchEvent { kind, changed_touches })
    }

    pub fn mouse_down(page_x: f32, page_y: f32) -> Self {
        Self::mouse(MouseEventKind::Down, page_x, page_y)
    }

    pub fn mouse_move(page_x: f32, page_y: f32) -> Self {
        Self::mouse(MouseEventKind::Move, page_x, page_y)
    }

    pub fn mouse_up(page_x: f32, page_y: f32) -> Self {
        Self::mouse(MouseEventKind::Up, page_x, page_y)
    }

    pub fn mouse_leave(page_x: f32, page_y: f32) -> Self {
        Self::mouse(MouseEventKind::Leave, page_x, page_y)
    }

    pub fn touch_start(changed_touches: Vec<Touch>) -> Self {
        Self::touch(TouchEventKind::Start, changed_touches)
    }

    pub fn touch_move(changed_touches: Vec<Touch>) -> Self {
        Self::touch(TouchEventKind::Move, changed_touches)
    }

    pub fn touch_end(changed_touches: Vec<Touch>) -> Self {
        Self::touch(TouchEventKind::End, changed_touches)
    }

    pub fn touch_cancel(changed_touches: Vec<Touch>) -> Self {
        Self::touch(TouchEventKind::Cancel, changed_touches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_maps_to_a_transition() {
        let starts = EventKind::ALL
            .iter()
            .filter(|k| k.transition() == Transition::Start)
            .count();
        let moves = EventKind::ALL
            .iter()
            .filter(|k| k.transition() == Transition::Move)
            .count();
        let ends = EventKind::ALL
            .iter()
            .filter(|k| k.transition() == Transition::End)
            .count();
        assert_eq!((starts, moves, ends), (2, 2, 4));
    }

    #[test]
    fn test_event_kind_of_constructors() {
        assert_eq!(PointerEvent::mouse_leave(0.0, 0.0).kind(), EventKind::MouseLeave);
        assert_eq!(PointerEvent::touch_cancel(vec![]).kind(), EventKind::TouchCancel);
        assert_eq!(EventKind::TouchMove.name(), "touchmove");
    }
}
