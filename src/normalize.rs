// Maps a raw pointer event onto surface-local coordinates.
// Page position minus the surface's on-screen offset, nothing more: page scroll
// and any scaling applied to the on-screen box are not accounted for.

use crate::event::PointerEvent;
use crate::types::{Offset, Point};

/// Surface-local position of `event`, or `None` when it carries no usable position
/// (a touch event with an empty changed-touches list).
pub fn normalize(event: &PointerEvent, offset: Offset) -> Option<Point> {
    let (page_x, page_y) = match event {
        PointerEvent::Mouse(m) => (m.page_x, m.page_y),
        PointerEvent::Touch(t) => {
            let first = t.changed_touches.first()?;
            (first.page_x, first.page_y)
        }
    };
    Some(Point::new(page_x - offset.left, page_y - offset.top))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Touch;

    #[test]
    fn test_mouse_subtracts_offset() {
        let offset = Offset::new(20.0, 35.0);
        let p = normalize(&PointerEvent::mouse_move(120.0, 85.0), offset).unwrap();
        assert_eq!(p, Point::new(100.0, 50.0));
    }

    #[test]
    fn test_touch_matches_mouse_at_same_page_position() {
        let offset = Offset::new(8.0, 16.0);
        let mouse = normalize(&PointerEvent::mouse_down(40.0, 60.0), offset);
        let touch = normalize(
            &PointerEvent::touch_start(vec![Touch::new(1, 40.0, 60.0), Touch::new(2, 0.0, 0.0)]),
            offset,
        );
        assert_eq!(mouse, touch);
    }

    #[test]
    fn test_empty_touch_list_has_no_point() {
        assert_eq!(normalize(&PointerEvent::touch_move(vec![]), Offset::default()), None);
    }

    #[test]
    fn test_points_outside_surface_are_kept() {
        let p = normalize(&PointerEvent::mouse_move(2.0, 3.0), Offset::new(10.0, 10.0)).unwrap();
        assert_eq!(p, Point::new(-8.0, -7.0));
    }
}
