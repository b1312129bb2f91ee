// End-to-end behaviour of a mounted canvas: the pointer pipeline, compositing,
// listener lifecycle, forwarded handles and export.

use image::{DynamicImage, Rgba, RgbaImage};
use sketchpad::{
    Background, Canvas, CanvasProps, Color, Encoder, ExportError, ExportFormat, ForwardedRef,
    HandleCell, Offset, PaintState, PointerEvent, SurfaceHandle, Touch,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

fn mount(width: u32, height: u32) -> Canvas {
    Canvas::mount(CanvasProps::new(width, height), ForwardedRef::None)
}

fn solid_background(px: [u8; 4]) -> Background {
    let img = RgbaImage::from_pixel(8, 8, Rgba(px));
    Background::from_image(DynamicImage::ImageRgba8(img)).unwrap()
}

fn stroke(canvas: &mut Canvas, from: (f32, f32), to: (f32, f32)) -> usize {
    canvas.dispatch(&PointerEvent::mouse_down(from.0, from.1));
    let segments = canvas.dispatch(&PointerEvent::mouse_move(to.0, to.1)).segments;
    canvas.dispatch(&PointerEvent::mouse_up(to.0, to.1));
    segments
}

#[test]
fn test_clear_any_number_of_times_gives_same_blank_raster() {
    let mut canvas = mount(32, 32);
    stroke(&mut canvas, (0.0, 16.0), (32.0, 16.0));
    assert!(!canvas.surface().unwrap().is_blank());

    canvas.clear();
    let once = canvas.surface().unwrap().snapshot().unwrap();
    for _ in 0..4 {
        canvas.clear();
    }
    let surface = canvas.surface().unwrap();
    assert!(surface.is_blank());
    assert_eq!(surface.snapshot().unwrap(), once);
}

#[test]
fn test_move_while_idle_never_renders() {
    let mut canvas = mount(32, 32);
    let moves = [
        PointerEvent::mouse_move(4.0, 4.0),
        PointerEvent::touch_move(vec![Touch::new(1, 8.0, 8.0)]),
    ];
    for event in &moves {
        let outcome = canvas.dispatch(event);
        assert_eq!(outcome.fired, 1);
        assert_eq!(outcome.segments, 0);
    }
    assert_eq!(canvas.paint_state(), PaintState::Idle);
    assert!(canvas.surface().unwrap().is_blank());
}

#[test]
fn test_every_end_kind_returns_to_idle() {
    let ends = [
        PointerEvent::mouse_up(0.0, 0.0),
        PointerEvent::mouse_leave(0.0, 0.0),
        PointerEvent::touch_end(vec![Touch::new(1, 0.0, 0.0)]),
        PointerEvent::touch_cancel(vec![]),
    ];
    let mut canvas = mount(16, 16);
    for end in &ends {
        canvas.dispatch(&PointerEvent::mouse_down(2.0, 2.0));
        assert!(canvas.paint_state().is_painting());
        canvas.dispatch(end);
        assert_eq!(canvas.paint_state(), PaintState::Idle);
        assert_eq!(canvas.dispatch(&PointerEvent::mouse_move(9.0, 9.0)).segments, 0);
    }
}

#[test]
fn test_mouse_and_touch_normalize_identically() {
    let offset = Offset::new(37.0, 11.0);
    let (px, py) = (61.0, 45.0);

    let mut by_mouse = mount(64, 64);
    by_mouse.set_offset(offset);
    by_mouse.dispatch(&PointerEvent::mouse_down(px, py));

    let mut by_touch = mount(64, 64);
    by_touch.set_offset(offset);
    by_touch.dispatch(&PointerEvent::touch_start(vec![Touch::new(3, px, py)]));

    let expected = PaintState::Painting {
        last: sketchpad::Point::new(px - offset.left, py - offset.top),
    };
    assert_eq!(by_mouse.paint_state(), expected);
    assert_eq!(by_touch.paint_state(), expected);
}

#[test]
fn test_empty_changed_touches_change_nothing() {
    let mut canvas = mount(32, 32);
    assert_eq!(canvas.dispatch(&PointerEvent::touch_start(vec![])).segments, 0);
    assert_eq!(canvas.paint_state(), PaintState::Idle);

    canvas.dispatch(&PointerEvent::touch_start(vec![Touch::new(1, 4.0, 4.0)]));
    let painting = canvas.paint_state();
    let outcome = canvas.dispatch(&PointerEvent::touch_move(vec![]));
    assert_eq!(outcome.segments, 0);
    assert_eq!(canvas.paint_state(), painting);
    assert!(canvas.surface().unwrap().is_blank());
}

#[test]
fn test_background_change_wipes_strokes() {
    let mut canvas = mount(40, 40);
    stroke(&mut canvas, (0.0, 20.0), (40.0, 20.0));
    assert_eq!(canvas.surface().unwrap().pixel(20, 20), Some(Color::RED));

    let green = solid_background([0, 200, 0, 255]);
    canvas.render(CanvasProps::new(40, 40).with_background(Some(green.clone())));
    {
        let surface = canvas.surface().unwrap();
        let px = surface.pixel(20, 20).unwrap();
        assert!(px.r < 5, "stroke still visible: {px:?}");
        assert!((px.g as i32 - 200).abs() <= 2);
    }

    // Same background again: no recomposite, so new strokes stay.
    stroke(&mut canvas, (0.0, 20.0), (40.0, 20.0));
    canvas.render(CanvasProps::new(40, 40).with_background(Some(green)));
    assert_eq!(canvas.surface().unwrap().pixel(20, 20), Some(Color::RED));

    // Toggling the background off leaves a blank raster.
    canvas.render(CanvasProps::new(40, 40));
    assert!(canvas.surface().unwrap().is_blank());
}

#[test]
fn test_export_blank_surface_gives_jpeg() {
    let canvas = mount(10, 10);
    let blob = smol::block_on(canvas.export(ExportFormat::default()))
        .unwrap()
        .expect("blob");
    assert!(!blob.is_empty());
    assert_eq!(blob.mime_type(), "image/jpeg");
    assert_eq!(&blob.bytes()[..3], &[0xFF, 0xD8, 0xFF]);

    let decoded = image::load_from_memory(blob.bytes()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (10, 10));
}

#[test]
fn test_export_png_preserves_strokes() {
    let mut canvas = mount(32, 32);
    stroke(&mut canvas, (0.0, 16.0), (32.0, 16.0));
    let blob = smol::block_on(canvas.export(ExportFormat::Png)).unwrap().unwrap();
    let decoded = image::load_from_memory(blob.bytes()).unwrap().to_rgba8();
    assert_eq!(decoded.get_pixel(16, 16).0, [255, 0, 0, 255]);
    assert_eq!(decoded.get_pixel(16, 2).0[3], 0);
}

#[test]
fn test_export_while_surface_is_read_borrowed() {
    let mut canvas = mount(10, 10);
    stroke(&mut canvas, (0.0, 5.0), (10.0, 5.0));

    let reader = canvas.surface().unwrap();
    let blob = smol::block_on(canvas.export(ExportFormat::Png))
        .unwrap()
        .expect("live surface exports while another reader holds it");
    drop(reader);

    let decoded = image::load_from_memory(blob.bytes()).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (10, 10));
    assert_eq!(decoded.get_pixel(5, 5).0, [255, 0, 0, 255]);
}

#[test]
fn test_export_while_surface_is_mutated_is_busy() {
    let canvas = mount(10, 10);
    let handle = canvas.handle().unwrap();
    let result = handle
        .with_surface(|_| smol::block_on(handle.export(ExportFormat::Png)))
        .expect("live handle");
    assert!(matches!(result, Err(ExportError::Busy)));
}

#[test]
fn test_export_zero_area_resolves_none() {
    let canvas = mount(0, 10);
    assert!(matches!(smol::block_on(canvas.export(ExportFormat::Png)), Ok(None)));
}

struct FailingEncoder {
    calls: Arc<AtomicUsize>,
    panic: bool,
}

impl Encoder for FailingEncoder {
    fn mime_type(&self) -> &'static str {
        "image/x-test"
    }

    fn encode(&self, _image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.panic {
            panic!("encoder blew up");
        }
        Err(ExportError::Encoder("no codec".into()))
    }
}

#[test]
fn test_encoder_failure_surfaces_as_err() {
    let calls = Arc::new(AtomicUsize::new(0));
    let canvas = mount(10, 10);

    // Creating the export runs nothing.
    let encoder = FailingEncoder { calls: Arc::clone(&calls), panic: false };
    let pending = canvas.export_with(Arc::new(encoder));
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let result = smol::block_on(pending);
    assert!(matches!(result, Err(ExportError::Encoder(ref m)) if m == "no codec"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_encoder_panic_surfaces_as_err() {
    let calls = Arc::new(AtomicUsize::new(0));
    let canvas = mount(10, 10);
    let result = smol::block_on(
        canvas.export_with(Arc::new(FailingEncoder { calls: Arc::clone(&calls), panic: true })),
    );
    assert!(matches!(result, Err(ExportError::Worker(ref m)) if m.contains("blew up")));
}

#[test]
fn test_rerenders_do_not_stack_listeners() {
    let mut canvas = mount(48, 48);
    for _ in 0..10 {
        canvas.render(CanvasProps::new(48, 48));
    }
    canvas.dispatch(&PointerEvent::mouse_down(4.0, 4.0));
    let outcome = canvas.dispatch(&PointerEvent::mouse_move(40.0, 40.0));
    assert_eq!(outcome.fired, 1);
    assert_eq!(outcome.segments, 1);

    // Restyling swaps handlers instead of adding to them.
    for width in [1.0, 2.0, 3.0] {
        canvas.render(CanvasProps::new(48, 48).line_width(width));
    }
    assert_eq!(canvas.dispatch(&PointerEvent::mouse_move(10.0, 40.0)).segments, 1);
    assert_eq!(
        canvas.surface().unwrap().listeners().len(),
        sketchpad::EventKind::ALL.len()
    );
}

#[test]
fn test_unmounted_canvas_ignores_everything() {
    let cell: HandleCell = Rc::default();
    let mut canvas = Canvas::mount(CanvasProps::new(32, 32), ForwardedRef::cell(&cell));
    let handle = cell.borrow().clone().expect("handle published on mount");
    canvas.dispatch(&PointerEvent::mouse_down(1.0, 1.0));

    canvas.unmount();
    assert!(cell.borrow().is_none());
    assert!(!handle.is_live());

    for event in [
        PointerEvent::mouse_down(2.0, 2.0),
        PointerEvent::mouse_move(20.0, 20.0),
        PointerEvent::touch_move(vec![Touch::new(1, 5.0, 5.0)]),
        PointerEvent::mouse_up(20.0, 20.0),
    ] {
        assert!(canvas.dispatch(&event).is_noop());
    }
    assert_eq!(canvas.paint_state(), PaintState::Idle);

    handle.clear();
    assert!(matches!(smol::block_on(handle.export(ExportFormat::Png)), Ok(None)));
}

#[test]
fn test_forwarded_callback_tracks_each_render_and_mount() {
    let seen: Rc<RefCell<Vec<Option<SurfaceHandle>>>> = Rc::default();
    let log = Rc::clone(&seen);
    let mut first = Canvas::mount(
        CanvasProps::new(8, 8),
        ForwardedRef::callback(move |h| log.borrow_mut().push(h)),
    );
    first.render(CanvasProps::new(8, 8));
    assert_eq!(seen.borrow().len(), 2);
    assert!(seen.borrow().iter().all(|h| h.as_ref().is_some_and(SurfaceHandle::is_live)));

    drop(first);
    assert!(seen.borrow().last().unwrap().is_none());

    // A handle from the old mount never reaches a new surface.
    let stale = seen.borrow()[0].clone().unwrap();
    let second = mount(8, 8);
    assert!(!stale.is_live());
    assert!(!stale.ptr_eq(&second.handle().unwrap()));
}

#[test]
fn test_swapping_the_slot_refills_it() {
    let mut canvas = mount(8, 8);
    let cell: HandleCell = Rc::default();
    canvas.set_forwarded_ref(ForwardedRef::cell(&cell));
    assert!(cell.borrow().as_ref().is_some_and(SurfaceHandle::is_live));

    let handle = cell.borrow().clone().unwrap();
    handle.set_offset(Offset::new(2.0, 2.0));
    assert_eq!(canvas.surface().unwrap().offset(), Offset::new(2.0, 2.0));
}
