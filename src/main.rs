// Sketchpad viewer: a minimal embedder for the drawing surface.
// • The canvas sits on a white page, MARGIN pixels in from the window corner.
// • Hold Left Mouse over the canvas to paint. Leaving the canvas ends the stroke.
// • C clears the drawing. S saves it as annotations.jpg (or .png). ESC quits.
//
// usage: sketchpad [background-image] [--config canvas.json]

mod draw;

use draw::{FrameBuffer, ViewerError, draw_crosshair, draw_frame};
use sketchpad::{
    Background, Canvas, CanvasConfig, ExportFormat, ForwardedRef, HandleCell, Offset, PointerEvent,
    SurfaceHandle,
};
use std::path::PathBuf;
use tracing::{error, info, warn};

const MARGIN: usize = 24;
const PAGE_COLOR: u32 = 0x00_FF_FF_FF;
const FRAME_COLOR: u32 = 0x00_BB_BB_BB;
const CROSSHAIR_COLOR: u32 = 0x00_33_33_33;

struct Args {
    background: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut args = Args { background: None, config: None };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            args.config = iter.next().map(PathBuf::from);
        } else {
            args.background = Some(PathBuf::from(arg));
        }
    }
    args
}

fn setup_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,sketchpad=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

/// Mouse state from the previous frame, used to synthesize DOM-style events.
#[derive(Default)]
struct PointerTracker {
    last_pos: Option<(f32, f32)>,
    was_down: bool,
    was_over: bool,
}

impl PointerTracker {
    /// Events for this frame, in the order a browser would fire them.
    fn poll(&mut self, pos: Option<(f32, f32)>, down: bool, over: bool) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        match pos {
            Some((x, y)) if over => {
                if down && !self.was_down {
                    events.push(PointerEvent::mouse_down(x, y));
                }
                if self.last_pos != pos {
                    events.push(PointerEvent::mouse_move(x, y));
                }
                if !down && self.was_down {
                    events.push(PointerEvent::mouse_up(x, y));
                }
            }
            _ => {
                if self.was_over {
                    let (x, y) = self.last_pos.unwrap_or_default();
                    events.push(PointerEvent::mouse_leave(x, y));
                }
            }
        }
        self.last_pos = pos;
        self.was_down = down;
        self.was_over = over && pos.is_some();
        events
    }
}

fn save(handle: &SurfaceHandle, format: ExportFormat) {
    let path = format!("annotations.{}", format.extension());
    match smol::block_on(handle.export(format)) {
        Ok(Some(blob)) => match std::fs::write(&path, blob.bytes()) {
            Ok(()) => info!(%path, len = blob.len(), "image saved"),
            Err(e) => error!(%path, "could not write image: {e}"),
        },
        Ok(None) => warn!("nothing to export"),
        Err(e) => error!("export failed: {e}"),
    }
}

fn main() -> Result<(), ViewerError> {
    setup_logging();
    let args = parse_args();

    let config = match &args.config {
        Some(path) => CanvasConfig::load(path)?,
        None => CanvasConfig::default(),
    };
    let background = args.background.as_ref().map(Background::open).transpose()?;
    if let Some(bg) = &background {
        if !bg.fits(config.width, config.height) {
            warn!(
                natural_width = bg.natural_width(),
                natural_height = bg.natural_height(),
                "background does not match the canvas aspect ratio"
            );
        }
    }

    /* --- Mount the canvas and keep a forwarded handle to it --- */
    let canvas_ref: HandleCell = Default::default();
    let props = config.props().with_background(background);
    let mut canvas = Canvas::mount(props, ForwardedRef::cell(&canvas_ref));
    canvas.set_offset(Offset::new(MARGIN as f32, MARGIN as f32));

    let (cw, ch) = (config.width as usize, config.height as usize);
    let (w, h) = (cw + 2 * MARGIN, ch + 2 * MARGIN);
    let mut drawer = draw::Drawer::new("Sketchpad", w, h)?;
    let mut screen = FrameBuffer::new(w, h);
    let mut tracker = PointerTracker::default();

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && !drawer.esc_pressed() {
        /* 1) Pointer input -> canvas events */
        let pos = drawer.mouse_pos();
        let over = pos.is_some_and(|(x, y)| {
            let (x, y) = (x - MARGIN as f32, y - MARGIN as f32);
            x >= 0.0 && y >= 0.0 && x < cw as f32 && y < ch as f32
        });
        for event in tracker.poll(pos, drawer.left_mouse_down(), over) {
            canvas.dispatch(&event);
        }

        /* 2) Keys go through the forwarded handle, like any embedder would */
        let handle = canvas_ref.borrow().clone();
        if let Some(handle) = handle {
            if drawer.c_pressed_once() {
                handle.clear();
                info!("canvas cleared");
            }
            if drawer.s_pressed_once() {
                save(&handle, config.export);
            }
        }

        /* 3) Paper, canvas, frame, cursor */
        screen.fill(PAGE_COLOR);
        if let Some(image) = canvas.surface().and_then(|s| s.snapshot()) {
            screen.blit_rgba(&image, MARGIN, MARGIN);
        }
        draw_frame(&mut screen, MARGIN as i32, MARGIN as i32, cw as i32, ch as i32, FRAME_COLOR);
        if let Some((mx, my)) = pos {
            draw_crosshair(&mut screen, mx as i32, my as i32, 10, CROSSHAIR_COLOR);
        }

        drawer.present(&screen)?;
    }

    canvas.unmount();
    Ok(())
}
