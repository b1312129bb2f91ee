//! Freehand drawing surface.
//!
//! A fixed-size raster that a pointer (mouse or single touch) paints strokes on,
//! optionally over a background image, and that can be exported as a JPEG/PNG
//! blob. The embedder owns the window, the pointer hardware, file pickers and
//! downloads; this crate owns the painting engine:
//!
//! - [`normalize`]: page coordinates to surface coordinates
//! - [`paint`]: the Idle/Painting state machine
//! - [`surface`]: the raster itself and its renderer (tiny-skia)
//! - [`listeners`]: listener table plus the binding manager
//! - [`handle`]: weak surface handles and the forwarded-ref slot
//! - [`export`]: asynchronous, fallible image encoding
//! - [`canvas`]: the component tying it all together
//!
//! ```no_run
//! use sketchpad::{Canvas, CanvasProps, ExportFormat, ForwardedRef, PointerEvent};
//!
//! let mut canvas = Canvas::mount(CanvasProps::new(600, 600), ForwardedRef::None);
//! canvas.dispatch(&PointerEvent::mouse_down(10.0, 10.0));
//! canvas.dispatch(&PointerEvent::mouse_move(80.0, 40.0));
//! canvas.dispatch(&PointerEvent::mouse_up(80.0, 40.0));
//! let blob = smol::block_on(canvas.export(ExportFormat::default()));
//! ```

pub mod background;
pub mod canvas;
pub mod config;
pub mod error;
pub mod event;
pub mod export;
pub mod handle;
pub mod listeners;
pub mod normalize;
pub mod paint;
pub mod surface;
pub mod types;

pub use background::Background;
pub use canvas::{Canvas, DispatchOutcome};
pub use config::{CanvasConfig, CanvasProps};
pub use error::{BackgroundError, ConfigError, ExportError, ParseColorError};
pub use event::{EventKind, PointerEvent, Touch, Transition};
pub use export::{Blob, Encoder, ExportFormat};
pub use handle::{ForwardedRef, HandleCell, SurfaceHandle};
pub use paint::{PaintState, Segment};
pub use surface::{Surface, SurfaceId};
pub use types::{Color, LineJoin, Offset, Point, StrokeStyle};
