// The canvas component: owns the surface, the paint session and the listener
// binding, and reconciles them against new props on every render.
//
// Lifecycle:
//   mount   -> surface created, background composited, listeners bound, ref synced
//   render  -> resize / recomposite / rebind only what changed, ref synced
//   unmount -> listeners unbound, surface dropped, ref set to absent
// After unmount every operation is a silent no-op.

use crate::background::Background;
use crate::config::CanvasProps;
use crate::error::ExportResult;
use crate::event::PointerEvent;
use crate::export::{Blob, Encoder, ExportFormat};
use crate::handle::{ForwardedRef, SurfaceHandle};
use crate::listeners::ListenerManager;
use crate::normalize::normalize;
use crate::paint::PaintState;
use crate::surface::Surface;
use crate::types::Offset;
use std::cell::{Ref, RefCell};
use std::future::Future;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace};

/// What a single dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// Listeners that ran for the event
    pub fired: usize,
    /// Segments drawn onto the surface
    pub segments: usize,
}

impl DispatchOutcome {
    pub fn is_noop(&self) -> bool {
        self.fired == 0
    }
}

pub struct Canvas {
    surface: Option<Rc<RefCell<Surface>>>,
    props: CanvasProps,
    paint: PaintState,
    listeners: ListenerManager,
    handler_version: u64,
    forwarded: ForwardedRef,
}

impl Canvas {
    /// Mount with `props`, publishing the surface handle through `forwarded`.
    pub fn mount(props: CanvasProps, forwarded: ForwardedRef) -> Self {
        let surface = Rc::new(RefCell::new(Surface::new(props.width, props.height)));
        let mut canvas = Self {
            surface: Some(surface),
            props,
            paint: PaintState::default(),
            listeners: ListenerManager::new(),
            handler_version: 1,
            forwarded,
        };

        if let Some(surface) = &canvas.surface {
            let mut surface = surface.borrow_mut();
            debug!(
                surface = surface.id().0,
                width = canvas.props.width,
                height = canvas.props.height,
                "canvas mounted"
            );
            canvas
                .listeners
                .sync(Some(&mut *surface), canvas.handler_version, canvas.props.style);
            surface.composite(canvas.props.background.as_ref());
        }
        canvas.sync_ref();
        canvas
    }

    /// Re-render with new props. Only what changed is redone:
    /// a new size reallocates the raster, a new size or background recomposites,
    /// a new stroke style rebinds every listener.
    pub fn render(&mut self, props: CanvasProps) {
        let Some(surface) = self.surface.clone() else {
            debug!("render on unmounted canvas ignored");
            return;
        };

        let resized = props.width != self.props.width || props.height != self.props.height;
        let restyled = props.style != self.props.style;
        let background_changed =
            !Background::same(props.background.as_ref(), self.props.background.as_ref());
        self.props = props;
        if restyled {
            self.handler_version += 1;
        }

        {
            let mut surface = surface.borrow_mut();
            if resized {
                surface.resize(self.props.width, self.props.height);
            }
            self.listeners
                .sync(Some(&mut *surface), self.handler_version, self.props.style);
            if resized || background_changed {
                surface.composite(self.props.background.as_ref());
            }
        }

        self.sync_ref();
    }

    /// Swap the external handle slot. The new slot is filled right away and on every later render.
    pub fn set_forwarded_ref(&mut self, forwarded: ForwardedRef) {
        self.forwarded = forwarded;
        self.sync_ref();
    }

    /// Tear everything down. Idempotent.
    pub fn unmount(&mut self) {
        let Some(surface) = self.surface.take() else {
            return;
        };
        {
            let mut surface = surface.borrow_mut();
            self.listeners.unbind(Some(&mut *surface));
            debug!(surface = surface.id().0, "canvas unmounted");
        }
        drop(surface);
        self.paint = PaintState::Idle;
        self.sync_ref();
    }

    /// Route one pointer event through the listeners bound on the surface.
    pub fn dispatch(&mut self, event: &PointerEvent) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        let Some(surface) = &self.surface else {
            return outcome;
        };
        let mut surface = surface.borrow_mut();

        let kind = event.kind();
        let handlers = surface
            .listeners()
            .handlers_for(kind)
            .copied()
            .collect::<Vec<_>>();
        if handlers.is_empty() {
            return outcome;
        }

        let point = normalize(event, surface.offset());
        if point.is_none() {
            trace!(event = kind.name(), "event carries no position");
        }

        for handler in handlers {
            outcome.fired += 1;
            if let Some(segment) = self.paint.apply(handler.transition, point) {
                surface.draw_segment(segment.from, segment.to, &handler.style);
                outcome.segments += 1;
            }
        }
        trace!(event = kind.name(), ?point, ?outcome, "dispatched");
        outcome
    }

    /// Reset the raster to blank. Paint state and background are untouched.
    pub fn clear(&mut self) {
        if let Some(surface) = &self.surface {
            surface.borrow_mut().clear();
        }
    }

    pub fn set_offset(&mut self, offset: Offset) {
        if let Some(surface) = &self.surface {
            surface.borrow_mut().set_offset(offset);
        }
    }

    pub fn export(
        &self,
        format: ExportFormat,
    ) -> impl Future<Output = ExportResult<Option<Blob>>> + use<> {
        self.handle_or_detached().export(format)
    }

    pub fn export_with(
        &self,
        encoder: Arc<dyn Encoder>,
    ) -> impl Future<Output = ExportResult<Option<Blob>>> + use<> {
        self.handle_or_detached().export_with(encoder)
    }

    /// Handle to the live surface; `None` once unmounted.
    pub fn handle(&self) -> Option<SurfaceHandle> {
        self.surface.as_ref().map(SurfaceHandle::new)
    }

    /// Borrow the live surface for reading.
    pub fn surface(&self) -> Option<Ref<'_, Surface>> {
        self.surface.as_ref().map(|s| s.borrow())
    }

    pub fn props(&self) -> &CanvasProps {
        &self.props
    }

    pub fn paint_state(&self) -> PaintState {
        self.paint
    }

    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    fn handle_or_detached(&self) -> SurfaceHandle {
        self.handle().unwrap_or_else(SurfaceHandle::detached)
    }

    fn sync_ref(&mut self) {
        let handle = self.handle();
        self.forwarded.sync(handle.as_ref());
    }
}

impl Drop for Canvas {
    fn drop(&mut self) {
        self.unmount();
    }
}
