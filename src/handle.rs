// Outward-facing surface handles and the slot that receives them.
//
// A handle is a weak reference: once the canvas unmounts, every handle it ever
// gave out goes dead and all operations on it become no-ops. A handle from a
// previous mount can therefore never reach a later surface.

use crate::error::{ExportError, ExportResult};
use crate::export::{self, Blob, Encoder, ExportFormat};
use crate::surface::{Surface, SurfaceId};
use crate::types::Offset;
use image::RgbaImage;
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct SurfaceHandle {
    surface: Weak<RefCell<Surface>>,
}

impl SurfaceHandle {
    pub(crate) fn new(surface: &Rc<RefCell<Surface>>) -> Self {
        Self { surface: Rc::downgrade(surface) }
    }

    /// A handle that never pointed at anything.
    pub fn detached() -> Self {
        Self { surface: Weak::new() }
    }

    pub fn is_live(&self) -> bool {
        self.surface.strong_count() > 0
    }

    /// Run `f` against the live surface. `None` when the surface is gone or already borrowed.
    pub fn with_surface<R>(&self, f: impl FnOnce(&mut Surface) -> R) -> Option<R> {
        let surface = self.surface.upgrade()?;
        let Ok(mut surface) = surface.try_borrow_mut() else {
            warn!("surface busy, handle operation skipped");
            return None;
        };
        Some(f(&mut surface))
    }

    /// Read-only access. Coexists with other readers; `None` when the surface is
    /// gone or mutably borrowed.
    pub fn read_surface<R>(&self, f: impl FnOnce(&Surface) -> R) -> Option<R> {
        let surface = self.surface.upgrade()?;
        let Ok(surface) = surface.try_borrow() else {
            warn!("surface busy, handle read skipped");
            return None;
        };
        Some(f(&surface))
    }

    pub fn id(&self) -> Option<SurfaceId> {
        self.read_surface(|s| s.id())
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.read_surface(|s| (s.width(), s.height()))
    }

    /// Reset the raster to blank. Idempotent; a no-op on a dead handle.
    pub fn clear(&self) {
        self.with_surface(Surface::clear);
    }

    pub fn set_offset(&self, offset: Offset) {
        self.with_surface(|s| s.set_offset(offset));
    }

    pub fn snapshot(&self) -> Option<RgbaImage> {
        self.read_surface(|s| s.snapshot()).flatten()
    }

    /// Snapshot for export: a dead handle or a zero-area surface gives `Ok(None)`,
    /// a surface that is mid-mutation gives `Err(Busy)`.
    pub(crate) fn try_snapshot(&self) -> ExportResult<Option<RgbaImage>> {
        let Some(surface) = self.surface.upgrade() else {
            return Ok(None);
        };
        let surface = surface.try_borrow().map_err(|_| ExportError::Busy)?;
        Ok(surface.snapshot())
    }

    /// Export in one of the built-in formats. See [`export::export`].
    pub fn export(
        &self,
        format: ExportFormat,
    ) -> impl Future<Output = ExportResult<Option<Blob>>> + use<> {
        export::export(self.clone(), Arc::new(format))
    }

    pub fn export_with(
        &self,
        encoder: Arc<dyn Encoder>,
    ) -> impl Future<Output = ExportResult<Option<Blob>>> + use<> {
        export::export(self.clone(), encoder)
    }

    /// Same underlying surface (or both dead).
    pub fn ptr_eq(&self, other: &SurfaceHandle) -> bool {
        Weak::ptr_eq(&self.surface, &other.surface)
    }
}

impl fmt::Debug for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurfaceHandle")
            .field("live", &self.is_live())
            .finish()
    }
}

/// Shared cell an embedder can read the current handle from.
pub type HandleCell = Rc<RefCell<Option<SurfaceHandle>>>;

/// External slot the canvas keeps in sync with its own handle after every render.
#[derive(Default)]
pub enum ForwardedRef {
    #[default]
    None,
    Callback(Box<dyn FnMut(Option<SurfaceHandle>)>),
    Cell(HandleCell),
}

impl ForwardedRef {
    pub fn callback(f: impl FnMut(Option<SurfaceHandle>) + 'static) -> Self {
        ForwardedRef::Callback(Box::new(f))
    }

    pub fn cell(cell: &HandleCell) -> Self {
        ForwardedRef::Cell(Rc::clone(cell))
    }

    /// Push the current handle (or its absence) into the slot.
    pub fn sync(&mut self, current: Option<&SurfaceHandle>) {
        match self {
            ForwardedRef::None => {}
            ForwardedRef::Callback(f) => f(current.cloned()),
            ForwardedRef::Cell(cell) => match cell.try_borrow_mut() {
                Ok(mut slot) => *slot = current.cloned(),
                Err(_) => warn!("forwarded ref cell is borrowed, skipping sync"),
            },
        }
    }
}

impl fmt::Debug for ForwardedRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForwardedRef::None => f.write_str("ForwardedRef::None"),
            ForwardedRef::Callback(_) => f.write_str("ForwardedRef::Callback(..)"),
            ForwardedRef::Cell(cell) => f.debug_tuple("ForwardedRef::Cell").field(cell).finish(),
        }
    }
}
