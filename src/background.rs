// Background sources: externally owned images composited under the strokes.
// The surface only ever holds a shared reference; identity (not pixel equality)
// decides whether the background "changed" between renders.

use crate::error::BackgroundError;
use image::DynamicImage;
use std::path::Path;
use std::rc::Rc;
use tiny_skia::{ColorU8, Pixmap};
use tracing::debug;

/// Relative difference in aspect ratio still considered a fit.
const ASPECT_TOLERANCE: f32 = 0.01;

#[derive(Debug, Clone)]
pub struct Background {
    pixmap: Rc<Pixmap>,
}

impl Background {
    /// Wrap a decoded image. Pixels are premultiplied once here so compositing is a straight blit.
    pub fn from_image(image: DynamicImage) -> Result<Self, BackgroundError> {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut pixmap =
            Pixmap::new(width, height).ok_or(BackgroundError::Empty { width, height })?;

        for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
            let [r, g, b, a] = src.0;
            *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
        }

        debug!(width, height, "background decoded");
        Ok(Self { pixmap: Rc::new(pixmap) })
    }

    /// Decode an image file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BackgroundError> {
        Self::from_image(image::open(path)?)
    }

    /// Decode an in-memory encoded image (PNG, JPEG, ...).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BackgroundError> {
        Self::from_image(image::load_from_memory(bytes)?)
    }

    pub fn natural_width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn natural_height(&self) -> u32 {
        self.pixmap.height()
    }

    /// True when the image has the same aspect ratio as a `width × height` surface,
    /// i.e. stretching it to fill will not distort it.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        let natural = self.natural_width() as f32 / self.natural_height() as f32;
        let target = width as f32 / height as f32;
        ((natural - target) / target).abs() <= ASPECT_TOLERANCE
    }

    pub(crate) fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Identity comparison of two optional backgrounds.
    pub fn same(a: Option<&Background>, b: Option<&Background>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(&a.pixmap, &b.pixmap),
            _ => false,
        }
    }
}
