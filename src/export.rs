// Export: turn the current raster into a compressed image blob.
//
// The returned future does nothing until polled. On first poll it snapshots
// the pixels and hands them to smol's blocking pool for encoding, so creating
// an export can never fail or panic in the caller's frame. Every failure
// (busy surface, codec error, custom encoder error, encoder panic) arrives
// through the future's `Err`.

use crate::error::{ExportError, ExportResult};
use crate::handle::SurfaceHandle;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbImage, RgbaImage};
use serde::Deserialize;
use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_JPEG_QUALITY: u8 = 92;

fn default_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

/// Compressed output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum ExportFormat {
    /// Lossy, no alpha: transparent pixels come out black.
    Jpeg {
        #[serde(default = "default_quality")]
        quality: u8,
    },
    Png,
}

impl Default for ExportFormat {
    fn default() -> Self {
        ExportFormat::Jpeg { quality: DEFAULT_JPEG_QUALITY }
    }
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg { .. } => "jpg",
            ExportFormat::Png => "png",
        }
    }
}

/// Anything that can compress a straight-alpha RGBA snapshot.
pub trait Encoder: Send + Sync {
    fn mime_type(&self) -> &'static str;
    fn encode(&self, image: &RgbaImage) -> ExportResult<Vec<u8>>;
}

impl Encoder for ExportFormat {
    fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Jpeg { .. } => "image/jpeg",
            ExportFormat::Png => "image/png",
        }
    }

    fn encode(&self, image: &RgbaImage) -> ExportResult<Vec<u8>> {
        let mut bytes = Vec::new();
        match *self {
            ExportFormat::Jpeg { quality } => {
                let rgb = flatten_over_black(image);
                JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
                    .encode_image(&rgb)?;
            }
            ExportFormat::Png => {
                PngEncoder::new(&mut bytes).write_image(
                    image.as_raw(),
                    image.width(),
                    image.height(),
                    ExtendedColorType::Rgba8,
                )?;
            }
        }
        Ok(bytes)
    }
}

// straight alpha over black == premultiplied color
fn flatten_over_black(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let mul = |c: u8| ((c as u16 * a as u16 + 127) / 255) as u8;
        image::Rgb([mul(r), mul(g), mul(b)])
    })
}

/// Encoded image bytes, detached from the surface they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Vec<u8>,
    mime_type: &'static str,
}

impl Blob {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Encode whatever `handle` points at when the future first runs.
///
/// Resolves to `Ok(None)` when there is nothing to encode: the surface is gone,
/// has zero area, or the encoder produced no bytes. A surface held mutably at
/// that moment gives `Err(ExportError::Busy)`.
pub fn export(
    handle: SurfaceHandle,
    encoder: Arc<dyn Encoder>,
) -> impl Future<Output = ExportResult<Option<Blob>>> {
    async move {
        let Some(snapshot) = handle.try_snapshot()? else {
            debug!("export skipped, nothing to encode");
            return Ok(None);
        };

        let mime_type = encoder.mime_type();
        let bytes = smol::unblock(move || {
            panic::catch_unwind(AssertUnwindSafe(|| encoder.encode(&snapshot)))
                .unwrap_or_else(|payload| Err(ExportError::Worker(panic_message(&*payload))))
        })
        .await?;

        if bytes.is_empty() {
            return Ok(None);
        }
        debug!(len = bytes.len(), mime_type, "export encoded");
        Ok(Some(Blob { bytes, mime_type }))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "encoder panicked".to_string()
    }
}
