// The raster surface and its renderer.
//
// A `width × height` premultiplied RGBA buffer (tiny-skia's `Pixmap`) plus the
// listener table and on-screen offset that belong to the surface itself.
// A zero-area surface is legal and simply holds no pixels; every drawing call on
// it is a no-op.

use crate::background::Background;
use crate::listeners::ListenerRegistry;
use crate::types::{Color, Offset, Point, StrokeStyle};
use image::RgbaImage;
use std::sync::atomic::{AtomicU64, Ordering};
use tiny_skia::{FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform};
use tracing::{debug, warn};

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

impl SurfaceId {
    fn next() -> Self {
        SurfaceId(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

#[derive(Debug)]
pub struct Surface {
    id: SurfaceId,
    width: u32,
    height: u32,
    pixmap: Option<Pixmap>, // None when width or height is zero
    offset: Offset,
    listeners: ListenerRegistry,
}

impl Surface {
    /// Create a blank (fully transparent) surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            id: SurfaceId::next(),
            width,
            height,
            pixmap: Pixmap::new(width, height),
            offset: Offset::default(),
            listeners: ListenerRegistry::default(),
        }
    }

    /// Stable identity; survives `resize`.
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Raster width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Raster height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Page position of the top-left corner, subtracted from pointer coordinates.
    pub fn offset(&self) -> Offset {
        self.offset
    }

    /// Update the page position after the surface moved on screen.
    pub fn set_offset(&mut self, offset: Offset) {
        self.offset = offset;
    }

    /// Listeners currently attached to this surface.
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.listeners
    }

    /// Reallocate the pixel buffer at a new size. All drawn content is lost;
    /// identity, offset and listeners are kept.
    pub fn resize(&mut self, width: u32, height: u32) {
        debug!(surface = self.id.0, width, height, "surface resized");
        self.width = width;
        self.height = height;
        self.pixmap = Pixmap::new(width, height);
    }

    /// Stroke a single straight segment. Points outside the surface are clipped.
    pub fn draw_segment(&mut self, from: Point, to: Point, style: &StrokeStyle) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };

        // begin path, move, line, close: the closed two-point path gets a join at both ends.
        let mut pb = PathBuilder::new();
        pb.move_to(from.x, from.y);
        pb.line_to(to.x, to.y);
        pb.close();
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(style.color.into());
        paint.anti_alias = true;

        let stroke = Stroke {
            width: style.width,
            line_join: style.join.into(),
            ..Stroke::default()
        };

        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    /// Full overwrite: clear, then stretch `background` (if any) over the whole surface.
    pub fn composite(&mut self, background: Option<&Background>) {
        let (width, height) = (self.width, self.height);
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        pixmap.fill(tiny_skia::Color::TRANSPARENT);

        let Some(background) = background else {
            debug!(surface = self.id.0, "composited blank");
            return;
        };

        if !background.fits(width, height) {
            warn!(
                natural_width = background.natural_width(),
                natural_height = background.natural_height(),
                width,
                height,
                "background aspect ratio differs from surface, image will be stretched"
            );
        }

        let src = background.pixmap();
        let sx = width as f32 / src.width() as f32;
        let sy = height as f32 / src.height() as f32;
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        pixmap.draw_pixmap(0, 0, src.as_ref(), &paint, Transform::from_scale(sx, sy), None);
        debug!(surface = self.id.0, "composited background");
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(tiny_skia::Color::TRANSPARENT);
        }
    }

    /// Straight-alpha color at (x, y), or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        // Pixmap::pixel only bounds-checks the linear index.
        if x >= self.width || y >= self.height {
            return None;
        }
        let px = self.pixmap.as_ref()?.pixel(x, y)?.demultiply();
        Some(Color::rgba(px.red(), px.green(), px.blue(), px.alpha()))
    }

    /// True when every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        match &self.pixmap {
            Some(pixmap) => pixmap.pixels().iter().all(|p| p.alpha() == 0),
            None => true,
        }
    }

    /// Copy the raster out as straight-alpha RGBA. `None` for a zero-area surface.
    pub fn snapshot(&self) -> Option<RgbaImage> {
        let pixmap = self.pixmap.as_ref()?;
        let mut data = Vec::with_capacity(pixmap.data().len());
        for px in pixmap.pixels() {
            let c = px.demultiply();
            data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        RgbaImage::from_raw(self.width, self.height, data)
    }
}
