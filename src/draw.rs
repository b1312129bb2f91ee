// Window + software drawing utilities for the viewer.
// 1) A window that shows the page: white paper with the canvas placed on it.
// 2) Mouse/keyboard polling, turned into pointer events by main.rs.
// 3) A crosshair that follows the mouse.

use image::RgbaImage;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("window init error: {0}")]
    WindowInit(String),
    #[error("window update error: {0}")]
    WindowUpdate(String),
    #[error(transparent)]
    Config(#[from] sketchpad::ConfigError),
    #[error(transparent)]
    Background(#[from] sketchpad::BackgroundError),
}

/// What the window shows: one 0x00RRGGBB word per pixel.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    /// Black buffer of the given size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }

    /// Paint every pixel with `color`.
    pub fn fill(&mut self, color: u32) {
        self.pixels.fill(color);
    }

    /// Blend a straight-alpha image over the current contents, top-left at (x0, y0).
    pub fn blit_rgba(&mut self, image: &RgbaImage, x0: usize, y0: usize) {
        for (x, y, px) in image.enumerate_pixels() {
            let (dx, dy) = (x0 + x as usize, y0 + y as usize);
            if dx >= self.width || dy >= self.height {
                continue;
            }
            let idx = dy * self.width + dx;
            let dst = self.pixels[idx];
            let [r, g, b, a] = px.0;
            let a = a as u32;
            let mix = |src: u8, shift: u32| {
                let d = (dst >> shift) & 0xFF;
                (src as u32 * a + d * (255 - a) + 127) / 255
            };
            self.pixels[idx] = (mix(r, 16) << 16) | (mix(g, 8) << 8) | mix(b, 0);
        }
    }
}

/// The viewer window plus input polling.
pub struct Drawer {
    window: Window,
}

impl Drawer {
    /// Open a window of `width × height` pixels, capped at 60 FPS.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, ViewerError> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| ViewerError::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    /// Push a finished frame to the screen. Also pumps window events.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), ViewerError> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| ViewerError::WindowUpdate(e.to_string()))
    }

    /// False once the user closed the window.
    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    /// ESC held: quit.
    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Mouse position in window pixels; `None` while the cursor is outside the window.
    pub fn mouse_pos(&self) -> Option<(f32, f32)> {
        self.window.get_mouse_pos(MouseMode::Discard)
    }

    /// True while the left button is held (paints).
    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    /// Edge-triggered C: clear the drawing.
    pub fn c_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::C, KeyRepeat::No)
    }

    /// Edge-triggered S: save the drawing.
    pub fn s_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::S, KeyRepeat::No)
    }
}

/* ---------- Software drawing: pixels, lines, crosshair ---------- */

/// Write one pixel; anything off-screen is dropped.
#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    fb.pixels[y * fb.width + x] = color;
}

/// Bresenham, 1px wide.
fn draw_line(fb: &mut FrameBuffer, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(fb, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// A "+" with a small gap in the middle, centered at (cx, cy).
pub fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: u32) {
    draw_line(fb, cx - size, cy, cx - 2, cy, color);
    draw_line(fb, cx + 2, cy, cx + size, cy, color);
    draw_line(fb, cx, cy - size, cx, cy - 2, color);
    draw_line(fb, cx, cy + 2, cx, cy + size, color);
    put_pixel(fb, cx, cy, color);
}

/// 1px frame just outside the given rectangle, so the canvas edge is visible on white paper.
pub fn draw_frame(fb: &mut FrameBuffer, x: i32, y: i32, width: i32, height: i32, color: u32) {
    let (l, t, r, b) = (x - 1, y - 1, x + width, y + height);
    draw_line(fb, l, t, r, t, color);
    draw_line(fb, l, b, r, b, color);
    draw_line(fb, l, t, l, b, color);
    draw_line(fb, r, t, r, b, color);
}
