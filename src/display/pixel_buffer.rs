use super::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use crate::palette::{Color, RadialGradient};
use crate::surface::{PaintContext, Surface};

// ============================================================================
// Utility Functions
// ============================================================================

/// Alpha blend a single color channel
/// Uses fast approximation: (x + 1 + (x >> 8)) >> 8 instead of x / 255
#[inline]
fn blend_channel(src: u8, dst: u8, alpha: u16) -> u8 {
    let result = src as u16 * alpha + dst as u16 * (255 - alpha);
    ((result + 1 + (result >> 8)) >> 8) as u8
}

/// Map a 0..=1 opacity onto 0..=255 (NaN and negatives become 0)
#[inline]
fn alpha_to_u8(alpha: f32) -> u8 {
    if alpha > 0.0 {
        (alpha.min(1.0) * 255.0).round() as u8
    } else {
        0
    }
}

// ============================================================================
// PixelBuffer
// ============================================================================

/// RGBA8888 pixel buffer for software rendering
/// Byte order per pixel is A, B, G, R (SDL RGBA8888 on little-endian)
pub struct PixelBuffer {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    global_alpha: f32,
}

impl PixelBuffer {
    /// Create a new pixel buffer with default resolution (800x600)
    pub fn new() -> Self {
        Self::with_size(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }

    /// Create a new pixel buffer with custom resolution
    pub fn with_size(width: u32, height: u32) -> Self {
        let mut buffer = Self {
            pixels: vec![0; (width as usize) * (height as usize) * 4],
            width,
            height,
            global_alpha: 1.0,
        };
        buffer.clear(0, 0, 0);
        buffer
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocate for new dimensions; contents are cleared to black
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == self.width && height == self.height {
            return;
        }
        self.width = width;
        self.height = height;
        self.pixels = vec![0; (width as usize) * (height as usize) * 4];
        self.clear(0, 0, 0);
    }

    /// Check if coordinates are within bounds
    #[inline]
    fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32
    }

    /// Calculate byte offset for pixel at (x, y)
    #[inline]
    fn pixel_index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }

    /// Clear to a solid color
    /// Optimized: uses u32 fill for maximum speed
    pub fn clear(&mut self, r: u8, g: u8, b: u8) {
        // Create ABGR u32 pattern
        let pixel = u32::from_ne_bytes([255, b, g, r]);

        // Safety: pixels.len() is always divisible by 4 (width * height * 4).
        // We use write_unaligned to avoid assuming alignment of Vec<u8>.
        let ptr = self.pixels.as_mut_ptr() as *mut u32;
        let len = self.pixels.len() / 4;

        for i in 0..len {
            // Safety: i < len keeps every write inside the allocation
            unsafe {
                ptr.add(i).write_unaligned(pixel);
            }
        }
    }

    /// Read a pixel from the buffer (bounds checked)
    /// Returns None if coordinates are out of bounds
    #[inline]
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<(u8, u8, u8)> {
        if self.in_bounds(x, y) {
            let idx = self.pixel_index(x as u32, y as u32);
            Some((
                self.pixels[idx + 3], // R
                self.pixels[idx + 2], // G
                self.pixels[idx + 1], // B
            ))
        } else {
            None
        }
    }

    /// Draw a horizontal line with alpha blending
    pub fn hline_blend(&mut self, x1: i32, x2: i32, y: i32, r: u8, g: u8, b: u8, a: u8) {
        if y < 0 || y >= self.height as i32 {
            return;
        }
        let (x1, x2) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        let start = x1.max(0);
        let end = x2.min(self.width as i32 - 1);
        if start > end {
            return;
        }

        let alpha = a as u16;
        let mut idx = self.pixel_index(start as u32, y as u32);
        let count = (end - start + 1) as usize;
        for _ in 0..count {
            self.pixels[idx] = 255;
            self.pixels[idx + 1] = blend_channel(b, self.pixels[idx + 1], alpha);
            self.pixels[idx + 2] = blend_channel(g, self.pixels[idx + 2], alpha);
            self.pixels[idx + 3] = blend_channel(r, self.pixels[idx + 3], alpha);
            idx += 4;
        }
    }

    /// Fill a rectangle with alpha blending
    pub fn fill_rect_blend(&mut self, x: i32, y: i32, w: u32, h: u32, r: u8, g: u8, b: u8, a: u8) {
        if w == 0 || a == 0 {
            return;
        }
        let y_start = y.max(0);
        let y_end = y.saturating_add(h as i32).min(self.height as i32);
        for row in y_start..y_end {
            self.hline_blend(x, x.saturating_add(w as i32 - 1), row, r, g, b, a);
        }
    }

    /// Filled disc shaded by a radial gradient, alpha blended over the buffer.
    /// Pixels are sampled at their centers, so sub-pixel positions are honored.
    pub fn fill_circle_radial(&mut self, cx: f32, cy: f32, radius: f32, gradient: &RadialGradient, a: u8) {
        if !(radius > 0.0) || a == 0 {
            return;
        }
        let r_sq = radius * radius;

        let y_start = ((cy - radius).floor() as i32).max(0);
        let y_end = ((cy + radius).ceil() as i32).min(self.height as i32 - 1);
        let x_start = ((cx - radius).floor() as i32).max(0);
        let x_end = ((cx + radius).ceil() as i32).min(self.width as i32 - 1);

        let alpha = a as u16;
        for y in y_start..=y_end {
            let dy = y as f32 + 0.5 - cy;
            let dy_sq = dy * dy;
            for x in x_start..=x_end {
                let dx = x as f32 + 0.5 - cx;
                let dist_sq = dx * dx + dy_sq;
                if dist_sq > r_sq {
                    continue;
                }

                let c = gradient.color_at_distance(dist_sq.sqrt());
                let idx = self.pixel_index(x as u32, y as u32);
                self.pixels[idx] = 255;
                self.pixels[idx + 1] = blend_channel(c.b, self.pixels[idx + 1], alpha);
                self.pixels[idx + 2] = blend_channel(c.g, self.pixels[idx + 2], alpha);
                self.pixels[idx + 3] = blend_channel(c.r, self.pixels[idx + 3], alpha);
            }
        }
    }

    /// Raw bytes for SDL texture upload
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

impl Default for PixelBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl PaintContext for PixelBuffer {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, alpha: f32) {
        if !(w > 0.0 && h > 0.0) {
            return;
        }
        self.fill_rect_blend(
            x.floor() as i32,
            y.floor() as i32,
            w.ceil() as u32,
            h.ceil() as u32,
            color.r,
            color.g,
            color.b,
            alpha_to_u8(alpha),
        );
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.global_alpha = alpha;
    }

    fn global_alpha(&self) -> f32 {
        self.global_alpha
    }

    fn fill_circle_gradient(&mut self, cx: f32, cy: f32, radius: f32, gradient: &RadialGradient) {
        let a = alpha_to_u8(self.global_alpha);
        self.fill_circle_radial(cx, cy, radius, gradient, a);
    }
}

impl Surface for PixelBuffer {
    type Context = Self;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.resize(width, height);
    }

    fn context_2d(&mut self) -> Option<&mut Self> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::ColorScheme;

    #[test]
    fn test_new_buffer_is_black() {
        let buf = PixelBuffer::with_size(4, 3);
        assert_eq!(buf.as_bytes().len(), 4 * 3 * 4);
        assert_eq!(buf.get_pixel(3, 2), Some((0, 0, 0)));
        assert_eq!(buf.get_pixel(4, 0), None);
    }

    #[test]
    fn test_default_buffer_matches_window_default() {
        let buf = PixelBuffer::new();
        assert_eq!((buf.width(), buf.height()), (DEFAULT_WIDTH, DEFAULT_HEIGHT));
        assert_eq!((buf.width(), buf.height()), (800, 600));
    }

    #[test]
    fn test_full_alpha_rect_overwrites() {
        let mut buf = PixelBuffer::with_size(8, 8);
        buf.fill_rect(2.0, 2.0, 3.0, 3.0, Color::rgb(255, 102, 0), 1.0);
        assert_eq!(buf.get_pixel(2, 2), Some((255, 102, 0)));
        assert_eq!(buf.get_pixel(4, 4), Some((255, 102, 0)));
        assert_eq!(buf.get_pixel(5, 5), Some((0, 0, 0)));
    }

    #[test]
    fn test_fade_wash_darkens_gradually() {
        let mut buf = PixelBuffer::with_size(2, 2);
        buf.clear(200, 200, 200);
        buf.fill_rect(0.0, 0.0, 2.0, 2.0, Color::BLACK, 0.1);
        let (r, _, _) = buf.get_pixel(0, 0).unwrap();
        assert!(r < 200 && r > 170, "r = {}", r);

        for _ in 0..200 {
            buf.fill_rect(0.0, 0.0, 2.0, 2.0, Color::BLACK, 0.1);
        }
        assert_eq!(buf.get_pixel(1, 1), Some((0, 0, 0)));
    }

    #[test]
    fn test_rect_clipped_to_bounds() {
        let mut buf = PixelBuffer::with_size(4, 4);
        buf.fill_rect(-10.0, -10.0, 100.0, 100.0, Color::rgb(9, 9, 9), 1.0);
        assert_eq!(buf.get_pixel(0, 0), Some((9, 9, 9)));
        assert_eq!(buf.get_pixel(3, 3), Some((9, 9, 9)));
    }

    #[test]
    fn test_gradient_disc_center_and_edge() {
        let mut buf = PixelBuffer::with_size(41, 41);
        let scheme = ColorScheme::fire();
        let gradient = scheme.gradient(20.5, 20.5, 20.0);
        buf.set_global_alpha(1.0);
        buf.fill_circle_gradient(20.5, 20.5, 20.0, &gradient);

        // pixel (20, 20) is sampled exactly at the center
        let c = scheme.colors[0];
        assert_eq!(buf.get_pixel(20, 20), Some((c.r, c.g, c.b)));
        // corners are outside the disc
        assert_eq!(buf.get_pixel(0, 0), Some((0, 0, 0)));
        // halfway out blends toward the middle stop
        let (r, g, _) = buf.get_pixel(30, 20).unwrap();
        assert_eq!(r, 255);
        assert!(g > 0x33 && g <= 0x66);
    }

    #[test]
    fn test_zero_alpha_or_radius_paints_nothing() {
        let mut buf = PixelBuffer::with_size(10, 10);
        let gradient = ColorScheme::fire().gradient(5.0, 5.0, 4.0);
        buf.set_global_alpha(0.0);
        buf.fill_circle_gradient(5.0, 5.0, 4.0, &gradient);
        buf.set_global_alpha(-0.5);
        buf.fill_circle_gradient(5.0, 5.0, 4.0, &gradient);
        buf.set_global_alpha(1.0);
        buf.fill_circle_gradient(5.0, 5.0, 0.0, &gradient);
        buf.fill_circle_gradient(5.0, 5.0, -3.0, &gradient);
        for y in 0..10 {
            for x in 0..10 {
                assert_eq!(buf.get_pixel(x, y), Some((0, 0, 0)));
            }
        }
    }

    #[test]
    fn test_surface_resize() {
        let mut buf = PixelBuffer::with_size(10, 10);
        buf.set_size(20, 5);
        assert_eq!(buf.size(), (20, 5));
        assert_eq!(buf.as_bytes().len(), 20 * 5 * 4);
        assert!(buf.context_2d().is_some());
    }
}
