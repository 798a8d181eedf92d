//! Drawing surface and 2D paint context traits
//!
//! A surface owns pixel dimensions and hands out a paint context. The
//! animation only ever talks to these traits, so it can render into the
//! software `PixelBuffer`, a recording context in tests, or anything else.

use crate::palette::{Color, RadialGradient};

/// Paint operations consumed by one animation frame
pub trait PaintContext {
    /// Fill an axis-aligned rectangle with `color` at opacity `alpha` (0..=1).
    /// Not affected by the global alpha.
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color, alpha: f32);

    /// Set the opacity applied to subsequent gradient fills
    fn set_global_alpha(&mut self, alpha: f32);

    fn global_alpha(&self) -> f32;

    /// Fill a disc centered at (cx, cy) with a radial gradient, at the
    /// current global alpha. Radius <= 0 or alpha <= 0 paints nothing.
    fn fill_circle_gradient(&mut self, cx: f32, cy: f32, radius: f32, gradient: &RadialGradient);
}

/// A drawable surface with mutable pixel dimensions
pub trait Surface {
    type Context: PaintContext;

    fn size(&self) -> (u32, u32);

    /// Resize the backing store; contents after a resize are unspecified
    fn set_size(&mut self, width: u32, height: u32);

    /// The 2D paint context, or `None` if this surface cannot provide one
    fn context_2d(&mut self) -> Option<&mut Self::Context>;
}
