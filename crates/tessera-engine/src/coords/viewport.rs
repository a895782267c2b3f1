/// Viewport size in pixels.
///
/// The batcher builds its screen projection from this each dispatch.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Returns a viewport whose dimensions are finite and at least one pixel.
    #[inline]
    pub fn clamped(self) -> Self {
        let fix = |v: f32| if v.is_finite() { v.max(1.0) } else { 1.0 };
        Self::new(fix(self.width), fix(self.height))
    }
}

impl From<(u32, u32)> for Viewport {
    #[inline]
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f32, height as f32)
    }
}
