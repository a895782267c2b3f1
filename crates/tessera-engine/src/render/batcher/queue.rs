use crate::coords::{ColorRgba, Vec2};

/// One queued textured quad.
///
/// Corners are independent, so the quad may be rotated, skewed or mirrored.
/// `texture` is a handle; the texture itself is owned elsewhere.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawRequest<T> {
    pub texture: T,
    pub top_left: Vec2,
    pub top_right: Vec2,
    pub bottom_left: Vec2,
    pub bottom_right: Vec2,
    pub tint: ColorRgba,
}

/// Draw requests for the current frame, in submission order.
///
/// Append-only until drained. Draining keeps the allocation for the next frame.
#[derive(Debug)]
pub struct DrawQueue<T> {
    items: Vec<DrawRequest<T>>,
}

impl<T> Default for DrawQueue<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> DrawQueue<T> {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn enqueue(&mut self, request: DrawRequest<T>) {
        self.items.push(request);
    }

    /// Removes every queued request, yielding them in submission order.
    ///
    /// The queue is empty once the iterator is dropped, even if it was not
    /// fully consumed.
    #[inline]
    pub fn drain_all(&mut self) -> std::vec::Drain<'_, DrawRequest<T>> {
        self.items.drain(..)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
