use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a texture resource.
///
/// Two textures compare equal only if one is a clone of the other, never
/// because their pixels match.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct TextureId(u64);

static NEXT_TEXTURE_ID: AtomicU64 = AtomicU64::new(1);

impl TextureId {
    /// Allocates a process-unique id.
    pub fn next() -> Self {
        Self(NEXT_TEXTURE_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// A texture that can be bound for drawing.
pub trait TextureHandle {
    fn id(&self) -> TextureId;
}
