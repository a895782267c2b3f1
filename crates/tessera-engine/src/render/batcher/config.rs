use anyhow::Result;

use super::geometry::INDICES_PER_QUAD;

/// Default number of quads per draw call.
pub const MAX_BATCH_SIZE: u32 = 2048;

/// Texture batcher configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BatcherConfig {
    /// Quads per draw call. GPU buffers and scratch arrays are sized for this.
    pub max_batch_size: u32,
}

impl Default for BatcherConfig {
    fn default() -> Self {
        Self { max_batch_size: MAX_BATCH_SIZE }
    }
}

impl BatcherConfig {
    pub(super) fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.max_batch_size > 0, "max_batch_size must be at least 1");
        anyhow::ensure!(
            u64::from(self.max_batch_size) * INDICES_PER_QUAD as u64 <= u64::from(u32::MAX),
            "max_batch_size {} exceeds the 32-bit index range",
            self.max_batch_size
        );
        Ok(())
    }
}
