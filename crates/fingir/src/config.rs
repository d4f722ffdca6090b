//! Collection construction options.

use serde::{Deserialize, Serialize};

/// Default delay before a deferred attachment resolves, in virtual
/// milliseconds
pub const DEFAULT_RESOLUTION_DELAY_MS: u64 = 100;

/// Options for collection construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Replace inserted attachments with delayed payload wrappers,
    /// emulating a reload-from-storage scenario
    pub simulate_deferred_resolution: bool,
    /// Delay before a deferred attachment resolves, in virtual milliseconds
    pub resolution_delay_ms: u64,
    /// Whether mutation-interface calls write through to the backing
    /// collection. Disabled for spy-only recording.
    pub write_through: bool,
}

impl CollectionConfig {
    /// Immediate-resolution options (the default): attachments are stored
    /// as inserted, mutations write through
    #[must_use]
    pub fn new() -> Self {
        Self {
            simulate_deferred_resolution: false,
            resolution_delay_ms: DEFAULT_RESOLUTION_DELAY_MS,
            write_through: true,
        }
    }

    /// Deferred-resolution options with the default delay
    #[must_use]
    pub fn deferred() -> Self {
        Self {
            simulate_deferred_resolution: true,
            ..Self::new()
        }
    }

    /// Set the resolution delay
    #[must_use]
    pub fn delay_ms(mut self, resolution_delay_ms: u64) -> Self {
        self.resolution_delay_ms = resolution_delay_ms;
        self
    }

    /// Set whether mutations write through to the backing collection
    #[must_use]
    pub fn write_through(mut self, write_through: bool) -> Self {
        self.write_through = write_through;
        self
    }

    /// Record mutation calls without mutating the backing collection
    #[must_use]
    pub fn spy_only(self) -> Self {
        self.write_through(false)
    }
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self::new()
    }
}
