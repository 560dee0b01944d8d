#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Collision policy for [`StoreStack::add_store_at_pointer`](crate::StoreStack::add_store_at_pointer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct AllocOptions {
    /// Replace a store already allocated at the pointer. Its observers are
    /// dropped along with it.
    pub override_existing: bool,
    /// Log a warning before failing on a collision.
    pub verbose: bool,
}

impl AllocOptions {
    pub fn overriding() -> Self {
        Self {
            override_existing: true,
            verbose: false,
        }
    }

    pub fn with_override(mut self, override_existing: bool) -> Self {
        self.override_existing = override_existing;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Options for [`StoreStack::remove_store`](crate::StoreStack::remove_store).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct RemoveOptions {
    /// Log a warning before failing on an unallocated pointer.
    pub verbose: bool,
}

impl RemoveOptions {
    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}
