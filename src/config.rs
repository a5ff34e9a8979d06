//! Bridge configuration.

/// Builder-style configuration for a [`Bridge`](crate::Bridge).
///
/// # Example
///
/// ```
/// use kitbridge::{Bridge, BridgeConfig};
///
/// let config = BridgeConfig::new()
///     .with_registry_capacity(256)
///     .with_wrapper_capacity(256)
///     .with_audit(true);
/// let bridge = Bridge::with_config(config);
/// assert!(bridge.config().audit());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    registry_capacity: usize,
    wrapper_capacity: usize,
    audit: bool,
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self {
            registry_capacity: 0,
            wrapper_capacity: 0,
            audit: false,
        }
    }

    /// Pre-size the registry for this many bridged pairs.
    pub fn with_registry_capacity(mut self, capacity: usize) -> Self {
        self.registry_capacity = capacity;
        self
    }

    /// Pre-size the wrapper heap for this many wrappers.
    pub fn with_wrapper_capacity(mut self, capacity: usize) -> Self {
        self.wrapper_capacity = capacity;
        self
    }

    /// Re-check the bridge invariants after every mutating operation.
    ///
    /// Only takes effect in builds with debug assertions; a failed check panics.
    pub fn with_audit(mut self, audit: bool) -> Self {
        self.audit = audit;
        self
    }

    pub fn registry_capacity(&self) -> usize {
        self.registry_capacity
    }

    pub fn wrapper_capacity(&self) -> usize {
        self.wrapper_capacity
    }

    pub fn audit(&self) -> bool {
        self.audit
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self::new()
    }
}
