/// How a variable read before any assignment on the current path is resolved.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum UnboundRead {
    /// Reads as the variable's own unbounded seed input.
    #[default]
    Unconstrained,
    /// Reads as the constant `0`.
    Zero,
}

/// Engine configuration.
///
/// ```
/// use symex_rs::config::{EngineConfig, UnboundRead};
///
/// let config = EngineConfig::default()
///     .with_max_paths(Some(64))
///     .with_unbound(UnboundRead::Zero);
/// assert_eq!(config.max_paths, Some(64));
/// ```
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EngineConfig {
    /// Upper bound on live paths in any generation, `None` for no limit.
    pub max_paths: Option<usize>,
    pub unbound: UnboundRead,
}

impl EngineConfig {
    pub const DEFAULT_MAX_PATHS: usize = 1 << 16;

    pub fn with_max_paths(mut self, max_paths: Option<usize>) -> Self {
        self.max_paths = max_paths;
        self
    }

    pub fn with_unbound(mut self, unbound: UnboundRead) -> Self {
        self.unbound = unbound;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_paths: Some(Self::DEFAULT_MAX_PATHS),
            unbound: UnboundRead::default(),
        }
    }
}
