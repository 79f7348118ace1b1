use crate::error::ConfigError;

/// Backlog length at which an inbox logs a warning.
pub const DEFAULT_BACKLOG_WARNING: usize = 4096;

/// Inline drain nesting on one thread at which a warning is logged.
pub const DEFAULT_INLINE_DEPTH_WARNING: usize = 256;

/// Per-inbox settings.
///
/// None of these change delivery semantics. They only name the inbox in log
/// output and decide when to warn about growth that usually means trouble.
#[derive(Clone, Debug)]
pub struct InboxConfig {
    /// Human-readable name attached to log events.
    pub name: Option<String>,

    /// Warn once the pending queue reaches this many operations.
    /// `None` disables the warning.
    pub backlog_warning: Option<usize>,

    /// Warn once this thread nests more than this many drains inside each
    /// other (each level is a stack frame chain). `None` disables the warning.
    pub inline_depth_warning: Option<usize>,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self {
            name: None,
            backlog_warning: Some(DEFAULT_BACKLOG_WARNING),
            inline_depth_warning: Some(DEFAULT_INLINE_DEPTH_WARNING),
        }
    }
}

impl InboxConfig {
    /// Default configuration carrying a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_backlog_warning(mut self, threshold: Option<usize>) -> Self {
        self.backlog_warning = threshold;
        self
    }

    pub fn with_inline_depth_warning(mut self, threshold: Option<usize>) -> Self {
        self.inline_depth_warning = threshold;
        self
    }

    /// Checks that thresholds are usable and the name, if set, is not blank.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if matches!(self.name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(ConfigError::EmptyName);
        }
        if self.backlog_warning == Some(0) {
            return Err(ConfigError::ZeroThreshold { field: "backlog_warning" });
        }
        if self.inline_depth_warning == Some(0) {
            return Err(ConfigError::ZeroThreshold { field: "inline_depth_warning" });
        }
        Ok(())
    }
}
