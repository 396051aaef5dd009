//! Compile and match options.

/// Options controlling compilation and the default matching mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Report exported rules that have no registered builder
    pub warn_unimplemented_builder: bool,
    /// Do not report registered builders that no rule exports
    pub ignore_extra_builder: bool,
    /// Report rules that no other rule references (`main` excepted)
    pub warn_unused_rule: bool,
    /// Resolve unknown identifiers to `any` instead of reporting them
    pub bypass_missing_rule: bool,
    /// Stop compiling at the first schema error
    pub stop_at_first_schema_error: bool,
    /// Stop matching at the first content error
    pub stop_at_first_content_error: bool,
}

impl Options {
    /// Default options: accumulate every error, report extra builders
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `warn_unimplemented_builder`
    #[must_use]
    pub fn with_warn_unimplemented_builder(mut self, value: bool) -> Self {
        self.warn_unimplemented_builder = value;
        self
    }

    /// Set `ignore_extra_builder`
    #[must_use]
    pub fn with_ignore_extra_builder(mut self, value: bool) -> Self {
        self.ignore_extra_builder = value;
        self
    }

    /// Set `warn_unused_rule`
    #[must_use]
    pub fn with_warn_unused_rule(mut self, value: bool) -> Self {
        self.warn_unused_rule = value;
        self
    }

    /// Set `bypass_missing_rule`
    #[must_use]
    pub fn with_bypass_missing_rule(mut self, value: bool) -> Self {
        self.bypass_missing_rule = value;
        self
    }

    /// Set `stop_at_first_schema_error`
    #[must_use]
    pub fn with_stop_at_first_schema_error(mut self, value: bool) -> Self {
        self.stop_at_first_schema_error = value;
        self
    }

    /// Set `stop_at_first_content_error`
    #[must_use]
    pub fn with_stop_at_first_content_error(mut self, value: bool) -> Self {
        self.stop_at_first_content_error = value;
        self
    }
}
