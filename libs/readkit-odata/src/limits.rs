//! Input caps for read-query translation.
//!
//! Sane caps against resource exhaustion: maximum `$top` value and maximum
//! number of `$orderby` segments. Both are checked before any store query
//! is built.

use crate::Error;

/// Default configuration for read-query input limits.
#[derive(Debug, Clone)]
pub struct ReadLimits {
    /// Maximum value for $top (default: 1000)
    pub max_top: u64,
    /// Maximum number of segments in $orderby (default: 5)
    pub max_orderby_fields: usize,
}

impl Default for ReadLimits {
    fn default() -> Self {
        Self {
            max_top: 1000,
            max_orderby_fields: 5,
        }
    }
}

impl ReadLimits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum $top value.
    #[must_use]
    pub fn with_max_top(mut self, max_top: u64) -> Self {
        self.max_top = max_top;
        self
    }

    /// Set maximum number of $orderby segments.
    #[must_use]
    pub fn with_max_orderby_fields(mut self, max: usize) -> Self {
        self.max_orderby_fields = max;
        self
    }

    /// Validate a $top value against limits.
    ///
    /// # Errors
    /// Returns `Error::InvalidLimit` if the value exceeds `max_top`.
    pub fn validate_top(&self, top: u64) -> Result<(), Error> {
        if top > self.max_top {
            return Err(Error::InvalidLimit);
        }
        Ok(())
    }

    /// Validate the number of $orderby segments.
    ///
    /// # Errors
    /// Returns `Error::InvalidOrderByField` if the count exceeds the cap.
    pub fn validate_orderby_count(&self, count: usize) -> Result<(), Error> {
        if count > self.max_orderby_fields {
            return Err(Error::InvalidOrderByField(format!(
                "too many orderby segments (max: {})",
                self.max_orderby_fields
            )));
        }
        Ok(())
    }
}
