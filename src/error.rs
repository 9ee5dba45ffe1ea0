//! Error handling for the stripevec library
//!
//! This module provides detailed error information for all container and
//! lock-strategy operations.

use thiserror::Error;

/// Main error type for the stripevec library
#[derive(Error, Debug)]
pub enum StripeVecError {
    /// Index out of bounds access
    #[error("Out of bounds: index {index}, size {size}")]
    OutOfBounds {
        /// The invalid index
        index: usize,
        /// The valid size/length
        size: usize,
    },

    /// A non-blocking acquisition could not proceed immediately
    #[error("Would block: {resource}")]
    WouldBlock {
        /// Description of the contended resource
        resource: String,
    },

    /// Malformed half-open range passed to a batch operation
    #[error("Invalid range: [{start}, {end}) against size {size}")]
    InvalidRange {
        /// Start of the half-open range
        start: usize,
        /// End of the half-open range
        end: usize,
        /// The valid size/length
        size: usize,
    },

    /// Configuration or parameter errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        /// Configuration error message
        message: String,
    },
}

impl StripeVecError {
    /// Create an out of bounds error
    pub fn out_of_bounds(index: usize, size: usize) -> Self {
        Self::OutOfBounds { index, size }
    }

    /// Create a would-block error
    pub fn would_block<S: Into<String>>(resource: S) -> Self {
        Self::WouldBlock {
            resource: resource.into(),
        }
    }

    /// Create an invalid range error
    pub fn invalid_range(start: usize, end: usize, size: usize) -> Self {
        Self::InvalidRange { start, end, size }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// `WouldBlock` is a normal control-flow outcome of the `try_*` family:
    /// retrying after the contended lock is released is expected to succeed.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::WouldBlock { .. } => true,
            Self::OutOfBounds { .. } => false,
            Self::InvalidRange { .. } => false,
            Self::Configuration { .. } => false,
        }
    }

    /// Get the error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            Self::OutOfBounds { .. } => "bounds",
            Self::WouldBlock { .. } => "contention",
            Self::InvalidRange { .. } => "range",
            Self::Configuration { .. } => "config",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, StripeVecError>;

/// Assert that an index is within bounds
#[inline]
pub fn check_bounds(index: usize, size: usize) -> Result<()> {
    if index >= size {
        Err(StripeVecError::out_of_bounds(index, size))
    } else {
        Ok(())
    }
}

/// Assert that a half-open range `[start, end)` is non-empty and within bounds
#[inline]
pub fn check_range(start: usize, end: usize, size: usize) -> Result<()> {
    if start >= end || end > size {
        Err(StripeVecError::invalid_range(start, end, size))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = StripeVecError::out_of_bounds(10, 5);
        assert_eq!(err.category(), "bounds");
        assert!(!err.is_recoverable());

        let err = StripeVecError::would_block("stripe 3");
        assert_eq!(err.category(), "contention");
        assert!(err.is_recoverable());

        let err = StripeVecError::invalid_range(8, 2, 10);
        assert_eq!(err.category(), "range");
        assert!(!err.is_recoverable());

        let err = StripeVecError::configuration("stripe count must be > 0");
        assert_eq!(err.category(), "config");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_bounds_checking() {
        assert!(check_bounds(5, 10).is_ok());
        assert!(check_bounds(10, 10).is_err());
        assert!(check_bounds(11, 10).is_err());
        assert!(check_bounds(0, 0).is_err());
    }

    #[test]
    fn test_range_checking() {
        assert!(check_range(2, 8, 10).is_ok());
        assert!(check_range(0, 10, 10).is_ok());
        assert!(check_range(8, 2, 10).is_err()); // start > end
        assert!(check_range(5, 5, 10).is_err()); // empty range
        assert!(check_range(2, 15, 10).is_err()); // end > size
    }

    #[test]
    fn test_error_display() {
        let err = StripeVecError::out_of_bounds(10, 5);
        let display = format!("{}", err);
        assert!(display.contains("Out of bounds"));
        assert!(display.contains("10"));
        assert!(display.contains("5"));

        let err = StripeVecError::invalid_range(4, 2, 8);
        let display = format!("{}", err);
        assert!(display.contains("Invalid range"));
        assert!(display.contains("[4, 2)"));
    }
}
