//! # Error Types
//!
//! Domain-specific error types for quill-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Error Types                             │
//! │                                                                 │
//! │  quill-core errors (this file)                                  │
//! │  ├── NumberError       - Document number parse failures         │
//! │  ├── AllocationError   - Sequence allocation failures           │
//! │  └── ValidationError   - Input validation failures              │
//! │                                                                 │
//! │  quill-db errors (separate crate)                               │
//! │  └── DbError           - Database operation failures            │
//! │                                                                 │
//! │  Flow: ValidationError / AllocationError → DbError → caller     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (prefix, attempt count, field)
//! 3. Errors are enum variants, never String
//! 4. Backing-store errors propagate unchanged through `AllocationError`

use thiserror::Error;

// =============================================================================
// Number Error
// =============================================================================

/// Errors produced when parsing a document number or its prefix.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NumberError {
    /// Prefix is not in the closed set of supported document types.
    #[error("unsupported document type: {0}")]
    UnsupportedKind(String),

    /// String does not match the `PREFIX-YYYY-NNN` shape.
    #[error("malformed document number: {0}")]
    Malformed(String),
}

// =============================================================================
// Allocation Error
// =============================================================================

/// Errors produced by the sequence allocator.
///
/// Generic over the backend's error type so that backing-store failures
/// are propagated as-is: the allocator never masks or retries
/// infrastructure errors (retry policy for those belongs to the caller).
#[derive(Debug, Error)]
pub enum AllocationError<E> {
    /// The requested document type is outside `{INV, QTN}`.
    ///
    /// Raised before any store access; the counter is never touched.
    #[error("unsupported document type: {0}")]
    UnsupportedKind(String),

    /// Every candidate within the attempt budget collided with an
    /// existing document. The counter has been advanced once per attempt;
    /// burned values are never reclaimed.
    #[error("could not allocate a free document number after {attempts} attempts")]
    Exhausted { attempts: u32 },

    /// Backing-store failure during the atomic increment or the
    /// existence check, propagated unchanged.
    #[error(transparent)]
    Backend(#[from] E),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a document draft doesn't meet requirements.
/// Used for early validation before any persistence runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: &'static str },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: &'static str },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: &'static str, min: i64, max: i64 },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_error_messages() {
        let err = NumberError::UnsupportedKind("RCT".to_string());
        assert_eq!(err.to_string(), "unsupported document type: RCT");

        let err = NumberError::Malformed("INV_2025_001".to_string());
        assert_eq!(err.to_string(), "malformed document number: INV_2025_001");
    }

    #[test]
    fn test_allocation_error_messages() {
        let err: AllocationError<NumberError> = AllocationError::Exhausted { attempts: 10 };
        assert_eq!(
            err.to_string(),
            "could not allocate a free document number after 10 attempts"
        );
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let inner = NumberError::Malformed("x".to_string());
        let err: AllocationError<NumberError> = inner.into();
        assert_eq!(err.to_string(), "malformed document number: x");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required { field: "customer_name" };
        assert_eq!(err.to_string(), "customer_name is required");

        let err = ValidationError::TooLong { field: "customer_name", max: 200 };
        assert_eq!(err.to_string(), "customer_name must be at most 200 characters");
    }
}
