//! Error types for license matching and review.

use thiserror::Error;
use uuid::Uuid;

use crate::types::{EmployeeId, LicenseId};

/// Errors raised by the matching engine and the review workflow.
///
/// Classification outcomes are never errors: an identifier that is not an
/// email address is routed to `external_review` like any other result.
#[derive(Debug, Clone, Error)]
pub enum LicenseMatchingError {
    /// A license or employee referenced by a review operation does not exist.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Kind of resource ("License" or "Employee").
        resource: &'static str,
        /// Identifier that was looked up.
        id: Uuid,
    },

    /// The requested transition is not legal from the record's current state.
    #[error("Invalid state for license {license_id}: {message}")]
    InvalidState {
        /// The license whose state blocked the transition.
        license_id: LicenseId,
        /// Human readable explanation.
        message: String,
    },

    /// A candidate without a usable full name was offered to the fuzzy scorer.
    #[error("Employee {0} has no full name to compare against")]
    IncompleteEmployee(EmployeeId),

    /// The backing record store failed.
    #[error("Store error: {0}")]
    Store(String),
}

impl LicenseMatchingError {
    pub(crate) fn license_not_found(id: LicenseId) -> Self {
        Self::NotFound {
            resource: "License",
            id: *id.as_uuid(),
        }
    }

    pub(crate) fn employee_not_found(id: EmployeeId) -> Self {
        Self::NotFound {
            resource: "Employee",
            id: *id.as_uuid(),
        }
    }

    /// Returns true for [`LicenseMatchingError::NotFound`].
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true for [`LicenseMatchingError::InvalidState`].
    #[must_use]
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState { .. })
    }
}

/// Convenience Result type for the matching engine.
pub type Result<T> = std::result::Result<T, LicenseMatchingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let id = LicenseId::new();
        let err = LicenseMatchingError::license_not_found(id);
        assert!(err.is_not_found());
        assert!(!err.is_invalid_state());
        assert_eq!(err.to_string(), format!("License not found: {id}"));
    }

    #[test]
    fn test_employee_not_found_message() {
        let id = EmployeeId::new();
        let err = LicenseMatchingError::employee_not_found(id);
        assert!(err.to_string().starts_with("Employee not found"));
    }

    #[test]
    fn test_invalid_state_message() {
        let license_id = LicenseId::new();
        let err = LicenseMatchingError::InvalidState {
            license_id,
            message: "no pending suggestion".to_string(),
        };
        assert!(err.is_invalid_state());
        assert!(err.to_string().contains("no pending suggestion"));
    }
}
