//! Spec validation
//!
//! Validators report semantic problems as [`Validation`] violations, never as
//! errors. `Err` is reserved for infrastructure failures such as an
//! unreachable secret store. Every violation is logged at warn level as it is
//! found, and validation keeps scanning so one pass surfaces all problems.

mod base;
mod user;

use std::fmt;

pub use base::validate_base;
pub use user::{validate_private_key, validate_user, PrivateKeyError};

/// Outcome of a validation pass
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validation {
    violations: Vec<String>,
}

impl Validation {
    /// A passing validation
    pub fn valid() -> Self {
        Self::default()
    }

    /// Record a violation
    pub fn push(&mut self, violation: impl Into<String>) {
        self.violations.push(violation.into());
    }

    /// True when no violations were recorded
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations in the order they were found
    pub fn violations(&self) -> &[String] {
        &self.violations
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "valid");
        }
        write!(f, "{}", self.violations.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_validation_is_valid() {
        let validation = Validation::valid();
        assert!(validation.is_valid());
        assert_eq!(validation.to_string(), "valid");
    }

    #[test]
    fn violations_are_joined_in_order() {
        let mut validation = Validation::valid();
        validation.push("image not set");
        validation.push("seed job id can't be empty");
        assert!(!validation.is_valid());
        assert_eq!(
            validation.to_string(),
            "image not set; seed job id can't be empty"
        );
    }
}
