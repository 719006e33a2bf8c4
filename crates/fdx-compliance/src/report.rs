//! Structured validation outcome shared by all three validators.

use serde::{Deserialize, Serialize};

/// Outcome of a validation pass: hard errors and advisory warnings.
///
/// `valid` is false iff `errors` is non-empty; warnings never flip it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether the input passed (no errors; warnings allowed).
    pub valid: bool,
    /// Hard failures. Any entry means the document must not be sent.
    pub errors: Vec<String>,
    /// Advisory findings. The document may still be sent.
    pub warnings: Vec<String>,
}

impl ValidationReport {
    /// An empty passing report.
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Record a hard error.
    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
        self.valid = false;
    }

    /// Record an advisory warning.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: ValidationReport) {
        self.valid = self.valid && other.valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::valid()
    }
}
