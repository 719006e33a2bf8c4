//! Structured error hierarchy for the core domain types.

use crate::document::DocumentStatus;

/// Validation failures raised by identifier and record constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Access key is not exactly 44 ASCII digits.
    #[error("invalid access key: {reason}")]
    InvalidAccessKey {
        /// Description of the format violation.
        reason: String,
    },

    /// Protocol number is empty or contains non-digit characters.
    #[error("invalid protocol number: {reason}")]
    InvalidProtocolNumber {
        /// Description of the format violation.
        reason: String,
    },

    /// Jurisdiction code is not a two-letter uppercase code.
    #[error("invalid jurisdiction code: {reason}")]
    InvalidJurisdictionCode {
        /// Description of the format violation.
        reason: String,
    },

    /// Justification shorter than the authority-mandated 15 characters.
    #[error("justification must be at least 15 characters, got {length}")]
    JustificationTooShort {
        /// Trimmed length of the rejected justification.
        length: usize,
    },

    /// A number range where `from > to`, or a zero document number.
    #[error("invalid number range: {reason}")]
    InvalidNumberRange {
        /// Description of the range violation.
        reason: String,
    },

    /// A monetary or rate field outside its legal domain.
    #[error("invalid amount: {reason}")]
    InvalidAmount {
        /// Description of the domain violation.
        reason: String,
    },
}

/// An illegal document state transition was requested.
///
/// This is a caller logic bug, not a recoverable runtime condition:
/// the legal edge set is fixed by the authorization protocol and
/// collaborators must consult [`DocumentStatus::can_transition`]
/// before driving the document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("illegal transition {from} -> {to}")]
pub struct TransitionError {
    /// Status the document was in.
    pub from: DocumentStatus,
    /// Status the caller tried to reach.
    pub to: DocumentStatus,
}
