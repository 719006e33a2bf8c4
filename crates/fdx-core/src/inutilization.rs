//! # Number-Range Invalidation Records
//!
//! When a contiguous run of document numbers will never be issued
//! (printer jams, numbering gaps, series retirement), the authority
//! requires the range to be formally voided. [`InutilizationRecord`]
//! captures one invalidation request and its outcome. Records are
//! write-once: created after the authority answers, never mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::identifiers::{Justification, ProtocolNumber};

/// Outcome of a range-invalidation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InutilizationStatus {
    /// Authority homologated the invalidation.
    Confirmed,
    /// Authority rejected the invalidation.
    Rejected,
}

impl std::fmt::Display for InutilizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirmed => write!(f, "CONFIRMED"),
            Self::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// A voided document-number range and the authority's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InutilizationRecord {
    /// Issuing series the range belongs to.
    pub series: u16,
    /// First voided number (inclusive).
    pub number_from: u64,
    /// Last voided number (inclusive).
    pub number_to: u64,
    /// Calendar year the numbers belong to.
    pub year: i32,
    /// Why the range is being voided (>= 15 chars).
    pub justification: Justification,
    /// Authority protocol for the exchange, when one was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<ProtocolNumber>,
    /// Whether the authority confirmed or rejected the invalidation.
    pub status: InutilizationStatus,
    /// When the record was created.
    pub recorded_at: DateTime<Utc>,
}

impl InutilizationRecord {
    /// Create a record, validating the number range.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidNumberRange`] when `from` is
    /// zero or greater than `to`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        series: u16,
        number_from: u64,
        number_to: u64,
        year: i32,
        justification: Justification,
        protocol: Option<ProtocolNumber>,
        status: InutilizationStatus,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        validate_number_range(number_from, number_to)?;
        Ok(Self {
            series,
            number_from,
            number_to,
            year,
            justification,
            protocol,
            status,
            recorded_at,
        })
    }

    /// How many numbers the range voids.
    pub fn range_len(&self) -> u64 {
        self.number_to - self.number_from + 1
    }
}

/// Validate a candidate number range before it goes anywhere.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidNumberRange`] when `from` is zero
/// or greater than `to`.
pub fn validate_number_range(number_from: u64, number_to: u64) -> Result<(), ValidationError> {
    if number_from == 0 {
        return Err(ValidationError::InvalidNumberRange {
            reason: "document numbers start at 1".into(),
        });
    }
    if number_from > number_to {
        return Err(ValidationError::InvalidNumberRange {
            reason: format!("from {number_from} > to {number_to}"),
        });
    }
    Ok(())
}
