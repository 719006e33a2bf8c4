//! # Authority Status Codes → Canonical Outcomes
//!
//! The authority's status taxonomy is a fixed set of opaque integers.
//! This module is the single lookup table that translates them; no code
//! outside it may interpret a raw number. Codes the table does not know
//! are rejections by definition — the authority reserves the
//! non-success space for family-specific rejection reasons.
//!
//! | code | meaning                        |
//! |------|--------------------------------|
//! | 100  | document authorized            |
//! | 104  | batch processed, doc authorized|
//! | 105  | batch still in processing      |
//! | 135  | cancellation homologated       |
//! | 136  | cancellation homologated (event)|
//! | 102  | number-range invalidation homologated |

use chrono::{DateTime, Utc};
use fdx_core::identifiers::{AccessKey, ProtocolNumber};
use serde::{Deserialize, Serialize};

/// Canonical verdict of an authority exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AuthorityOutcome {
    /// Document authorized; the artifacts are now legally binding.
    Authorized {
        /// Raw authority code (100 or 104).
        code: u16,
        /// Authority-assigned access key.
        access_key: AccessKey,
        /// Authorization protocol number.
        protocol: ProtocolNumber,
        /// Authority-side receipt timestamp, when reported.
        received_at: Option<DateTime<Utc>>,
    },
    /// Authority refused the payload. Not retryable unchanged.
    Rejected {
        /// Raw authority rejection code.
        code: u16,
        /// Authority's human-readable reason.
        message: String,
    },
    /// Cancellation homologated (135/136).
    CancellationHomologated {
        /// Raw authority code.
        code: u16,
        /// Cancellation protocol number.
        protocol: ProtocolNumber,
    },
    /// Number-range invalidation homologated (102).
    InvalidationHomologated {
        /// Invalidation protocol number.
        protocol: ProtocolNumber,
    },
    /// Batch accepted but still processing; poll again later.
    Processing,
}

impl AuthorityOutcome {
    /// Raw authority code carried by this outcome, when one exists.
    pub fn raw_code(&self) -> Option<u16> {
        match self {
            Self::Authorized { code, .. } | Self::Rejected { code, .. } => Some(*code),
            Self::CancellationHomologated { code, .. } => Some(*code),
            Self::InvalidationHomologated { .. } => Some(102),
            Self::Processing => Some(105),
        }
    }

    /// Whether this outcome concludes the exchange positively.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Rejected { .. } | Self::Processing)
    }
}

/// Classification of a raw code before artifact extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeClass {
    /// 100/104: authorization; requires access key + protocol.
    Authorized,
    /// 135/136: cancellation homologation; requires protocol.
    CancellationHomologated,
    /// 102: invalidation homologation; requires protocol.
    InvalidationHomologated,
    /// 105: still processing.
    Processing,
    /// Everything else: rejection, message carried verbatim.
    Rejected,
}

/// Classify a raw authority status code.
pub fn classify(code: u16) -> CodeClass {
    match code {
        100 | 104 => CodeClass::Authorized,
        135 | 136 => CodeClass::CancellationHomologated,
        102 => CodeClass::InvalidationHomologated,
        105 => CodeClass::Processing,
        _ => CodeClass::Rejected,
    }
}
