//! # FDX Core Types
//!
//! Foundational domain types for the FDX fiscal document stack:
//!
//! - [`FiscalDocument`] and its protocol state machine ([`DocumentStatus`])
//! - Identifier newtypes ([`AccessKey`], [`ProtocolNumber`], [`JurisdictionCode`], ...)
//! - [`TaxLine`] per-item dual-tax arithmetic
//! - [`InutilizationRecord`] for voided number ranges
//! - The structured error hierarchy ([`ValidationError`], [`TransitionError`])
//!
//! This crate holds no I/O, no XML, and no cryptography. Every other
//! crate in the workspace depends on it; it depends on nothing internal.

pub mod document;
pub mod error;
pub mod identifiers;
pub mod inutilization;
pub mod taxline;

pub use document::{CancellationInfo, DocumentStatus, DocumentType, FiscalDocument};
pub use error::{TransitionError, ValidationError};
pub use identifiers::{
    AccessKey, BranchId, DocumentId, JurisdictionCode, Justification, OrganizationId,
    ProtocolNumber,
};
pub use inutilization::{validate_number_range, InutilizationRecord, InutilizationStatus};
pub use taxline::{expected_value, TaxLine, CONSISTENCY_TOLERANCE};
