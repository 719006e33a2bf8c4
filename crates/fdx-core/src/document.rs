//! # Fiscal Document Model & Protocol State Machine
//!
//! [`FiscalDocument`] is the unit the authorization protocol operates
//! on. Its status moves only along the authority-defined edges:
//!
//! ```text
//! DRAFT -> SIGNED -> SENT -> { AUTHORIZED | REJECTED }
//! AUTHORIZED -> CANCELLED
//! ```
//!
//! REJECTED and CANCELLED are terminal-but-retained: documents are
//! never physically deleted, the record stays for audit.
//!
//! ## Invariants
//!
//! Enforced by the transition methods, which are the only mutation path:
//!
//! - `access_key` and `protocol_number` are `Some` iff status is
//!   `Authorized` (cancellation keeps them — the authority's cancel
//!   protocol is recorded separately).
//! - `rejection_code`/`rejection_message` are `Some` iff status is
//!   `Rejected`.
//! - Any illegal edge returns [`TransitionError`] and leaves the
//!   document untouched.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TransitionError;
use crate::identifiers::{
    AccessKey, BranchId, DocumentId, JurisdictionCode, Justification, OrganizationId,
    ProtocolNumber,
};

/// The closed set of document families the stack issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentType {
    /// Cargo transport document.
    TransportDoc,
    /// Goods sale invoice.
    GoodsInvoice,
    /// Cargo manifest aggregating transport documents.
    Manifest,
    /// Service invoice.
    ServiceInvoice,
}

impl DocumentType {
    /// XML root element name for this family's outbound envelope.
    pub fn root_element(&self) -> &'static str {
        match self {
            Self::TransportDoc => "transportDoc",
            Self::GoodsInvoice => "goodsInvoice",
            Self::Manifest => "manifest",
            Self::ServiceInvoice => "serviceInvoice",
        }
    }

    /// Namespace URI the authority expects on the root element.
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::TransportDoc => "http://authority.gov/schemas/transport",
            Self::GoodsInvoice => "http://authority.gov/schemas/goods",
            Self::Manifest => "http://authority.gov/schemas/manifest",
            Self::ServiceInvoice => "http://authority.gov/schemas/service",
        }
    }

    /// Required top-level sections of the outbound envelope, in order.
    pub fn required_sections(&self) -> &'static [&'static str] {
        match self {
            Self::TransportDoc => &["identification", "issuer", "cargo", "totals"],
            Self::GoodsInvoice => &["identification", "issuer", "items", "totals"],
            Self::Manifest => &["identification", "issuer", "documents", "totals"],
            Self::ServiceInvoice => &["identification", "issuer", "service", "totals"],
        }
    }

    /// Layout version marker the structural validator expects.
    pub fn layout_version(&self) -> &'static str {
        match self {
            Self::TransportDoc | Self::Manifest => "3.00",
            Self::GoodsInvoice => "4.00",
            Self::ServiceInvoice => "1.00",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TransportDoc => write!(f, "transport-doc"),
            Self::GoodsInvoice => write!(f, "goods-invoice"),
            Self::Manifest => write!(f, "manifest"),
            Self::ServiceInvoice => write!(f, "service-invoice"),
        }
    }
}

/// Protocol state of a fiscal document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentStatus {
    /// Created locally, not yet signed.
    Draft,
    /// Signature embedded, not yet transmitted.
    Signed,
    /// Transmitted, awaiting the authority's verdict.
    Sent,
    /// Authority authorized the document (access key + protocol held).
    Authorized,
    /// Authority rejected the document (code + message held). Terminal.
    Rejected,
    /// Cancellation homologated by the authority. Terminal.
    Cancelled,
}

impl DocumentStatus {
    /// Whether the protocol permits moving from `self` to `to`.
    ///
    /// The edge set is exactly the authority-defined machine; there are
    /// no administrative shortcuts.
    pub fn can_transition(&self, to: DocumentStatus) -> bool {
        use DocumentStatus::*;
        matches!(
            (self, to),
            (Draft, Signed)
                | (Signed, Sent)
                | (Sent, Authorized)
                | (Sent, Rejected)
                | (Authorized, Cancelled)
        )
    }

    /// Whether the document can never change status again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled)
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "DRAFT"),
            Self::Signed => write!(f, "SIGNED"),
            Self::Sent => write!(f, "SENT"),
            Self::Authorized => write!(f, "AUTHORIZED"),
            Self::Rejected => write!(f, "REJECTED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Cancellation metadata recorded when the authority homologates a cancel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationInfo {
    /// The justification sent to the authority.
    pub reason: Justification,
    /// When the homologation was recorded locally.
    pub date: DateTime<Utc>,
    /// The authority's cancellation protocol number.
    pub protocol: ProtocolNumber,
}

/// A legally binding transport/tax document and its protocol state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalDocument {
    /// Local identity.
    pub id: DocumentId,
    /// Document family.
    pub document_type: DocumentType,
    /// Sequential document number within the series.
    pub number: u64,
    /// Issuing series.
    pub series: u16,
    /// Issuing organization (tenant scope).
    pub organization_id: OrganizationId,
    /// Issuing branch (tenant scope).
    pub branch_id: BranchId,
    /// Jurisdiction the document is issued under.
    pub jurisdiction: JurisdictionCode,
    /// Operation date; selects the tax regime by calendar year.
    pub operation_date: NaiveDate,
    /// Total document value.
    pub total_value: Decimal,
    /// Protocol state.
    pub status: DocumentStatus,
    /// Authority access key; `Some` iff authorized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<AccessKey>,
    /// Authority protocol number; `Some` iff authorized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_number: Option<ProtocolNumber>,
    /// Authority rejection code; `Some` iff rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_code: Option<u16>,
    /// Authority rejection message; `Some` iff rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_message: Option<String>,
    /// Signed XML payload, kept from signing onward.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signed_payload: Option<String>,
    /// Authorized XML payload as acknowledged by the authority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorized_payload: Option<String>,
    /// Cancellation metadata; `Some` iff cancelled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<CancellationInfo>,
}

impl FiscalDocument {
    /// Create a new document in `Draft` with empty protocol artifacts.
    #[allow(clippy::too_many_arguments)]
    pub fn draft(
        document_type: DocumentType,
        number: u64,
        series: u16,
        organization_id: OrganizationId,
        branch_id: BranchId,
        jurisdiction: JurisdictionCode,
        operation_date: NaiveDate,
        total_value: Decimal,
    ) -> Self {
        Self {
            id: DocumentId::new(),
            document_type,
            number,
            series,
            organization_id,
            branch_id,
            jurisdiction,
            operation_date,
            total_value,
            status: DocumentStatus::Draft,
            access_key: None,
            protocol_number: None,
            rejection_code: None,
            rejection_message: None,
            signed_payload: None,
            authorized_payload: None,
            cancellation: None,
        }
    }

    fn require_edge(&self, to: DocumentStatus) -> Result<(), TransitionError> {
        if self.status.can_transition(to) {
            Ok(())
        } else {
            Err(TransitionError {
                from: self.status,
                to,
            })
        }
    }

    /// DRAFT -> SIGNED, recording the signed payload.
    pub fn mark_signed(&mut self, signed_payload: String) -> Result<(), TransitionError> {
        self.require_edge(DocumentStatus::Signed)?;
        self.signed_payload = Some(signed_payload);
        self.status = DocumentStatus::Signed;
        Ok(())
    }

    /// SIGNED -> SENT. The transmission itself is the gateway's business.
    pub fn mark_sent(&mut self) -> Result<(), TransitionError> {
        self.require_edge(DocumentStatus::Sent)?;
        self.status = DocumentStatus::Sent;
        Ok(())
    }

    /// SENT -> AUTHORIZED, recording the authority's artifacts.
    pub fn mark_authorized(
        &mut self,
        access_key: AccessKey,
        protocol_number: ProtocolNumber,
        authorized_payload: Option<String>,
    ) -> Result<(), TransitionError> {
        self.require_edge(DocumentStatus::Authorized)?;
        self.access_key = Some(access_key);
        self.protocol_number = Some(protocol_number);
        self.authorized_payload = authorized_payload;
        self.status = DocumentStatus::Authorized;
        Ok(())
    }

    /// SENT -> REJECTED, recording the authority's code and message.
    pub fn mark_rejected(&mut self, code: u16, message: String) -> Result<(), TransitionError> {
        self.require_edge(DocumentStatus::Rejected)?;
        self.rejection_code = Some(code);
        self.rejection_message = Some(message);
        self.status = DocumentStatus::Rejected;
        Ok(())
    }

    /// AUTHORIZED -> CANCELLED, recording the homologated cancellation.
    pub fn mark_cancelled(
        &mut self,
        reason: Justification,
        protocol: ProtocolNumber,
        date: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.require_edge(DocumentStatus::Cancelled)?;
        self.cancellation = Some(CancellationInfo {
            reason,
            date,
            protocol,
        });
        self.status = DocumentStatus::Cancelled;
        Ok(())
    }

    /// Check the status/artifact invariants hold. Used by the store and
    /// by tests; transition methods keep this true by construction.
    pub fn invariants_hold(&self) -> bool {
        let authorized_artifacts = self.access_key.is_some() && self.protocol_number.is_some();
        let rejected_artifacts = self.rejection_code.is_some();
        match self.status {
            DocumentStatus::Authorized | DocumentStatus::Cancelled => {
                // Cancelled keeps the authorization artifacts for audit.
                authorized_artifacts && !rejected_artifacts
            }
            DocumentStatus::Rejected => rejected_artifacts && !authorized_artifacts,
            _ => !authorized_artifacts && !rejected_artifacts,
        }
    }
}
