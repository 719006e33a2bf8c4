//! Orchestrator error hierarchy.

use fdx_core::{DocumentId, TransitionError, ValidationError};
use fdx_gateway::{AuthorityOutcome, GatewayError};
use fdx_tax::TaxError;

use crate::store::PersistenceError;

/// Failures raised by the document lifecycle orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// No document with the given id exists in the store.
    #[error("document {id} not found")]
    DocumentNotFound {
        /// The id that was requested.
        id: DocumentId,
    },

    /// The requested operation implies an illegal state transition.
    /// A caller logic bug, never silently tolerated.
    #[error(transparent)]
    IllegalTransition(#[from] TransitionError),

    /// An input failed domain validation before any authority call.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Tax computation refused the document's values.
    #[error(transparent)]
    Tax(#[from] TaxError),

    /// Pre-submission validation found blocking errors.
    #[error("document failed pre-submission validation: {}", errors.join("; "))]
    ComplianceRejected {
        /// Blocking findings, in validator order.
        errors: Vec<String>,
    },

    /// Signing failed; the document stays in `Draft`.
    #[error(transparent)]
    Signature(#[from] fdx_crypto::SignatureError),

    /// The authority exchange failed in transport or protocol terms.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The authority answered but the answer could not be persisted.
    ///
    /// The exchange already happened on the authority side; the carried
    /// outcome is what the operator must reconcile via `query`.
    #[error("authority answered for document {document_id} but persisting failed: {source}")]
    PersistFailed {
        /// Document whose state is now ahead of the store.
        document_id: DocumentId,
        /// The authority's answer that was lost.
        outcome: AuthorityOutcome,
        /// The underlying storage failure.
        source: PersistenceError,
    },

    /// A plain load/save failure outside the post-exchange window.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
