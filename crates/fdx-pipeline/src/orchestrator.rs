//! # Document Lifecycle Orchestrator
//!
//! Drives a fiscal document through its protocol lifecycle: tax
//! computation, pre-submission validation, signing, authority exchange,
//! and persistence. One orchestrator instance serves the whole process;
//! collaborators reach it through the four entry points
//! ([`authorize`], [`cancel`], [`invalidate_range`], [`compute_tax`]).
//!
//! ## Submit serialization
//!
//! At most one submit is in flight per document. Concurrent `authorize`
//! calls for the same id queue on a per-document `tokio::Mutex` held in
//! a `DashMap`; operations on distinct documents never contend. Query,
//! cancel and invalidate run without that lock.
//!
//! ## Persistence discipline
//!
//! Every state transition goes through the store before the call
//! returns. A save failure after the authority has already answered is
//! surfaced as [`PipelineError::PersistFailed`] carrying the lost
//! outcome, because at that point the authority's state is ahead of
//! ours and the operator must reconcile via `query`.
//!
//! [`authorize`]: DocumentPipeline::authorize
//! [`cancel`]: DocumentPipeline::cancel
//! [`invalidate_range`]: DocumentPipeline::invalidate_range
//! [`compute_tax`]: DocumentPipeline::compute_tax

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use fdx_compliance::{validate_structure, validate_tax_consistency, ValidationReport};
use fdx_core::{
    validate_number_range, AccessKey, DocumentId, DocumentStatus, FiscalDocument,
    InutilizationRecord, InutilizationStatus, JurisdictionCode, Justification, ProtocolNumber,
    TaxLine, TransitionError,
};
use fdx_crypto::{sign_fragment, CredentialBundle};
use fdx_gateway::{
    AuthorityClient, AuthorityOutcome, CancelRequest, InvalidateRangeRequest, SubmitRequest,
};
use fdx_tax::{JurisdictionPair, TaxRegimeCalculator};
use fdx_xml::DocumentXmlBuilder;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::PipelineError;
use crate::store::{DocumentStore, PersistenceError};

/// Outcome of an [`DocumentPipeline::authorize`] call.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizeResponse {
    /// The document the response describes.
    pub document_id: DocumentId,
    /// Status after the exchange.
    pub status: DocumentStatus,
    /// Access key, present iff authorized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<AccessKey>,
    /// Authorization protocol, present iff authorized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol_number: Option<ProtocolNumber>,
    /// Authority rejection code, present iff rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_code: Option<u16>,
    /// Authority rejection message, present iff rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl AuthorizeResponse {
    fn from_document(document: &FiscalDocument) -> Self {
        Self {
            document_id: document.id,
            status: document.status,
            access_key: document.access_key.clone(),
            protocol_number: document.protocol_number.clone(),
            rejection_code: document.rejection_code,
            rejection_reason: document.rejection_message.clone(),
        }
    }
}

/// Outcome of a [`DocumentPipeline::cancel`] call.
#[derive(Debug, Clone, Serialize)]
pub struct CancelResponse {
    /// The document the response describes.
    pub document_id: DocumentId,
    /// Status after the exchange; `Cancelled` only on homologation.
    pub status: DocumentStatus,
    /// Whether the authority homologated the cancellation.
    pub homologated: bool,
    /// Authority failure code, when the cancellation was refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_code: Option<u16>,
    /// Authority failure message, when the cancellation was refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
}

/// Outcome of a [`DocumentPipeline::invalidate_range`] call.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateRangeResponse {
    /// Authority's verdict on the range.
    pub status: InutilizationStatus,
    /// Homologation protocol, present iff confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<ProtocolNumber>,
    /// The write-once record of the exchange.
    pub record: InutilizationRecord,
}

/// The document lifecycle orchestrator.
pub struct DocumentPipeline {
    client: Arc<dyn AuthorityClient>,
    store: Arc<dyn DocumentStore>,
    credential: CredentialBundle,
    calculator: TaxRegimeCalculator,
    builder: DocumentXmlBuilder,
    submit_locks: DashMap<DocumentId, Arc<tokio::sync::Mutex<()>>>,
}

impl DocumentPipeline {
    /// Wire up an orchestrator. Done once at startup; the client comes
    /// from [`crate::ClientFactory`], the credential from a decrypted
    /// bundle.
    pub fn new(
        client: Arc<dyn AuthorityClient>,
        store: Arc<dyn DocumentStore>,
        credential: CredentialBundle,
    ) -> Self {
        tracing::info!(client = client.client_name(), "document pipeline ready");
        Self {
            client,
            store,
            credential,
            calculator: TaxRegimeCalculator::new(),
            builder: DocumentXmlBuilder::new(),
            submit_locks: DashMap::new(),
        }
    }

    /// Register a new draft in the store.
    ///
    /// # Errors
    ///
    /// Propagates store failures.
    pub fn register(&self, document: &FiscalDocument) -> Result<(), PipelineError> {
        self.store.save(document)?;
        Ok(())
    }

    fn submit_lock(&self, id: DocumentId) -> Arc<tokio::sync::Mutex<()>> {
        self.submit_locks
            .entry(id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    fn load(&self, id: &DocumentId) -> Result<FiscalDocument, PipelineError> {
        self.store.load(id).map_err(|e| match e {
            PersistenceError::NotFound { .. } => PipelineError::DocumentNotFound { id: *id },
            backend => PipelineError::Persistence(backend),
        })
    }

    fn persist_after_exchange(
        &self,
        document: &FiscalDocument,
        outcome: AuthorityOutcome,
    ) -> Result<(), PipelineError> {
        self.store.save(document).map_err(|source| {
            tracing::error!(
                document_id = %document.id,
                outcome = ?outcome,
                error = %source,
                "authority answered but persisting the result failed"
            );
            PipelineError::PersistFailed {
                document_id: document.id,
                outcome,
                source,
            }
        })
    }

    /// Prepare a draft for submission: compute tax lines, validate,
    /// sign, persist as `Signed`. Returns the signed payload.
    fn prepare_draft(&self, document: &mut FiscalDocument) -> Result<String, PipelineError> {
        let pair = JurisdictionPair::new(
            document.jurisdiction.clone(),
            document.jurisdiction.clone(),
        );
        let line =
            self.calculator
                .calculate(document.total_value, document.operation_date, &pair)?;
        let lines = vec![line];

        let fragment = self.builder.build(document, &lines);
        let mut report = ValidationReport::valid();
        for line in &lines {
            report.merge(validate_tax_consistency(line));
        }
        if report.valid {
            report.merge(validate_structure(&fragment, document.document_type));
        }
        if !report.valid {
            tracing::warn!(
                document_id = %document.id,
                errors = report.errors.len(),
                "pre-submission validation failed, document stays draft"
            );
            return Err(PipelineError::ComplianceRejected {
                errors: report.errors,
            });
        }

        let signed = sign_fragment(&fragment.canonicalize(), &self.credential, Utc::now())?;
        document.mark_signed(signed.xml.clone())?;
        self.store.save(document)?;
        Ok(signed.xml)
    }

    /// Drive a document to the authority's verdict.
    ///
    /// Retry-safe: a transport failure leaves the document `Signed` in
    /// the store, and a later call resumes from the signed payload
    /// without re-signing.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::DocumentNotFound`] for an unknown id.
    /// - [`PipelineError::IllegalTransition`] when the document is past
    ///   the submittable states.
    /// - [`PipelineError::ComplianceRejected`] when validation blocks
    ///   the submission; the document stays `Draft`.
    /// - [`PipelineError::Gateway`] on transport failure or while the
    ///   authority is still processing; either way the document stays
    ///   `Signed` and the call can be repeated.
    pub async fn authorize(
        &self,
        document_id: DocumentId,
    ) -> Result<AuthorizeResponse, PipelineError> {
        let lock = self.submit_lock(document_id);
        let _guard = lock.lock().await;

        let mut document = self.load(&document_id)?;
        let signed_xml = match document.status {
            DocumentStatus::Draft => self.prepare_draft(&mut document)?,
            DocumentStatus::Signed => document.signed_payload.clone().ok_or_else(|| {
                PipelineError::IllegalTransition(TransitionError {
                    from: DocumentStatus::Signed,
                    to: DocumentStatus::Sent,
                })
            })?,
            from => {
                return Err(TransitionError {
                    from,
                    to: DocumentStatus::Signed,
                }
                .into())
            }
        };

        document.mark_sent()?;
        let request = SubmitRequest {
            document_id,
            jurisdiction: document.jurisdiction.clone(),
            signed_xml: signed_xml.clone(),
        };
        // The store still says Signed; a transport failure below keeps
        // it that way.
        let outcome = match self.client.submit(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::warn!(
                    document_id = %document_id,
                    error = %e,
                    "submission failed, document stays signed"
                );
                return Err(e.into());
            }
        };

        match &outcome {
            AuthorityOutcome::Authorized {
                access_key,
                protocol,
                ..
            } => {
                document.mark_authorized(
                    access_key.clone(),
                    protocol.clone(),
                    Some(signed_xml),
                )?;
                tracing::info!(
                    document_id = %document_id,
                    access_key = access_key.as_str(),
                    protocol = protocol.as_str(),
                    "document authorized"
                );
            }
            AuthorityOutcome::Rejected { code, message } => {
                document.mark_rejected(*code, message.clone())?;
                tracing::info!(document_id = %document_id, code, "document rejected");
            }
            // A processing verdict never reaches the store: the
            // document stays Signed and a later authorize resubmits
            // the same payload once the authority has settled.
            AuthorityOutcome::Processing => {
                tracing::warn!(
                    document_id = %document_id,
                    "authority still processing, document stays signed"
                );
                return Err(PipelineError::Gateway(
                    fdx_gateway::GatewayError::Transient {
                        endpoint: "submit".to_string(),
                        reason: "authority is still processing the submission".to_string(),
                    },
                ));
            }
            unexpected => {
                return Err(PipelineError::Gateway(
                    fdx_gateway::GatewayError::MalformedResponse {
                        endpoint: "submit".to_string(),
                        reason: format!("unexpected outcome for a submission: {unexpected:?}"),
                    },
                ));
            }
        }

        self.persist_after_exchange(&document, outcome)?;
        Ok(AuthorizeResponse::from_document(&document))
    }

    /// Cancel an authorized document.
    ///
    /// The justification is validated before any authority call. Only a
    /// homologated cancellation moves the document to `Cancelled`;
    /// every other answer leaves it `Authorized` and is reported in the
    /// response.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] for a short justification.
    /// - [`PipelineError::IllegalTransition`] when the document is not
    ///   `Authorized`.
    pub async fn cancel(
        &self,
        document_id: DocumentId,
        justification: &str,
    ) -> Result<CancelResponse, PipelineError> {
        let justification = Justification::new(justification)?;

        let mut document = self.load(&document_id)?;
        if document.status != DocumentStatus::Authorized {
            return Err(TransitionError {
                from: document.status,
                to: DocumentStatus::Cancelled,
            }
            .into());
        }
        let (Some(access_key), Some(protocol)) = (
            document.access_key.clone(),
            document.protocol_number.clone(),
        ) else {
            return Err(TransitionError {
                from: document.status,
                to: DocumentStatus::Cancelled,
            }
            .into());
        };

        let request = CancelRequest {
            access_key,
            protocol,
            justification: justification.clone(),
            jurisdiction: document.jurisdiction.clone(),
        };
        let outcome = self.client.cancel(&request).await?;

        match &outcome {
            AuthorityOutcome::CancellationHomologated { protocol, .. } => {
                document.mark_cancelled(justification, protocol.clone(), Utc::now())?;
                self.persist_after_exchange(&document, outcome.clone())?;
                tracing::info!(document_id = %document_id, "cancellation homologated");
                Ok(CancelResponse {
                    document_id,
                    status: document.status,
                    homologated: true,
                    failure_code: None,
                    failure_message: None,
                })
            }
            AuthorityOutcome::Rejected { code, message } => {
                tracing::warn!(
                    document_id = %document_id,
                    code,
                    "cancellation refused, document stays authorized"
                );
                Ok(CancelResponse {
                    document_id,
                    status: document.status,
                    homologated: false,
                    failure_code: Some(*code),
                    failure_message: Some(message.clone()),
                })
            }
            other => {
                tracing::warn!(
                    document_id = %document_id,
                    outcome = ?other,
                    "unexpected cancellation outcome, document stays authorized"
                );
                Ok(CancelResponse {
                    document_id,
                    status: document.status,
                    homologated: false,
                    failure_code: other.raw_code(),
                    failure_message: Some(format!("unexpected outcome: {other:?}")),
                })
            }
        }
    }

    /// Void an unused document-number range.
    ///
    /// Range and justification are validated before any authority call.
    /// The returned record is write-once: `Confirmed` on homologation,
    /// `Rejected` on anything else. The store holds documents only, so
    /// filing the record in the caller's audit trail is the caller's
    /// responsibility.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Validation`] for a bad range or short
    ///   justification.
    /// - [`PipelineError::Gateway`] on transport failure; no record is
    ///   produced.
    pub async fn invalidate_range(
        &self,
        series: u16,
        number_from: u64,
        number_to: u64,
        year: u16,
        justification: &str,
        jurisdiction: JurisdictionCode,
    ) -> Result<InvalidateRangeResponse, PipelineError> {
        let justification = Justification::new(justification)?;
        validate_number_range(number_from, number_to)?;

        let request = InvalidateRangeRequest {
            series,
            number_from,
            number_to,
            year,
            justification: justification.clone(),
            jurisdiction,
        };
        let outcome = self.client.invalidate_range(&request).await?;

        let (status, protocol) = match outcome {
            AuthorityOutcome::InvalidationHomologated { protocol } => {
                tracing::info!(series, number_from, number_to, "range invalidation homologated");
                (InutilizationStatus::Confirmed, Some(protocol))
            }
            other => {
                tracing::warn!(
                    series,
                    number_from,
                    number_to,
                    outcome = ?other,
                    "range invalidation refused"
                );
                (InutilizationStatus::Rejected, None)
            }
        };

        let record = InutilizationRecord::new(
            series,
            number_from,
            number_to,
            i32::from(year),
            justification,
            protocol.clone(),
            status,
            Utc::now(),
        )?;
        Ok(InvalidateRangeResponse {
            status,
            protocol,
            record,
        })
    }

    /// Compute the tax line for one item. Pure pass-through to the
    /// calculator; no document state involved.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Tax`] for a negative base.
    pub fn compute_tax(
        &self,
        base_value: Decimal,
        operation_date: NaiveDate,
        jurisdiction: &JurisdictionPair,
    ) -> Result<TaxLine, PipelineError> {
        Ok(self
            .calculator
            .calculate(base_value, operation_date, jurisdiction)?)
    }
}
