//! # Authority Client Interface
//!
//! Defines the client interface for the fiscal authority's document
//! services. Production deployments use [`HttpAuthorityClient`]; test
//! environments use [`MockAuthorityClient`]. This separation lets the
//! submission pipeline compose authority operations without coupling to
//! a specific transport.
//!
//! ## Mock conventions
//!
//! `MockAuthorityClient` returns deterministic outcomes based on
//! request content:
//! - a signed payload containing the marker `__reject__` is rejected
//!   with code 539
//! - a justification containing `deny` makes cancellation and
//!   invalidation come back rejected
//! - everything else is homologated, with protocol numbers drawn from
//!   an internal counter
//!
//! Per-operation call counters are exposed so pipeline tests can assert
//! that validation failures never reach the wire.
//!
//! [`HttpAuthorityClient`]: crate::http::HttpAuthorityClient

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use fdx_core::identifiers::{AccessKey, DocumentId, Justification, JurisdictionCode, ProtocolNumber};

use crate::error::GatewayError;
use crate::status::AuthorityOutcome;

/// A signed document ready for submission.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// Pipeline-side identifier, for log correlation only.
    pub document_id: DocumentId,
    /// Issuer jurisdiction, drives endpoint routing.
    pub jurisdiction: JurisdictionCode,
    /// The complete signed XML payload.
    pub signed_xml: String,
}

/// Cancellation of an authorized document.
#[derive(Debug, Clone)]
pub struct CancelRequest {
    /// Access key of the authorized document.
    pub access_key: AccessKey,
    /// Authorization protocol being cancelled.
    pub protocol: ProtocolNumber,
    /// Taxpayer justification, validated upstream.
    pub justification: Justification,
    /// Issuer jurisdiction.
    pub jurisdiction: JurisdictionCode,
}

/// Invalidation of an unused document number range.
#[derive(Debug, Clone)]
pub struct InvalidateRangeRequest {
    /// Document series the range belongs to.
    pub series: u16,
    /// First number of the range, inclusive.
    pub number_from: u64,
    /// Last number of the range, inclusive.
    pub number_to: u64,
    /// Fiscal year the numbers were allocated for.
    pub year: u16,
    /// Taxpayer justification, validated upstream.
    pub justification: Justification,
    /// Issuer jurisdiction.
    pub jurisdiction: JurisdictionCode,
}

/// Client trait for the fiscal authority's document services.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// async tasks behind an `Arc`. The trait is object-safe to support
/// runtime client selection (mock vs. live).
#[async_trait]
pub trait AuthorityClient: Send + Sync {
    /// Submit a signed document for authorization.
    async fn submit(&self, request: &SubmitRequest) -> Result<AuthorityOutcome, GatewayError>;

    /// Query the current status of a document by access key.
    async fn query(&self, access_key: &AccessKey) -> Result<AuthorityOutcome, GatewayError>;

    /// Request cancellation of an authorized document.
    async fn cancel(&self, request: &CancelRequest) -> Result<AuthorityOutcome, GatewayError>;

    /// Invalidate an unused number range.
    async fn invalidate_range(
        &self,
        request: &InvalidateRangeRequest,
    ) -> Result<AuthorityOutcome, GatewayError>;

    /// Human-readable name of this client implementation
    /// (e.g. "MockAuthorityClient", "HttpAuthorityClient").
    fn client_name(&self) -> &str;
}

/// Marker that makes the mock reject a submission.
pub const MOCK_REJECT_MARKER: &str = "__reject__";

/// Mock authority client for testing and development.
#[derive(Debug, Default)]
pub struct MockAuthorityClient {
    protocol_seq: AtomicU64,
    submit_count: AtomicU32,
    query_count: AtomicU32,
    cancel_count: AtomicU32,
    invalidate_count: AtomicU32,
}

impl MockAuthorityClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of submit calls that reached this client.
    pub fn submit_calls(&self) -> u32 {
        self.submit_count.load(Ordering::SeqCst)
    }

    /// Number of query calls that reached this client.
    pub fn query_calls(&self) -> u32 {
        self.query_count.load(Ordering::SeqCst)
    }

    /// Number of cancel calls that reached this client.
    pub fn cancel_calls(&self) -> u32 {
        self.cancel_count.load(Ordering::SeqCst)
    }

    /// Number of invalidation calls that reached this client.
    pub fn invalidate_calls(&self) -> u32 {
        self.invalidate_count.load(Ordering::SeqCst)
    }

    fn next_seq(&self) -> u64 {
        self.protocol_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    // 15 digits, same shape the live service uses.
    fn protocol_for(seq: u64) -> ProtocolNumber {
        ProtocolNumber::new(format!("1352600{:08}", seq % 100_000_000))
            .unwrap_or_else(|_| unreachable!("generated protocol is always 15 digits"))
    }

    fn access_key_for(seq: u64) -> AccessKey {
        AccessKey::new(format!("{seq:0>44}"))
            .unwrap_or_else(|_| unreachable!("generated key is always 44 digits"))
    }
}

#[async_trait]
impl AuthorityClient for MockAuthorityClient {
    async fn submit(&self, request: &SubmitRequest) -> Result<AuthorityOutcome, GatewayError> {
        self.submit_count.fetch_add(1, Ordering::SeqCst);

        if request.signed_xml.contains(MOCK_REJECT_MARKER) {
            return Ok(AuthorityOutcome::Rejected {
                code: 539,
                message: "Duplicidade de documento".to_string(),
            });
        }

        let seq = self.next_seq();
        Ok(AuthorityOutcome::Authorized {
            code: 100,
            access_key: Self::access_key_for(seq),
            protocol: Self::protocol_for(seq),
            received_at: Some(Utc::now()),
        })
    }

    async fn query(&self, _access_key: &AccessKey) -> Result<AuthorityOutcome, GatewayError> {
        self.query_count.fetch_add(1, Ordering::SeqCst);
        Ok(AuthorityOutcome::Processing)
    }

    async fn cancel(&self, request: &CancelRequest) -> Result<AuthorityOutcome, GatewayError> {
        self.cancel_count.fetch_add(1, Ordering::SeqCst);

        if request.justification.as_str().contains("deny") {
            return Ok(AuthorityOutcome::Rejected {
                code: 501,
                message: "Cancelamento nao homologado".to_string(),
            });
        }

        Ok(AuthorityOutcome::CancellationHomologated {
            code: 135,
            protocol: Self::protocol_for(self.next_seq()),
        })
    }

    async fn invalidate_range(
        &self,
        request: &InvalidateRangeRequest,
    ) -> Result<AuthorityOutcome, GatewayError> {
        self.invalidate_count.fetch_add(1, Ordering::SeqCst);

        if request.justification.as_str().contains("deny") {
            return Ok(AuthorityOutcome::Rejected {
                code: 563,
                message: "Inutilizacao nao homologada".to_string(),
            });
        }

        Ok(AuthorityOutcome::InvalidationHomologated {
            protocol: Self::protocol_for(self.next_seq()),
        })
    }

    fn client_name(&self) -> &str {
        "MockAuthorityClient"
    }
}
