//! # FDX Authority Gateway
//!
//! Protocol client for the government authority's document webservices.
//! Maps a jurisdiction to its service provider and environment-specific
//! endpoint set, exposes the four remote operations (submit, query,
//! cancel, invalidate-range) behind the object-safe [`AuthorityClient`]
//! trait, and translates the authority's numeric status codes into the
//! canonical [`AuthorityOutcome`] taxonomy.
//!
//! ## Status codes stay here
//!
//! The numeric-code-to-outcome mapping lives in [`status`] and nowhere
//! else. Raw codes never cross this crate's boundary without their
//! canonical outcome attached, so authority quirks cannot leak into the
//! orchestrator or the validators.
//!
//! ## Retry semantics
//!
//! Transport failures ([`GatewayError::Transient`]) are safe to retry
//! with the same payload. An authority rejection is not an error at all
//! — it is a normal [`AuthorityOutcome::Rejected`] verdict, and the
//! payload must change before resubmission.

pub mod client;
pub mod endpoints;
pub mod envelope;
pub mod error;
pub mod http;
pub mod retry;
pub mod status;

pub use client::{
    AuthorityClient, CancelRequest, InvalidateRangeRequest, MockAuthorityClient, SubmitRequest,
};
pub use endpoints::{EndpointSet, Environment, ServiceProvider};
pub use error::GatewayError;
pub use http::{GatewayConfig, HttpAuthorityClient};
pub use status::AuthorityOutcome;
