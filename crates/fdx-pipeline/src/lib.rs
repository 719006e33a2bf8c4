//! # FDX Document Pipeline
//!
//! The orchestration layer of the FDX stack. Owns the document state
//! machine end to end: draft preparation (tax computation, validation,
//! signing), the authority exchange, and persistence through the
//! [`DocumentStore`] seam.
//!
//! Collaborating systems use exactly four entry points on
//! [`DocumentPipeline`]: `authorize`, `cancel`, `invalidate_range` and
//! `compute_tax`. Everything else (status codes, XML layouts, regime
//! windows, credential handling) stays behind this boundary.
//!
//! ## Wiring
//!
//! One pipeline per process, assembled explicitly at startup:
//!
//! ```no_run
//! use std::sync::Arc;
//! use fdx_crypto::CredentialBundle;
//! use fdx_gateway::Environment;
//! use fdx_pipeline::{ClientFactory, DocumentPipeline, InMemoryDocumentStore};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let container: Vec<u8> = vec![];
//! let client = ClientFactory::for_environment(Environment::Homologation)?;
//! let store = Arc::new(InMemoryDocumentStore::new());
//! let credential = CredentialBundle::decrypt(&container, "passphrase")?;
//! let pipeline = DocumentPipeline::new(client, store, credential);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod factory;
pub mod orchestrator;
pub mod store;

pub use error::PipelineError;
pub use factory::ClientFactory;
pub use orchestrator::{
    AuthorizeResponse, CancelResponse, DocumentPipeline, InvalidateRangeResponse,
};
pub use store::{DocumentStore, InMemoryDocumentStore, PersistenceError};
