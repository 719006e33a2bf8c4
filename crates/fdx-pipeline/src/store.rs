//! # Document Persistence Seam
//!
//! The orchestrator talks to storage through [`DocumentStore`] and
//! nothing else. Production backends live behind this trait; the
//! in-memory implementation here serves tests and local rigs.

use std::collections::HashMap;

use fdx_core::{DocumentId, FiscalDocument};
use parking_lot::RwLock;

/// Failures raised by a document store.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PersistenceError {
    /// No document with the given id.
    #[error("document {id} not found")]
    NotFound {
        /// The id that was requested.
        id: DocumentId,
    },

    /// The backend refused or lost the operation.
    #[error("storage backend failed: {reason}")]
    Backend {
        /// Description of the backend failure.
        reason: String,
    },
}

/// Storage seam for fiscal documents.
///
/// Implementations must be `Send + Sync`; the orchestrator shares one
/// instance behind an `Arc` across async tasks. `save` replaces the
/// whole document; the per-document submit lock upstream guarantees a
/// single writer per id during an exchange.
pub trait DocumentStore: Send + Sync {
    /// Load a document by id.
    fn load(&self, id: &DocumentId) -> Result<FiscalDocument, PersistenceError>;

    /// Persist a document, replacing any previous state.
    fn save(&self, document: &FiscalDocument) -> Result<(), PersistenceError>;
}

/// In-memory store for tests and local rigs.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<DocumentId, FiscalDocument>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }
}

impl DocumentStore for InMemoryDocumentStore {
    fn load(&self, id: &DocumentId) -> Result<FiscalDocument, PersistenceError> {
        self.documents
            .read()
            .get(id)
            .cloned()
            .ok_or(PersistenceError::NotFound { id: *id })
    }

    fn save(&self, document: &FiscalDocument) -> Result<(), PersistenceError> {
        self.documents
            .write()
            .insert(document.id, document.clone());
        Ok(())
    }
}
