//! # FDX Signing Service
//!
//! Produces digitally signed copies of fiscal document fragments:
//!
//! 1. [`CredentialBundle::decrypt`] opens a passphrase-protected
//!    key-and-certificate container (key material zeroized on drop,
//!    never logged, never persisted decrypted).
//! 2. [`verify_credential`] reports validity as a business outcome —
//!    it never returns an error.
//! 3. [`sign_fragment`] canonicalizes the fragment, digests it with
//!    SHA-256, signs the digest with the bundle's Ed25519 key, and
//!    embeds a `Signature` element (digest, signature, certificate —
//!    base64, no PEM delimiters) as a sibling immediately after the
//!    signed root.
//!
//! Signing is CPU-bound and synchronous; the decrypted key is borrowed
//! for the duration of one call and nothing is retained afterward.

pub mod credential;
pub mod error;
pub mod signer;

pub use credential::{verify_credential, CredentialBundle, CredentialStatus};
pub use error::SignatureError;
pub use signer::{sign_fragment, SignedDocument, SIGNED_CONTAINER_ELEMENT};
