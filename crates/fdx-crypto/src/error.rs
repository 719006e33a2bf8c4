//! Signing service error types.

/// Errors from credential loading and fragment signing.
///
/// All variants are terminal for the calling document: there is no
/// retry without a new credential or a corrected fragment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    /// The bundle holds no usable key or certificate.
    #[error("credential bundle missing key or certificate: {reason}")]
    MissingKeyOrCert {
        /// What was missing or unusable.
        reason: String,
    },

    /// "Now" falls outside the credential's validity window.
    #[error("credential not valid at signing time (window {not_before} .. {not_after})")]
    ExpiredCredential {
        /// Start of the validity window (RFC 3339).
        not_before: String,
        /// End of the validity window (RFC 3339).
        not_after: String,
    },

    /// The container could not be decrypted with the supplied passphrase.
    #[error("credential bundle decryption failed: {reason}")]
    DecryptFailed {
        /// AEAD or container-format diagnostic. Never includes key material.
        reason: String,
    },

    /// The decrypted payload is not a valid credential record.
    #[error("malformed credential bundle: {reason}")]
    MalformedBundle {
        /// Parse diagnostic.
        reason: String,
    },

    /// The fragment to sign is not well-formed XML.
    #[error("fragment is not signable: {reason}")]
    UnsignableFragment {
        /// XML diagnostic.
        reason: String,
    },
}
