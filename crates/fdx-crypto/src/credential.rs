//! # Credential Bundles
//!
//! A credential bundle is the decrypted form of the password-protected
//! key-and-certificate container operators upload. Container layout:
//!
//! ```text
//! salt (16 bytes) || xnonce (24 bytes) || XChaCha20-Poly1305 ciphertext
//! ```
//!
//! The AEAD key is `SHA-256(salt || passphrase)`. The plaintext is a
//! JSON credential record: hex-encoded Ed25519 seed, base64 DER
//! certificate, RFC 3339 validity bounds, and the subject common name.
//!
//! ## Security Invariants
//!
//! - The decrypted seed is zeroized on drop.
//! - Key material is never logged and never serialized back out; the
//!   bundle type deliberately has no `Serialize` impl.
//! - A bundle lives for the duration of one signing call; callers drop
//!   it afterwards.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use chrono::{DateTime, Utc};
use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::SignatureError;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 24;

/// JSON record inside the encrypted container.
#[derive(Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
struct CredentialRecord {
    /// Hex-encoded 32-byte Ed25519 seed.
    seed_hex: String,
    /// Base64 DER certificate (no PEM delimiters).
    certificate_b64: String,
    /// RFC 3339 start of validity.
    not_before: String,
    /// RFC 3339 end of validity.
    not_after: String,
    /// Certificate subject common name.
    common_name: String,
}

/// A decrypted signing credential: private key, certificate, validity
/// window, subject. Owned exclusively by the signing call that loaded it.
pub struct CredentialBundle {
    signing_key: SigningKey,
    certificate_der: Vec<u8>,
    /// Start of the validity window.
    pub not_before: DateTime<Utc>,
    /// End of the validity window.
    pub not_after: DateTime<Utc>,
    /// Certificate subject common name.
    pub common_name: String,
}

impl std::fmt::Debug for CredentialBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material must never leak through Debug output.
        f.debug_struct("CredentialBundle")
            .field("common_name", &self.common_name)
            .field("not_before", &self.not_before)
            .field("not_after", &self.not_after)
            .finish_non_exhaustive()
    }
}

impl CredentialBundle {
    /// Decrypt a credential container with the supplied passphrase.
    ///
    /// # Errors
    ///
    /// - [`SignatureError::DecryptFailed`] for truncated containers or
    ///   AEAD failures (wrong passphrase, tampered ciphertext).
    /// - [`SignatureError::MalformedBundle`] when the plaintext is not
    ///   a valid credential record.
    /// - [`SignatureError::MissingKeyOrCert`] when the record's key or
    ///   certificate fields are unusable.
    pub fn decrypt(container: &[u8], passphrase: &str) -> Result<Self, SignatureError> {
        if container.len() < SALT_LEN + NONCE_LEN + 1 {
            return Err(SignatureError::DecryptFailed {
                reason: format!("container too short: {} bytes", container.len()),
            });
        }
        let (salt, rest) = container.split_at(SALT_LEN);
        let (nonce, ciphertext) = rest.split_at(NONCE_LEN);

        let mut key = derive_key(salt, passphrase);
        let cipher = XChaCha20Poly1305::new((&key).into());
        let plaintext = cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| SignatureError::DecryptFailed {
                reason: "authentication failed (wrong passphrase or corrupted container)".into(),
            });
        key.zeroize();
        let mut plaintext = plaintext?;

        let record: CredentialRecord =
            serde_json::from_slice(&plaintext).map_err(|e| SignatureError::MalformedBundle {
                reason: e.to_string(),
            })?;
        plaintext.zeroize();

        Self::from_record(&record)
    }

    fn from_record(record: &CredentialRecord) -> Result<Self, SignatureError> {
        let mut seed_bytes =
            hex::decode(&record.seed_hex).map_err(|_| SignatureError::MissingKeyOrCert {
                reason: "seed is not valid hex".into(),
            })?;
        let seed: [u8; 32] =
            seed_bytes
                .as_slice()
                .try_into()
                .map_err(|_| SignatureError::MissingKeyOrCert {
                    reason: format!("seed must be 32 bytes, got {}", seed_bytes.len()),
                })?;
        let signing_key = SigningKey::from_bytes(&seed);
        seed_bytes.zeroize();

        if record.certificate_b64.is_empty() {
            return Err(SignatureError::MissingKeyOrCert {
                reason: "certificate is empty".into(),
            });
        }
        use base64::Engine;
        let certificate_der = base64::engine::general_purpose::STANDARD
            .decode(&record.certificate_b64)
            .map_err(|_| SignatureError::MissingKeyOrCert {
                reason: "certificate is not valid base64".into(),
            })?;

        let not_before = parse_rfc3339(&record.not_before)?;
        let not_after = parse_rfc3339(&record.not_after)?;
        if not_after < not_before {
            return Err(SignatureError::MalformedBundle {
                reason: "validity window ends before it starts".into(),
            });
        }

        Ok(Self {
            signing_key,
            certificate_der,
            not_before,
            not_after,
            common_name: record.common_name.clone(),
        })
    }

    /// Encrypt a credential record into container form. Test and
    /// provisioning helper; production bundles arrive pre-encrypted.
    pub fn encrypt(
        seed: &[u8; 32],
        certificate_der: &[u8],
        not_before: DateTime<Utc>,
        not_after: DateTime<Utc>,
        common_name: &str,
        passphrase: &str,
        salt: [u8; SALT_LEN],
        nonce: [u8; NONCE_LEN],
    ) -> Result<Vec<u8>, SignatureError> {
        use base64::Engine;
        let record = CredentialRecord {
            seed_hex: hex::encode(seed),
            certificate_b64: base64::engine::general_purpose::STANDARD.encode(certificate_der),
            not_before: not_before.to_rfc3339(),
            not_after: not_after.to_rfc3339(),
            common_name: common_name.to_string(),
        };
        let mut plaintext =
            serde_json::to_vec(&record).map_err(|e| SignatureError::MalformedBundle {
                reason: e.to_string(),
            })?;

        let mut key = derive_key(&salt, passphrase);
        let cipher = XChaCha20Poly1305::new((&key).into());
        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext.as_slice())
            .map_err(|_| SignatureError::DecryptFailed {
                reason: "encryption failed".into(),
            });
        key.zeroize();
        plaintext.zeroize();
        let ciphertext = ciphertext?;

        let mut container = Vec::with_capacity(SALT_LEN + NONCE_LEN + ciphertext.len());
        container.extend_from_slice(&salt);
        container.extend_from_slice(&nonce);
        container.extend_from_slice(&ciphertext);
        Ok(container)
    }

    /// Whether `now` falls inside the validity window.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.not_before <= now && now <= self.not_after
    }

    /// Borrow the signing key for one signature.
    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// The DER certificate bytes.
    pub fn certificate_der(&self) -> &[u8] {
        &self.certificate_der
    }
}

impl Drop for CredentialBundle {
    fn drop(&mut self) {
        // SigningKey zeroizes itself (ed25519-dalek zeroize feature);
        // the certificate is public but cleared with the rest.
        self.certificate_der.zeroize();
    }
}

fn derive_key(salt: &[u8], passphrase: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(passphrase.as_bytes());
    hasher.finalize().into()
}

fn parse_rfc3339(value: &str) -> Result<DateTime<Utc>, SignatureError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| SignatureError::MalformedBundle {
            reason: format!("bad timestamp {value:?}: {e}"),
        })
}

/// Result of a credential health check, surfaced to operators as a
/// business outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialStatus {
    /// Whether the credential can sign right now.
    pub valid: bool,
    /// End of the validity window (RFC 3339), when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    /// Certificate subject common name, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
}

/// Check a credential's validity window against `now`.
///
/// Never returns an error: callers surface "certificate invalid" as a
/// normal business outcome, not a crash.
pub fn verify_credential(bundle: &CredentialBundle, now: DateTime<Utc>) -> CredentialStatus {
    CredentialStatus {
        valid: bundle.is_valid_at(now),
        expires_at: Some(bundle.not_after.to_rfc3339()),
        common_name: Some(bundle.common_name.clone()),
    }
}
