//! # Fragment Signing
//!
//! Deterministic pipeline: canonicalize → digest → sign → embed.
//!
//! The signed output places the `Signature` element as a sibling
//! immediately after the fragment's root, both wrapped in the
//! [`SIGNED_CONTAINER_ELEMENT`]:
//!
//! ```text
//! <fiscalDocument>
//!   <goodsInvoice ...>...</goodsInvoice>
//!   <Signature>
//!     <DigestValue>...</DigestValue>
//!     <SignatureValue>...</SignatureValue>
//!     <X509Certificate>...</X509Certificate>
//!   </Signature>
//! </fiscalDocument>
//! ```
//!
//! Digest, signature and certificate are base64 without PEM delimiters.
//! The pipeline is a pure transform over (fragment, credential, now);
//! it has no side effects and retains nothing.

use base64::Engine;
use chrono::{DateTime, Utc};
use ed25519_dalek::Signer;
use fdx_xml::{wrap_with_sibling, XmlElement, XmlTree};
use sha2::{Digest, Sha256};

use crate::credential::CredentialBundle;
use crate::error::SignatureError;

/// Container element wrapping the signed fragment and its signature.
pub const SIGNED_CONTAINER_ELEMENT: &str = "fiscalDocument";

const B64: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// A signed copy of a document fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedDocument {
    /// Full signed XML: container, fragment, signature block.
    pub xml: String,
    /// Base64 SHA-256 digest of the canonical fragment.
    pub digest_b64: String,
    /// Base64 Ed25519 signature over the digest.
    pub signature_b64: String,
    /// Canonical form of the fragment that was signed.
    pub canonical_fragment: String,
}

/// Sign a document fragment with a decrypted credential.
///
/// Preconditions: the credential's validity window must contain `now`;
/// the fragment must be well-formed XML. The caller built the fragment
/// already — its content is not this component's concern.
///
/// # Errors
///
/// - [`SignatureError::ExpiredCredential`] when `now` is outside the
///   validity window.
/// - [`SignatureError::UnsignableFragment`] when the fragment does not
///   parse.
pub fn sign_fragment(
    fragment_xml: &str,
    credential: &CredentialBundle,
    now: DateTime<Utc>,
) -> Result<SignedDocument, SignatureError> {
    if !credential.is_valid_at(now) {
        return Err(SignatureError::ExpiredCredential {
            not_before: credential.not_before.to_rfc3339(),
            not_after: credential.not_after.to_rfc3339(),
        });
    }

    let tree = XmlTree::parse(fragment_xml).map_err(|e| SignatureError::UnsignableFragment {
        reason: e.to_string(),
    })?;
    let canonical_fragment = tree.canonicalize();

    let digest = Sha256::digest(canonical_fragment.as_bytes());
    let signature = credential.signing_key().sign(&digest);

    let digest_b64 = B64.encode(digest);
    let signature_b64 = B64.encode(signature.to_bytes());
    let certificate_b64 = B64.encode(credential.certificate_der());

    let signature_block = XmlElement::new("Signature")
        .with_leaf("DigestValue", &digest_b64)
        .with_leaf("SignatureValue", &signature_b64)
        .with_leaf("X509Certificate", &certificate_b64);

    let container = wrap_with_sibling(SIGNED_CONTAINER_ELEMENT, tree.root, signature_block);
    let xml = XmlTree { root: container }.canonicalize();

    tracing::debug!(
        common_name = %credential.common_name,
        fragment_bytes = canonical_fragment.len(),
        "fragment signed"
    );

    Ok(SignedDocument {
        xml,
        digest_b64,
        signature_b64,
        canonical_fragment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::test_support::{container, wide_open_container, TEST_PASSPHRASE};
    use ed25519_dalek::{Verifier, VerifyingKey};

    const FRAGMENT: &str =
        r#"<goodsInvoice version="4.00" xmlns="http://authority.gov/schemas/goods"><identification><number>1</number></identification></goodsInvoice>"#;

    fn bundle() -> CredentialBundle {
        CredentialBundle::decrypt(&wide_open_container(), TEST_PASSPHRASE).unwrap()
    }

    fn now() -> DateTime<Utc> {
        "2026-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn signature_block_follows_fragment_root() {
        let signed = sign_fragment(FRAGMENT, &bundle(), now()).unwrap();
        let tree = XmlTree::parse(&signed.xml).unwrap();
        assert_eq!(tree.root_name(), SIGNED_CONTAINER_ELEMENT);
        assert_eq!(tree.root.children.len(), 2);

        // Order matters: fragment first, signature immediately after.
        let names: Vec<&str> = tree
            .root
            .children
            .iter()
            .filter_map(|n| match n {
                fdx_xml::XmlNode::Element(e) => Some(e.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, ["goodsInvoice", "Signature"]);
    }

    #[test]
    fn no_pem_delimiters_in_output() {
        let signed = sign_fragment(FRAGMENT, &bundle(), now()).unwrap();
        assert!(!signed.xml.contains("-----BEGIN"));
        assert!(!signed.xml.contains("-----END"));
    }

    #[test]
    fn digest_matches_canonical_fragment() {
        let signed = sign_fragment(FRAGMENT, &bundle(), now()).unwrap();
        let expected = B64.encode(Sha256::digest(signed.canonical_fragment.as_bytes()));
        assert_eq!(signed.digest_b64, expected);
    }

    #[test]
    fn signature_verifies_against_bundle_key() {
        let bundle = bundle();
        let signed = sign_fragment(FRAGMENT, &bundle, now()).unwrap();

        let digest = Sha256::digest(signed.canonical_fragment.as_bytes());
        let sig_bytes: [u8; 64] = B64
            .decode(&signed.signature_b64)
            .unwrap()
            .try_into()
            .unwrap();
        let signature = ed25519_dalek::Signature::from_bytes(&sig_bytes);

        let vk: VerifyingKey = bundle.signing_key().verifying_key();
        assert!(vk.verify(&digest, &signature).is_ok());
    }

    #[test]
    fn signing_is_deterministic_for_same_inputs() {
        let bundle = bundle();
        let a = sign_fragment(FRAGMENT, &bundle, now()).unwrap();
        let b = sign_fragment(FRAGMENT, &bundle, now()).unwrap();
        assert_eq!(a.xml, b.xml);
        assert_eq!(a.signature_b64, b.signature_b64);
    }

    #[test]
    fn whitespace_variants_sign_identically() {
        let spaced = "<a>\n  <b>v</b>\n</a>";
        let tight = "<a><b>v</b></a>";
        let bundle = bundle();
        let a = sign_fragment(spaced, &bundle, now()).unwrap();
        let b = sign_fragment(tight, &bundle, now()).unwrap();
        assert_eq!(a.digest_b64, b.digest_b64);
    }

    #[test]
    fn expired_credential_rejected() {
        let container = container(
            "2020-01-01T00:00:00Z".parse().unwrap(),
            "2021-01-01T00:00:00Z".parse().unwrap(),
        );
        let bundle = CredentialBundle::decrypt(&container, TEST_PASSPHRASE).unwrap();
        let err = sign_fragment(FRAGMENT, &bundle, now()).unwrap_err();
        assert!(matches!(err, SignatureError::ExpiredCredential { .. }));
    }

    #[test]
    fn not_yet_valid_credential_rejected() {
        let container = container(
            "2030-01-01T00:00:00Z".parse().unwrap(),
            "2031-01-01T00:00:00Z".parse().unwrap(),
        );
        let bundle = CredentialBundle::decrypt(&container, TEST_PASSPHRASE).unwrap();
        assert!(matches!(
            sign_fragment(FRAGMENT, &bundle, now()),
            Err(SignatureError::ExpiredCredential { .. })
        ));
    }

    #[test]
    fn malformed_fragment_rejected() {
        let err = sign_fragment("<a><b></a>", &bundle(), now()).unwrap_err();
        assert!(matches!(err, SignatureError::UnsignableFragment { .. }));
    }
}
