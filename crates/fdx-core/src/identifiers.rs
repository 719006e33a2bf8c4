//! # Identifier Newtypes
//!
//! Validated newtypes for the protocol identifiers the authority issues
//! and the tenant identifiers the caller supplies. All string-backed
//! identifiers validate at construction time so downstream code never
//! re-checks formats.
//!
//! ## Validation
//!
//! - [`AccessKey`]: exactly 44 ASCII digits (authority-assigned,
//!   globally unique once a document is authorized).
//! - [`ProtocolNumber`]: 1..=15 ASCII digits.
//! - [`JurisdictionCode`]: two uppercase ASCII letters (federative unit).
//! - [`Justification`]: trimmed length >= 15 — the authority rejects
//!   shorter justifications for cancel and invalidate-range, so the
//!   rule lives here, once, and is enforced before any wire call.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Unique identifier of a fiscal document within the issuing system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(Uuid);

impl DocumentId {
    /// Create a new random document identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a document identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issuing organization (tenant) identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub Uuid);

impl OrganizationId {
    /// Create a new random organization identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for OrganizationId {
    fn default() -> Self {
        Self::new()
    }
}

/// Issuing branch identifier within an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchId(pub Uuid);

impl BranchId {
    /// Create a new random branch identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BranchId {
    fn default() -> Self {
        Self::new()
    }
}

// -- Validating Deserialize for string-backed newtypes -------------------------

impl<'de> Deserialize<'de> for AccessKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for ProtocolNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for JurisdictionCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Justification {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Authority-assigned access key: exactly 44 ASCII digits, globally
/// unique once the document is authorized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AccessKey(String);

impl AccessKey {
    /// Create an access key, validating the 44-digit format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAccessKey`] if the value is
    /// not exactly 44 ASCII digits.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.len() != 44 || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidAccessKey {
                reason: format!("expected 44 digits, got {:?} chars", value.len()),
            });
        }
        Ok(Self(value))
    }

    /// Access the key digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AccessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authority-assigned protocol number proving a homologated exchange.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ProtocolNumber(String);

impl ProtocolNumber {
    /// Create a protocol number, validating it is 1..=15 ASCII digits.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidProtocolNumber`] for empty,
    /// overlong, or non-digit input.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() || value.len() > 15 {
            return Err(ValidationError::InvalidProtocolNumber {
                reason: format!("expected 1..=15 digits, got {} chars", value.len()),
            });
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidProtocolNumber {
                reason: "non-digit character".into(),
            });
        }
        Ok(Self(value))
    }

    /// Access the protocol number digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProtocolNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two-letter federative-unit code identifying the jurisdiction a
/// document is issued under (e.g. "SP", "MG").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct JurisdictionCode(String);

impl JurisdictionCode {
    /// Create a jurisdiction code, validating the two-uppercase-letter form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidJurisdictionCode`] otherwise.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into().trim().to_string();
        if value.len() != 2 || !value.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(ValidationError::InvalidJurisdictionCode {
                reason: format!("expected two uppercase letters, got {value:?}"),
            });
        }
        Ok(Self(value))
    }

    /// Access the code string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JurisdictionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cancellation or invalidation justification, trimmed and at least
/// 15 characters long.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Justification(String);

impl Justification {
    /// Minimum accepted length after trimming.
    pub const MIN_LEN: usize = 15;

    /// Create a justification, enforcing the minimum length.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::JustificationTooShort`] when the
    /// trimmed text is shorter than [`Self::MIN_LEN`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.chars().count() < Self::MIN_LEN {
            return Err(ValidationError::JustificationTooShort {
                length: trimmed.chars().count(),
            });
        }
        Ok(Self(trimmed))
    }

    /// Access the justification text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Justification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_44: &str = "35260612345678000190550010000000011000000015";

    // -- AccessKey ----------------------------------------------------------

    #[test]
    fn access_key_valid() {
        let key = AccessKey::new(KEY_44).unwrap();
        assert_eq!(key.as_str(), KEY_44);
        assert_eq!(key.to_string(), KEY_44);
    }

    #[test]
    fn access_key_rejects_wrong_length() {
        assert!(AccessKey::new("123").is_err());
        assert!(AccessKey::new(format!("{KEY_44}0")).is_err());
        assert!(AccessKey::new("").is_err());
    }

    #[test]
    fn access_key_rejects_non_digits() {
        let bad = format!("{}x", &KEY_44[..43]);
        assert!(AccessKey::new(bad).is_err());
    }

    #[test]
    fn access_key_serde_roundtrip() {
        let key = AccessKey::new(KEY_44).unwrap();
        let json = serde_json::to_string(&key).unwrap();
        let back: AccessKey = serde_json::from_str(&json).unwrap();
        assert_eq!(key, back);
    }

    #[test]
    fn access_key_deserialize_rejects_invalid() {
        let result: Result<AccessKey, _> = serde_json::from_str("\"not-a-key\"");
        assert!(result.is_err());
    }

    // -- ProtocolNumber -----------------------------------------------------

    #[test]
    fn protocol_number_valid() {
        let p = ProtocolNumber::new("135260000012345").unwrap();
        assert_eq!(p.as_str(), "135260000012345");
    }

    #[test]
    fn protocol_number_rejects_empty_and_overlong() {
        assert!(ProtocolNumber::new("").is_err());
        assert!(ProtocolNumber::new("1234567890123456").is_err());
    }

    #[test]
    fn protocol_number_rejects_non_digits() {
        assert!(ProtocolNumber::new("12345a").is_err());
    }

    // -- JurisdictionCode ---------------------------------------------------

    #[test]
    fn jurisdiction_code_valid() {
        let uf = JurisdictionCode::new("SP").unwrap();
        assert_eq!(uf.as_str(), "SP");
    }

    #[test]
    fn jurisdiction_code_trims_whitespace() {
        let uf = JurisdictionCode::new(" MG ").unwrap();
        assert_eq!(uf.as_str(), "MG");
    }

    #[test]
    fn jurisdiction_code_rejects_bad_forms() {
        assert!(JurisdictionCode::new("sp").is_err());
        assert!(JurisdictionCode::new("SPX").is_err());
        assert!(JurisdictionCode::new("S").is_err());
        assert!(JurisdictionCode::new("").is_err());
    }

    // -- Justification ------------------------------------------------------

    #[test]
    fn justification_accepts_15_chars() {
        let j = Justification::new("erro de digitacao").unwrap();
        assert_eq!(j.as_str(), "erro de digitacao");
    }

    #[test]
    fn justification_rejects_short() {
        let err = Justification::new("too short").unwrap_err();
        assert!(matches!(
            err,
            ValidationError::JustificationTooShort { length: 9 }
        ));
    }

    #[test]
    fn justification_length_counts_after_trim() {
        // 14 meaningful chars padded with spaces must still be rejected.
        assert!(Justification::new("   14-character   ").is_err());
    }

    // -- DocumentId ---------------------------------------------------------

    #[test]
    fn document_id_unique() {
        assert_ne!(DocumentId::new(), DocumentId::new());
    }

    #[test]
    fn document_id_from_uuid_roundtrip() {
        let uuid = Uuid::new_v4();
        let id = DocumentId::from_uuid(uuid);
        assert_eq!(*id.as_uuid(), uuid);
    }
}
