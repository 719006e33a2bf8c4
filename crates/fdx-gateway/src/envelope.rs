//! # Wire Envelopes
//!
//! Request envelope construction and response envelope parsing for the
//! authority's XML protocol. Every response carries at minimum
//! `statusCode` and `statusMessage`; authorization responses add
//! `accessKey`, `protocolNumber` and `receivedAt`.

use chrono::{DateTime, Utc};
use fdx_core::identifiers::{AccessKey, ProtocolNumber};
use fdx_xml::{XmlElement, XmlTree};

use crate::client::{CancelRequest, InvalidateRangeRequest, SubmitRequest};
use crate::error::GatewayError;
use crate::status::{classify, AuthorityOutcome, CodeClass};

/// Parsed authority response fields, before outcome classification.
#[derive(Debug, Clone)]
pub struct AuthorityResponse {
    /// Raw status code.
    pub status_code: u16,
    /// Human-readable status message.
    pub status_message: String,
    /// Access key, on authorization.
    pub access_key: Option<AccessKey>,
    /// Protocol number, on any homologated exchange.
    pub protocol_number: Option<ProtocolNumber>,
    /// Authority-side receipt timestamp.
    pub received_at: Option<DateTime<Utc>>,
}

/// Parse a response envelope.
///
/// # Errors
///
/// [`GatewayError::MalformedResponse`] when the XML does not parse,
/// `statusCode` is absent or non-numeric, or a protocol artifact is
/// present but ill-formed.
pub fn parse_response(xml: &str, endpoint: &str) -> Result<AuthorityResponse, GatewayError> {
    let malformed = |reason: String| GatewayError::MalformedResponse {
        endpoint: endpoint.to_string(),
        reason,
    };

    let tree = XmlTree::parse(xml).map_err(|e| malformed(e.to_string()))?;

    let status_code: u16 = tree
        .leaf_text("statusCode")
        .ok_or_else(|| malformed("missing statusCode".into()))?
        .trim()
        .parse()
        .map_err(|_| malformed("statusCode is not numeric".into()))?;

    let status_message = tree.leaf_text("statusMessage").unwrap_or_default();

    let access_key = tree
        .leaf_text("accessKey")
        .map(|raw| AccessKey::new(raw.trim()))
        .transpose()
        .map_err(|e| malformed(format!("bad accessKey: {e}")))?;

    let protocol_number = tree
        .leaf_text("protocolNumber")
        .map(|raw| ProtocolNumber::new(raw.trim()))
        .transpose()
        .map_err(|e| malformed(format!("bad protocolNumber: {e}")))?;

    let received_at = tree
        .leaf_text("receivedAt")
        .map(|raw| {
            DateTime::parse_from_rfc3339(raw.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| malformed(format!("bad receivedAt: {e}")))
        })
        .transpose()?;

    Ok(AuthorityResponse {
        status_code,
        status_message,
        access_key,
        protocol_number,
        received_at,
    })
}

/// Classify a parsed response into a canonical outcome, checking that
/// the artifacts each class mandates are present.
pub fn outcome_for(
    response: AuthorityResponse,
    endpoint: &str,
) -> Result<AuthorityOutcome, GatewayError> {
    let missing = |what: &str| GatewayError::MalformedResponse {
        endpoint: endpoint.to_string(),
        reason: format!("code {} without {what}", response.status_code),
    };

    match classify(response.status_code) {
        CodeClass::Authorized => Ok(AuthorityOutcome::Authorized {
            code: response.status_code,
            access_key: response.access_key.ok_or_else(|| missing("accessKey"))?,
            protocol: response
                .protocol_number
                .ok_or_else(|| missing("protocolNumber"))?,
            received_at: response.received_at,
        }),
        CodeClass::CancellationHomologated => Ok(AuthorityOutcome::CancellationHomologated {
            code: response.status_code,
            protocol: response
                .protocol_number
                .ok_or_else(|| missing("protocolNumber"))?,
        }),
        CodeClass::InvalidationHomologated => Ok(AuthorityOutcome::InvalidationHomologated {
            protocol: response
                .protocol_number
                .ok_or_else(|| missing("protocolNumber"))?,
        }),
        CodeClass::Processing => Ok(AuthorityOutcome::Processing),
        CodeClass::Rejected => Ok(AuthorityOutcome::Rejected {
            code: response.status_code,
            message: response.status_message,
        }),
    }
}

// -- request envelopes ---------------------------------------------------------

/// Submission envelope: the signed document wrapped with routing data.
pub fn submit_envelope(request: &SubmitRequest) -> Result<String, GatewayError> {
    let signed = XmlTree::parse(&request.signed_xml).map_err(|e| GatewayError::Config {
        reason: format!("signed payload is not well-formed XML: {e}"),
    })?;
    let envelope = XmlElement::new("submitEnvelope")
        .with_attr("jurisdiction", request.jurisdiction.as_str())
        .with_child(signed.root);
    Ok(XmlTree { root: envelope }.canonicalize())
}

/// Query envelope keyed by access key.
pub fn query_envelope(access_key: &AccessKey) -> String {
    let envelope =
        XmlElement::new("queryEnvelope").with_leaf("accessKey", access_key.as_str());
    XmlTree { root: envelope }.canonicalize()
}

/// Cancellation envelope: access key + justification.
pub fn cancel_envelope(request: &CancelRequest) -> String {
    let envelope = XmlElement::new("cancelEnvelope")
        .with_leaf("accessKey", request.access_key.as_str())
        .with_leaf("protocolNumber", request.protocol.as_str())
        .with_leaf("justification", request.justification.as_str());
    XmlTree { root: envelope }.canonicalize()
}

/// Invalidation envelope: series, range, year, justification.
pub fn invalidate_envelope(request: &InvalidateRangeRequest) -> String {
    let envelope = XmlElement::new("invalidateEnvelope")
        .with_attr("jurisdiction", request.jurisdiction.as_str())
        .with_leaf("series", request.series.to_string())
        .with_leaf("numberFrom", request.number_from.to_string())
        .with_leaf("numberTo", request.number_to.to_string())
        .with_leaf("year", request.year.to_string())
        .with_leaf("justification", request.justification.as_str());
    XmlTree { root: envelope }.canonicalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EP: &str = "http://test/query";
    const KEY_44: &str = "35260612345678000190550010000000011000000015";

    fn response(xml: &str) -> AuthorityResponse {
        parse_response(xml, EP).unwrap()
    }

    #[test]
    fn parses_full_authorization_response() {
        let xml = format!(
            "<authorityResponse><statusCode>100</statusCode>\
             <statusMessage>Autorizado o uso</statusMessage>\
             <accessKey>{KEY_44}</accessKey>\
             <protocolNumber>135260000012345</protocolNumber>\
             <receivedAt>2026-06-01T12:00:00Z</receivedAt></authorityResponse>"
        );
        let resp = response(&xml);
        assert_eq!(resp.status_code, 100);
        assert!(resp.access_key.is_some());

        let outcome = outcome_for(resp, EP).unwrap();
        match outcome {
            AuthorityOutcome::Authorized {
                code, received_at, ..
            } => {
                assert_eq!(code, 100);
                assert!(received_at.is_some());
            }
            other => panic!("expected Authorized, got {other:?}"),
        }
    }

    #[test]
    fn rejection_carries_code_and_message_verbatim() {
        let xml = "<authorityResponse><statusCode>539</statusCode>\
                   <statusMessage>Duplicidade de numero</statusMessage></authorityResponse>";
        let outcome = outcome_for(response(xml), EP).unwrap();
        assert_eq!(
            outcome,
            AuthorityOutcome::Rejected {
                code: 539,
                message: "Duplicidade de numero".into()
            }
        );
    }

    #[test]
    fn authorization_without_access_key_is_malformed() {
        let xml = "<authorityResponse><statusCode>100</statusCode>\
                   <statusMessage>ok</statusMessage></authorityResponse>";
        let err = outcome_for(response(xml), EP).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn missing_status_code_is_malformed() {
        let err = parse_response("<authorityResponse></authorityResponse>", EP).unwrap_err();
        assert!(matches!(err, GatewayError::MalformedResponse { .. }));
    }

    #[test]
    fn non_numeric_status_code_is_malformed() {
        let xml = "<r><statusCode>abc</statusCode></r>";
        assert!(parse_response(xml, EP).is_err());
    }

    #[test]
    fn garbage_xml_is_malformed() {
        assert!(parse_response("not xml at all", EP).is_err());
    }

    #[test]
    fn cancellation_homologation_needs_protocol() {
        let with = "<r><statusCode>135</statusCode>\
                    <protocolNumber>135260000054321</protocolNumber></r>";
        let outcome = outcome_for(response(with), EP).unwrap();
        assert!(matches!(
            outcome,
            AuthorityOutcome::CancellationHomologated { code: 135, .. }
        ));

        let without = "<r><statusCode>136</statusCode></r>";
        assert!(outcome_for(response(without), EP).is_err());
    }

    #[test]
    fn processing_needs_no_artifacts() {
        let xml = "<r><statusCode>105</statusCode><statusMessage>em processamento</statusMessage></r>";
        let outcome = outcome_for(response(xml), EP).unwrap();
        assert_eq!(outcome, AuthorityOutcome::Processing);
    }

    #[test]
    fn query_envelope_round_trips() {
        let key = AccessKey::new(KEY_44).unwrap();
        let xml = query_envelope(&key);
        let tree = XmlTree::parse(&xml).unwrap();
        assert_eq!(tree.leaf_text("accessKey").as_deref(), Some(KEY_44));
    }
}
