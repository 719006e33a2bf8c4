//! # Integration Tests for the Live Authority Client
//!
//! Exercises `HttpAuthorityClient` against wiremock servers to verify
//! request construction, response envelope parsing, outcome
//! classification, and the transient-only retry policy, without live
//! authority access.

use std::sync::Arc;

use fdx_core::identifiers::{
    AccessKey, DocumentId, JurisdictionCode, Justification, ProtocolNumber,
};
use fdx_gateway::{
    AuthorityClient, AuthorityOutcome, CancelRequest, Environment, GatewayConfig, GatewayError,
    HttpAuthorityClient, InvalidateRangeRequest, SubmitRequest,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_44: &str = "35260612345678000190550010000000011000000015";

fn client(server: &MockServer) -> Arc<HttpAuthorityClient> {
    let config = GatewayConfig::new(Environment::Homologation).with_base_url(server.uri());
    Arc::new(HttpAuthorityClient::new(config).expect("client build"))
}

fn submit_request() -> SubmitRequest {
    SubmitRequest {
        document_id: DocumentId::new(),
        jurisdiction: JurisdictionCode::new("RS").expect("valid uf"),
        signed_xml: "<fiscalDocument><transportDoc/><Signature/></fiscalDocument>".to_string(),
    }
}

fn authorized_body() -> String {
    format!(
        "<authorityResponse><statusCode>100</statusCode>\
         <statusMessage>Autorizado o uso</statusMessage>\
         <accessKey>{KEY_44}</accessKey>\
         <protocolNumber>135260000012345</protocolNumber>\
         <receivedAt>2026-06-01T12:00:00Z</receivedAt></authorityResponse>"
    )
}

// ── submit ────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn submit_authorized_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/submit"))
        .and(header("Content-Type", "application/xml"))
        .and(body_string_contains("submitEnvelope"))
        .respond_with(ResponseTemplate::new(200).set_body_string(authorized_body()))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client(&server)
        .submit(&submit_request())
        .await
        .expect("submit");

    match outcome {
        AuthorityOutcome::Authorized {
            code,
            access_key,
            protocol,
            received_at,
        } => {
            assert_eq!(code, 100);
            assert_eq!(access_key.as_str(), KEY_44);
            assert_eq!(protocol.as_str(), "135260000012345");
            assert!(received_at.is_some());
        }
        other => panic!("expected Authorized, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn submit_rejection_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<authorityResponse><statusCode>539</statusCode>\
             <statusMessage>Duplicidade de numero</statusMessage></authorityResponse>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client(&server)
        .submit(&submit_request())
        .await
        .expect("submit");

    assert_eq!(
        outcome,
        AuthorityOutcome::Rejected {
            code: 539,
            message: "Duplicidade de numero".to_string()
        }
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn submit_retries_server_errors_then_succeeds() {
    let server = MockServer::start().await;

    // First two attempts hit a 503; the mounted-later mock with higher
    // priority is limited to 2 responses, after which the 200 applies.
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_string(authorized_body()))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;

    let outcome = client(&server)
        .submit(&submit_request())
        .await
        .expect("submit should recover");

    assert!(outcome.is_success());
    assert_eq!(server.received_requests().await.expect("requests").len(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn submit_gives_up_after_retry_budget() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .expect(4)
        .mount(&server)
        .await;

    let err = client(&server)
        .submit(&submit_request())
        .await
        .expect_err("must exhaust retries");

    assert!(matches!(err, GatewayError::Transient { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn garbage_response_body_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_string("this is not xml"))
        .mount(&server)
        .await;

    let err = client(&server)
        .submit(&submit_request())
        .await
        .expect_err("must fail on garbage");

    assert!(matches!(err, GatewayError::MalformedResponse { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn authorization_without_protocol_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<authorityResponse><statusCode>100</statusCode>\
             <statusMessage>ok</statusMessage>\
             <accessKey>{KEY_44}</accessKey></authorityResponse>"
        )))
        .mount(&server)
        .await;

    let err = client(&server)
        .submit(&submit_request())
        .await
        .expect_err("missing protocol must fail");

    assert!(matches!(err, GatewayError::MalformedResponse { .. }));
}

// ── query ─────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn query_carries_access_key_and_parses_processing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_string_contains(KEY_44))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<authorityResponse><statusCode>105</statusCode>\
             <statusMessage>Lote em processamento</statusMessage></authorityResponse>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let key = AccessKey::new(KEY_44).expect("valid key");
    let outcome = client(&server).query(&key).await.expect("query");
    assert_eq!(outcome, AuthorityOutcome::Processing);
}

// ── cancel ────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancel_homologation_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cancel"))
        .and(body_string_contains("erro de digitacao"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<authorityResponse><statusCode>135</statusCode>\
             <statusMessage>Evento registrado</statusMessage>\
             <protocolNumber>135260000054321</protocolNumber></authorityResponse>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let request = CancelRequest {
        access_key: AccessKey::new(KEY_44).expect("valid key"),
        protocol: ProtocolNumber::new("135260000012345").expect("valid protocol"),
        justification: Justification::new("erro de digitacao nos itens").expect("valid"),
        jurisdiction: JurisdictionCode::new("RS").expect("valid uf"),
    };
    let outcome = client(&server).cancel(&request).await.expect("cancel");

    match outcome {
        AuthorityOutcome::CancellationHomologated { code, protocol } => {
            assert_eq!(code, 135);
            assert_eq!(protocol.as_str(), "135260000054321");
        }
        other => panic!("expected CancellationHomologated, got {other:?}"),
    }
}

// ── invalidate ────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn invalidation_round_trip() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/invalidate"))
        .and(body_string_contains("<numberFrom>100</numberFrom>"))
        .and(body_string_contains("<numberTo>110</numberTo>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<authorityResponse><statusCode>102</statusCode>\
             <statusMessage>Inutilizacao homologada</statusMessage>\
             <protocolNumber>135260000099999</protocolNumber></authorityResponse>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let request = InvalidateRangeRequest {
        series: 1,
        number_from: 100,
        number_to: 110,
        year: 2026,
        justification: Justification::new("numeracao pulada por falha").expect("valid"),
        jurisdiction: JurisdictionCode::new("SP").expect("valid uf"),
    };
    let outcome = client(&server)
        .invalidate_range(&request)
        .await
        .expect("invalidate");

    assert!(matches!(
        outcome,
        AuthorityOutcome::InvalidationHomologated { .. }
    ));
}
