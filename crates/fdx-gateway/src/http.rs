//! # Live HTTP Authority Client
//!
//! Production implementation of [`AuthorityClient`] over the
//! authority's XML-over-HTTPS webservices. Wraps a `reqwest::Client`
//! with per-request timeout, endpoint resolution per jurisdiction, and
//! transient-only retry via [`crate::retry`].
//!
//! Retries cover transport failures and malformed response envelopes.
//! A well-formed rejection is a final answer and is never retried.

use std::time::Duration;

use async_trait::async_trait;
use fdx_core::identifiers::{AccessKey, JurisdictionCode};
use url::Url;

use crate::client::{AuthorityClient, CancelRequest, InvalidateRangeRequest, SubmitRequest};
use crate::endpoints::{EndpointSet, Environment, ServiceProvider};
use crate::envelope;
use crate::error::GatewayError;
use crate::retry::retry_call;
use crate::status::AuthorityOutcome;

/// Configuration for the live authority client.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Environment to resolve endpoints for.
    pub environment: Environment,
    /// When set, all four operation URLs are built from this base
    /// instead of the provider's. Used by tests and local rigs.
    pub base_url_override: Option<String>,
    /// Request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl GatewayConfig {
    /// Create a configuration with default timeout.
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            base_url_override: None,
            timeout_secs: 30,
        }
    }

    /// Point all operations at a fixed base URL.
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        self.base_url_override = Some(base.into());
        self
    }
}

/// Live HTTP client for the authority's document services.
#[derive(Debug)]
pub struct HttpAuthorityClient {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpAuthorityClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Config`] when the override URL does not parse or
    /// the underlying HTTP client cannot be constructed.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        if let Some(base) = &config.base_url_override {
            Url::parse(base).map_err(|e| GatewayError::Config {
                reason: format!("invalid base url override {base:?}: {e}"),
            })?;
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Config {
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    fn endpoints_for(&self, jurisdiction: &JurisdictionCode) -> EndpointSet {
        match &self.config.base_url_override {
            Some(base) => EndpointSet::with_base(base),
            None => EndpointSet::resolve(
                ServiceProvider::for_jurisdiction(jurisdiction),
                self.config.environment,
            ),
        }
    }

    /// POST an XML envelope and classify the response.
    async fn exchange(&self, endpoint: &str, body: &str) -> Result<AuthorityOutcome, GatewayError> {
        let response = self
            .client
            .post(endpoint)
            .header(reqwest::header::CONTENT_TYPE, "application/xml")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| GatewayError::Transient {
                endpoint: endpoint.to_string(),
                reason: if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if status.is_server_error() {
            let excerpt: String = response.text().await.unwrap_or_default().chars().take(200).collect();
            return Err(GatewayError::Transient {
                endpoint: endpoint.to_string(),
                reason: format!("HTTP {status}: {excerpt}"),
            });
        }
        if !status.is_success() {
            return Err(GatewayError::MalformedResponse {
                endpoint: endpoint.to_string(),
                reason: format!("unexpected HTTP {status}"),
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| GatewayError::Transient {
                endpoint: endpoint.to_string(),
                reason: format!("reading response body: {e}"),
            })?;

        let parsed = envelope::parse_response(&text, endpoint)?;
        tracing::debug!(
            endpoint,
            status_code = parsed.status_code,
            "authority response"
        );
        envelope::outcome_for(parsed, endpoint)
    }
}

#[async_trait]
impl AuthorityClient for HttpAuthorityClient {
    async fn submit(&self, request: &SubmitRequest) -> Result<AuthorityOutcome, GatewayError> {
        let endpoint = self.endpoints_for(&request.jurisdiction).submit;
        let body = envelope::submit_envelope(request)?;
        tracing::info!(
            document_id = %request.document_id,
            jurisdiction = request.jurisdiction.as_str(),
            endpoint,
            "submitting document"
        );
        retry_call(&endpoint, || self.exchange(&endpoint, &body)).await
    }

    async fn query(&self, access_key: &AccessKey) -> Result<AuthorityOutcome, GatewayError> {
        // Queries are routed by the jurisdiction embedded in the key
        // prefix; the shared provider answers for all of them.
        let endpoint = match &self.config.base_url_override {
            Some(base) => EndpointSet::with_base(base).query,
            None => {
                EndpointSet::resolve(ServiceProvider::SharedVirtual, self.config.environment).query
            }
        };
        let body = envelope::query_envelope(access_key);
        retry_call(&endpoint, || self.exchange(&endpoint, &body)).await
    }

    async fn cancel(&self, request: &CancelRequest) -> Result<AuthorityOutcome, GatewayError> {
        let endpoint = self.endpoints_for(&request.jurisdiction).cancel;
        let body = envelope::cancel_envelope(request);
        tracing::info!(
            access_key = request.access_key.as_str(),
            endpoint,
            "requesting cancellation"
        );
        retry_call(&endpoint, || self.exchange(&endpoint, &body)).await
    }

    async fn invalidate_range(
        &self,
        request: &InvalidateRangeRequest,
    ) -> Result<AuthorityOutcome, GatewayError> {
        let endpoint = self.endpoints_for(&request.jurisdiction).invalidate;
        let body = envelope::invalidate_envelope(request);
        tracing::info!(
            series = request.series,
            number_from = request.number_from,
            number_to = request.number_to,
            endpoint,
            "requesting range invalidation"
        );
        retry_call(&endpoint, || self.exchange(&endpoint, &body)).await
    }

    fn client_name(&self) -> &str {
        "HttpAuthorityClient"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_30s_timeout() {
        let config = GatewayConfig::new(Environment::Homologation);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.base_url_override.is_none());
    }

    #[test]
    fn rejects_unparseable_override_url() {
        let config =
            GatewayConfig::new(Environment::Homologation).with_base_url("not a url at all");
        let err = HttpAuthorityClient::new(config).unwrap_err();
        assert!(matches!(err, GatewayError::Config { .. }));
    }

    #[test]
    fn override_reroutes_all_operations() {
        let config =
            GatewayConfig::new(Environment::Production).with_base_url("http://127.0.0.1:9000");
        let client = HttpAuthorityClient::new(config).unwrap();
        let set = client.endpoints_for(&JurisdictionCode::new("SP").unwrap());
        assert_eq!(set.submit, "http://127.0.0.1:9000/submit");
        assert_eq!(set.invalidate, "http://127.0.0.1:9000/invalidate");
    }
}
