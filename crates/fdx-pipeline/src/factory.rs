//! Client selection at startup.
//!
//! The authority client is chosen once, when the process wires itself
//! up, and shared behind an `Arc` from then on. Nothing in the
//! orchestrator consults the environment again.

use std::sync::Arc;

use fdx_gateway::{
    AuthorityClient, Environment, GatewayConfig, GatewayError, HttpAuthorityClient,
    MockAuthorityClient,
};

/// Builds the authority client a deployment runs against.
#[derive(Debug, Clone, Copy)]
pub struct ClientFactory;

impl ClientFactory {
    /// Live HTTP client for the given environment.
    ///
    /// # Errors
    ///
    /// [`GatewayError::Config`] when the HTTP client cannot be built.
    pub fn for_environment(
        environment: Environment,
    ) -> Result<Arc<dyn AuthorityClient>, GatewayError> {
        let client = HttpAuthorityClient::new(GatewayConfig::new(environment))?;
        tracing::info!(%environment, client = client.client_name(), "authority client selected");
        Ok(Arc::new(client))
    }

    /// Deterministic mock client for tests and local development.
    pub fn mock() -> Arc<dyn AuthorityClient> {
        Arc::new(MockAuthorityClient::new())
    }
}
