//! # Jurisdiction → Provider → Endpoint Resolution
//!
//! Most jurisdictions share one virtual webservice provider; São Paulo
//! runs its own dedicated endpoint set. Each provider exposes the four
//! operations in two environments (production and homologation).
//!
//! Resolution is static data, fixed at compile time; tests and local
//! rigs override the base URL through [`crate::GatewayConfig`].

use fdx_core::identifiers::JurisdictionCode;
use serde::{Deserialize, Serialize};

/// Authority environment a client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Environment {
    /// Live environment; documents are legally binding.
    Production,
    /// Homologation (rehearsal) environment.
    Homologation,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Homologation => write!(f, "homologation"),
        }
    }
}

/// Named webservice provider serving one or more jurisdictions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceProvider {
    /// Shared virtual provider used by most jurisdictions.
    SharedVirtual,
    /// Dedicated endpoint set operated by São Paulo.
    SaoPauloDedicated,
}

impl ServiceProvider {
    /// Resolve the provider for a jurisdiction.
    pub fn for_jurisdiction(jurisdiction: &JurisdictionCode) -> Self {
        match jurisdiction.as_str() {
            "SP" => Self::SaoPauloDedicated,
            _ => Self::SharedVirtual,
        }
    }

    fn base_url(&self, environment: Environment) -> &'static str {
        match (self, environment) {
            (Self::SharedVirtual, Environment::Production) => {
                "https://ws.svrs.authority.gov/v2"
            }
            (Self::SharedVirtual, Environment::Homologation) => {
                "https://hom.ws.svrs.authority.gov/v2"
            }
            (Self::SaoPauloDedicated, Environment::Production) => {
                "https://ws.sp.authority.gov/v2"
            }
            (Self::SaoPauloDedicated, Environment::Homologation) => {
                "https://hom.ws.sp.authority.gov/v2"
            }
        }
    }
}

/// The four operation URLs for one provider × environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSet {
    /// Document submission endpoint.
    pub submit: String,
    /// Status query endpoint.
    pub query: String,
    /// Per-document cancellation endpoint.
    pub cancel: String,
    /// Number-range invalidation endpoint.
    pub invalidate: String,
}

impl EndpointSet {
    /// Resolve the endpoint set for a provider and environment.
    pub fn resolve(provider: ServiceProvider, environment: Environment) -> Self {
        Self::with_base(provider.base_url(environment))
    }

    /// Build the four operation URLs from a base URL. Public so tests
    /// and local rigs can point a client at a mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            submit: format!("{base}/submit"),
            query: format!("{base}/query"),
            cancel: format!("{base}/cancel"),
            invalidate: format!("{base}/invalidate"),
        }
    }
}
