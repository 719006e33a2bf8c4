//! Credit-compensation validation.
//!
//! The authority lets taxpayers offset document taxes against
//! accumulated credit, tracked in two buckets: legacy-regime credit and
//! new-regime credit. Grants never exceed the available bucket and
//! balances never go negative; shortfalls produce a partial grant, not
//! a failure. A new-regime grant above 10% of the document total is
//! flagged as a warning, not a hard error.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::report::ValidationReport;

/// New-regime credit may not quietly exceed this share of the document
/// total (advisory cap).
const NEW_REGIME_CAP_SHARE: Decimal = dec!(0.10);

/// Available credit, by regime bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditBalances {
    /// Credit accumulated under the legacy system.
    pub legacy: Decimal,
    /// Credit accumulated under the new dual-tax regime.
    pub new_regime: Decimal,
}

/// A compensation request against a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationRequest {
    /// Amount requested from the legacy bucket.
    pub legacy: Decimal,
    /// Amount requested from the new-regime bucket.
    pub new_regime: Decimal,
    /// Total value of the document being compensated.
    pub document_total: Decimal,
}

impl CompensationRequest {
    /// Total requested across both buckets.
    pub fn total(&self) -> Decimal {
        self.legacy + self.new_regime
    }
}

/// What the validator grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationDecision {
    /// Amount granted from the legacy bucket.
    pub granted_legacy: Decimal,
    /// Amount granted from the new-regime bucket.
    pub granted_new_regime: Decimal,
    /// Legacy credit remaining after the grant.
    pub remaining_legacy: Decimal,
    /// New-regime credit remaining after the grant.
    pub remaining_new_regime: Decimal,
    /// Whether the full requested amount was granted.
    pub fully_granted: bool,
}

impl CompensationDecision {
    /// Total granted across both buckets.
    pub fn total_granted(&self) -> Decimal {
        self.granted_legacy + self.granted_new_regime
    }
}

/// Validate and size a compensation grant.
///
/// Negative inputs are hard errors (and nothing is granted). Otherwise
/// each bucket grants `min(requested, available)`; a shortfall makes
/// the decision partial and adds a warning naming the bucket.
pub fn validate_credit_compensation(
    balances: &CreditBalances,
    request: &CompensationRequest,
) -> (ValidationReport, CompensationDecision) {
    let mut report = ValidationReport::valid();

    let denied = CompensationDecision {
        granted_legacy: Decimal::ZERO,
        granted_new_regime: Decimal::ZERO,
        remaining_legacy: balances.legacy.max(Decimal::ZERO),
        remaining_new_regime: balances.new_regime.max(Decimal::ZERO),
        fully_granted: false,
    };

    for (name, amount) in [
        ("available legacy", balances.legacy),
        ("available new-regime", balances.new_regime),
        ("requested legacy", request.legacy),
        ("requested new-regime", request.new_regime),
        ("document total", request.document_total),
    ] {
        if amount < Decimal::ZERO {
            report.error(format!("{name} amount {amount} is negative"));
        }
    }
    if !report.valid {
        return (report, denied);
    }

    let granted_legacy = request.legacy.min(balances.legacy);
    let granted_new_regime = request.new_regime.min(balances.new_regime);
    let fully_granted =
        granted_legacy == request.legacy && granted_new_regime == request.new_regime;

    if granted_legacy < request.legacy {
        report.warning(format!(
            "legacy compensation reduced to {granted_legacy} (requested {}, available {})",
            request.legacy, balances.legacy
        ));
    }
    if granted_new_regime < request.new_regime {
        report.warning(format!(
            "new-regime compensation reduced to {granted_new_regime} (requested {}, available {})",
            request.new_regime, balances.new_regime
        ));
    }

    let cap = request.document_total * NEW_REGIME_CAP_SHARE;
    if granted_new_regime > cap {
        report.warning(format!(
            "new-regime compensation {granted_new_regime} exceeds {}% of document total {}",
            NEW_REGIME_CAP_SHARE * dec!(100),
            request.document_total
        ));
    }

    let decision = CompensationDecision {
        granted_legacy,
        granted_new_regime,
        remaining_legacy: balances.legacy - granted_legacy,
        remaining_new_regime: balances.new_regime - granted_new_regime,
        fully_granted,
    };
    (report, decision)
}
