//! # Tax Line Arithmetic
//!
//! [`TaxLine`] carries the per-item dual-tax amounts: the two IBS
//! components (state and municipal shares) and the composite federal
//! consumption tax. The single most important correctness contract of
//! the subsystem lives here:
//!
//! ```text
//! value = round(base_value * rate / 100, 2)    (within 0.01)
//! ```
//!
//! for every (rate, value) pair. [`expected_value`] is the one rounding
//! routine; the calculator produces values through it and the
//! consistency validator re-checks stored values against it.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Maximum absolute deviation tolerated between a stored value and the
/// recomputed `base * rate / 100`.
pub const CONSISTENCY_TOLERANCE: Decimal = dec!(0.01);

/// Compute `round(base * rate / 100, 2)` with half-away-from-zero
/// rounding, the convention the authority's totals use.
pub fn expected_value(base: Decimal, rate: Decimal) -> Decimal {
    (base * rate / dec!(100)).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Per-item tax amounts under the dual-tax regime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxLine {
    /// Item base value the rates apply to.
    pub base_value: Decimal,
    /// IBS state-share rate (percent).
    pub ibs_state_rate: Decimal,
    /// IBS state-share amount.
    pub ibs_state_value: Decimal,
    /// IBS municipal-share rate (percent).
    pub ibs_municipal_rate: Decimal,
    /// IBS municipal-share amount.
    pub ibs_municipal_value: Decimal,
    /// Composite federal consumption tax rate (percent).
    pub composite_rate: Decimal,
    /// Composite federal consumption tax amount.
    pub composite_value: Decimal,
}

impl TaxLine {
    /// Build a line from a base value and the three component rates,
    /// deriving each amount through [`expected_value`].
    pub fn from_rates(
        base_value: Decimal,
        ibs_state_rate: Decimal,
        ibs_municipal_rate: Decimal,
        composite_rate: Decimal,
    ) -> Self {
        Self {
            base_value,
            ibs_state_rate,
            ibs_state_value: expected_value(base_value, ibs_state_rate),
            ibs_municipal_rate,
            ibs_municipal_value: expected_value(base_value, ibs_municipal_rate),
            composite_rate,
            composite_value: expected_value(base_value, composite_rate),
        }
    }

    /// Total IBS rate (state + municipal shares).
    pub fn ibs_total_rate(&self) -> Decimal {
        self.ibs_state_rate + self.ibs_municipal_rate
    }

    /// Total tax amount across all three components.
    pub fn total_tax(&self) -> Decimal {
        self.ibs_state_value + self.ibs_municipal_value + self.composite_value
    }

    /// The (rate, value) pairs, with a component label for diagnostics.
    pub fn components(&self) -> [(&'static str, Decimal, Decimal); 3] {
        [
            ("ibs_state", self.ibs_state_rate, self.ibs_state_value),
            (
                "ibs_municipal",
                self.ibs_municipal_rate,
                self.ibs_municipal_value,
            ),
            ("composite", self.composite_rate, self.composite_value),
        ]
    }

    /// Whether every stored value is within [`CONSISTENCY_TOLERANCE`]
    /// of the recomputed `base * rate / 100`.
    pub fn is_consistent(&self) -> bool {
        self.components().iter().all(|(_, rate, value)| {
            (*value - expected_value(self.base_value, *rate)).abs() <= CONSISTENCY_TOLERANCE
        })
    }
}
