//! # Tax Line Computation
//!
//! [`TaxRegimeCalculator`] is the one entry point the rest of the stack
//! uses to price an item: base value in, [`TaxLine`] out. Each document
//! item gets its own independent line; scaling the base by `k` scales
//! every monetary output by `k` while the rates stay fixed for a given
//! date.

use chrono::NaiveDate;
use fdx_core::identifiers::JurisdictionCode;
use fdx_core::taxline::TaxLine;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::regime::{window_for_year, Regime};
use chrono::Datelike;

/// Errors from tax line computation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TaxError {
    /// Base values are monetary amounts and must be non-negative.
    #[error("base value must be non-negative, got {base}")]
    NegativeBase {
        /// The offending base value.
        base: Decimal,
    },
}

/// Origin and destination jurisdictions of an operation.
///
/// Rates are uniform nationally during the transition, but the pair is
/// carried through so the gateway can resolve endpoints and so a future
/// destination-based split does not change this signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionPair {
    /// Jurisdiction the operation originates in.
    pub origin: JurisdictionCode,
    /// Jurisdiction the operation is destined for.
    pub destination: JurisdictionCode,
}

impl JurisdictionPair {
    /// Create a pair from origin and destination codes.
    pub fn new(origin: JurisdictionCode, destination: JurisdictionCode) -> Self {
        Self {
            origin,
            destination,
        }
    }

    /// Whether the operation stays within one jurisdiction.
    pub fn is_internal(&self) -> bool {
        self.origin == self.destination
    }
}

/// Pure calculator over the legislated rate schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaxRegimeCalculator;

impl TaxRegimeCalculator {
    /// Create a calculator. Stateless; the schedule is compiled in.
    pub fn new() -> Self {
        Self
    }

    /// Compute the tax line for one item.
    ///
    /// Regime selection is a pure function of `operation_date.year`.
    /// Every returned component satisfies
    /// `value = round(base * rate / 100, 2)` exactly.
    ///
    /// # Errors
    ///
    /// Returns [`TaxError::NegativeBase`] for negative base values.
    pub fn calculate(
        &self,
        base_value: Decimal,
        operation_date: NaiveDate,
        _jurisdiction: &JurisdictionPair,
    ) -> Result<TaxLine, TaxError> {
        if base_value.is_sign_negative() && !base_value.is_zero() {
            return Err(TaxError::NegativeBase { base: base_value });
        }

        let window = window_for_year(operation_date.year());
        tracing::debug!(
            year = operation_date.year(),
            regime = %Regime::for_date(operation_date),
            ibs_state = %window.ibs_state_rate,
            ibs_municipal = %window.ibs_municipal_rate,
            composite = %window.composite_rate,
            "computing tax line"
        );

        Ok(TaxLine::from_rates(
            base_value,
            window.ibs_state_rate,
            window.ibs_municipal_rate,
            window.composite_rate,
        ))
    }
}
