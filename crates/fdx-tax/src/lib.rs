//! # FDX Tax Regime Calculator
//!
//! Pure computation of per-item dual-tax lines under the legislated
//! multi-year tax transition. Given an operation date, a base value and
//! a jurisdiction pair, [`TaxRegimeCalculator::calculate`] selects the
//! applicable [`Regime`] by calendar year, looks up that year's
//! [`RegimeWindow`] in the fixed rate schedule, and derives each
//! monetary amount as `round(base * rate / 100, 2)`.
//!
//! No I/O, no clocking: the operation date is always an input.

pub mod calculator;
pub mod regime;

pub use calculator::{JurisdictionPair, TaxError, TaxRegimeCalculator};
pub use regime::{Regime, RegimeWindow, FIRST_TRANSITION_YEAR, NEW_REGIME_YEAR};
