//! Field, range and consistency validation of computed tax lines.
//!
//! Re-derives `expected = base * rate / 100` for every component and
//! flags stored values that drift beyond the 0.01 tolerance. This is
//! the independent re-check of the calculator's core contract; it runs
//! before anything touches the network.

use fdx_core::taxline::{expected_value, TaxLine, CONSISTENCY_TOLERANCE};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::report::ValidationReport;

/// Any component rate above this is flagged as unusual (warning only).
const UNUSUAL_RATE_THRESHOLD: Decimal = dec!(20);

/// Validate one tax line: rate domains, value signs, and the
/// recomputed-value consistency contract.
pub fn validate_tax_consistency(line: &TaxLine) -> ValidationReport {
    let mut report = ValidationReport::valid();

    if line.base_value < Decimal::ZERO {
        report.error(format!("base value {} is negative", line.base_value));
    }

    for (name, rate, value) in line.components() {
        if rate < Decimal::ZERO || rate > dec!(100) {
            report.error(format!("{name} rate {rate} outside [0, 100]"));
            continue;
        }
        if rate > UNUSUAL_RATE_THRESHOLD {
            report.warning(format!("{name} rate {rate} above {UNUSUAL_RATE_THRESHOLD}%"));
        }
        if value < Decimal::ZERO {
            report.error(format!("{name} value {value} is negative"));
            continue;
        }
        let expected = expected_value(line.base_value, rate);
        let deviation = (value - expected).abs();
        if deviation > CONSISTENCY_TOLERANCE {
            report.error(format!(
                "{name} value {value} deviates from expected {expected} by {deviation}"
            ));
        }
    }

    report
}
