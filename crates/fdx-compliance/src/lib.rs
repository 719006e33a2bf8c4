//! # FDX Compliance Validators
//!
//! Three independent, stateless, side-effect-free checks, each
//! returning a structured [`ValidationReport`]:
//!
//! 1. [`consistency`] — field/range/consistency validation of computed
//!    tax lines.
//! 2. [`structure`] — structural validation of the outbound envelope
//!    against the document family's profile.
//! 3. [`credit`] — credit-compensation limits (never negative, partial
//!    grants, new-regime cap).
//!
//! [`run_all`] composes them in the fixed order consistency →
//! structural → credit: garbled numeric input is caught before the more
//! expensive structural pass runs.

pub mod consistency;
pub mod credit;
pub mod report;
pub mod structure;

pub use consistency::validate_tax_consistency;
pub use credit::{
    validate_credit_compensation, CompensationDecision, CompensationRequest, CreditBalances,
};
pub use report::ValidationReport;
pub use structure::validate_structure;

use fdx_core::document::DocumentType;
use fdx_core::taxline::TaxLine;
use fdx_xml::XmlTree;

/// Run all three validators in the mandated order.
///
/// When consistency fails with errors, the structural and credit passes
/// are skipped and the report carries only the consistency findings.
pub fn run_all(
    lines: &[TaxLine],
    envelope: &XmlTree,
    document_type: DocumentType,
    balances: &CreditBalances,
    request: &CompensationRequest,
) -> ValidationReport {
    let mut report = ValidationReport::valid();
    for line in lines {
        report.merge(validate_tax_consistency(line));
    }
    if !report.valid {
        tracing::debug!(
            errors = report.errors.len(),
            "consistency failed, skipping structural and credit passes"
        );
        return report;
    }

    report.merge(validate_structure(envelope, document_type));
    let (credit_report, _decision) = validate_credit_compensation(balances, request);
    report.merge(credit_report);
    report
}
