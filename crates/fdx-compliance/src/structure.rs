//! Structural validation of outbound envelopes.
//!
//! Checks the declared root element, namespace and required top-level
//! sections for the document family. A missing or mismatched layout
//! version is a warning, not an error: some authority environments
//! tolerate version drift and rejecting locally would block documents
//! the authority would accept.

use fdx_core::document::DocumentType;
use fdx_xml::XmlTree;

use crate::report::ValidationReport;

/// Validate an envelope against its family profile.
pub fn validate_structure(envelope: &XmlTree, document_type: DocumentType) -> ValidationReport {
    let mut report = ValidationReport::valid();

    let expected_root = document_type.root_element();
    if envelope.root_name() != expected_root {
        report.error(format!(
            "root element {:?} does not match declared {expected_root:?}",
            envelope.root_name()
        ));
        // Without the right root the section checks would only add noise.
        return report;
    }

    match envelope.namespace() {
        None => report.error(format!(
            "missing xmlns declaration, expected {:?}",
            document_type.namespace()
        )),
        Some(ns) if ns != document_type.namespace() => report.error(format!(
            "namespace {ns:?} does not match declared {:?}",
            document_type.namespace()
        )),
        Some(_) => {}
    }

    for section in document_type.required_sections() {
        if !envelope.has_section(section) {
            report.error(format!("required section {section:?} is missing"));
        }
    }

    match envelope.version_attr() {
        None => report.warning("version marker absent".to_string()),
        Some(v) if v != document_type.layout_version() => report.warning(format!(
            "version marker {v:?} differs from expected {:?}",
            document_type.layout_version()
        )),
        Some(_) => {}
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(xml: &str) -> XmlTree {
        XmlTree::parse(xml).unwrap()
    }

    const GOOD: &str = concat!(
        r#"<goodsInvoice xmlns="http://authority.gov/schemas/goods" version="4.00">"#,
        "<identification></identification><issuer></issuer>",
        "<items></items><totals></totals></goodsInvoice>"
    );

    #[test]
    fn complete_envelope_passes() {
        let report = validate_structure(&envelope(GOOD), DocumentType::GoodsInvoice);
        assert!(report.valid, "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn wrong_root_is_an_error_and_stops() {
        let report = validate_structure(
            &envelope("<serviceInvoice></serviceInvoice>"),
            DocumentType::GoodsInvoice,
        );
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("root"));
    }

    #[test]
    fn missing_namespace_is_an_error() {
        let xml = concat!(
            r#"<goodsInvoice version="4.00">"#,
            "<identification></identification><issuer></issuer>",
            "<items></items><totals></totals></goodsInvoice>"
        );
        let report = validate_structure(&envelope(xml), DocumentType::GoodsInvoice);
        assert!(!report.valid);
        assert!(report.errors[0].contains("xmlns"));
    }

    #[test]
    fn wrong_namespace_is_an_error() {
        let xml = concat!(
            r#"<goodsInvoice xmlns="http://other" version="4.00">"#,
            "<identification></identification><issuer></issuer>",
            "<items></items><totals></totals></goodsInvoice>"
        );
        assert!(!validate_structure(&envelope(xml), DocumentType::GoodsInvoice).valid);
    }

    #[test]
    fn missing_section_is_an_error() {
        let xml = concat!(
            r#"<goodsInvoice xmlns="http://authority.gov/schemas/goods" version="4.00">"#,
            "<identification></identification><issuer></issuer>",
            "<totals></totals></goodsInvoice>"
        );
        let report = validate_structure(&envelope(xml), DocumentType::GoodsInvoice);
        assert!(!report.valid);
        assert!(report.errors[0].contains("items"));
    }

    #[test]
    fn absent_version_is_only_a_warning() {
        let xml = concat!(
            r#"<goodsInvoice xmlns="http://authority.gov/schemas/goods">"#,
            "<identification></identification><issuer></issuer>",
            "<items></items><totals></totals></goodsInvoice>"
        );
        let report = validate_structure(&envelope(xml), DocumentType::GoodsInvoice);
        assert!(report.valid);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn mismatched_version_is_only_a_warning() {
        let xml = concat!(
            r#"<goodsInvoice xmlns="http://authority.gov/schemas/goods" version="3.10">"#,
            "<identification></identification><issuer></issuer>",
            "<items></items><totals></totals></goodsInvoice>"
        );
        let report = validate_structure(&envelope(xml), DocumentType::GoodsInvoice);
        assert!(report.valid);
        assert!(report.warnings[0].contains("3.10"));
    }

    #[test]
    fn transport_profile_checks_cargo_section() {
        let xml = concat!(
            r#"<transportDoc xmlns="http://authority.gov/schemas/transport" version="3.00">"#,
            "<identification></identification><issuer></issuer>",
            "<cargo></cargo><totals></totals></transportDoc>"
        );
        assert!(validate_structure(&envelope(xml), DocumentType::TransportDoc).valid);
    }
}
