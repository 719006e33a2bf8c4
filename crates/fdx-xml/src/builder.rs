//! Outbound envelope construction for fiscal documents.
//!
//! Builds the family-specific XML fragment the signer canonicalizes and
//! the authority receives. The shape follows each [`DocumentType`]
//! profile: declared root element, namespace, layout version attribute,
//! and the family's required top-level sections.

use fdx_core::document::{DocumentType, FiscalDocument};
use fdx_core::taxline::TaxLine;

use crate::tree::{XmlElement, XmlTree};

/// Builds outbound document envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentXmlBuilder;

impl DocumentXmlBuilder {
    /// Create a builder. Stateless.
    pub fn new() -> Self {
        Self
    }

    /// Build the unsigned fragment for a document and its tax lines.
    ///
    /// The fragment is structurally valid for the document's family by
    /// construction; the structural validator still re-checks it so
    /// hand-built payloads go through the same gate.
    pub fn build(&self, document: &FiscalDocument, lines: &[TaxLine]) -> XmlTree {
        let dt = document.document_type;

        let identification = XmlElement::new("identification")
            .with_leaf("documentType", dt.to_string())
            .with_leaf("number", document.number.to_string())
            .with_leaf("series", document.series.to_string())
            .with_leaf("jurisdiction", document.jurisdiction.as_str())
            .with_leaf(
                "operationDate",
                document.operation_date.format("%Y-%m-%d").to_string(),
            );

        let issuer = XmlElement::new("issuer")
            .with_leaf("organizationId", document.organization_id.0.to_string())
            .with_leaf("branchId", document.branch_id.0.to_string());

        let mut items = XmlElement::new(Self::items_section(dt));
        for (index, line) in lines.iter().enumerate() {
            items = items.with_child(Self::item_element(index + 1, line));
        }

        let total_tax: rust_decimal::Decimal = lines.iter().map(TaxLine::total_tax).sum();
        let totals = XmlElement::new("totals")
            .with_leaf("totalValue", format!("{:.2}", document.total_value))
            .with_leaf("totalTax", format!("{total_tax:.2}"));

        let root = XmlElement::new(dt.root_element())
            .with_attr("xmlns", dt.namespace())
            .with_attr("version", dt.layout_version())
            .with_child(identification)
            .with_child(issuer)
            .with_child(items)
            .with_child(totals);

        XmlTree { root }
    }

    /// The family-specific items section name (third required section).
    fn items_section(dt: DocumentType) -> &'static str {
        // Third entry of the profile: cargo/items/documents/service.
        dt.required_sections()[2]
    }

    fn item_element(position: usize, line: &TaxLine) -> XmlElement {
        XmlElement::new("item")
            .with_attr("n", position.to_string())
            .with_leaf("baseValue", format!("{:.2}", line.base_value))
            .with_leaf("ibsStateRate", line.ibs_state_rate.to_string())
            .with_leaf("ibsStateValue", format!("{:.2}", line.ibs_state_value))
            .with_leaf("ibsMunicipalRate", line.ibs_municipal_rate.to_string())
            .with_leaf(
                "ibsMunicipalValue",
                format!("{:.2}", line.ibs_municipal_value),
            )
            .with_leaf("compositeRate", line.composite_rate.to_string())
            .with_leaf("compositeValue", format!("{:.2}", line.composite_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fdx_core::document::DocumentType;
    use fdx_core::identifiers::{BranchId, JurisdictionCode, OrganizationId};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn document(dt: DocumentType) -> FiscalDocument {
        FiscalDocument::draft(
            dt,
            42,
            1,
            OrganizationId(Uuid::new_v4()),
            BranchId(Uuid::new_v4()),
            JurisdictionCode::new("SP").unwrap(),
            NaiveDate::from_ymd_opt(2033, 1, 1).unwrap(),
            dec!(1000.00),
        )
    }

    fn line() -> TaxLine {
        TaxLine::from_rates(dec!(1000.00), dec!(10.62), dec!(7.08), dec!(8.80))
    }

    #[test]
    fn envelope_carries_profile_root_namespace_version() {
        let doc = document(DocumentType::GoodsInvoice);
        let tree = DocumentXmlBuilder::new().build(&doc, &[line()]);
        assert_eq!(tree.root_name(), "goodsInvoice");
        assert_eq!(tree.namespace(), Some("http://authority.gov/schemas/goods"));
        assert_eq!(tree.version_attr(), Some("4.00"));
    }

    #[test]
    fn all_required_sections_present_for_every_family() {
        for dt in [
            DocumentType::TransportDoc,
            DocumentType::GoodsInvoice,
            DocumentType::Manifest,
            DocumentType::ServiceInvoice,
        ] {
            let doc = document(dt);
            let tree = DocumentXmlBuilder::new().build(&doc, &[line()]);
            for section in dt.required_sections() {
                assert!(
                    tree.has_section(section),
                    "{dt}: missing section {section}"
                );
            }
        }
    }

    #[test]
    fn leaf_values_round_trip() {
        let doc = document(DocumentType::GoodsInvoice);
        let tree = DocumentXmlBuilder::new().build(&doc, &[line()]);
        assert_eq!(tree.leaf_text("number").as_deref(), Some("42"));
        assert_eq!(tree.leaf_text("operationDate").as_deref(), Some("2033-01-01"));
        assert_eq!(tree.leaf_text("totalValue").as_deref(), Some("1000.00"));
        assert_eq!(tree.leaf_text("compositeValue").as_deref(), Some("88.00"));
        assert_eq!(tree.leaf_text("totalTax").as_deref(), Some("265.00"));
    }

    #[test]
    fn one_item_per_tax_line() {
        let doc = document(DocumentType::GoodsInvoice);
        let lines = vec![line(), line(), line()];
        let tree = DocumentXmlBuilder::new().build(&doc, &lines);
        let items = tree.root.child("items").expect("items section");
        assert_eq!(items.children.len(), 3);
    }

    #[test]
    fn built_envelope_canonicalizes_deterministically() {
        let doc = document(DocumentType::TransportDoc);
        let builder = DocumentXmlBuilder::new();
        let a = builder.build(&doc, &[line()]).canonicalize();
        let b = builder.build(&doc, &[line()]).canonicalize();
        assert_eq!(a, b);
        // And survives a parse round trip.
        assert_eq!(XmlTree::parse(&a).unwrap().canonicalize(), a);
    }
}
