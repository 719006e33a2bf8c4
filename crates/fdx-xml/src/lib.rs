//! # FDX XML Access Layer
//!
//! The one place in the stack that touches raw XML. Everything above it
//! works with [`XmlTree`] — a small owned element tree parsed with
//! `quick-xml` — or with strings produced by [`XmlTree::canonicalize`].
//!
//! Three contracts, and nothing more:
//!
//! - **Deterministic rejection**: malformed input fails with
//!   [`XmlError::Malformed`]; it is never silently mis-parsed.
//! - **Named leaf extraction & section detection**: [`XmlTree::leaf_text`],
//!   [`XmlTree::has_section`], [`XmlTree::version_attr`] — the access
//!   pattern validators and the gateway response parser need.
//! - **Canonical form for signing**: [`XmlTree::canonicalize`] emits a
//!   deterministic exclusive-canonical-style serialization (sorted
//!   attributes, trimmed text, expanded empty elements) that is a
//!   fixpoint under re-parse.
//!
//! This is deliberately not a general XML toolkit: no DTDs, no
//! processing instructions, no mixed-content preservation.

pub mod builder;
pub mod tree;

pub use builder::DocumentXmlBuilder;
pub use tree::{wrap_with_sibling, XmlElement, XmlError, XmlNode, XmlTree};
