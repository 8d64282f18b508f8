//! Core types: XML trees, the part store and definition records

pub mod document;
pub mod records;
pub mod xml;

pub use document::*;
pub use records::*;
pub use xml::{NodeId, NodeKind, XmlTree, A_NS, PKG_REL_NS, R_NS, W_NS};
