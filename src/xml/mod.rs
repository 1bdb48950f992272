//! Raw XML records and namespace-scoped queries
//!
//! This module provides the parsed record tree handed to transformers and
//! the small query layer every field extractor is built on.

pub mod query;
pub mod tree;

pub use query::{Namespaces, XPath};
pub use tree::{RawRecord, XmlNode};
