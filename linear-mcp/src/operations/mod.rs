//! Backend operation catalog
//!
//! The tracking service is driven through a fixed set of named GraphQL
//! operations. Each one is described by a static [`OperationDescriptor`]:
//! its document, the variables it declares, and where its result lives.
//!
//! ## Architecture
//!
//! - **Documents**: `documents.rs` - GraphQL text, opaque to everything else
//! - **Table**: `table.rs` - `OperationId` -> descriptor lookup

pub mod documents;
pub mod table;

pub use table::*;
