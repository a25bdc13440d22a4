//! Documents, identifiers and schemaless collections.
//!
//! A [Document] is an ordered map of field name to [Value](crate::common::Value).
//! A [Collection] stores documents under store-assigned [DocumentId]s and
//! answers equality queries over them.
//!
//! ```rust,ignore
//! use tabby::doc;
//! use tabby::filter::{Criteria, Projection};
//!
//! let cats = connection.collection("cats")?;
//! let id = cats.insert(doc! { "name": "Dooby", "age": 8 })?;
//! let found = cats.find(&Criteria::new(doc! { "name": "Dooby" })?, &FindOptions::new())?;
//! ```

#[allow(clippy::module_inception)]
mod collection;
mod document;
mod document_id;
mod find_options;
pub(crate) mod snowflake;

pub use collection::*;
pub use document::*;
pub use document_id::*;
pub use find_options::*;
