//! Record schemas.
//!
//! A [Schema] is the allow-list of fields a model stores, each with a
//! [FieldType] that incoming values are cast to. [pluralize] derives the
//! collection name of a model from its name.

mod field_type;
mod pluralize;
#[allow(clippy::module_inception)]
mod schema;

pub use field_type::*;
pub use pluralize::*;
pub use schema::*;
