//! Typed models over schema-checked collections.
//!
//! A [Model] binds a model name, a [Schema](crate::schema::Schema) and a
//! collection. It builds [Record]s from key-value input, runs queries and
//! hands back records that can be changed and persisted again.
//!
//! ```rust,ignore
//! #[derive(Default, Convertible, Entity)]
//! #[entity(name = "Cat")]
//! struct Cat {
//!     name: Option<String>,
//!     owner: Option<String>,
//!     age: Option<f64>,
//!     #[field(name = "favoriteFoods")]
//!     favorite_foods: Vec<String>,
//! }
//!
//! let cats = connection.model::<Cat>()?;
//! let mut dooby = cats.new_record(doc! { "name": "Dooby", "owner": "Ariel" })?;
//! dooby.persist()?;
//!
//! let mut found = cats.find_one(doc! { "name": "Dooby" }).exec()?.unwrap();
//! found.set_fields(doc! { "name": "Beans" })?;
//! found.persist()?;
//! ```

mod entity;
#[allow(clippy::module_inception)]
mod model;
mod query;
mod record;

pub use entity::*;
pub use model::*;
pub use query::*;
pub use record::*;
