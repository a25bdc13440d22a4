//! # Tabby - schema-projected document store client
//!
//! Tabby binds typed record shapes to named collections of a document
//! store and runs create, read and update operations through them.
//!
//! - **Connections**: [connect] parses `scheme://host[:port]/databaseName`
//!   and opens the store registered for the scheme. The in-memory store is
//!   built in; other stores plug in as [store::StoreModule]s through
//!   [connection::Connection::builder].
//! - **Schemas**: a [schema::Schema] is an ordered allow-list of fields and
//!   their types. Input passing through it keeps only declared fields, with
//!   values cast to the declared types.
//! - **Models and records**: a [model::Model] pairs a schema with a
//!   collection named after the pluralized model name. It builds
//!   [model::Record]s, runs equality queries with projection and paging,
//!   and persists records by id.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tabby::connection::ConnectOptions;
//! use tabby::doc;
//! use tabby::schema::{FieldType, Schema};
//!
//! let connection = tabby::connect(
//!     "memory://localhost/adopt-a-cat",
//!     ConnectOptions::new().use_modern_client(true),
//! )?;
//!
//! let schema = Schema::builder()
//!     .field("name", FieldType::String)
//!     .field("owner", FieldType::String)
//!     .field("age", FieldType::Number)
//!     .field("favoriteFoods", FieldType::array_of(FieldType::String))
//!     .build()?;
//! let cats = connection.model_with_schema("Cat", schema)?;
//!
//! let mut dooby = cats.new_record(doc! { "name": "Dooby", "owner": "Ariel", "age": 8 })?;
//! dooby.persist()?;
//!
//! let mut found = cats.find_one(doc! { "name": "Dooby" }).exec()?.unwrap();
//! found.set("name", "Beans")?;
//! found.persist()?;
//!
//! connection.close()?;
//! ```
//!
//! ## Module Organization
//!
//! - [`collection`] - documents, ids and schemaless collections
//! - [`common`] - values, type conversion and constants
//! - [`connection`] - connection strings, options and the connection handle
//! - [`errors`] - error kinds and the crate result type
//! - [`filter`] - equality criteria and projections
//! - [`model`] - models, queries and records
//! - [`schema`] - schemas, field types and pluralization
//! - [`store`] - store abstraction and the in-memory store

use crate::collection::snowflake::SnowflakeIdGenerator;
use std::sync::LazyLock;

pub mod collection;
pub mod common;
pub mod connection;
pub mod errors;
pub mod filter;
pub mod model;
pub mod schema;
pub mod store;

pub use connection::connect;

pub(crate) static ID_GENERATOR: LazyLock<SnowflakeIdGenerator> =
    LazyLock::new(SnowflakeIdGenerator::new);
