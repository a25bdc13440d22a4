//! Storage abstraction.
//!
//! A [Store] holds one [StoreMap] per collection; each map is keyed by
//! [DocumentId](crate::collection::DocumentId) and holds whole documents.
//! Backends plug in through a [StoreModule] registered for an address
//! scheme. The built-in backend is [memory::InMemoryStoreModule].

pub mod memory;
mod store_map;
mod store_module;
mod store_provider;

pub use store_map::*;
pub use store_module::*;
pub use store_provider::*;
