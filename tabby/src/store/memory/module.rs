use super::InMemoryStore;
use crate::common::MEMORY_SCHEME;
use crate::connection::ConnectionString;
use crate::errors::TabbyResult;
use crate::store::{Store, StoreModule};

/// Serves `memory://host/database` addresses with a fresh [InMemoryStore]
/// per connection.
#[derive(Clone, Default)]
pub struct InMemoryStoreModule;

impl InMemoryStoreModule {
    pub fn new() -> Self {
        InMemoryStoreModule
    }
}

impl StoreModule for InMemoryStoreModule {
    fn scheme(&self) -> &str {
        MEMORY_SCHEME
    }

    fn get_store(&self, address: &ConnectionString) -> TabbyResult<Store> {
        log::debug!("Creating in-memory store for database {}", address.database());
        Ok(Store::new(InMemoryStore::new()))
    }
}
