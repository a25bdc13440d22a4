use crate::connection::ConnectionString;
use crate::errors::TabbyResult;
use crate::store::Store;

/// Factory for stores reachable through one address scheme.
///
/// A connection picks the module whose [StoreModule::scheme] matches the
/// scheme of its address and asks it for a store for that address.
pub trait StoreModule: Send + Sync {
    fn scheme(&self) -> &str;

    fn get_store(&self, address: &ConnectionString) -> TabbyResult<Store>;
}
