use crate::errors::TabbyResult;
use crate::store::StoreMap;
use std::ops::Deref;
use std::sync::Arc;

/// Backend contract for a database: a named set of maps.
pub trait StoreProvider: Send + Sync {
    /// Opens the underlying storage, creating it when missing.
    fn open_or_create(&self) -> TabbyResult<()>;

    fn is_closed(&self) -> TabbyResult<bool>;

    /// Makes every acknowledged write durable.
    fn commit(&self) -> TabbyResult<()>;

    fn close(&self) -> TabbyResult<()>;

    fn has_map(&self, name: &str) -> TabbyResult<bool>;

    /// Opens the map called `name`, creating it when missing.
    fn open_map(&self, name: &str) -> TabbyResult<StoreMap>;

    fn map_names(&self) -> TabbyResult<Vec<String>>;

    fn store_version(&self) -> TabbyResult<String>;
}

/// Shared handle to a [StoreProvider].
#[derive(Clone)]
pub struct Store {
    inner: Arc<dyn StoreProvider>,
}

impl Store {
    pub fn new<T: StoreProvider + 'static>(inner: T) -> Self {
        Store {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for Store {
    type Target = Arc<dyn StoreProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
