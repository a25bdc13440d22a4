use crate::collection::{Document, DocumentId};
use crate::errors::TabbyResult;
use std::ops::Deref;
use std::sync::Arc;

/// Backend contract for one collection's records.
///
/// Iteration order of [StoreMapProvider::entries] is ascending id order,
/// which for store-assigned ids is insertion order.
pub trait StoreMapProvider: Send + Sync {
    fn name(&self) -> String;

    fn contains_key(&self, key: &DocumentId) -> TabbyResult<bool>;

    fn get(&self, key: &DocumentId) -> TabbyResult<Option<Document>>;

    fn put(&self, key: DocumentId, value: Document) -> TabbyResult<()>;

    /// Stores `value` unless `key` is present; returns the existing value
    /// when it was.
    fn put_if_absent(&self, key: DocumentId, value: Document) -> TabbyResult<Option<Document>>;

    /// Snapshot of every entry.
    fn entries(&self) -> TabbyResult<Vec<(DocumentId, Document)>>;

    fn size(&self) -> TabbyResult<u64>;

    fn is_closed(&self) -> TabbyResult<bool>;

    fn close(&self) -> TabbyResult<()>;
}

#[derive(Clone)]
pub struct StoreMap {
    inner: Arc<dyn StoreMapProvider>,
}

impl StoreMap {
    pub fn new<T: StoreMapProvider + 'static>(inner: T) -> Self {
        StoreMap {
            inner: Arc::new(inner),
        }
    }
}

impl Deref for StoreMap {
    type Target = Arc<dyn StoreMapProvider>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
