use crate::collection::{Document, DocumentId};
use crate::errors::{ErrorKind, TabbyError, TabbyResult};
use crate::store::StoreMapProvider;
use crossbeam_skiplist::SkipMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A lock-free ordered map living only in process memory.
#[derive(Clone)]
pub struct InMemoryMap {
    inner: Arc<InMemoryMapInner>,
}

impl InMemoryMap {
    pub fn new(name: &str) -> Self {
        InMemoryMap {
            inner: Arc::new(InMemoryMapInner::new(name)),
        }
    }
}

impl StoreMapProvider for InMemoryMap {
    fn name(&self) -> String {
        self.inner.name.clone()
    }

    fn contains_key(&self, key: &DocumentId) -> TabbyResult<bool> {
        self.inner.check_opened()?;
        Ok(self.inner.backing_map.contains_key(key))
    }

    fn get(&self, key: &DocumentId) -> TabbyResult<Option<Document>> {
        self.inner.check_opened()?;
        Ok(self
            .inner
            .backing_map
            .get(key)
            .map(|entry| entry.value().clone()))
    }

    fn put(&self, key: DocumentId, value: Document) -> TabbyResult<()> {
        self.inner.check_opened()?;
        self.inner.backing_map.insert(key, value);
        Ok(())
    }

    fn put_if_absent(&self, key: DocumentId, value: Document) -> TabbyResult<Option<Document>> {
        self.inner.check_opened()?;
        let _guard = self.inner.insert_lock.lock();
        if let Some(existing) = self.inner.backing_map.get(&key) {
            return Ok(Some(existing.value().clone()));
        }
        self.inner.backing_map.insert(key, value);
        Ok(None)
    }

    fn entries(&self) -> TabbyResult<Vec<(DocumentId, Document)>> {
        self.inner.check_opened()?;
        Ok(self
            .inner
            .backing_map
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect())
    }

    fn size(&self) -> TabbyResult<u64> {
        self.inner.check_opened()?;
        Ok(self.inner.backing_map.len() as u64)
    }

    fn is_closed(&self) -> TabbyResult<bool> {
        Ok(self.inner.closed.load(Ordering::Relaxed))
    }

    fn close(&self) -> TabbyResult<()> {
        self.inner.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

struct InMemoryMapInner {
    backing_map: SkipMap<DocumentId, Document>,
    insert_lock: Mutex<()>,
    closed: AtomicBool,
    name: String,
}

impl InMemoryMapInner {
    fn new(name: &str) -> InMemoryMapInner {
        InMemoryMapInner {
            backing_map: SkipMap::new(),
            insert_lock: Mutex::new(()),
            closed: AtomicBool::from(false),
            name: name.to_string(),
        }
    }

    fn check_opened(&self) -> TabbyResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("Map {} is closed", self.name);
            return Err(TabbyError::new(
                &format!("Map {} is closed", self.name),
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        Ok(())
    }
}
