use super::InMemoryMap;
use crate::common::STORE_VERSION;
use crate::errors::{ErrorKind, TabbyError, TabbyResult};
use crate::store::{StoreMap, StoreMapProvider, StoreProvider};
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A store whose maps live only as long as the process.
#[derive(Clone)]
pub struct InMemoryStore {
    inner: Arc<InMemoryStoreInner>,
}

impl InMemoryStore {
    pub fn new() -> InMemoryStore {
        InMemoryStore {
            inner: Arc::new(InMemoryStoreInner::new()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreProvider for InMemoryStore {
    fn open_or_create(&self) -> TabbyResult<()> {
        self.inner.closed.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn is_closed(&self) -> TabbyResult<bool> {
        Ok(self.inner.closed.load(Ordering::Relaxed))
    }

    fn commit(&self) -> TabbyResult<()> {
        self.inner.check_opened()
    }

    fn close(&self) -> TabbyResult<()> {
        self.inner.close()
    }

    fn has_map(&self, name: &str) -> TabbyResult<bool> {
        self.inner.check_opened()?;
        Ok(self.inner.map_registry.contains_key(name))
    }

    fn open_map(&self, name: &str) -> TabbyResult<StoreMap> {
        self.inner.open_map(name)
    }

    fn map_names(&self) -> TabbyResult<Vec<String>> {
        self.inner.check_opened()?;
        let mut names: Vec<String> = self
            .inner
            .map_registry
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        Ok(names)
    }

    fn store_version(&self) -> TabbyResult<String> {
        Ok(format!("InMemory/{}", STORE_VERSION))
    }
}

struct InMemoryStoreInner {
    closed: AtomicBool,
    map_registry: DashMap<String, InMemoryMap>,
}

impl InMemoryStoreInner {
    fn new() -> InMemoryStoreInner {
        InMemoryStoreInner {
            closed: AtomicBool::from(false),
            map_registry: DashMap::new(),
        }
    }

    fn check_opened(&self) -> TabbyResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("In-memory store is closed");
            return Err(TabbyError::new(
                "Store is closed",
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        Ok(())
    }

    fn open_map(&self, name: &str) -> TabbyResult<StoreMap> {
        self.check_opened()?;
        let map = self
            .map_registry
            .entry(name.to_string())
            .or_insert_with(|| {
                log::debug!("Creating in-memory map {}", name);
                InMemoryMap::new(name)
            })
            .clone();
        Ok(StoreMap::new(map))
    }

    fn close(&self) -> TabbyResult<()> {
        if self.closed.swap(true, Ordering::Relaxed) {
            return Ok(());
        }
        for entry in self.map_registry.iter() {
            entry.value().close()?;
        }
        self.map_registry.clear();
        Ok(())
    }
}
