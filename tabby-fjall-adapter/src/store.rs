use crate::config::FjallConfig;
use crate::map::FjallMap;
use crate::version::fjall_version;
use crate::wrapper::to_tabby_error;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use fjall::{Keyspace, PersistMode};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tabby::errors::{ErrorKind, TabbyError, TabbyResult};
use tabby::store::{StoreMap, StoreMapProvider, StoreProvider};

const MAX_MAP_NAME_LENGTH: usize = 254;

/// A database kept in one fjall keyspace directory.
///
/// The keyspace is opened by [StoreProvider::open_or_create]; every map
/// is a partition of it.
#[derive(Clone)]
pub struct FjallStore {
    inner: Arc<FjallStoreInner>,
}

impl FjallStore {
    pub fn new(config: FjallConfig, path: PathBuf) -> FjallStore {
        FjallStore {
            inner: Arc::new(FjallStoreInner::new(config, path)),
        }
    }

    /// Keyspace directory of this database.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }
}

impl StoreProvider for FjallStore {
    fn open_or_create(&self) -> TabbyResult<()> {
        self.inner.open_or_create()
    }

    fn is_closed(&self) -> TabbyResult<bool> {
        Ok(self.inner.closed.load(Ordering::Relaxed))
    }

    fn commit(&self) -> TabbyResult<()> {
        self.inner.commit()
    }

    fn close(&self) -> TabbyResult<()> {
        self.inner.close()
    }

    fn has_map(&self, name: &str) -> TabbyResult<bool> {
        self.inner.has_map(name)
    }

    fn open_map(&self, name: &str) -> TabbyResult<StoreMap> {
        let map = self.inner.open_map(name)?;
        Ok(StoreMap::new(map))
    }

    fn map_names(&self) -> TabbyResult<Vec<String>> {
        self.inner.map_names()
    }

    fn store_version(&self) -> TabbyResult<String> {
        let version = fjall_version().map_err(|e| {
            log::error!("Failed to read fjall version: {}", e);
            TabbyError::new(&e, ErrorKind::InternalError)
        })?;
        Ok(format!("Fjall/{}", version))
    }
}

struct FjallStoreInner {
    path: PathBuf,
    config: FjallConfig,
    keyspace: OnceLock<Keyspace>,
    closed: AtomicBool,
    map_registry: DashMap<String, FjallMap>,
}

impl FjallStoreInner {
    fn new(config: FjallConfig, path: PathBuf) -> FjallStoreInner {
        FjallStoreInner {
            path,
            config,
            keyspace: OnceLock::new(),
            closed: AtomicBool::new(false),
            map_registry: DashMap::new(),
        }
    }

    fn check_opened(&self) -> TabbyResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            log::error!("Store at {} is closed", self.path.display());
            return Err(TabbyError::new(
                &format!("Store at {} is closed", self.path.display()),
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        Ok(())
    }

    fn keyspace(&self) -> TabbyResult<Keyspace> {
        self.check_opened()?;
        match self.keyspace.get() {
            Some(keyspace) => Ok(keyspace.clone()),
            None => {
                log::error!("Store at {} is not opened", self.path.display());
                Err(TabbyError::new(
                    &format!("Store at {} is not opened", self.path.display()),
                    ErrorKind::StoreNotInitialized,
                ))
            }
        }
    }

    fn open_or_create(&self) -> TabbyResult<()> {
        self.check_opened()?;
        if self.keyspace.get().is_some() {
            return Ok(());
        }

        let config = self.config.keyspace_config(&self.path);
        match Keyspace::open(config) {
            Ok(keyspace) => {
                self.keyspace.get_or_init(|| keyspace);
                log::debug!("Opened fjall keyspace at {}", self.path.display());
                Ok(())
            }
            Err(err) => {
                log::error!("Failed to open or create keyspace: {}", err);
                Err(to_tabby_error(err))
            }
        }
    }

    fn commit(&self) -> TabbyResult<()> {
        let keyspace = self.keyspace()?;
        keyspace
            .persist(PersistMode::SyncAll)
            .map_err(to_tabby_error)
    }

    fn close(&self) -> TabbyResult<()> {
        if self.closed.load(Ordering::Relaxed) {
            return Ok(());
        }

        for entry in self.map_registry.iter() {
            entry.value().close()?;
        }
        self.map_registry.clear();

        if let Some(keyspace) = self.keyspace.get() {
            keyspace
                .persist(PersistMode::SyncAll)
                .map_err(to_tabby_error)?;
        }
        self.closed.store(true, Ordering::Relaxed);
        log::debug!("Closed fjall store at {}", self.path.display());
        Ok(())
    }

    fn has_map(&self, name: &str) -> TabbyResult<bool> {
        let keyspace = self.keyspace()?;
        Ok(keyspace.partition_exists(name))
    }

    fn open_map(&self, name: &str) -> TabbyResult<FjallMap> {
        validate_map_name(name)?;
        let keyspace = self.keyspace()?;

        let entry = self.map_registry.entry(name.to_string());
        if let Entry::Occupied(ref occupied) = entry {
            if !occupied.get().is_closed()? {
                return Ok(occupied.get().clone());
            }
        }

        let partition = keyspace
            .open_partition(name, self.config.partition_config())
            .map_err(to_tabby_error)?;
        let map = FjallMap::new(name, partition);
        entry.insert(map.clone());
        Ok(map)
    }

    fn map_names(&self) -> TabbyResult<Vec<String>> {
        let keyspace = self.keyspace()?;
        let mut names: Vec<String> = keyspace
            .list_partitions()
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        names.sort();
        Ok(names)
    }
}

impl Drop for FjallStoreInner {
    fn drop(&mut self) {
        if self.closed.load(Ordering::Relaxed) || !self.config.commit_before_close() {
            return;
        }
        if let Some(keyspace) = self.keyspace.get() {
            if let Err(err) = keyspace.persist(PersistMode::SyncAll) {
                log::error!("Failed to persist keyspace on drop: {}", err);
            }
        }
    }
}

/// Partition names may only use `a-z A-Z 0-9 _ - . # $`.
fn validate_map_name(name: &str) -> TabbyResult<()> {
    let valid = !name.is_empty()
        && name.len() <= MAX_MAP_NAME_LENGTH
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '#' | '$'));
    if !valid {
        log::error!("'{}' is not a valid fjall map name", name);
        return Err(TabbyError::new(
            &format!("'{}' is not a valid fjall map name", name),
            ErrorKind::InvalidOperation,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{random_path, run_test, Context};
    use tabby::doc;
    use tabby::collection::DocumentId;

    fn create_context() -> Context {
        let path = random_path();
        let store = FjallStore::new(FjallConfig::new(), PathBuf::from(&path));
        store.open_or_create().unwrap();
        Context::new(path, None, Some(store), None)
    }

    #[test]
    fn open_map_creates_partition() {
        run_test(
            create_context,
            |ctx| {
                let store = ctx.fjall_store().unwrap();
                assert!(!store.has_map("cats").unwrap());
                store.open_map("cats").unwrap();
                assert!(store.has_map("cats").unwrap());
                store.open_map("dogs").unwrap();
                assert_eq!(store.map_names().unwrap(), vec!["cats", "dogs"]);
            },
            |_| {},
        );
    }

    #[test]
    fn reopening_map_shares_data() {
        run_test(
            create_context,
            |ctx| {
                let store = ctx.fjall_store().unwrap();
                let id = DocumentId::create_id(1_000_000_000_000_000_001).unwrap();
                store.open_map("cats").unwrap().put(id, doc! { "name": "Momo" }).unwrap();
                let again = store.open_map("cats").unwrap();
                assert_eq!(again.get(&id).unwrap(), Some(doc! { "name": "Momo" }));
            },
            |_| {},
        );
    }

    #[test]
    fn data_survives_reopen() {
        let path = random_path();
        let id = DocumentId::create_id(1_000_000_000_000_000_002).unwrap();
        {
            let store = FjallStore::new(FjallConfig::new(), PathBuf::from(&path));
            store.open_or_create().unwrap();
            store
                .open_map("cats")
                .unwrap()
                .put(id, doc! { "name": "Dooby", "age": 3.0 })
                .unwrap();
            store.commit().unwrap();
            store.close().unwrap();
        }

        let store = FjallStore::new(FjallConfig::new(), PathBuf::from(&path));
        store.open_or_create().unwrap();
        assert!(store.has_map("cats").unwrap());
        let map = store.open_map("cats").unwrap();
        assert_eq!(map.get(&id).unwrap(), Some(doc! { "name": "Dooby", "age": 3.0 }));
        store.close().unwrap();
        drop(store);
        let _ = std::fs::remove_dir_all(&path);
    }

    #[test]
    fn closed_store_rejects_maps() {
        run_test(
            create_context,
            |ctx| {
                let store = ctx.fjall_store().unwrap();
                let map = store.open_map("cats").unwrap();
                store.close().unwrap();
                assert!(store.is_closed().unwrap());
                assert!(map.is_closed().unwrap());
                let err = store.open_map("cats").err().unwrap();
                assert_eq!(err.kind(), &ErrorKind::StoreAlreadyClosed);
                // second close is a no-op
                assert!(store.close().is_ok());
            },
            |_| {},
        );
    }

    #[test]
    fn unopened_store_is_not_initialized() {
        let store = FjallStore::new(FjallConfig::new(), PathBuf::from(random_path()));
        let err = store.open_map("cats").err().unwrap();
        assert_eq!(err.kind(), &ErrorKind::StoreNotInitialized);
    }

    #[test]
    fn invalid_map_names_are_rejected() {
        run_test(
            create_context,
            |ctx| {
                let store = ctx.fjall_store().unwrap();
                for name in ["", "cat food", "cats/dogs", "köter"] {
                    let err = store.open_map(name).err().unwrap();
                    assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
                }
            },
            |_| {},
        );
    }

    #[test]
    fn reports_fjall_version() {
        let store = FjallStore::new(FjallConfig::new(), PathBuf::from(random_path()));
        let version = store.store_version().unwrap();
        assert!(version.starts_with("Fjall/2"));
    }
}
