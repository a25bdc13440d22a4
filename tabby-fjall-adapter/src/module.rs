use crate::config::FjallConfig;
use crate::store::FjallStore;
use std::path::PathBuf;
use tabby::connection::ConnectionString;
use tabby::errors::TabbyResult;
use tabby::store::{Store, StoreModule};

/// Address scheme served by [FjallModule].
pub const FJALL_SCHEME: &str = "fjall";

/// Serves `fjall://host/database` addresses.
///
/// Each database gets its own keyspace directory under the configured data
/// directory; the host part only names the machine and is not used.
///
/// ```rust,ignore
/// use tabby::connection::Connection;
/// use tabby_fjall_adapter::FjallModule;
///
/// let module = FjallModule::with_config()
///     .data_dir("/var/lib/tabby")
///     .low_memory_preset()
///     .build();
///
/// let connection = Connection::builder()
///     .load_module(module)
///     .connect("fjall://localhost/adopt-a-cat")?;
/// ```
#[derive(Clone)]
pub struct FjallModule {
    store_config: FjallConfig,
}

impl FjallModule {
    #[inline]
    pub fn with_config() -> FjallModuleBuilder {
        FjallModuleBuilder::new()
    }

    pub fn config(&self) -> &FjallConfig {
        &self.store_config
    }
}

impl Default for FjallModule {
    fn default() -> Self {
        FjallModule::with_config().build()
    }
}

impl StoreModule for FjallModule {
    fn scheme(&self) -> &str {
        FJALL_SCHEME
    }

    fn get_store(&self, address: &ConnectionString) -> TabbyResult<Store> {
        let path = self.store_config.database_path(address.database());
        log::debug!(
            "Creating fjall store for database {} at {}",
            address.database(),
            path.display()
        );
        let store = FjallStore::new(self.store_config.clone(), path);
        Ok(Store::new(store))
    }
}

pub struct FjallModuleBuilder {
    store_config: FjallConfig,
}

impl Default for FjallModuleBuilder {
    fn default() -> Self {
        FjallModuleBuilder::new()
    }
}

impl FjallModuleBuilder {
    #[inline]
    pub fn new() -> FjallModuleBuilder {
        FjallModuleBuilder {
            store_config: FjallConfig::new(),
        }
    }

    /// Larger cache and memtables with a 100 ms background fsync.
    pub fn production_preset(self) -> Self {
        let cpus = std::thread::available_parallelism()
            .map(usize::from)
            .unwrap_or(4);

        self.cache_capacity(256 * 1024 * 1024)
            .max_write_buffer_size(128 * 1024 * 1024)
            .max_memtable_size(32 * 1024 * 1024)
            .flush_workers(cpus)
            .compaction_workers((cpus / 2).max(1))
            .fsync_frequency(100)
    }

    /// One flush and one compaction worker with small buffers.
    pub fn low_memory_preset(self) -> Self {
        self.cache_capacity(16 * 1024 * 1024)
            .max_write_buffer_size(16 * 1024 * 1024)
            .max_journaling_size(64 * 1024 * 1024)
            .max_memtable_size(4 * 1024 * 1024)
            .flush_workers(1)
            .compaction_workers(1)
    }

    pub fn data_dir(self, data_dir: impl Into<PathBuf>) -> Self {
        self.store_config.set_data_dir(data_dir);
        self
    }

    pub fn manual_journal_persist(self, manual: bool) -> Self {
        self.store_config.set_manual_journal_persist(manual);
        self
    }

    pub fn flush_workers(self, count: usize) -> Self {
        self.store_config.set_flush_workers(count);
        self
    }

    pub fn compaction_workers(self, count: usize) -> Self {
        self.store_config.set_compaction_workers(count);
        self
    }

    pub fn cache_capacity(self, bytes: u64) -> Self {
        self.store_config.set_cache_capacity(bytes);
        self
    }

    pub fn max_journaling_size(self, bytes: u64) -> Self {
        self.store_config.set_max_journaling_size(bytes);
        self
    }

    pub fn max_write_buffer_size(self, bytes: u64) -> Self {
        self.store_config.set_max_write_buffer_size(bytes);
        self
    }

    pub fn max_memtable_size(self, bytes: u32) -> Self {
        self.store_config.set_max_memtable_size(bytes);
        self
    }

    pub fn fsync_frequency(self, millis: u16) -> Self {
        self.store_config.set_fsync_frequency(millis);
        self
    }

    pub fn commit_before_close(self, commit: bool) -> Self {
        self.store_config.set_commit_before_close(commit);
        self
    }

    pub fn build(self) -> FjallModule {
        FjallModule {
            store_config: self.store_config,
        }
    }
}
