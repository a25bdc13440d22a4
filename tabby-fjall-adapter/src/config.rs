use fjall::{Config, PartitionCreateOptions};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tabby::common::{atomic, Atomic, ReadExecutor, WriteExecutor};

/// Fjall tuning shared by every store a [FjallModule](crate::FjallModule)
/// opens.
///
/// Cheap to clone; clones share the settings. Each database lives in its
/// own keyspace directory under [FjallConfig::data_dir].
#[derive(Clone)]
pub struct FjallConfig {
    inner: Arc<FjallConfigInner>,
}

impl Default for FjallConfig {
    fn default() -> Self {
        FjallConfig::new()
    }
}

impl FjallConfig {
    /// Defaults: 64 MB cache, 128 MB write buffer, 512 MB journal, all
    /// cores flushing, half of them compacting, fsync left to the OS.
    #[inline]
    pub fn new() -> FjallConfig {
        FjallConfig {
            inner: Arc::new(FjallConfigInner::new()),
        }
    }

    /// Keyspace settings for the database stored in `path`.
    pub(crate) fn keyspace_config(&self, path: &Path) -> Config {
        let mut config = Config::new(path)
            .manual_journal_persist(self.manual_journal_persist())
            .flush_workers(self.flush_workers())
            .compaction_workers(self.compaction_workers())
            .cache_size(self.cache_capacity())
            .max_journaling_size(self.max_journaling_size())
            .max_write_buffer_size(self.max_write_buffer_size());

        if self.fsync_frequency() > 0 {
            config = config.fsync_ms(Some(self.fsync_frequency()));
        }
        config
    }

    pub(crate) fn partition_config(&self) -> PartitionCreateOptions {
        PartitionCreateOptions::default().max_memtable_size(self.max_memtable_size())
    }

    /// Directory holding one keyspace per database name.
    pub fn data_dir(&self) -> PathBuf {
        self.inner.data_dir.read_with(|dir| dir.clone())
    }

    pub(crate) fn set_data_dir(&self, data_dir: impl Into<PathBuf>) {
        let data_dir = data_dir.into();
        self.inner.data_dir.write_with(|dir| *dir = data_dir);
    }

    /// Keyspace directory of `database`.
    pub fn database_path(&self, database: &str) -> PathBuf {
        self.data_dir().join(database)
    }

    #[inline]
    pub fn manual_journal_persist(&self) -> bool {
        self.inner.manual_journal_persist.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_manual_journal_persist(&self, v: bool) {
        self.inner.manual_journal_persist.store(v, Ordering::Relaxed)
    }

    #[inline]
    pub fn flush_workers(&self) -> usize {
        self.inner.flush_workers.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_flush_workers(&self, c: usize) {
        self.inner.flush_workers.store(c.max(1), Ordering::Relaxed)
    }

    #[inline]
    pub fn compaction_workers(&self) -> usize {
        self.inner.compaction_workers.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_compaction_workers(&self, c: usize) {
        self.inner.compaction_workers.store(c.max(1), Ordering::Relaxed)
    }

    /// Block cache size in bytes.
    #[inline]
    pub fn cache_capacity(&self) -> u64 {
        self.inner.cache_capacity.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_cache_capacity(&self, c: u64) {
        self.inner.cache_capacity.store(c, Ordering::Relaxed)
    }

    #[inline]
    pub fn max_journaling_size(&self) -> u64 {
        self.inner.max_journaling_size.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_max_journaling_size(&self, s: u64) {
        self.inner.max_journaling_size.store(s, Ordering::Relaxed)
    }

    #[inline]
    pub fn max_write_buffer_size(&self) -> u64 {
        self.inner.max_write_buffer_size.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_max_write_buffer_size(&self, s: u64) {
        self.inner.max_write_buffer_size.store(s, Ordering::Relaxed)
    }

    #[inline]
    pub fn max_memtable_size(&self) -> u32 {
        self.inner.max_memtable_size.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_max_memtable_size(&self, s: u32) {
        self.inner.max_memtable_size.store(s, Ordering::Relaxed)
    }

    /// Background fsync interval in milliseconds, 0 disables it.
    #[inline]
    pub fn fsync_frequency(&self) -> u16 {
        self.inner.fsync_frequency.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_fsync_frequency(&self, f: u16) {
        self.inner.fsync_frequency.store(f, Ordering::Relaxed)
    }

    /// Whether a store that is dropped without `close` persists its journal.
    #[inline]
    pub fn commit_before_close(&self) -> bool {
        self.inner.commit_before_close.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn set_commit_before_close(&self, v: bool) {
        self.inner.commit_before_close.store(v, Ordering::Relaxed)
    }
}

struct FjallConfigInner {
    data_dir: Atomic<PathBuf>,
    manual_journal_persist: AtomicBool,
    flush_workers: AtomicUsize,
    compaction_workers: AtomicUsize,
    cache_capacity: AtomicU64,
    max_journaling_size: AtomicU64,
    max_write_buffer_size: AtomicU64,
    max_memtable_size: AtomicU32,
    fsync_frequency: AtomicU16,
    commit_before_close: AtomicBool,
}

impl FjallConfigInner {
    const DEFAULT_CACHE_MB: u64 = 64;
    const DEFAULT_WRITE_BUFFER_MB: u64 = 128;
    const DEFAULT_MAX_JOURNALING_MB: u64 = 512;
    const DEFAULT_MEMTABLE_MB: u32 = 16;

    fn new() -> FjallConfigInner {
        let cpus = std::thread::available_parallelism()
            .map(usize::from)
            .unwrap_or(4);

        FjallConfigInner {
            data_dir: atomic(std::env::temp_dir().join("tabby")),
            manual_journal_persist: AtomicBool::new(false),
            flush_workers: AtomicUsize::new(cpus.max(1)),
            compaction_workers: AtomicUsize::new((cpus / 2).max(1)),
            cache_capacity: AtomicU64::new(Self::DEFAULT_CACHE_MB * 1_024 * 1_024),
            max_journaling_size: AtomicU64::new(Self::DEFAULT_MAX_JOURNALING_MB * 1_024 * 1_024),
            max_write_buffer_size: AtomicU64::new(Self::DEFAULT_WRITE_BUFFER_MB * 1_024 * 1_024),
            max_memtable_size: AtomicU32::new(Self::DEFAULT_MEMTABLE_MB * 1_024 * 1_024),
            fsync_frequency: AtomicU16::new(0),
            commit_before_close: AtomicBool::new(true),
        }
    }
}
