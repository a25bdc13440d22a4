use crate::wrapper::{decode_document, encode_document, to_tabby_error};
use fjall::PartitionHandle;
use parking_lot::Mutex;
use std::ops::RangeFull;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tabby::collection::{Document, DocumentId};
use tabby::errors::{ErrorKind, TabbyError, TabbyResult};
use tabby::store::StoreMapProvider;

/// One collection stored in a fjall partition.
///
/// Keys are the big-endian id bytes, so the partition's key order is the
/// id order. Values are bincode-encoded documents.
#[derive(Clone)]
pub struct FjallMap {
    inner: Arc<FjallMapInner>,
}

impl FjallMap {
    #[inline]
    pub(crate) fn new(name: &str, partition: PartitionHandle) -> FjallMap {
        FjallMap {
            inner: Arc::new(FjallMapInner::new(name, partition)),
        }
    }
}

impl StoreMapProvider for FjallMap {
    fn name(&self) -> String {
        self.inner.name.clone()
    }

    #[inline]
    fn contains_key(&self, key: &DocumentId) -> TabbyResult<bool> {
        self.inner.contains_key(key)
    }

    #[inline]
    fn get(&self, key: &DocumentId) -> TabbyResult<Option<Document>> {
        self.inner.get(key)
    }

    fn put(&self, key: DocumentId, value: Document) -> TabbyResult<()> {
        self.inner.put(key, &value)
    }

    fn put_if_absent(&self, key: DocumentId, value: Document) -> TabbyResult<Option<Document>> {
        self.inner.put_if_absent(key, &value)
    }

    fn entries(&self) -> TabbyResult<Vec<(DocumentId, Document)>> {
        self.inner.entries()
    }

    fn size(&self) -> TabbyResult<u64> {
        self.inner.size()
    }

    fn is_closed(&self) -> TabbyResult<bool> {
        Ok(self.inner.closed.load(Ordering::Relaxed))
    }

    fn close(&self) -> TabbyResult<()> {
        self.inner.closed.store(true, Ordering::Relaxed);
        Ok(())
    }
}

struct FjallMapInner {
    name: String,
    partition: PartitionHandle,
    insert_lock: Mutex<()>,
    closed: AtomicBool,
}

impl FjallMapInner {
    fn new(name: &str, partition: PartitionHandle) -> FjallMapInner {
        FjallMapInner {
            name: name.to_string(),
            partition,
            insert_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
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

    fn contains_key(&self, key: &DocumentId) -> TabbyResult<bool> {
        self.check_opened()?;
        self.partition
            .contains_key(key.to_bytes())
            .map_err(to_tabby_error)
    }

    fn get(&self, key: &DocumentId) -> TabbyResult<Option<Document>> {
        self.check_opened()?;
        match self.partition.get(key.to_bytes()) {
            Ok(Some(bytes)) => Ok(Some(decode_document(&bytes)?)),
            Ok(None) => Ok(None),
            Err(err) => Err(to_tabby_error(err)),
        }
    }

    fn put(&self, key: DocumentId, value: &Document) -> TabbyResult<()> {
        self.check_opened()?;
        let bytes = encode_document(value)?;
        self.partition
            .insert(key.to_bytes().to_vec(), bytes)
            .map_err(to_tabby_error)
    }

    fn put_if_absent(&self, key: DocumentId, value: &Document) -> TabbyResult<Option<Document>> {
        self.check_opened()?;
        let _guard = self.insert_lock.lock();
        if let Some(existing) = self.get(&key)? {
            return Ok(Some(existing));
        }
        self.put(key, value)?;
        Ok(None)
    }

    fn entries(&self) -> TabbyResult<Vec<(DocumentId, Document)>> {
        self.check_opened()?;
        let mut entries = Vec::new();
        for result in self.partition.range::<Vec<u8>, RangeFull>(..) {
            let (key, value) = result.map_err(to_tabby_error)?;
            let id = DocumentId::from_bytes(&key)?;
            entries.push((id, decode_document(&value)?));
        }
        Ok(entries)
    }

    fn size(&self) -> TabbyResult<u64> {
        self.check_opened()?;
        self.partition
            .len()
            .map(|len| len as u64)
            .map_err(to_tabby_error)
    }
}
