use crate::collection::{Document, DocumentId, FindOptions};
use crate::errors::{ErrorKind, TabbyError, TabbyResult};
use crate::filter::{Criteria, Projection};
use crate::store::StoreMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A named set of documents backed by one store map.
///
/// Cheap to clone; clones share the map. Operations are last-write-wins:
/// there is no locking across a read and a later write of the same record.
#[derive(Clone)]
pub struct Collection {
    inner: Arc<CollectionInner>,
}

struct CollectionInner {
    name: String,
    map: StoreMap,
}

impl Debug for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.inner.name)
            .finish()
    }
}

impl Collection {
    pub(crate) fn new(name: &str, map: StoreMap) -> Self {
        Collection {
            inner: Arc::new(CollectionInner {
                name: name.to_string(),
                map,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Stores a new document and returns the id assigned to it.
    ///
    /// A document that already carries an id keeps it, unless a record
    /// with that id exists, which is an error.
    pub fn insert(&self, document: Document) -> TabbyResult<DocumentId> {
        let mut document = document;
        let id = match document.id() {
            Some(id) => id,
            None => {
                let id = DocumentId::new();
                document.set_id(id);
                id
            }
        };

        if self.inner.map.put_if_absent(id, document)?.is_some() {
            log::error!("Document with id {} already exists in {}", id, self.name());
            return Err(TabbyError::new(
                &format!("Document with id {} already exists in '{}'", id, self.name()),
                ErrorKind::InvalidOperation,
            ));
        }
        log::debug!("Inserted document {} into {}", id, self.name());
        Ok(id)
    }

    /// Overwrites the stored document that has the same id.
    pub fn replace(&self, document: Document) -> TabbyResult<()> {
        let Some(id) = document.id() else {
            log::error!("Cannot replace a document without id in {}", self.name());
            return Err(TabbyError::new(
                "Document has no id, insert it first",
                ErrorKind::InvalidId,
            ));
        };

        if !self.inner.map.contains_key(&id)? {
            log::error!("No document found with id {} in {}", id, self.name());
            return Err(TabbyError::new(
                &format!("No document found with id {} in '{}'", id, self.name()),
                ErrorKind::NotFound,
            ));
        }
        self.inner.map.put(id, document)?;
        log::debug!("Replaced document {} in {}", id, self.name());
        Ok(())
    }

    pub fn get_by_id(&self, id: &DocumentId) -> TabbyResult<Option<Document>> {
        self.inner.map.get(id)
    }

    /// Every document matching `criteria`, in id order, paged and
    /// projected by `options`.
    pub fn find(&self, criteria: &Criteria, options: &FindOptions) -> TabbyResult<Vec<Document>> {
        let matched = self.matching(criteria)?;
        let paged = matched
            .into_iter()
            .skip(options.skip_count())
            .take(options.limit_count().unwrap_or(usize::MAX));

        let projection = options.projection();
        let mut results = Vec::new();
        for document in paged {
            results.push(projection.apply(&document)?);
        }
        log::debug!(
            "Found {} documents in {} for {}",
            results.len(),
            self.name(),
            criteria
        );
        Ok(results)
    }

    /// The first document matching `criteria` in id order.
    pub fn find_one(
        &self,
        criteria: &Criteria,
        projection: &Projection,
    ) -> TabbyResult<Option<Document>> {
        let options = FindOptions::new().limit(1).project(projection.clone());
        Ok(self.find(criteria, &options)?.into_iter().next())
    }

    pub fn count(&self, criteria: &Criteria) -> TabbyResult<usize> {
        if criteria.is_empty() {
            return Ok(self.size()? as usize);
        }
        Ok(self.matching(criteria)?.len())
    }

    pub fn size(&self) -> TabbyResult<u64> {
        self.inner.map.size()
    }

    pub fn is_open(&self) -> TabbyResult<bool> {
        Ok(!self.inner.map.is_closed()?)
    }

    fn matching(&self, criteria: &Criteria) -> TabbyResult<Vec<Document>> {
        // single record lookup when the criteria pin the id
        if let Some(id) = criteria.id_condition() {
            return match self.inner.map.get(&id)? {
                Some(document) if criteria.matches(&document)? => Ok(vec![document]),
                _ => Ok(Vec::new()),
            };
        }

        let mut matched = Vec::new();
        for (_, document) in self.inner.map.entries()? {
            if criteria.matches(&document)? {
                matched.push(document);
            }
        }
        Ok(matched)
    }
}
