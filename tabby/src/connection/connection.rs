use crate::collection::{Collection, Document};
use crate::connection::{ConnectOptions, ConnectionBuilder, ConnectionString};
use crate::errors::{ErrorKind, TabbyError, TabbyResult};
use crate::model::{Entity, Model};
use crate::schema::{pluralize, Schema};
use crate::store::Store;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use itertools::Itertools;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Connects to `uri` with the built-in in-memory store module.
///
/// Use [Connection::builder] to load other store modules.
///
/// ```rust,ignore
/// let connection = tabby::connect(
///     "memory://localhost/adopt-a-cat",
///     ConnectOptions::new().use_modern_client(true),
/// )?;
/// ```
pub fn connect(uri: &str, options: ConnectOptions) -> TabbyResult<Connection> {
    Connection::builder().options(options).connect(uri)
}

/// An open connection to one database.
///
/// The handle is cheap to clone and every clone shares the same store,
/// model bindings and collections, so it can be passed to worker threads.
/// Models hold a clone too, so the store stays open while any handle or
/// model is alive. Close it explicitly with [Connection::close], after
/// which every model of the connection fails with `StoreAlreadyClosed`.
/// When the last handle of a still-open connection is dropped, pending
/// writes are committed and the store is closed.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<ConnectionInner>,
}

impl Connection {
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }

    pub(crate) fn new(address: ConnectionString, options: ConnectOptions, store: Store) -> Self {
        Connection {
            inner: Arc::new(ConnectionInner {
                address,
                options,
                store,
                closed: AtomicBool::new(false),
                models: DashMap::new(),
                collections: DashMap::new(),
            }),
        }
    }

    pub fn database_name(&self) -> &str {
        self.inner.address.database()
    }

    pub fn connection_string(&self) -> &ConnectionString {
        &self.inner.address
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.inner.options
    }

    /// Name and version of the store behind this connection.
    pub fn store_version(&self) -> TabbyResult<String> {
        self.inner.check_opened()?;
        self.inner.store.store_version()
    }

    /// Binds the entity type `T` to its collection.
    ///
    /// The collection is `T::collection_name()` when given, otherwise the
    /// pluralized model name. Binding a model name again with the same
    /// schema returns an equivalent model; a different schema is an
    /// `InvalidOperation`.
    pub fn model<T: Entity>(&self) -> TabbyResult<Model<T>> {
        let name = T::model_name();
        let schema = T::schema()?;
        let collection_name = match T::collection_name() {
            Some(collection_name) => collection_name,
            None => self.inner.collection_name_for(&name),
        };
        let (schema, collection) = self.inner.bind(&name, collection_name, schema)?;
        Ok(Model::bound_to(&name, schema, collection, self.clone()))
    }

    /// Binds a model whose records are plain documents.
    pub fn model_with_schema(&self, name: &str, schema: Schema) -> TabbyResult<Model<Document>> {
        let collection_name = self.inner.collection_name_for(name);
        let (schema, collection) = self.inner.bind(name, collection_name, schema)?;
        Ok(Model::bound_to(name, schema, collection, self.clone()))
    }

    /// Raw access to a collection, creating it when missing.
    pub fn collection(&self, name: &str) -> TabbyResult<Collection> {
        self.inner.collection(name)
    }

    pub fn collection_names(&self) -> TabbyResult<Vec<String>> {
        self.inner.check_opened()?;
        self.inner.store.map_names()
    }

    pub fn model_names(&self) -> TabbyResult<Vec<String>> {
        self.inner.check_opened()?;
        Ok(self
            .inner
            .models
            .iter()
            .map(|entry| entry.key().clone())
            .sorted()
            .collect())
    }

    /// Flushes acknowledged writes to durable storage.
    pub fn commit(&self) -> TabbyResult<()> {
        self.inner.check_opened()?;
        self.inner.store.commit()
    }

    /// Commits and closes the store. Closing twice is a no-op.
    pub fn close(&self) -> TabbyResult<()> {
        self.inner.close()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

impl Debug for Connection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("address", &self.inner.address.to_string())
            .field("closed", &self.is_closed())
            .finish()
    }
}

struct ConnectionInner {
    address: ConnectionString,
    options: ConnectOptions,
    store: Store,
    closed: AtomicBool,
    // model name -> (collection name, schema)
    models: DashMap<String, (String, Arc<Schema>)>,
    collections: DashMap<String, Collection>,
}

impl ConnectionInner {
    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire) || self.store.is_closed().unwrap_or(true)
    }

    fn check_opened(&self) -> TabbyResult<()> {
        if self.is_closed() {
            log::error!("Connection to {} is closed", self.address);
            return Err(TabbyError::new(
                &format!("Connection to '{}' is already closed", self.address),
                ErrorKind::StoreAlreadyClosed,
            ));
        }
        Ok(())
    }

    fn collection_name_for(&self, model_name: &str) -> String {
        if self.options.is_pluralize() {
            pluralize(model_name)
        } else {
            model_name.to_string()
        }
    }

    fn bind(
        &self,
        name: &str,
        collection_name: String,
        schema: Schema,
    ) -> TabbyResult<(Arc<Schema>, Collection)> {
        self.check_opened()?;
        if name.is_empty() {
            log::error!("Model name cannot be empty");
            return Err(TabbyError::new(
                "Model name cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }

        let (collection_name, schema) = match self.models.entry(name.to_string()) {
            Entry::Occupied(entry) => {
                let (bound_collection, bound_schema) = entry.get();
                if **bound_schema != schema || *bound_collection != collection_name {
                    log::error!(
                        "Model {} is already bound to {} with schema {}",
                        name,
                        bound_collection,
                        bound_schema
                    );
                    return Err(TabbyError::new(
                        &format!("Model '{}' is already bound with a different schema", name),
                        ErrorKind::InvalidOperation,
                    ));
                }
                (bound_collection.clone(), bound_schema.clone())
            }
            Entry::Vacant(entry) => {
                let schema = Arc::new(schema);
                entry.insert((collection_name.clone(), schema.clone()));
                log::debug!("Bound model {} to collection {}", name, collection_name);
                (collection_name, schema)
            }
        };

        let collection = self.collection(&collection_name)?;
        Ok((schema, collection))
    }

    fn collection(&self, name: &str) -> TabbyResult<Collection> {
        self.check_opened()?;
        if name.is_empty() {
            log::error!("Collection name cannot be empty");
            return Err(TabbyError::new(
                "Collection name cannot be empty",
                ErrorKind::InvalidOperation,
            ));
        }

        if let Some(collection) = self.collections.get(name) {
            return Ok(collection.clone());
        }
        let map = self.store.open_map(name)?;
        let collection = self
            .collections
            .entry(name.to_string())
            .or_insert_with(|| Collection::new(name, map))
            .clone();
        Ok(collection)
    }

    fn close(&self) -> TabbyResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Ok(());
        }
        if !self.store.is_closed()? {
            self.store.commit()?;
            self.store.close()?;
        }
        self.closed.store(true, Ordering::Release);
        self.collections.clear();
        log::info!("Closed connection to {}", self.address);
        Ok(())
    }
}

impl Drop for ConnectionInner {
    fn drop(&mut self) {
        if !self.closed.load(Ordering::Acquire) {
            let _ = self.store.commit();
            let _ = self.store.close();
        }
    }
}
