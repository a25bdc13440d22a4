use crate::collection::{Document, DocumentId};
use crate::common::{Convertible, Value, DOC_ID};
use crate::errors::{ErrorKind, TabbyError, TabbyResult};
use crate::model::{entity_to_document, Model};
use std::fmt::{Debug, Display, Formatter};

/// Whether a record has been written to its collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordState {
    Unsaved,
    Saved,
}

/// A single record of a [Model], holding a typed value of `T`.
///
/// Records built by [Model::new_record] start [RecordState::Unsaved]; the
/// first [Record::persist] inserts them and assigns an id. Records returned
/// by queries are saved, and persisting them overwrites the stored copy.
///
/// A record only carries the declared fields its input or stored document
/// had. Typed fields that were never given (a `None`, an empty list) stay
/// out of [Record::to_document] and out of the stored document.
pub struct Record<T> {
    model: Model<T>,
    id: Option<DocumentId>,
    entity: T,
    // fields as last built, loaded or persisted, without `_id`
    snapshot: Document,
    saved: bool,
    partial: bool,
}

impl<T> Record<T>
where
    T: Convertible<Output = T>,
{
    pub(crate) fn new(model: Model<T>, snapshot: Document) -> TabbyResult<Self> {
        let entity = T::from_value(&Value::Document(snapshot.clone()))?;
        Ok(Record {
            model,
            id: None,
            entity,
            snapshot,
            saved: false,
            partial: false,
        })
    }

    pub(crate) fn from_stored(
        model: Model<T>,
        mut document: Document,
        partial: bool,
    ) -> TabbyResult<Self> {
        let id = document.id();
        document.remove_id();
        let snapshot = model.schema().project(&document)?;
        let entity = T::from_value(&Value::Document(snapshot.clone()))?;
        Ok(Record {
            model,
            id,
            entity,
            snapshot,
            saved: true,
            partial,
        })
    }

    pub fn state(&self) -> RecordState {
        if self.saved {
            RecordState::Saved
        } else {
            RecordState::Unsaved
        }
    }

    pub fn id(&self) -> Option<DocumentId> {
        self.id
    }

    pub fn entity(&self) -> &T {
        &self.entity
    }

    /// Mutable access to the typed value. Changes are cast and checked
    /// against the schema on the next [Record::persist].
    pub fn entity_mut(&mut self) -> &mut T {
        &mut self.entity
    }

    pub fn into_entity(self) -> T {
        self.entity
    }

    /// True when the record was loaded through a restricting projection.
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    pub fn model(&self) -> &Model<T> {
        &self.model
    }

    /// The record as a document, including `_id` once assigned.
    ///
    /// A partial record shows only the fields its projection returned.
    pub fn to_document(&self) -> TabbyResult<Document> {
        let mut document = self.current_fields()?;
        if let Some(id) = self.id {
            document.set_id(id);
        }
        Ok(document)
    }

    // the typed value encoded, minus fields it only holds as defaults
    fn current_fields(&self) -> TabbyResult<Document> {
        let mut document = entity_to_document(&self.entity)?;
        for field in document.fields() {
            let keep = if self.partial {
                self.snapshot.contains_key(&field)
            } else {
                self.snapshot.contains_key(&field) || !is_unset(&document.get(&field)?)
            };
            if !keep {
                document.remove(&field)?;
            }
        }
        Ok(document)
    }

    fn field_order(&self) -> Vec<&str> {
        let mut order = vec![DOC_ID];
        order.extend(self.model.schema().field_names());
        order
    }

    pub fn get(&self, field: &str) -> TabbyResult<Value> {
        self.to_document()?.get(field)
    }

    /// Applies `changes` to the in-memory value.
    ///
    /// Changes go through the schema like new input: undeclared fields are
    /// dropped and declared ones are cast. Nothing is written until
    /// [Record::persist].
    pub fn set_fields(&mut self, changes: Document) -> TabbyResult<()> {
        let changes = self.model.schema().project(&changes)?;
        let mut current = self.current_fields()?;
        let mut snapshot = self.snapshot.clone();
        for (field, value) in changes.iter() {
            current.put(field.as_str(), value.clone())?;
            snapshot.put(field.as_str(), value.clone())?;
        }
        self.entity = T::from_value(&Value::Document(current))?;
        self.snapshot = snapshot;
        Ok(())
    }

    pub fn set<V: Into<Value>>(&mut self, field: &str, value: V) -> TabbyResult<()> {
        let mut changes = Document::new();
        changes.put(field, value)?;
        self.set_fields(changes)
    }

    /// Writes the record to its collection and returns its id.
    ///
    /// An unsaved record is inserted and receives a fresh id. A saved record
    /// replaces the stored document with the same id, last write wins.
    /// Partial records are refused with `InvalidOperation`.
    pub fn persist(&mut self) -> TabbyResult<DocumentId> {
        if self.partial {
            log::error!(
                "Refusing to persist a partial {} record",
                self.model.name()
            );
            return Err(TabbyError::new(
                "Record was loaded with a projection and cannot be persisted",
                ErrorKind::InvalidOperation,
            ));
        }

        let mut document = self.model.schema().project(&self.current_fields()?)?;
        let snapshot = document.clone();
        let entity = T::from_value(&Value::Document(snapshot.clone()))?;

        let id = match (self.saved, self.id) {
            (false, _) => self.model.collection().insert(document)?,
            (true, Some(id)) => {
                document.set_id(id);
                self.model.collection().replace(document)?;
                id
            }
            (true, None) => {
                log::error!("Saved {} record has no id", self.model.name());
                return Err(TabbyError::new(
                    "Saved record has no id",
                    ErrorKind::InvalidId,
                ));
            }
        };

        self.entity = entity;
        self.snapshot = snapshot;
        self.id = Some(id);
        self.saved = true;
        log::debug!("Persisted {} record {}", self.model.name(), id);
        Ok(id)
    }
}

impl<T: Clone> Clone for Record<T> {
    fn clone(&self) -> Self {
        Record {
            model: self.model.clone(),
            id: self.id,
            entity: self.entity.clone(),
            snapshot: self.snapshot.clone(),
            saved: self.saved,
            partial: self.partial,
        }
    }
}

impl<T> Debug for Record<T>
where
    T: Convertible<Output = T>,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let document = self
            .to_document()
            .map(|d| d.to_debug_string_ordered(&self.field_order()))
            .unwrap_or_else(|err| format!("<{}>", err));
        f.debug_struct("Record")
            .field("model", &self.model.name())
            .field("state", &self.state())
            .field("partial", &self.partial)
            .field("document", &document)
            .finish()
    }
}

impl<T> Display for Record<T>
where
    T: Convertible<Output = T>,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.to_document() {
            Ok(document) => write!(f, "{}", document.to_pretty_json_ordered(0, &self.field_order())),
            Err(err) => write!(f, "<unprintable {} record: {}>", self.model.name(), err),
        }
    }
}

pub(crate) fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Collection;
    use crate::doc;
    use crate::schema::{FieldType, Schema};
    use crate::store::memory::InMemoryMap;
    use crate::store::StoreMap;
    use std::sync::Arc;

    fn cats() -> Model<Document> {
        let schema = Schema::define([
            ("name", FieldType::String),
            ("owner", FieldType::String),
            ("age", FieldType::Number),
            ("favoriteFoods", FieldType::array_of(FieldType::String)),
        ])
        .unwrap();
        let collection = Collection::new("cats", StoreMap::new(InMemoryMap::new("cats")));
        Model::new("Cat", Arc::new(schema), collection)
    }

    #[test]
    fn persist_assigns_id_once() {
        let cats = cats();
        let mut dooby = cats.new_record(doc! { "name": "Dooby" }).unwrap();
        let id = dooby.persist().unwrap();
        assert_eq!(dooby.id(), Some(id));
        assert_eq!(dooby.state(), RecordState::Saved);

        // a second persist overwrites rather than inserting again
        assert_eq!(dooby.persist().unwrap(), id);
        assert_eq!(cats.collection().size().unwrap(), 1);
    }

    #[test]
    fn set_fields_then_persist_updates() {
        let cats = cats();
        cats.create(doc! { "name": "Dooby", "owner": "Ariel", "age": 8 })
            .unwrap();

        let mut dooby = cats.find_one(doc! { "name": "Dooby" }).exec().unwrap().unwrap();
        dooby.set_fields(doc! { "name": "Beans", "breed": "tabby" }).unwrap();
        assert_eq!(dooby.get("name").unwrap(), Value::from("Beans"));
        assert!(dooby.get("breed").unwrap().is_null());

        // not written yet
        assert_eq!(cats.count(doc! { "name": "Beans" }).unwrap(), 0);
        dooby.persist().unwrap();

        let beans = cats.find_one(doc! { "name": "Beans" }).exec().unwrap().unwrap();
        assert_eq!(beans.id(), dooby.id());
        assert_eq!(beans.get("owner").unwrap(), Value::from("Ariel"));
        assert_eq!(cats.count(doc! { "name": "Dooby" }).unwrap(), 0);
    }

    #[test]
    fn set_casts_value() {
        let cats = cats();
        let mut momo = cats.new_record(doc! { "name": "Momo" }).unwrap();
        momo.set("age", "7").unwrap();
        assert_eq!(momo.get("age").unwrap(), Value::F64(7.0));
        assert!(momo.set("age", "seven").is_err());
        momo.set("_id", "1").unwrap();
        assert!(momo.id().is_none());
    }

    #[test]
    fn partial_records_refuse_persist() {
        let cats = cats();
        cats.create(doc! { "name": "Dooby", "owner": "Ariel" }).unwrap();
        let mut partial = cats
            .find_one(doc! { "name": "Dooby" })
            .project(doc! { "name": 1 })
            .exec()
            .unwrap()
            .unwrap();
        assert!(partial.is_partial());
        assert!(partial.id().is_some());
        let err = partial.persist().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::InvalidOperation);
    }

    #[test]
    fn persist_drops_undeclared_entity_fields() {
        let cats = cats();
        let mut momo = cats.new_record(doc! { "name": "Momo" }).unwrap();
        momo.entity_mut().put("breed", "blah").unwrap();
        let id = momo.persist().unwrap();
        assert!(!momo.entity().contains_key("breed"));

        let stored = cats.collection().get_by_id(&id).unwrap().unwrap();
        assert!(!stored.contains_key("breed"));
    }

    #[test]
    fn saved_record_removed_from_store() {
        let cats = cats();
        let mut ghost = cats.create(doc! { "name": "Ghost" }).unwrap();
        let fresh = Collection::new("cats", StoreMap::new(InMemoryMap::new("cats")));
        let other = Model::<Document>::new("Cat", Arc::new(cats.schema().clone()), fresh);
        let mut moved = Record::from_stored(other, ghost.to_document().unwrap(), false).unwrap();
        let err = moved.persist().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotFound);
        assert!(ghost.persist().is_ok());
    }

    #[test]
    fn partial_record_shows_projected_fields_only() {
        let cats = cats();
        cats.create(doc! { "name": "Dooby", "owner": "Ariel", "age": 8 }).unwrap();
        let partial = cats
            .find_one(doc! { "name": "Dooby" })
            .project(doc! { "name": 1, "_id": 0 })
            .exec()
            .unwrap()
            .unwrap();
        let document = partial.to_document().unwrap();
        assert_eq!(document, doc! { "name": "Dooby" });
        assert!(partial.get("owner").unwrap().is_null());
    }

    #[test]
    fn display_follows_schema_order() {
        let cats = cats();
        let dooby = cats
            .create(doc! { "age": 8, "owner": "Ariel", "name": "Dooby" })
            .unwrap();
        let shown = dooby.to_string();
        let position = |key: &str| shown.find(&format!("\"{}\"", key)).unwrap();
        assert!(position("_id") < position("name"));
        assert!(position("name") < position("owner"));
        assert!(position("owner") < position("age"));

        let debug = format!("{:?}", dooby);
        assert!(debug.find("\\\"name\\\"").unwrap() < debug.find("\\\"age\\\"").unwrap());
    }

    #[test]
    fn display_and_debug() {
        let cats = cats();
        let dooby = cats.create(doc! { "name": "Dooby" }).unwrap();
        assert!(dooby.to_string().contains("Dooby"));
        assert!(dooby.to_string().contains("_id"));
        assert!(format!("{:?}", dooby).contains("Saved"));
    }
}
