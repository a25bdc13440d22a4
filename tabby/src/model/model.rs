use crate::collection::{Collection, Document, DocumentId};
use crate::common::Convertible;
use crate::connection::Connection;
use crate::errors::TabbyResult;
use crate::filter::{Criteria, IntoCriteria};
use crate::model::{Query, QueryOne, Record};
use crate::schema::Schema;
use std::fmt::{Debug, Formatter};
use std::marker::PhantomData;
use std::sync::Arc;

use super::record::is_unset;

/// A schema bound to a collection, producing records of type `T`.
///
/// Obtained from [Connection::model](crate::connection::Connection::model)
/// for derived entities or
/// [Connection::model_with_schema](crate::connection::Connection::model_with_schema)
/// for `Model<Document>`. Clones share the binding.
pub struct Model<T> {
    inner: Arc<ModelInner>,
    _marker: PhantomData<fn() -> T>,
}

struct ModelInner {
    name: String,
    schema: Arc<Schema>,
    collection: Collection,
    // keeps the store open while the model is in use
    _connection: Option<Connection>,
}

impl<T> Clone for Model<T> {
    fn clone(&self) -> Self {
        Model {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> Debug for Model<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.inner.name)
            .field("collection", &self.inner.collection.name())
            .field("schema", &self.inner.schema.to_string())
            .finish()
    }
}

impl<T> Model<T>
where
    T: Convertible<Output = T>,
{
    #[cfg(test)]
    pub(crate) fn new(name: &str, schema: Arc<Schema>, collection: Collection) -> Self {
        Model::with_connection(name, schema, collection, None)
    }

    pub(crate) fn bound_to(
        name: &str,
        schema: Arc<Schema>,
        collection: Collection,
        connection: Connection,
    ) -> Self {
        Model::with_connection(name, schema, collection, Some(connection))
    }

    fn with_connection(
        name: &str,
        schema: Arc<Schema>,
        collection: Collection,
        connection: Option<Connection>,
    ) -> Self {
        Model {
            inner: Arc::new(ModelInner {
                name: name.to_string(),
                schema,
                collection,
                _connection: connection,
            }),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn collection_name(&self) -> &str {
        self.inner.collection.name()
    }

    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    pub fn collection(&self) -> &Collection {
        &self.inner.collection
    }

    /// Builds an unsaved record from arbitrary key-value input.
    ///
    /// Only fields declared by the schema are kept; everything else in
    /// `input` is dropped silently. Declared values are cast to their field
    /// types, and a value that cannot be cast is a `ValidationError`.
    pub fn new_record(&self, input: Document) -> TabbyResult<Record<T>> {
        let projected = self.schema().project(&input)?;
        Record::new(self.clone(), projected)
    }

    /// Wraps an already typed value as an unsaved record.
    ///
    /// Null fields and empty lists of `entity` count as not given.
    pub fn from_entity(&self, entity: T) -> TabbyResult<Record<T>> {
        let mut document = crate::model::entity_to_document(&entity)?;
        for field in document.fields() {
            if is_unset(&document.get(&field)?) {
                document.remove(&field)?;
            }
        }
        self.new_record(document)
    }

    /// Builds a record from `input` and persists it.
    pub fn create(&self, input: Document) -> TabbyResult<Record<T>> {
        let mut record = self.new_record(input)?;
        record.persist()?;
        Ok(record)
    }

    /// Every record matching `criteria`; an empty criteria matches all.
    pub fn find<C: IntoCriteria>(&self, criteria: C) -> Query<T> {
        Query::new(self.clone(), criteria.into_criteria())
    }

    /// The first record matching `criteria`, if any.
    pub fn find_one<C: IntoCriteria>(&self, criteria: C) -> QueryOne<T> {
        QueryOne::new(self.clone(), criteria.into_criteria())
    }

    pub fn find_by_id(&self, id: &DocumentId) -> TabbyResult<Option<Record<T>>> {
        match self.collection().get_by_id(id)? {
            Some(document) => Record::from_stored(self.clone(), document, false).map(Some),
            None => Ok(None),
        }
    }

    pub fn count<C: IntoCriteria>(&self, criteria: C) -> TabbyResult<usize> {
        let criteria = self.cast_criteria(criteria.into_criteria()?)?;
        self.collection().count(&criteria)
    }

    pub(crate) fn cast_criteria(&self, criteria: Criteria) -> TabbyResult<Criteria> {
        self.schema().cast_criteria(criteria)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Value;
    use crate::doc;
    use crate::errors::ErrorKind;
    use crate::model::RecordState;
    use crate::schema::FieldType;
    use crate::store::memory::InMemoryMap;
    use crate::store::StoreMap;

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
    fn names() {
        let cats = cats();
        assert_eq!(cats.name(), "Cat");
        assert_eq!(cats.collection_name(), "cats");
        assert_eq!(cats.schema().len(), 4);
    }

    #[test]
    fn new_record_applies_allow_list() {
        let cats = cats();
        let momo = cats
            .new_record(doc! {
                "name": "Momo",
                "owner": "Jessica",
                "age": 7,
                "favoriteFoods": ["wet food", "everything"],
                "breed": "blah",
            })
            .unwrap();
        assert_eq!(momo.state(), RecordState::Unsaved);
        assert!(momo.id().is_none());
        assert!(!momo.entity().contains_key("breed"));
        assert_eq!(momo.entity().get("age").unwrap(), Value::F64(7.0));
        assert_eq!(cats.collection().size().unwrap(), 0);
    }

    #[test]
    fn new_record_rejects_bad_values() {
        let err = cats().new_record(doc! { "age": "very old" }).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::ValidationError);
    }

    #[test]
    fn create_persists() {
        let cats = cats();
        let dooby = cats.create(doc! { "name": "Dooby", "owner": "Ariel" }).unwrap();
        assert_eq!(dooby.state(), RecordState::Saved);
        let id = dooby.id().unwrap();

        let found = cats.find_by_id(&id).unwrap().unwrap();
        assert_eq!(found.entity().get("owner").unwrap(), Value::from("Ariel"));
        assert_eq!(cats.count(doc! {}).unwrap(), 1);
    }

    #[test]
    fn count_casts_criteria() {
        let cats = cats();
        cats.create(doc! { "name": "Dooby", "age": 8 }).unwrap();
        cats.create(doc! { "name": "Momo", "age": 7 }).unwrap();
        assert_eq!(cats.count(doc! { "age": "8" }).unwrap(), 1);
        assert_eq!(cats.count(Criteria::all()).unwrap(), 2);
        assert!(cats.count(doc! { "age": "old" }).is_err());
    }

    #[test]
    fn find_by_missing_id() {
        assert!(cats().find_by_id(&DocumentId::new()).unwrap().is_none());
    }

    #[test]
    fn debug_names_binding() {
        let debug = format!("{:?}", cats());
        assert!(debug.contains("Cat"));
        assert!(debug.contains("cats"));
    }
}
