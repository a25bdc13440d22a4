use crate::collection::{Document, FindOptions};
use crate::common::Convertible;
use crate::errors::TabbyResult;
use crate::filter::{Criteria, IntoProjection, Projection};
use crate::model::{Model, Record};

/// A pending multi-record query built by [Model::find].
///
/// Nothing runs until [Query::exec] or [Query::exec_lean]. Criteria and
/// projection errors are held back and reported by the terminal call.
pub struct Query<T> {
    model: Model<T>,
    criteria: TabbyResult<Criteria>,
    projection: TabbyResult<Projection>,
    skip: usize,
    limit: Option<usize>,
}

impl<T> Query<T>
where
    T: Convertible<Output = T>,
{
    pub(crate) fn new(model: Model<T>, criteria: TabbyResult<Criteria>) -> Self {
        Query {
            model,
            criteria,
            projection: Ok(Projection::all()),
            skip: 0,
            limit: None,
        }
    }

    /// Restricts the returned fields. Records loaded through a projection
    /// other than [Projection::all] are partial and cannot be persisted.
    pub fn project<P: IntoProjection>(mut self, projection: P) -> Self {
        self.projection = projection.into_projection();
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Runs the query and wraps every match as a saved record.
    pub fn exec(self) -> TabbyResult<Vec<Record<T>>> {
        let model = self.model.clone();
        let (documents, partial) = self.run()?;
        documents
            .into_iter()
            .map(|document| Record::from_stored(model.clone(), document, partial))
            .collect()
    }

    /// Runs the query and returns the stored documents as they are.
    pub fn exec_lean(self) -> TabbyResult<Vec<Document>> {
        Ok(self.run()?.0)
    }

    fn run(self) -> TabbyResult<(Vec<Document>, bool)> {
        let criteria = self.model.cast_criteria(self.criteria?)?;
        let projection = self.projection?;
        let partial = !projection.is_all();

        let mut options = FindOptions::new().project(projection).skip(self.skip);
        if let Some(limit) = self.limit {
            options = options.limit(limit);
        }
        let documents = self.model.collection().find(&criteria, &options)?;
        log::debug!(
            "Query on model {} returned {} documents",
            self.model.name(),
            documents.len()
        );
        Ok((documents, partial))
    }
}

/// A pending single-record query built by [Model::find_one].
pub struct QueryOne<T> {
    model: Model<T>,
    criteria: TabbyResult<Criteria>,
    projection: TabbyResult<Projection>,
}

impl<T> QueryOne<T>
where
    T: Convertible<Output = T>,
{
    pub(crate) fn new(model: Model<T>, criteria: TabbyResult<Criteria>) -> Self {
        QueryOne {
            model,
            criteria,
            projection: Ok(Projection::all()),
        }
    }

    pub fn project<P: IntoProjection>(mut self, projection: P) -> Self {
        self.projection = projection.into_projection();
        self
    }

    /// The first match in store order, or `None`.
    pub fn exec(self) -> TabbyResult<Option<Record<T>>> {
        let model = self.model.clone();
        let (document, partial) = self.run()?;
        match document {
            Some(document) => Record::from_stored(model, document, partial).map(Some),
            None => Ok(None),
        }
    }

    pub fn exec_lean(self) -> TabbyResult<Option<Document>> {
        Ok(self.run()?.0)
    }

    fn run(self) -> TabbyResult<(Option<Document>, bool)> {
        let criteria = self.model.cast_criteria(self.criteria?)?;
        let projection = self.projection?;
        let partial = !projection.is_all();
        let document = self.model.collection().find_one(&criteria, &projection)?;
        Ok((document, partial))
    }
}
