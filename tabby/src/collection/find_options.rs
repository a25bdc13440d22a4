use crate::filter::Projection;

/// Projection and paging applied to a find.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FindOptions {
    pub(crate) projection: Projection,
    pub(crate) skip: Option<usize>,
    pub(crate) limit: Option<usize>,
}

impl FindOptions {
    pub fn new() -> Self {
        FindOptions::default()
    }

    pub fn project(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn skip_count(&self) -> usize {
        self.skip.unwrap_or(0)
    }

    pub fn limit_count(&self) -> Option<usize> {
        self.limit
    }
}
