use crate::collection::Document;
use crate::common::{Value, DOC_ID};
use crate::errors::{ErrorKind, TabbyError, TabbyResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum ProjectionMode {
    #[default]
    All,
    Include,
    Exclude,
}

/// Selects the fields returned by a query.
///
/// Built from a projection document in the usual `{field: 1}` /
/// `{field: 0}` form. `_id` is returned unless it is excluded explicitly.
/// Inclusion and exclusion cannot be mixed, except for excluding `_id`
/// from an inclusion projection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projection {
    mode: ProjectionMode,
    fields: Vec<String>,
    exclude_id: bool,
}

impl Projection {
    /// Returns whole documents.
    pub fn all() -> Self {
        Projection::default()
    }

    pub fn new(spec: &Document) -> TabbyResult<Self> {
        let mut projection = Projection::all();
        for (field, flag) in spec.iter() {
            let include = parse_flag(field, flag)?;
            if field == DOC_ID {
                projection.exclude_id = !include;
                continue;
            }

            let mode = if include {
                ProjectionMode::Include
            } else {
                ProjectionMode::Exclude
            };
            if projection.mode != ProjectionMode::All && projection.mode != mode {
                log::error!("Projection {} mixes inclusion and exclusion", spec);
                return Err(TabbyError::new(
                    "Projection cannot mix inclusion and exclusion",
                    ErrorKind::FilterError,
                ));
            }
            projection.mode = mode;
            projection.fields.push(field.clone());
        }

        // `{_id: 1}` alone returns only the id, `{_id: 0}` alone everything else
        if projection.mode == ProjectionMode::All && spec.contains_key(DOC_ID) {
            projection.mode = if projection.exclude_id {
                ProjectionMode::Exclude
            } else {
                ProjectionMode::Include
            };
        }
        Ok(projection)
    }

    /// Projection returning only `fields` (and `_id`).
    pub fn include(fields: &[&str]) -> Self {
        Projection {
            mode: ProjectionMode::Include,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            exclude_id: false,
        }
    }

    /// Projection returning everything except `fields`.
    pub fn exclude(fields: &[&str]) -> Self {
        Projection {
            mode: ProjectionMode::Exclude,
            fields: fields.iter().map(|f| f.to_string()).collect(),
            exclude_id: false,
        }
    }

    pub fn without_id(mut self) -> Self {
        self.exclude_id = true;
        if self.mode == ProjectionMode::All {
            self.mode = ProjectionMode::Exclude;
        }
        self
    }

    pub fn is_all(&self) -> bool {
        self.mode == ProjectionMode::All
    }

    pub fn apply(&self, document: &Document) -> TabbyResult<Document> {
        match self.mode {
            ProjectionMode::All => Ok(document.clone()),
            ProjectionMode::Include => {
                let mut projected = Document::new();
                for field in &self.fields {
                    if document.contains_field(field) {
                        projected.put(field.as_str(), document.get(field)?)?;
                    }
                }
                if !self.exclude_id {
                    if let Some(id) = document.id() {
                        projected.set_id(id);
                    }
                }
                Ok(projected)
            }
            ProjectionMode::Exclude => {
                let mut projected = document.clone();
                for field in &self.fields {
                    projected.remove(field)?;
                }
                if self.exclude_id {
                    projected.remove_id();
                }
                Ok(projected)
            }
        }
    }
}

fn parse_flag(field: &str, flag: &Value) -> TabbyResult<bool> {
    match flag {
        Value::Bool(b) => Ok(*b),
        value if value.is_number() => Ok(value.as_decimal().is_some_and(|n| n != 0.0)),
        _ => {
            log::error!("Projection of {} has non boolean value {}", field, flag);
            Err(TabbyError::new(
                &format!("Projection of '{}' must be 0/1 or a boolean", field),
                ErrorKind::FilterError,
            ))
        }
    }
}

/// Conversion into [Projection], accepted by the query methods.
pub trait IntoProjection {
    fn into_projection(self) -> TabbyResult<Projection>;
}

impl IntoProjection for Projection {
    fn into_projection(self) -> TabbyResult<Projection> {
        Ok(self)
    }
}

impl IntoProjection for Document {
    fn into_projection(self) -> TabbyResult<Projection> {
        Projection::new(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::DocumentId;
    use crate::{doc, val};

    fn dooby() -> Document {
        let mut doc = doc! {
            "name": "Dooby",
            "owner": "Ariel",
            "age": 8.0,
            "favoriteFoods": ["treats", "catnip"],
        };
        doc.set_id(DocumentId::create_id(1_000_000_000_000_000_001).unwrap());
        doc
    }

    #[test]
    fn all_returns_whole_document() {
        assert!(Projection::all().is_all());
        assert_eq!(Projection::all().apply(&dooby()).unwrap(), dooby());
    }

    #[test]
    fn inclusion_without_id() {
        let projection = Projection::new(&doc! { "name": 1, "_id": 0 }).unwrap();
        let projected = projection.apply(&dooby()).unwrap();
        assert_eq!(projected, doc! { "name": "Dooby" });
    }

    #[test]
    fn inclusion_keeps_id_by_default() {
        let projection = Projection::new(&doc! { "name": true }).unwrap();
        let projected = projection.apply(&dooby()).unwrap();
        assert_eq!(projected.size(), 2);
        assert!(projected.has_id());
        assert_eq!(projected.get("owner").unwrap(), Value::Null);
    }

    #[test]
    fn exclusion() {
        let projection = Projection::new(&doc! { "favoriteFoods": 0, "age": false }).unwrap();
        let projected = projection.apply(&dooby()).unwrap();
        assert_eq!(projected.fields(), vec!["name".to_string(), "owner".to_string()]);
        assert!(projected.has_id());
    }

    #[test]
    fn only_id_flags() {
        let only_id = Projection::new(&doc! { "_id": 1 }).unwrap();
        let projected = only_id.apply(&dooby()).unwrap();
        assert_eq!(projected.size(), 1);
        assert!(projected.has_id());

        let no_id = Projection::new(&doc! { "_id": 0 }).unwrap();
        let projected = no_id.apply(&dooby()).unwrap();
        assert_eq!(projected.size(), 4);
        assert!(!projected.has_id());

        let no_id = Projection::all().without_id().apply(&dooby()).unwrap();
        assert!(!no_id.has_id());
    }

    #[test]
    fn missing_fields_are_skipped() {
        let projection = Projection::include(&["name", "breed"]);
        let projected = projection.apply(&dooby()).unwrap();
        assert!(!projected.contains_key("breed"));
        assert_eq!(projected.get("name").unwrap(), val!("Dooby"));
    }

    #[test]
    fn mixing_is_rejected() {
        let err = Projection::new(&doc! { "name": 1, "age": 0 }).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FilterError);
        let err = Projection::new(&doc! { "name": "yes" }).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FilterError);
    }
}
