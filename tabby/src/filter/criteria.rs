use crate::collection::{Document, DocumentId};
use crate::common::{Value, DOC_ID, FIELD_SEPARATOR, OPERATOR_PREFIX};
use crate::errors::{ErrorKind, TabbyError, TabbyResult};
use std::fmt::{Display, Formatter};

/// A conjunction of `field == value` conditions.
///
/// A stored array matches a scalar condition when one of its elements
/// equals it, a `null` condition matches fields that are absent or null,
/// and dotted field names reach into embedded documents. Query operators
/// (`$gt`, `$in`, ...) are not supported and are rejected.
///
/// ```rust,ignore
/// let by_name = Criteria::new(doc! { "name": "Dooby" })?;
/// let everything = Criteria::all();
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Criteria {
    conditions: Vec<(String, Value)>,
}

impl Criteria {
    /// Criteria that match every record.
    pub fn all() -> Self {
        Criteria::default()
    }

    pub fn new(conditions: Document) -> TabbyResult<Self> {
        let mut criteria = Criteria::all();
        for (field, value) in conditions.iter() {
            criteria = criteria.and(field, value.clone())?;
        }
        Ok(criteria)
    }

    /// Adds a `field == value` condition.
    pub fn and(mut self, field: &str, value: impl Into<Value>) -> TabbyResult<Self> {
        let value = value.into();
        validate_field(field)?;
        validate_value(field, &value)?;
        self.conditions.retain(|(existing, _)| existing != field);
        self.conditions.push((field.to_string(), value));
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn conditions(&self) -> &[(String, Value)] {
        &self.conditions
    }

    /// Whether every condition holds for `document`.
    pub fn matches(&self, document: &Document) -> TabbyResult<bool> {
        for (field, expected) in &self.conditions {
            let actual = document.get(field)?;
            if !value_matches(&actual, expected) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// The id when the criteria pin `_id` to a single document.
    pub(crate) fn id_condition(&self) -> Option<DocumentId> {
        self.conditions
            .iter()
            .find(|(field, _)| field == DOC_ID)
            .and_then(|(_, value)| value.as_id().copied())
    }

    /// Rewrites every condition value through `f`.
    pub(crate) fn map_values<F>(self, mut f: F) -> TabbyResult<Self>
    where
        F: FnMut(&str, Value) -> TabbyResult<Value>,
    {
        let conditions = self
            .conditions
            .into_iter()
            .map(|(field, value)| f(&field, value).map(|value| (field, value)))
            .collect::<TabbyResult<Vec<_>>>()?;
        Ok(Criteria { conditions })
    }
}

fn value_matches(actual: &Value, expected: &Value) -> bool {
    if actual == expected {
        return true;
    }
    match (actual, expected) {
        (Value::Array(items), expected) if !expected.is_array() => {
            items.iter().any(|item| item == expected)
        }
        _ => false,
    }
}

fn validate_field(field: &str) -> TabbyResult<()> {
    if field.is_empty() {
        log::error!("Criteria field name cannot be empty");
        return Err(TabbyError::new(
            "Criteria field name cannot be empty",
            ErrorKind::FilterError,
        ));
    }
    if field
        .split(FIELD_SEPARATOR)
        .any(|segment| segment.is_empty() || segment.starts_with(OPERATOR_PREFIX))
    {
        log::error!("Invalid criteria field name {}", field);
        return Err(TabbyError::new(
            &format!("Invalid criteria field name '{}', query operators are not supported", field),
            ErrorKind::FilterError,
        ));
    }
    Ok(())
}

fn validate_value(field: &str, value: &Value) -> TabbyResult<()> {
    if let Value::Document(doc) = value {
        if doc.iter().any(|(key, _)| key.starts_with(OPERATOR_PREFIX)) {
            log::error!("Criteria on {} uses a query operator", field);
            return Err(TabbyError::new(
                &format!("Criteria on '{}' uses a query operator, only equality is supported", field),
                ErrorKind::FilterError,
            ));
        }
    }
    Ok(())
}

impl Display for Criteria {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.conditions.is_empty() {
            return write!(f, "{{}}");
        }
        let conditions = self
            .conditions
            .iter()
            .map(|(field, value)| format!("{} == {}", field, value))
            .collect::<Vec<_>>()
            .join(" && ");
        write!(f, "({})", conditions)
    }
}

/// Conversion into [Criteria], accepted by the query methods.
pub trait IntoCriteria {
    fn into_criteria(self) -> TabbyResult<Criteria>;
}

impl IntoCriteria for Criteria {
    fn into_criteria(self) -> TabbyResult<Criteria> {
        Ok(self)
    }
}

impl IntoCriteria for Document {
    fn into_criteria(self) -> TabbyResult<Criteria> {
        Criteria::new(self)
    }
}

impl IntoCriteria for DocumentId {
    fn into_criteria(self) -> TabbyResult<Criteria> {
        Criteria::all().and(DOC_ID, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    fn dooby() -> Document {
        doc! {
            "name": "Dooby",
            "owner": "Ariel",
            "age": 8.0,
            "favoriteFoods": ["treats", "catnip"],
            "address": { "city": "Springfield" },
        }
    }

    #[test]
    fn empty_criteria_match_everything() {
        assert!(Criteria::all().is_empty());
        assert!(Criteria::all().matches(&dooby()).unwrap());
        assert!(Criteria::new(doc! {}).unwrap().matches(&Document::new()).unwrap());
    }

    #[test]
    fn equality_on_fields() {
        let criteria = Criteria::new(doc! { "name": "Dooby", "owner": "Ariel" }).unwrap();
        assert!(criteria.matches(&dooby()).unwrap());

        let criteria = Criteria::new(doc! { "name": "Momo" }).unwrap();
        assert!(!criteria.matches(&dooby()).unwrap());
    }

    #[test]
    fn numbers_match_across_widths() {
        let criteria = Criteria::new(doc! { "age": 8 }).unwrap();
        assert!(criteria.matches(&dooby()).unwrap());
    }

    #[test]
    fn array_contains_scalar() {
        let criteria = Criteria::new(doc! { "favoriteFoods": "catnip" }).unwrap();
        assert!(criteria.matches(&dooby()).unwrap());

        let criteria = Criteria::new(doc! { "favoriteFoods": "wet food" }).unwrap();
        assert!(!criteria.matches(&dooby()).unwrap());

        let criteria = Criteria::new(doc! { "favoriteFoods": ["treats", "catnip"] }).unwrap();
        assert!(criteria.matches(&dooby()).unwrap());

        let criteria = Criteria::new(doc! { "favoriteFoods": ["catnip", "treats"] }).unwrap();
        assert!(!criteria.matches(&dooby()).unwrap());
    }

    #[test]
    fn null_matches_absent() {
        let criteria = Criteria::all().and("breed", Value::Null).unwrap();
        assert!(criteria.matches(&dooby()).unwrap());
        let criteria = Criteria::all().and("name", Value::Null).unwrap();
        assert!(!criteria.matches(&dooby()).unwrap());
    }

    #[test]
    fn bytes_match_exactly() {
        let mut photo = dooby();
        photo.put("photo", Value::Bytes(vec![1, 2, 3])).unwrap();

        let criteria = Criteria::all().and("photo", Value::Bytes(vec![1, 2, 3])).unwrap();
        assert!(criteria.matches(&photo).unwrap());
        let criteria = Criteria::all().and("photo", Value::Bytes(vec![1, 2])).unwrap();
        assert!(!criteria.matches(&photo).unwrap());
    }

    #[test]
    fn embedded_fields() {
        let criteria = Criteria::new(doc! { "address.city": "Springfield" }).unwrap();
        assert!(criteria.matches(&dooby()).unwrap());
    }

    #[test]
    fn rejects_operators_and_bad_names() {
        let err = Criteria::new(doc! { "$where": "1" }).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FilterError);

        let err = Criteria::new(doc! { "age": { "$gt": 5 } }).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::FilterError);

        assert!(Criteria::all().and("", 1).is_err());
        assert!(Criteria::all().and("address.$city", 1).is_err());
    }

    #[test]
    fn and_replaces_same_field() {
        let criteria = Criteria::all()
            .and("name", "Dooby")
            .unwrap()
            .and("name", "Momo")
            .unwrap();
        assert_eq!(criteria.conditions().len(), 1);
        assert_eq!(criteria.conditions()[0].1, Value::from("Momo"));
    }

    #[test]
    fn id_condition_is_detected() {
        let id = DocumentId::create_id(1_000_000_000_000_000_001).unwrap();
        let criteria = id.into_criteria().unwrap();
        assert_eq!(criteria.id_condition(), Some(id));
        assert_eq!(Criteria::all().id_condition(), None);
    }

    #[test]
    fn display() {
        let criteria = Criteria::new(doc! { "name": "Dooby" }).unwrap();
        assert_eq!(criteria.to_string(), "(name == \"Dooby\")");
        assert_eq!(Criteria::all().to_string(), "{}");
    }
}
