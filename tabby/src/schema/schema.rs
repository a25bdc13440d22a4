use crate::collection::Document;
use crate::common::{DOC_ID, FIELD_SEPARATOR, OPERATOR_PREFIX, RESERVED_FIELDS};
use crate::errors::{ErrorKind, TabbyError, TabbyResult};
use crate::filter::Criteria;
use crate::schema::FieldType;
use indexmap::IndexMap;
use std::fmt::{Display, Formatter};

/// The declared shape of a model's records.
///
/// Field order is declaration order. A schema is an allow-list: projecting
/// input through it keeps only declared fields and casts their values.
///
/// ```rust,ignore
/// let cat_schema = Schema::builder()
///     .field("name", FieldType::String)
///     .field("owner", FieldType::String)
///     .field("age", FieldType::Number)
///     .field("favoriteFoods", FieldType::array_of(FieldType::String))
///     .build()?;
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Schema {
    fields: IndexMap<String, FieldType>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// Builds a schema from `(name, type)` pairs.
    pub fn define<'a, I>(fields: I) -> TabbyResult<Schema>
    where
        I: IntoIterator<Item = (&'a str, FieldType)>,
    {
        fields
            .into_iter()
            .fold(Schema::builder(), |builder, (name, field_type)| {
                builder.field(name, field_type)
            })
            .build()
    }

    pub fn field_type(&self, name: &str) -> Option<&FieldType> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(|k| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Keeps the declared fields present in `input`, cast to their types.
    ///
    /// Undeclared fields, reserved fields included, are dropped. A value
    /// that cannot be cast fails the whole projection with a
    /// `ValidationError` naming the field.
    pub fn project(&self, input: &Document) -> TabbyResult<Document> {
        let mut projected = Document::new();
        for (name, field_type) in &self.fields {
            if !input.contains_key(name) {
                continue;
            }
            let value = field_type
                .cast(input.get(name)?)
                .map_err(|err| field_error(name, err))?;
            projected.put(name.as_str(), value)?;
        }

        for dropped in input.iter().map(|(k, _)| k).filter(|k| !self.fields.contains_key(*k)) {
            log::debug!("Dropping field {} not declared in schema", dropped);
        }
        Ok(projected)
    }

    /// Casts criteria values of declared fields the way stored values are
    /// cast. Conditions on `_id` accept the id as a string or a number.
    pub fn cast_criteria(&self, criteria: Criteria) -> TabbyResult<Criteria> {
        criteria.map_values(|field, value| {
            if field == DOC_ID {
                return FieldType::Id.cast(value);
            }
            match self.field_type(field) {
                Some(field_type) => field_type
                    .cast_criterion(value)
                    .map_err(|err| field_error(field, err)),
                None => Ok(value),
            }
        })
    }
}

fn field_error(field: &str, cause: TabbyError) -> TabbyError {
    TabbyError::new_with_cause(
        &format!("Validation failed for field '{}'", field),
        ErrorKind::ValidationError,
        cause,
    )
}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let fields = self
            .fields
            .iter()
            .map(|(name, field_type)| format!("{}: {}", name, field_type))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{{ {} }}", fields)
    }
}

/// Collects schema fields; the first invalid declaration is reported by
/// [SchemaBuilder::build].
#[derive(Default)]
pub struct SchemaBuilder {
    fields: IndexMap<String, FieldType>,
    error: Option<TabbyError>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        SchemaBuilder::default()
    }

    pub fn field(mut self, name: &str, field_type: FieldType) -> Self {
        if self.error.is_some() {
            return self;
        }
        if let Err(err) = self.validate_name(name) {
            self.error = Some(err);
            return self;
        }
        self.fields.insert(name.to_string(), field_type);
        self
    }

    pub fn build(self) -> TabbyResult<Schema> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(Schema {
                fields: self.fields,
            }),
        }
    }

    fn validate_name(&self, name: &str) -> TabbyResult<()> {
        let problem = if name.is_empty() {
            Some("field name cannot be empty")
        } else if RESERVED_FIELDS.contains(&name) {
            Some("field name is reserved")
        } else if name.starts_with(OPERATOR_PREFIX) {
            Some("field name cannot start with '$'")
        } else if name.contains(FIELD_SEPARATOR) {
            Some("field name cannot contain '.'")
        } else if self.fields.contains_key(name) {
            Some("field is declared twice")
        } else {
            None
        };

        match problem {
            Some(problem) => {
                log::error!("Invalid schema field {}: {}", name, problem);
                Err(TabbyError::new(
                    &format!("Invalid schema field '{}': {}", name, problem),
                    ErrorKind::ValidationError,
                ))
            }
            None => Ok(()),
        }
    }
}
