use crate::collection::DocumentId;
use crate::common::Value;
use crate::errors::{ErrorKind, TabbyError, TabbyResult};
use std::fmt::{Display, Formatter};

/// Declared type of a schema field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    /// Any number, stored as `f64`.
    Number,
    Boolean,
    Array(Box<FieldType>),
    Document,
    Id,
    /// Any value, stored as given.
    Mixed,
}

impl FieldType {
    pub fn array_of(inner: FieldType) -> FieldType {
        FieldType::Array(Box::new(inner))
    }

    /// Casts `value` to this type.
    ///
    /// Null stays null for every type, a scalar given to an array field
    /// becomes a one-element array. Values that cannot be represented in
    /// this type are a `ValidationError`.
    pub fn cast(&self, value: Value) -> TabbyResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        match self {
            FieldType::Mixed => Ok(value),
            FieldType::String => match value {
                Value::String(_) => Ok(value),
                Value::Bool(b) => Ok(Value::String(b.to_string())),
                Value::Id(id) => Ok(Value::String(id.to_string())),
                v if v.is_number() => Ok(Value::String(v.to_string())),
                v => cast_error(self, &v),
            },
            FieldType::Number => match value {
                Value::F64(_) => Ok(value),
                Value::Bool(b) => Ok(Value::F64(if b { 1.0 } else { 0.0 })),
                Value::String(ref s) if s.trim().is_empty() => Ok(Value::Null),
                Value::String(ref s) => match s.trim().parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(Value::F64(n)),
                    _ => cast_error(self, &value),
                },
                v => match v.as_decimal() {
                    Some(n) => Ok(Value::F64(n)),
                    None => cast_error(self, &v),
                },
            },
            FieldType::Boolean => match value {
                Value::Bool(_) => Ok(value),
                Value::String(ref s) => match s.trim().to_lowercase().as_str() {
                    "true" | "1" | "yes" => Ok(Value::Bool(true)),
                    "false" | "0" | "no" => Ok(Value::Bool(false)),
                    _ => cast_error(self, &value),
                },
                v => match v.as_decimal() {
                    Some(n) if n == 1.0 => Ok(Value::Bool(true)),
                    Some(n) if n == 0.0 => Ok(Value::Bool(false)),
                    _ => cast_error(self, &v),
                },
            },
            FieldType::Array(inner) => match value {
                Value::Array(items) => items
                    .into_iter()
                    .map(|item| inner.cast(item))
                    .collect::<TabbyResult<Vec<_>>>()
                    .map(Value::Array),
                scalar => Ok(Value::Array(vec![inner.cast(scalar)?])),
            },
            FieldType::Document => match value {
                Value::Document(_) => Ok(value),
                v => cast_error(self, &v),
            },
            FieldType::Id => match value {
                Value::Id(_) => Ok(value),
                Value::String(ref s) => s.parse::<DocumentId>().map(Value::Id),
                v => match v.as_integer().map(u64::try_from) {
                    Some(Ok(id)) => DocumentId::create_id(id).map(Value::Id),
                    _ => cast_error(self, &v),
                },
            },
        }
    }

    /// Casts a criteria value. An array field also accepts a single
    /// element, which matches arrays containing it.
    pub fn cast_criterion(&self, value: Value) -> TabbyResult<Value> {
        match (self, &value) {
            (FieldType::Array(inner), v) if !v.is_array() => inner.cast(value),
            _ => self.cast(value),
        }
    }
}

fn cast_error<T>(field_type: &FieldType, value: &Value) -> TabbyResult<T> {
    log::error!("Cannot cast {} to {}", value, field_type);
    Err(TabbyError::new(
        &format!("Cast to {} failed for value {}", field_type, value),
        ErrorKind::ValidationError,
    ))
}

impl Display for FieldType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::String => write!(f, "String"),
            FieldType::Number => write!(f, "Number"),
            FieldType::Boolean => write!(f, "Boolean"),
            FieldType::Array(inner) => write!(f, "[{}]", inner),
            FieldType::Document => write!(f, "Document"),
            FieldType::Id => write!(f, "ObjectId"),
            FieldType::Mixed => write!(f, "Mixed"),
        }
    }
}
