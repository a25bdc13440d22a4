use crate::collection::{Document, DocumentId};
use crate::common::Value;
use crate::errors::{ErrorKind, TabbyError, TabbyResult};
use crate::schema::FieldType;

/// Two-way mapping between a Rust type and a [Value].
///
/// `field_type` tells a derived schema which [FieldType] a struct field of
/// this type declares.
pub trait Convertible {
    type Output;

    fn to_value(&self) -> TabbyResult<Value>;
    fn from_value(value: &Value) -> TabbyResult<Self::Output>;

    fn field_type() -> FieldType {
        FieldType::Mixed
    }
}

/// Decodes `value`, or returns `T::default()` when it is `Null`.
///
/// Derived decoders use this so that fields missing from a stored or
/// projected document come back as their default.
pub fn from_value_or_default<T>(value: &Value) -> TabbyResult<T>
where
    T: Convertible<Output = T> + Default,
{
    if value.is_null() {
        Ok(T::default())
    } else {
        T::from_value(value)
    }
}

fn mapping_error<T>(expected: &str, value: &Value) -> TabbyResult<T> {
    log::error!("Value {} is not {}", value, expected);
    Err(TabbyError::new(
        &format!("Value of type {} is not {}", value.type_name(), expected),
        ErrorKind::ObjectMappingError,
    ))
}

// integral f64 values are accepted, a Number field stores every number as f64
fn integral(value: &Value, min: f64, max: f64) -> Option<i128> {
    match value {
        Value::F64(f) if f.fract() == 0.0 && *f >= min && *f <= max => Some(*f as i128),
        _ => value.as_integer(),
    }
}

impl Convertible for i32 {
    type Output = i32;

    fn to_value(&self) -> TabbyResult<Value> {
        Ok(Value::I32(*self))
    }

    fn from_value(value: &Value) -> TabbyResult<Self> {
        match integral(value, i32::MIN as f64, i32::MAX as f64).map(i32::try_from) {
            Some(Ok(i)) => Ok(i),
            _ => mapping_error("an i32", value),
        }
    }

    fn field_type() -> FieldType {
        FieldType::Number
    }
}

impl Convertible for i64 {
    type Output = i64;

    fn to_value(&self) -> TabbyResult<Value> {
        Ok(Value::I64(*self))
    }

    fn from_value(value: &Value) -> TabbyResult<Self> {
        match integral(value, i64::MIN as f64, i64::MAX as f64).map(i64::try_from) {
            Some(Ok(i)) => Ok(i),
            _ => mapping_error("an i64", value),
        }
    }

    fn field_type() -> FieldType {
        FieldType::Number
    }
}

impl Convertible for u32 {
    type Output = u32;

    fn to_value(&self) -> TabbyResult<Value> {
        Ok(Value::I64(*self as i64))
    }

    fn from_value(value: &Value) -> TabbyResult<Self> {
        match integral(value, 0.0, u32::MAX as f64).map(u32::try_from) {
            Some(Ok(i)) => Ok(i),
            _ => mapping_error("a u32", value),
        }
    }

    fn field_type() -> FieldType {
        FieldType::Number
    }
}

impl Convertible for u64 {
    type Output = u64;

    fn to_value(&self) -> TabbyResult<Value> {
        Ok(Value::U64(*self))
    }

    fn from_value(value: &Value) -> TabbyResult<Self> {
        match integral(value, 0.0, u64::MAX as f64).map(u64::try_from) {
            Some(Ok(i)) => Ok(i),
            _ => mapping_error("a u64", value),
        }
    }

    fn field_type() -> FieldType {
        FieldType::Number
    }
}

impl Convertible for f64 {
    type Output = f64;

    fn to_value(&self) -> TabbyResult<Value> {
        Ok(Value::F64(*self))
    }

    fn from_value(value: &Value) -> TabbyResult<Self> {
        match value.as_decimal() {
            Some(f) => Ok(f),
            None => mapping_error("a number", value),
        }
    }

    fn field_type() -> FieldType {
        FieldType::Number
    }
}

impl Convertible for f32 {
    type Output = f32;

    fn to_value(&self) -> TabbyResult<Value> {
        Ok(Value::F64(*self as f64))
    }

    fn from_value(value: &Value) -> TabbyResult<Self> {
        match value.as_decimal() {
            Some(f) => Ok(f as f32),
            None => mapping_error("a number", value),
        }
    }

    fn field_type() -> FieldType {
        FieldType::Number
    }
}

impl Convertible for bool {
    type Output = bool;

    fn to_value(&self) -> TabbyResult<Value> {
        Ok(Value::Bool(*self))
    }

    fn from_value(value: &Value) -> TabbyResult<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => mapping_error("a bool", value),
        }
    }

    fn field_type() -> FieldType {
        FieldType::Boolean
    }
}

impl Convertible for String {
    type Output = String;

    fn to_value(&self) -> TabbyResult<Value> {
        Ok(Value::String(self.clone()))
    }

    fn from_value(value: &Value) -> TabbyResult<Self> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => mapping_error("a string", value),
        }
    }

    fn field_type() -> FieldType {
        FieldType::String
    }
}

impl Convertible for Document {
    type Output = Document;

    fn to_value(&self) -> TabbyResult<Value> {
        Ok(Value::Document(self.clone()))
    }

    fn from_value(value: &Value) -> TabbyResult<Self> {
        match value {
            Value::Document(doc) => Ok(doc.clone()),
            _ => mapping_error("a document", value),
        }
    }

    fn field_type() -> FieldType {
        FieldType::Document
    }
}

impl Convertible for DocumentId {
    type Output = DocumentId;

    fn to_value(&self) -> TabbyResult<Value> {
        Ok(Value::Id(*self))
    }

    fn from_value(value: &Value) -> TabbyResult<Self> {
        match value {
            Value::Id(id) => Ok(*id),
            _ => mapping_error("a document id", value),
        }
    }

    fn field_type() -> FieldType {
        FieldType::Id
    }
}

impl Convertible for Value {
    type Output = Value;

    fn to_value(&self) -> TabbyResult<Value> {
        Ok(self.clone())
    }

    fn from_value(value: &Value) -> TabbyResult<Self> {
        Ok(value.clone())
    }
}

impl<T> Convertible for Option<T>
where
    T: Convertible<Output = T>,
{
    type Output = Option<T>;

    fn to_value(&self) -> TabbyResult<Value> {
        match self {
            Some(v) => v.to_value(),
            None => Ok(Value::Null),
        }
    }

    fn from_value(value: &Value) -> TabbyResult<Self> {
        match value {
            Value::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }

    fn field_type() -> FieldType {
        T::field_type()
    }
}

impl<T> Convertible for Vec<T>
where
    T: Convertible<Output = T>,
{
    type Output = Vec<T>;

    fn to_value(&self) -> TabbyResult<Value> {
        let values = self
            .iter()
            .map(|v| v.to_value())
            .collect::<TabbyResult<Vec<_>>>()?;
        Ok(Value::Array(values))
    }

    fn from_value(value: &Value) -> TabbyResult<Self> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Array(values) => values.iter().map(T::from_value).collect(),
            _ => mapping_error("an array", value),
        }
    }

    fn field_type() -> FieldType {
        FieldType::Array(Box::new(T::field_type()))
    }
}
