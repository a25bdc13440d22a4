use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};

use im::OrdMap;

use crate::collection::DocumentId;
use crate::common::{escape_json, Value, DOC_ID, FIELD_SEPARATOR, RESERVED_FIELDS};
use crate::errors::{ErrorKind, TabbyError, TabbyResult};

/// A schemaless set of named values, the unit stored in a collection.
///
/// Backed by a persistent ordered map, so clones are O(1) and share
/// structure until one side is mutated. Keys containing `.` address
/// embedded documents (`"address.city"`). The `_id` field is reserved for
/// the store-assigned [DocumentId].
#[derive(Clone, Eq, PartialEq, Hash, Default, Ord, PartialOrd, serde::Deserialize, serde::Serialize)]
pub struct Document {
    data: OrdMap<String, Value>,
}

impl Document {
    pub fn new() -> Self {
        Document {
            data: OrdMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Associates `value` with `key`, replacing any previous value.
    ///
    /// Dotted keys create or update embedded documents along the path.
    /// Any value may be put under `_id`, but only a [Value::Id] there is
    /// reported by [Document::id]; stores replace anything else on insert.
    ///
    /// # Errors
    ///
    /// * the key (or a segment of a dotted key) is empty
    /// * a dotted path runs through a value that is not a document
    ///
    /// ```ignore
    /// let mut doc = Document::new();
    /// doc.put("name", "Dooby")?;
    /// doc.put("address.city", "Springfield")?;
    /// assert_eq!(doc.get("address.city")?, val!("Springfield"));
    /// ```
    pub fn put<'a, T: Into<Value>>(
        &mut self,
        key: impl Into<Cow<'a, str>>,
        value: T,
    ) -> TabbyResult<()> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(TabbyError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }

        let value = value.into();

        if key.contains(FIELD_SEPARATOR) {
            let path: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_put(&path, value)
        } else {
            self.data.insert(key.into_owned(), value);
            Ok(())
        }
    }

    /// Returns the value for `key`, or [Value::Null] when absent.
    ///
    /// Dotted keys walk embedded documents; a numeric segment indexes into
    /// an array (`"favoriteFoods.0"`).
    pub fn get(&self, key: &str) -> TabbyResult<Value> {
        match self.data.get(key) {
            Some(value) => Ok(value.clone()),
            None if key.contains(FIELD_SEPARATOR) => Ok(self.deep_get(key)),
            None => Ok(Value::Null),
        }
    }

    /// The store-assigned id, if this document has been persisted.
    pub fn id(&self) -> Option<DocumentId> {
        match self.data.get(DOC_ID) {
            Some(Value::Id(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn has_id(&self) -> bool {
        self.id().is_some()
    }

    pub(crate) fn set_id(&mut self, id: DocumentId) {
        self.data.insert(DOC_ID.to_string(), Value::Id(id));
    }

    pub(crate) fn remove_id(&mut self) {
        self.data.remove(DOC_ID);
    }

    /// Removes `key` (dotted keys remove the embedded field).
    pub fn remove(&mut self, key: &str) -> TabbyResult<()> {
        if self.data.remove(key).is_none() && key.contains(FIELD_SEPARATOR) {
            let path: Vec<&str> = key.split(FIELD_SEPARATOR).collect();
            self.deep_remove(&path);
        }
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Top-level field names, excluding reserved fields.
    pub fn fields(&self) -> Vec<String> {
        self.data
            .keys()
            .filter(|key| !RESERVED_FIELDS.contains(&key.as_str()))
            .cloned()
            .collect()
    }

    /// Copies every field of `other` into this document; embedded
    /// documents are merged recursively.
    pub fn merge(&mut self, other: &Document) {
        for (key, value) in other.data.iter() {
            match (self.data.get(key), value) {
                (Some(Value::Document(existing)), Value::Document(incoming)) => {
                    let mut nested = existing.clone();
                    nested.merge(incoming);
                    self.data.insert(key.clone(), Value::Document(nested));
                }
                _ => {
                    self.data.insert(key.clone(), value.clone());
                }
            }
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Like [Document::contains_key] but also resolves dotted keys.
    pub fn contains_field(&self, field: &str) -> bool {
        self.contains_key(field)
            || (field.contains(FIELD_SEPARATOR) && !self.deep_get(field).is_null())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    pub fn to_map(&self) -> BTreeMap<String, Value> {
        self.data
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn deep_put(&mut self, path: &[&str], value: Value) -> TabbyResult<()> {
        let Some((head, rest)) = path.split_first() else {
            return Ok(());
        };
        if head.is_empty() {
            log::error!("Embedded key {} contains an empty segment", path.join(FIELD_SEPARATOR));
            return Err(TabbyError::new(
                "Embedded key contains an empty segment",
                ErrorKind::InvalidOperation,
            ));
        }

        if rest.is_empty() {
            self.data.insert(head.to_string(), value);
            return Ok(());
        }

        let mut nested = match self.data.get(*head) {
            Some(Value::Document(doc)) => doc.clone(),
            Some(Value::Null) | None => Document::new(),
            Some(other) => {
                log::error!("Cannot embed a field into {} value at {}", other.type_name(), head);
                return Err(TabbyError::new(
                    &format!("Field '{}' is not a document", head),
                    ErrorKind::InvalidOperation,
                ));
            }
        };
        nested.deep_put(rest, value)?;
        self.data.insert(head.to_string(), Value::Document(nested));
        Ok(())
    }

    fn deep_get(&self, key: &str) -> Value {
        let mut segments = key.split(FIELD_SEPARATOR);
        let mut current = match segments.next().and_then(|first| self.data.get(first)) {
            Some(value) => value,
            None => return Value::Null,
        };

        for segment in segments {
            let next = match current {
                Value::Document(doc) => doc.data.get(segment),
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            match next {
                Some(value) => current = value,
                None => return Value::Null,
            }
        }
        current.clone()
    }

    fn deep_remove(&mut self, path: &[&str]) {
        let Some((head, rest)) = path.split_first() else {
            return;
        };
        if rest.is_empty() {
            self.data.remove(*head);
            return;
        }
        if let Some(Value::Document(doc)) = self.data.get(*head) {
            let mut nested = doc.clone();
            nested.deep_remove(rest);
            self.data.insert(head.to_string(), Value::Document(nested));
        }
    }

    pub(crate) fn to_pretty_json(&self, indent: usize) -> String {
        self.to_pretty_json_ordered(indent, &[])
    }

    /// Pretty JSON listing the `leading` keys first, in that order.
    pub(crate) fn to_pretty_json_ordered(&self, indent: usize, leading: &[&str]) -> String {
        if self.data.is_empty() {
            return "{}".to_string();
        }
        let indent_str = " ".repeat(indent + 2);
        let fields = self
            .ordered_entries(leading)
            .map(|(key, value)| {
                format!(
                    "{}\"{}\": {}",
                    indent_str,
                    escape_json(key),
                    value.to_pretty_json(indent + 2)
                )
            })
            .collect::<Vec<_>>()
            .join(",\n");
        format!("{{\n{}\n{}}}", fields, " ".repeat(indent))
    }

    pub(crate) fn to_debug_string(&self) -> String {
        self.to_debug_string_ordered(&[])
    }

    pub(crate) fn to_debug_string_ordered(&self, leading: &[&str]) -> String {
        let fields = self
            .ordered_entries(leading)
            .map(|(key, value)| format!("\"{}\": {}", key, value.to_debug_string()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{{}}}", fields)
    }

    // leading keys first, then the rest in key order
    fn ordered_entries<'a>(
        &'a self,
        leading: &'a [&'a str],
    ) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        let first = leading
            .iter()
            .filter_map(move |key| self.data.get(*key).map(|value| (*key, value)));
        let rest = self
            .data
            .iter()
            .filter(move |(key, _)| !leading.contains(&key.as_str()))
            .map(|(key, value)| (key.as_str(), value));
        first.chain(rest)
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_debug_string())
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_pretty_json(0))
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document {
            data: iter.into_iter().collect(),
        }
    }
}

pub fn normalize(value: &str) -> String {
    value.trim_matches('"').to_string()
}

/// Creates a [Document] with JSON-like syntax.
///
/// ```rust
/// use tabby::doc;
///
/// let cat = doc! {
///     "name": "Dooby",
///     "owner": "Ariel",
///     "age": 8,
///     "favoriteFoods": ["treats", "catnip"],
/// };
/// assert_eq!(cat.size(), 4);
///
/// let base = 100;
/// let nested = doc! {
///     "address": { "city": "Springfield" },
///     "score": (base * 2),
/// };
/// assert_eq!(nested.size(), 2);
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::collection::Document::new()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put($crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                    .expect(&format!("Failed to put value {} in document", stringify!($value)));
            )*
            doc
        }
    };
}

/// Converts the value side of a [doc!] entry: nested documents, arrays or
/// any expression with a `From` impl for [Value].
#[macro_export]
macro_rules! doc_value {
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}
