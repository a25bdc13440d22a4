use crate::collection::Document;
use crate::common::{Convertible, Value};
use crate::errors::{ErrorKind, TabbyError, TabbyResult};
use crate::schema::Schema;

/// A record type bound to a model.
///
/// Usually derived together with [Convertible]:
/// `#[derive(Default, Convertible, Entity)]`.
pub trait Entity: Convertible<Output = Self> + Default + Send + Sync + 'static {
    /// Name the model is registered under, e.g. `"Cat"`.
    fn model_name() -> String;

    /// Collection override; the pluralized model name is used when `None`.
    fn collection_name() -> Option<String> {
        None
    }

    fn schema() -> TabbyResult<Schema>;
}

/// Encodes `entity` as a document.
pub fn entity_to_document<T: Convertible>(entity: &T) -> TabbyResult<Document> {
    match entity.to_value()? {
        Value::Document(document) => Ok(document),
        other => {
            log::error!("Entity encoded to {} instead of a document", other.type_name());
            Err(TabbyError::new(
                &format!("Entity must encode to a document, found {}", other.type_name()),
                ErrorKind::ObjectMappingError,
            ))
        }
    }
}
