use crate::errors::{ErrorKind, TabbyError, TabbyResult};
use crate::ID_GENERATOR;
use once_cell::sync::Lazy;
use std::fmt::{Debug, Display};
use std::str::FromStr;

static ID_TOO_LARGE_ERROR: Lazy<TabbyError> = Lazy::new(|| {
    TabbyError::new(
        &format!("Document id must be less than 10^19 ({})", 10u64.pow(19)),
        ErrorKind::InvalidId,
    )
});

static ID_TOO_SMALL_ERROR: Lazy<TabbyError> = Lazy::new(|| {
    TabbyError::new(
        &format!("Document id must be greater than or equal to 10^18 ({})", 10u64.pow(18)),
        ErrorKind::InvalidId,
    )
});

const MAX_VALUE: u64 = 10u64.pow(19);
const MIN_VALUE: u64 = 10u64.pow(18);

/// Identifier of a persisted record, stored in its `_id` field.
///
/// Ids are assigned by the collection on first insert and come from a
/// snowflake generator, so they are unique within the process and roughly
/// ordered by creation time. Valid ids lie in `[10^18, 10^19)`.
#[derive(PartialEq, Eq, Ord, PartialOrd, Hash, Clone, Copy, serde::Deserialize, serde::Serialize)]
pub struct DocumentId {
    id_value: u64,
}

impl DocumentId {
    pub(crate) fn new() -> Self {
        DocumentId {
            id_value: ID_GENERATOR.get_id(),
        }
    }

    /// Wraps an existing id value after range validation.
    pub fn create_id(id_value: u64) -> TabbyResult<DocumentId> {
        DocumentId::valid_id(id_value)?;
        Ok(DocumentId { id_value })
    }

    pub fn id_value(&self) -> u64 {
        self.id_value
    }

    /// Big-endian bytes of the id; byte order matches numeric order.
    pub fn to_bytes(&self) -> [u8; 8] {
        self.id_value.to_be_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> TabbyResult<DocumentId> {
        let array: [u8; 8] = bytes.try_into().map_err(|_| {
            log::error!("Document id key must be 8 bytes, found {}", bytes.len());
            TabbyError::new("Document id key must be 8 bytes", ErrorKind::InvalidId)
        })?;
        DocumentId::create_id(u64::from_be_bytes(array))
    }

    pub(crate) fn valid_id(id_value: u64) -> TabbyResult<()> {
        if id_value >= MAX_VALUE {
            log::error!("Id value {} is too large", id_value);
            return Err(ID_TOO_LARGE_ERROR.clone());
        } else if id_value < MIN_VALUE {
            log::error!("Id value {} is too small", id_value);
            return Err(ID_TOO_SMALL_ERROR.clone());
        }
        Ok(())
    }
}

impl FromStr for DocumentId {
    type Err = TabbyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id_value = s.trim().parse::<u64>().map_err(|err| {
            log::error!("Failed to parse document id {}: {}", s, err);
            TabbyError::new(&format!("Invalid document id '{}'", s), ErrorKind::InvalidId)
        })?;
        DocumentId::create_id(id_value)
    }
}

impl Debug for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DocumentId({})", self.id_value)
    }
}

impl Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id_value)
    }
}
