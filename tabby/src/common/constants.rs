pub const DOC_ID: &str = "_id";
pub const RESERVED_FIELDS: [&str; 1] = [DOC_ID];
pub const FIELD_SEPARATOR: &str = ".";
pub const OPERATOR_PREFIX: &str = "$";

pub const MEMORY_SCHEME: &str = "memory";
pub const STORE_VERSION: &str = env!("CARGO_PKG_VERSION");

// mongodb naming rules for database names
pub const MAX_DATABASE_NAME_LEN: usize = 63;
pub const INVALID_DATABASE_NAME_CHARS: [char; 5] = ['/', '\\', '.', '"', '$'];
