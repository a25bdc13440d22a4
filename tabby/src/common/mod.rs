mod constants;
mod convertible;
mod date_utils;
mod type_utils;
mod value;

pub use constants::*;
pub use convertible::*;
pub use date_utils::*;
pub use type_utils::*;
pub use value::*;
