//! Connection management.
//!
//! [connect] and [ConnectionBuilder] parse a [ConnectionString], pick the
//! store module registered for its scheme and open the store once. The
//! returned [Connection] is the handle every model and collection is
//! obtained from.

mod builder;
#[allow(clippy::module_inception)]
mod connection;
mod connection_string;
mod options;

pub use builder::*;
pub use connection::*;
pub use connection_string::*;
pub use options::*;
