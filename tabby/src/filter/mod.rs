//! Equality criteria and field projections used by queries.

mod criteria;
mod projection;

pub use criteria::*;
pub use projection::*;
