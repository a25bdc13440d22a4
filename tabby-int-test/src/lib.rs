//! Shared helpers for the integration tests and the `adopt-a-cat`
//! walkthrough.

pub mod test_util;
