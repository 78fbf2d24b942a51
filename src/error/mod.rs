//! Error types
//!
//! Every fallible operation in the crate returns [`BeanstalkError`]. Failures
//! are propagated to the caller unchanged; nothing here retries or recovers.

pub mod types;

pub use types::{BeanstalkError, Result};
