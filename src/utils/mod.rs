//! The `utils` module provides the pieces shared across `offsetbus`:
//! error types and logging setup.

pub mod error;
pub mod logging;

pub use error::{BrokerError, HandlerError};
