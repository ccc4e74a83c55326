//! Core types shared by every capability kind.
//!
//! - [`Connection`]: the command-execution contract probes and
//!   implementations run against
//! - [`CancelToken`]: cancellation flag plus optional deadline
//! - [`ExecError`] / [`OperationError`]: execution and operation failures

pub mod cancel;
pub mod connection;
pub mod error;
pub mod local;

pub use cancel::CancelToken;
pub use connection::{Connection, ConnectionId};
pub use error::{ExecError, OperationError};
pub use local::LocalConnection;
