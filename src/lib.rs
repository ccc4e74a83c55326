//! outpost - capability resolution for service and package managers
//!
//! This crate answers "which init system / package manager does this
//! target use?" by running ordered probes over a [`Connection`], caching the
//! answer per connection identity, and dispatching operations to the
//! matching implementation.

pub mod core;
pub mod initsystem;
pub mod ops;
pub mod packagemanager;
pub mod resolver;
pub mod util;

/// Test utilities and mocks for outpost unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides a scripted connection and assertion helpers.
#[cfg(test)]
pub mod test_support;

pub use core::{CancelToken, Connection, ConnectionId, ExecError, LocalConnection, OperationError};
pub use initsystem::ServiceManager;
pub use packagemanager::PackageManager;
pub use resolver::{Probe, ResolveError, Resolver};
pub use util::context::GlobalContext;
