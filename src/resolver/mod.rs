//! Capability resolution.
//!
//! A [`Resolver`] holds the ordered probes for one capability kind (init
//! systems, package managers, ...) and picks the first one that matches a
//! connection. The outcome is cached per connection identity, so a target
//! is probed at most once per resolver.
//!
//! ## Caching
//!
//! - A match is cached and the same `Arc` is handed to every later caller.
//! - "No probe matched" is cached too; asking again returns the same
//!   `NotFound` error without touching the target.
//! - A probe that fails to run (lost connection, timeout, cancellation) is
//!   *not* cached. The error is returned and the next call probes again.
//!
//! ## Concurrency
//!
//! Each identity has its own slot. The probe sequence for an uncached
//! identity runs while holding that slot, so concurrent callers for the
//! same target wait and then read the cached outcome. Different targets
//! probe in parallel.

mod errors;
pub mod probe;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

pub use errors::ResolveError;
pub use probe::{Probe, ProbeResult};

use crate::core::cancel::CancelToken;
use crate::core::connection::{Connection, ConnectionId};
use crate::core::error::ExecError;

type Slot<T> = Arc<Mutex<Option<Option<Arc<T>>>>>;

/// Ordered probe registry with a per-connection resolution cache.
pub struct Resolver<T: ?Sized> {
    kind: &'static str,
    not_found: &'static str,
    probes: Vec<Probe<T>>,
    cache: Mutex<HashMap<ConnectionId, Slot<T>>>,
}

impl<T: ?Sized> Resolver<T> {
    /// Create an empty resolver.
    ///
    /// `kind` names the capability in logs and errors; `not_found` is the
    /// message of the error returned when no probe matches.
    pub fn new(kind: &'static str, not_found: &'static str) -> Self {
        Resolver {
            kind,
            not_found,
            probes: Vec::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Append a probe. Earlier probes take precedence.
    pub fn register(&mut self, probe: Probe<T>) {
        tracing::trace!("registered {} probe `{}`", self.kind, probe.name());
        self.probes.push(probe);
    }

    /// Builder-style [`Resolver::register`].
    pub fn with_probe(mut self, probe: Probe<T>) -> Self {
        self.register(probe);
        self
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Names of the registered probes, in evaluation order.
    pub fn probe_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.probes.iter().map(|p| p.name())
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// Number of connections with a cached outcome.
    pub fn cached_count(&self) -> usize {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache
            .values()
            .filter(|slot| slot.lock().unwrap_or_else(PoisonError::into_inner).is_some())
            .count()
    }

    /// Find the implementation for `conn`, probing only on the first call.
    pub fn resolve(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
    ) -> Result<Arc<T>, ResolveError> {
        let id = conn.identity();
        let slot = self.slot(&id);
        let mut entry = slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = entry.as_ref() {
            tracing::trace!("{} for {} served from cache", self.kind, id);
            return self.outcome(cached.clone());
        }

        let found = self.run_probes(conn, cancel, &id)?;
        *entry = Some(found.clone());
        self.outcome(found)
    }

    fn slot(&self, id: &ConnectionId) -> Slot<T> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.entry(id.clone()).or_default().clone()
    }

    fn run_probes(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        id: &ConnectionId,
    ) -> Result<Option<Arc<T>>, ResolveError> {
        for probe in &self.probes {
            cancel
                .check(probe.name())
                .map_err(|source| self.probe_error(probe, source))?;

            tracing::debug!("probing {} `{}` on {}", self.kind, probe.name(), id);
            match probe.run(conn, cancel) {
                Ok(Some(found)) => {
                    tracing::info!("{} on {}: {}", self.kind, id, probe.name());
                    return Ok(Some(found));
                }
                Ok(None) => continue,
                Err(source) => {
                    tracing::warn!(
                        "{} probe `{}` failed on {}: {}",
                        self.kind,
                        probe.name(),
                        id,
                        source
                    );
                    return Err(self.probe_error(probe, source));
                }
            }
        }

        tracing::info!("{} on {}: none of {} probes matched", self.kind, id, self.probes.len());
        Ok(None)
    }

    fn probe_error(&self, probe: &Probe<T>, source: ExecError) -> ResolveError {
        ResolveError::Probe {
            kind: self.kind,
            probe: probe.name(),
            source,
        }
    }

    fn outcome(&self, found: Option<Arc<T>>) -> Result<Arc<T>, ResolveError> {
        found.ok_or(ResolveError::NotFound {
            kind: self.kind,
            message: self.not_found,
        })
    }
}

impl<T: ?Sized> fmt::Debug for Resolver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("kind", &self.kind)
            .field("probes", &self.probes)
            .finish_non_exhaustive()
    }
}
