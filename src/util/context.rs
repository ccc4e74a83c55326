//! Global context for outpost operations.
//!
//! The context is the composition root: it owns the loaded configuration
//! and one resolver per capability kind. Resolvers are built once here and
//! handed out by reference, so every operation in a process shares the same
//! resolution caches.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::core::cancel::CancelToken;
use crate::initsystem::{self, ServiceManagerResolver};
use crate::packagemanager::{self, PackageManagerResolver};
use crate::util::config::{global_config_path, load_config, project_config_path, Config};

/// Global context containing configuration and resolvers.
#[derive(Debug)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Merged global + project configuration
    config: Config,

    services: ServiceManagerResolver,

    packages: PackageManagerResolver,
}

impl GlobalContext {
    /// Create a context with default configuration and the default resolvers.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Ok(Self::with_resolvers(
            cwd,
            Config::default(),
            initsystem::default_resolver(),
            packagemanager::default_resolver(),
        ))
    }

    /// Create a context reading configuration for `cwd`.
    pub fn load(cwd: PathBuf) -> Self {
        let global = global_config_path();
        let config = load_config(global.as_deref(), &project_config_path(&cwd));
        Self::with_resolvers(
            cwd,
            config,
            initsystem::default_resolver(),
            packagemanager::default_resolver(),
        )
    }

    /// Create a context with explicit resolvers.
    pub fn with_resolvers(
        cwd: PathBuf,
        config: Config,
        services: ServiceManagerResolver,
        packages: PackageManagerResolver,
    ) -> Self {
        GlobalContext {
            cwd,
            config,
            services,
            packages,
        }
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// The init system resolver.
    pub fn services(&self) -> &ServiceManagerResolver {
        &self.services
    }

    /// The package manager resolver.
    pub fn packages(&self) -> &PackageManagerResolver {
        &self.packages
    }

    /// A fresh cancellation token carrying the configured deadline, if any.
    pub fn cancel_token(&self) -> CancelToken {
        match self.config.timeout() {
            Some(timeout) => CancelToken::with_timeout(timeout),
            None => CancelToken::new(),
        }
    }

    /// Override the configured deadline.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.config.exec.timeout_secs = Some(timeout.as_secs());
    }
}
