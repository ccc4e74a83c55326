//! Package managers.
//!
//! Every supported package manager is a [`UniversalPackageManager`]: a
//! command plus the sub-commands it uses for install, remove and index
//! refresh. The ones that can report installed versions expose
//! [`PackageVersionQuery`] through [`PackageManager::as_version_query`].

use std::fmt;
use std::sync::Arc;

use crate::core::cancel::CancelToken;
use crate::core::connection::Connection;
use crate::core::error::OperationError;
use crate::resolver::{probe, Probe, Resolver};

mod universal;

pub use universal::{
    UniversalPackageManager, VersionStyle, APK, APT, CHOCOLATEY, DNF, HOMEBREW, MACPORTS, PACMAN,
    YUM, ZYPPER,
};

/// Error message when no package manager probe matches.
pub const NOT_FOUND: &str = "no supported package manager found";

/// Resolver specialized for package managers.
pub type PackageManagerResolver = Resolver<dyn PackageManager>;

/// Base contract every package manager provides.
///
/// `install` and `remove` with an empty list succeed without running
/// anything.
pub trait PackageManager: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn install(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        packages: &[String],
    ) -> Result<(), OperationError>;

    fn remove(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        packages: &[String],
    ) -> Result<(), OperationError>;

    /// Refresh the package index.
    fn update(&self, conn: &dyn Connection, cancel: &CancelToken) -> Result<(), OperationError>;

    fn as_version_query(&self) -> Option<&dyn PackageVersionQuery> {
        None
    }
}

/// Package managers that can report what is installed.
pub trait PackageVersionQuery {
    /// Installed version of `package`, or `None` when it is not installed.
    fn installed_version(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        package: &str,
    ) -> Result<Option<String>, OperationError>;
}

/// Names of the extensions `pm` supports, for display.
pub fn extensions(pm: &dyn PackageManager) -> Vec<&'static str> {
    let mut out = Vec::new();
    if pm.as_version_query().is_some() {
        out.push("version");
    }
    out
}

fn register(resolver: &mut PackageManagerResolver, pm: UniversalPackageManager) {
    resolver.register(Probe::new(pm.name(), move |conn, cancel| {
        if conn.is_windows() != pm.windows_only() {
            return Ok(None);
        }
        if !probe::command_exists(conn, cancel, pm.binary())? {
            return Ok(None);
        }
        let found: Arc<dyn PackageManager> = Arc::new(pm);
        Ok(Some(found))
    }));
}

/// Build the default package manager resolver.
///
/// Probe order: apk, apt, yum, dnf, pacman, zypper, homebrew, macports,
/// chocolatey.
pub fn default_resolver() -> PackageManagerResolver {
    let mut resolver = PackageManagerResolver::new("package manager", NOT_FOUND);
    for pm in [APK, APT, YUM, DNF, PACMAN, ZYPPER, HOMEBREW, MACPORTS, CHOCOLATEY] {
        register(&mut resolver, pm);
    }
    resolver
}
