use crate::core::cancel::CancelToken;
use crate::core::connection::{capture_operation, run_operation, Connection};
use crate::core::error::OperationError;
use crate::util::shell::{check_operand, ShellCommand};

use super::{PackageManager, PackageVersionQuery};

/// How installed versions are queried and read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionStyle {
    /// `dpkg-query -W -f '${Version}' <pkg>` prints the bare version.
    Dpkg,
    /// `brew list --versions <pkg>` prints `<pkg> <v1> [<v2>...]`.
    Brew,
    /// `pacman -Q <pkg>` prints `<pkg> <version>`.
    Pacman,
}

impl VersionStyle {
    fn command(self, package: &str) -> ShellCommand {
        match self {
            VersionStyle::Dpkg => ShellCommand::new("dpkg-query -W -f '${Version}'").arg(package),
            VersionStyle::Brew => ShellCommand::new("brew list --versions").arg(package),
            VersionStyle::Pacman => ShellCommand::new("pacman -Q").arg(package),
        }
    }

    fn parse(self, output: &str) -> Option<String> {
        let line = output.lines().next()?.trim();
        let version = match self {
            VersionStyle::Dpkg => line,
            // Newest keg is listed last.
            VersionStyle::Brew => line.split_whitespace().skip(1).last()?,
            VersionStyle::Pacman => line.split_whitespace().nth(1)?,
        };
        (!version.is_empty()).then(|| version.to_string())
    }
}

/// A package manager driven by one command and three sub-commands.
#[derive(Debug, Clone, Copy)]
pub struct UniversalPackageManager {
    name: &'static str,
    binary: &'static str,
    command: &'static str,
    install: &'static str,
    remove: &'static str,
    update: &'static str,
    windows: bool,
    version: Option<VersionStyle>,
}

impl UniversalPackageManager {
    /// `binary` is what the probe looks for on PATH; `command` prefixes
    /// every invocation and may carry global flags.
    pub const fn new(
        name: &'static str,
        binary: &'static str,
        command: &'static str,
        install: &'static str,
        remove: &'static str,
        update: &'static str,
    ) -> Self {
        UniversalPackageManager {
            name,
            binary,
            command,
            install,
            remove,
            update,
            windows: false,
            version: None,
        }
    }

    pub const fn with_version(mut self, style: VersionStyle) -> Self {
        self.version = Some(style);
        self
    }

    /// Only probe on Windows-shell targets.
    pub const fn windows(mut self) -> Self {
        self.windows = true;
        self
    }

    pub fn binary(&self) -> &'static str {
        self.binary
    }

    pub fn windows_only(&self) -> bool {
        self.windows
    }

    fn packages(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        verb: &'static str,
        operation: &'static str,
        packages: &[String],
    ) -> Result<(), OperationError> {
        if packages.is_empty() {
            tracing::debug!("{} {}: nothing to do", self.name, operation);
            return Ok(());
        }
        let subject = packages.join(" ");
        for package in packages {
            check_operand(package)
                .map_err(|source| OperationError::new(operation, self.name, &subject, source))?;
        }
        let cmd = ShellCommand::new(self.command).raw(verb).args(packages);
        run_operation(conn, cancel, self.name, operation, &subject, &cmd)
    }
}

impl PackageManager for UniversalPackageManager {
    fn name(&self) -> &'static str {
        self.name
    }

    fn install(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        packages: &[String],
    ) -> Result<(), OperationError> {
        self.packages(conn, cancel, self.install, "install", packages)
    }

    fn remove(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        packages: &[String],
    ) -> Result<(), OperationError> {
        self.packages(conn, cancel, self.remove, "remove", packages)
    }

    fn update(&self, conn: &dyn Connection, cancel: &CancelToken) -> Result<(), OperationError> {
        let cmd = ShellCommand::new(self.command).raw(self.update);
        run_operation(conn, cancel, self.name, "update", "package index", &cmd)
    }

    fn as_version_query(&self) -> Option<&dyn PackageVersionQuery> {
        self.version.map(|_| self as &dyn PackageVersionQuery)
    }
}

impl PackageVersionQuery for UniversalPackageManager {
    fn installed_version(
        &self,
        conn: &dyn Connection,
        cancel: &CancelToken,
        package: &str,
    ) -> Result<Option<String>, OperationError> {
        let Some(style) = self.version else {
            return Ok(None);
        };
        check_operand(package).map_err(|source| {
            OperationError::new("query version of", self.name, package, source)
        })?;
        let cmd = style.command(package);
        match capture_operation(conn, cancel, self.name, "query version of", package, &cmd) {
            Ok(out) => Ok(style.parse(&out)),
            // The query tools exit non-zero for packages that are not installed.
            Err(err) if !err.source.is_transport() => Ok(None),
            Err(err) => Err(err),
        }
    }
}

pub const APK: UniversalPackageManager =
    UniversalPackageManager::new("apk", "apk", "apk", "add", "del", "update");

pub const APT: UniversalPackageManager = UniversalPackageManager::new(
    "apt",
    "apt-get",
    "apt-get",
    "install -y",
    "remove -y",
    "update",
)
.with_version(VersionStyle::Dpkg);

pub const YUM: UniversalPackageManager =
    UniversalPackageManager::new("yum", "yum", "yum", "install -y", "remove -y", "makecache");

pub const DNF: UniversalPackageManager =
    UniversalPackageManager::new("dnf", "dnf", "dnf", "install -y", "remove -y", "makecache");

pub const PACMAN: UniversalPackageManager = UniversalPackageManager::new(
    "pacman",
    "pacman",
    "pacman",
    "-S --noconfirm",
    "-R --noconfirm",
    "-Sy",
)
.with_version(VersionStyle::Pacman);

pub const ZYPPER: UniversalPackageManager =
    UniversalPackageManager::new("zypper", "zypper", "zypper -n", "install", "remove", "refresh");

pub const HOMEBREW: UniversalPackageManager =
    UniversalPackageManager::new("homebrew", "brew", "brew", "install", "uninstall", "update")
        .with_version(VersionStyle::Brew);

pub const MACPORTS: UniversalPackageManager =
    UniversalPackageManager::new("macports", "port", "port", "install", "uninstall", "selfupdate");

pub const CHOCOLATEY: UniversalPackageManager = UniversalPackageManager::new(
    "chocolatey",
    "choco",
    "choco",
    "install -y",
    "uninstall -y",
    "upgrade all -y",
)
.windows();
