//! Package operations against the resolved package manager.

use anyhow::{bail, Context, Result};

use crate::core::cancel::CancelToken;
use crate::core::connection::Connection;
use crate::util::GlobalContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageAction {
    Install,
    Remove,
    /// Refresh the package index.
    Update,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageOutcome {
    Done,
    /// Installed version per requested package, in request order.
    Versions(Vec<(String, Option<String>)>),
}

/// Resolve the package manager on `conn` and run `action`.
pub fn run_package_action(
    ctx: &GlobalContext,
    conn: &dyn Connection,
    cancel: &CancelToken,
    action: &PackageAction,
    packages: &[String],
) -> Result<PackageOutcome> {
    let pm = ctx
        .packages()
        .resolve(conn, cancel)
        .context("cannot manage packages on this target")?;

    tracing::debug!("{:?} {:?} using {}", action, packages, pm.name());

    match action {
        PackageAction::Install => pm.install(conn, cancel, packages)?,
        PackageAction::Remove => pm.remove(conn, cancel, packages)?,
        PackageAction::Update => pm.update(conn, cancel)?,
        PackageAction::Version => {
            let Some(query) = pm.as_version_query() else {
                bail!("{} cannot report installed versions", pm.name());
            };
            let versions = packages
                .iter()
                .map(|name| Ok((name.clone(), query.installed_version(conn, cancel, name)?)))
                .collect::<Result<Vec<_>>>()?;
            return Ok(PackageOutcome::Versions(versions));
        }
    }

    Ok(PackageOutcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initsystem;
    use crate::packagemanager;
    use crate::test_support::assertions::assert_err;
    use crate::test_support::{MockConnection, MockProcessOutput};
    use crate::util::config::Config;
    use std::path::PathBuf;

    fn context() -> GlobalContext {
        GlobalContext::with_resolvers(
            PathBuf::from("/"),
            Config::default(),
            initsystem::default_resolver(),
            packagemanager::default_resolver(),
        )
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_install_on_alpine() {
        let ctx = context();
        let conn = MockConnection::new("alpine-1");
        conn.expect("command -v apk", MockProcessOutput::success("/sbin/apk"));
        conn.expect("apk add curl jq", MockProcessOutput::success(""));

        let outcome = run_package_action(
            &ctx,
            &conn,
            &CancelToken::new(),
            &PackageAction::Install,
            &names(&["curl", "jq"]),
        )
        .unwrap();
        assert_eq!(outcome, PackageOutcome::Done);
        assert_eq!(conn.calls(), vec!["command -v apk", "apk add curl jq"]);
    }

    #[test]
    fn test_versions_on_debian() {
        let ctx = context();
        let conn = MockConnection::new("deb-1");
        conn.expect("command -v apt-get", MockProcessOutput::success("/usr/bin/apt-get"));
        conn.expect(
            "dpkg-query -W -f '${Version}' bash",
            MockProcessOutput::success("5.2.15-2+b2"),
        );

        let outcome = run_package_action(
            &ctx,
            &conn,
            &CancelToken::new(),
            &PackageAction::Version,
            &names(&["bash", "missing"]),
        )
        .unwrap();
        assert_eq!(
            outcome,
            PackageOutcome::Versions(vec![
                ("bash".to_string(), Some("5.2.15-2+b2".to_string())),
                ("missing".to_string(), None),
            ])
        );
    }

    #[test]
    fn test_version_unsupported() {
        let ctx = context();
        let conn = MockConnection::new("alpine-1");
        conn.expect("command -v apk", MockProcessOutput::success("/sbin/apk"));

        let err = assert_err(run_package_action(
            &ctx,
            &conn,
            &CancelToken::new(),
            &PackageAction::Version,
            &names(&["curl"]),
        ));
        assert_eq!(err.to_string(), "apk cannot report installed versions");
    }
}
