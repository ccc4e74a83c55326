//! `outpost package` command

use anyhow::{bail, Result};

use super::{load_context, GlobalOptions};
use crate::cli::{PackageArgs, PackageVerb};
use outpost::core::LocalConnection;
use outpost::ops::{run_package_action, PackageAction, PackageOutcome};

pub fn execute(args: PackageArgs, options: &GlobalOptions) -> Result<i32> {
    let action = match args.action {
        PackageVerb::Install => PackageAction::Install,
        PackageVerb::Remove => PackageAction::Remove,
        PackageVerb::Update => PackageAction::Update,
        PackageVerb::Version => PackageAction::Version,
    };
    if matches!(action, PackageAction::Version) && args.names.is_empty() {
        bail!("`package version` needs at least one package name");
    }

    let ctx = load_context(options)?;
    let conn = LocalConnection::new();
    let cancel = ctx.cancel_token();

    match run_package_action(&ctx, &conn, &cancel, &action, &args.names)? {
        PackageOutcome::Done => {
            tracing::info!("{:?}: ok", args.action);
            Ok(0)
        }
        PackageOutcome::Versions(versions) => {
            let mut missing = false;
            for (name, version) in versions {
                match version {
                    Some(v) => println!("{} {}", name, v),
                    None => {
                        missing = true;
                        println!("{} (not installed)", name);
                    }
                }
            }
            Ok(if missing { 1 } else { 0 })
        }
    }
}
