//! `outpost detect` command

use anyhow::{Context, Result};

use super::{load_context, GlobalOptions};
use crate::cli::DetectArgs;
use outpost::core::LocalConnection;
use outpost::ops::{detect, format_report};

/// Always exits 0: "nothing found" is a valid answer.
pub fn execute(args: DetectArgs, options: &GlobalOptions) -> Result<i32> {
    let ctx = load_context(options)?;
    let conn = LocalConnection::new();
    let cancel = ctx.cancel_token();

    let report = detect(&ctx, &conn, &cancel);

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("failed to encode report")?;
        println!("{}", json);
    } else {
        print!("{}", format_report(&report, options.verbose));
    }

    Ok(0)
}
