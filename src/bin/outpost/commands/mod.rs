//! Command implementations

use std::time::Duration;

use anyhow::Result;

use outpost::util::GlobalContext;

pub mod completions;
pub mod detect;
pub mod package;
pub mod service;

/// Flags shared by every subcommand.
pub struct GlobalOptions {
    pub verbose: bool,
    pub timeout: Option<u64>,
}

/// Load config for the current directory and apply command-line overrides.
pub fn load_context(options: &GlobalOptions) -> Result<GlobalContext> {
    let cwd = std::env::current_dir()?;
    let mut ctx = GlobalContext::load(cwd);
    if let Some(secs) = options.timeout {
        ctx.set_timeout(Duration::from_secs(secs));
    }
    Ok(ctx)
}
