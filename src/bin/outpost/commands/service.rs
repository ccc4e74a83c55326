//! `outpost service` command

use anyhow::Result;

use super::{load_context, GlobalOptions};
use crate::cli::{ServiceArgs, ServiceVerb};
use outpost::core::LocalConnection;
use outpost::ops::{run_service_action, ServiceAction, ServiceOutcome};

/// LSB exit code for "program is not running".
const NOT_RUNNING: i32 = 3;

pub fn execute(args: ServiceArgs, options: &GlobalOptions) -> Result<i32> {
    let ctx = load_context(options)?;
    let conn = LocalConnection::new();
    let cancel = ctx.cancel_token();

    let action = match args.action {
        ServiceVerb::Start => ServiceAction::Start,
        ServiceVerb::Stop => ServiceAction::Stop,
        ServiceVerb::Restart => ServiceAction::Restart,
        ServiceVerb::Enable => ServiceAction::Enable,
        ServiceVerb::Disable => ServiceAction::Disable,
        ServiceVerb::Status => ServiceAction::Status,
        ServiceVerb::Logs => ServiceAction::Logs {
            lines: args.lines.unwrap_or_else(|| ctx.config().log_lines()),
        },
        ServiceVerb::Path => ServiceAction::Path,
    };

    match run_service_action(&ctx, &conn, &cancel, &args.name, &action)? {
        ServiceOutcome::Done => {
            tracing::info!("{:?} {}: ok", args.action, args.name);
            Ok(0)
        }
        ServiceOutcome::Running(true) => {
            println!("{}: running", args.name);
            Ok(0)
        }
        ServiceOutcome::Running(false) => {
            println!("{}: not running", args.name);
            Ok(NOT_RUNNING)
        }
        ServiceOutcome::Logs(lines) => {
            for line in lines {
                println!("{}", line);
            }
            Ok(0)
        }
        ServiceOutcome::LogsUnavailable { facility } => {
            tracing::warn!("{} does not provide service logs", facility);
            Ok(0)
        }
        ServiceOutcome::Path(path) => {
            println!("{}", path);
            Ok(0)
        }
    }
}
