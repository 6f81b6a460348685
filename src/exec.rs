//! Child command execution

use crate::domain::EnvironmentMap;
use crate::error::{Error, Result};
use std::process::Command;
use tracing::debug;

/// Run `command` with `env` overlaid on the inherited environment.
///
/// Standard streams are inherited. On Windows the command goes through
/// `cmd /C` so that shell built-ins and `.cmd` shims resolve.
pub fn execute_command(command: &[String], env: &EnvironmentMap) -> Result<()> {
    let (program, args) = command.split_first().ok_or(Error::NoCommand)?;

    let mut cmd = build_command(program, args);
    cmd.envs(env);

    debug!("Spawning {} with {} argument(s)", program, args.len());
    let status =
        cmd.status().map_err(|source| Error::CommandLaunch { program: program.clone(), source })?;

    if status.success() {
        Ok(())
    } else {
        Err(Error::CommandExit { code: status.code() })
    }
}

#[cfg(windows)]
fn build_command(program: &str, args: &[String]) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(program).args(args);
    cmd
}

#[cfg(not(windows))]
fn build_command(program: &str, args: &[String]) -> Command {
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd
}
