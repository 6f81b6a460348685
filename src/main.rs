//! cross-env-cmd: run a command with per-environment variables
//!
//! Thin entry point; argument handling and exit status live in [`cross_env_cmd::cli`].

use std::process::ExitCode;

fn main() -> ExitCode {
    cross_env_cmd::cli::run()
}
