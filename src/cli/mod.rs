//! Command-line interface for cross-env-cmd
//!
//! Parses flags, inline assignments and the command, resolves the environment
//! and runs the command with it.

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::ffi::OsString;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::domain::{RcTrust, ResolutionOptions, DEFAULT_RC_FILE};
use crate::error::Error;
use crate::exec::execute_command;
use crate::resolve::load_environment;

mod utils;

pub use utils::{hoist_flags, split_inline_vars};

const EXAMPLES: &str = "\
Examples:
  cross-env-cmd -e staging npm start
  cross-env-cmd -e staging -f .env.local TEST=value npm test
  cross-env-cmd -f .env.development NODE_ENV=development npm run build
  cross-env-cmd -e staging -f .test.env -f .prod.env TEST=a BETA=e npm run deploy";

/// Run a command with environment variables from RC files, .env files and inline assignments
#[derive(Parser, Debug)]
#[command(name = "cross-env-cmd")]
#[command(author, about, long_about = None)]
#[command(disable_version_flag = true)]
#[command(override_usage = "cross-env-cmd [OPTIONS] [KEY=VALUE]... <COMMAND>...")]
#[command(after_help = EXAMPLES)]
pub struct Cli {
    /// Environment name from the RC file
    #[arg(short = 'e', long = "env", value_name = "ENVIRONMENT")]
    pub environment: Option<String>,

    /// Environment file to load (can be used multiple times, later files win)
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    pub files: Vec<String>,

    /// RC configuration file
    #[arg(long = "rc", value_name = "FILE", env = "CROSS_ENV_CMD_RC", default_value = DEFAULT_RC_FILE)]
    pub rc_file: String,

    /// Allow evaluating module-style RC files with node (runs the RC file as code)
    #[arg(
        long,
        env = "CROSS_ENV_CMD_ALLOW_EXEC_RC",
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    pub allow_exec_rc: bool,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(long)]
    pub verbose: bool,

    /// Show version
    #[arg(short = 'v', long)]
    pub version: bool,

    /// Inline KEY=VALUE assignments followed by the command to run
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// A fully parsed invocation: what to resolve and what to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub options: ResolutionOptions,
    pub command: Vec<String>,
}

impl From<Cli> for Invocation {
    fn from(cli: Cli) -> Self {
        let (inline_vars, command) = split_inline_vars(cli.args);
        let rc_trust = if cli.allow_exec_rc { RcTrust::Execute } else { RcTrust::Static };
        let options = ResolutionOptions {
            environment: cli.environment.filter(|name| !name.is_empty()),
            files: cli.files,
            rc_file: cli.rc_file,
            inline_vars,
            rc_trust,
        };
        Self { options, command }
    }
}

/// Parse raw arguments (including the program name).
pub fn parse_from<I, T>(args: I) -> std::result::Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    Cli::try_parse_from(hoist_flags(args.into_iter().map(Into::into).collect()))
}

pub fn run() -> ExitCode {
    let cli = match parse_from(std::env::args_os()) {
        Ok(cli) => cli,
        Err(err) => {
            // --help lands here too, on stdout with a success code
            let _ = err.print();
            return if err.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
        }
    };

    init_tracing(cli.verbose);

    if cli.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }

    match execute(cli.into()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            if matches!(err.downcast_ref::<Error>(), Some(Error::NoCommand)) {
                let _ = Cli::command().write_help(&mut std::io::stderr());
            }
            ExitCode::FAILURE
        }
    }
}

fn execute(invocation: Invocation) -> Result<()> {
    if invocation.command.is_empty() {
        return Err(Error::NoCommand.into());
    }

    let env = load_environment(&invocation.options)?;
    tracing::debug!("Resolved {} variables", env.len());

    tracing::info!("Running {}", invocation.command.join(" "));
    execute_command(&invocation.command, &env)?;
    Ok(())
}

fn init_tracing(verbose: bool) {
    // Directives from RUST_LOG are kept alongside the default level
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
