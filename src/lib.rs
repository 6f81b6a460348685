//! cross-env-cmd: run commands with environment variables merged from several sources
//!
//! Variables are resolved from the process environment, a named block of an RC
//! file, any number of dotenv files and inline `KEY=VALUE` assignments, in that
//! order of increasing precedence. The resolved map is then handed to a child
//! command.

pub mod cli;
pub mod domain;
pub mod envfile;
pub mod error;
pub mod exec;
pub mod rc;
pub mod resolve;
pub mod utils;

pub use domain::{EnvironmentMap, RcConfig, RcTrust, ResolutionOptions, DEFAULT_RC_FILE};
pub use envfile::{load_env_file, load_env_file_with};
pub use error::{Error, Result};
pub use exec::execute_command;
pub use rc::{load_rc_config, RcLoader};
pub use resolve::{ambient_environment, load_environment, resolve_from};
