//! Error taxonomy for environment resolution and command execution

use std::io;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the library can report.
///
/// Nothing is recovered internally: a failure while loading any source aborts
/// the whole resolution and reaches the caller with the path or name involved.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The requested environment is missing from the RC file, or the RC file
    /// itself does not exist.
    #[error("Environment '{environment}' not found in {rc_file}")]
    EnvironmentNotFound { environment: String, rc_file: String },

    /// A dotenv file passed with `-f` does not exist. `path` is the string the
    /// caller supplied, not the resolved absolute path.
    #[error("Environment file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid RC file format: {path}. Expected JSON or JavaScript module.")]
    InvalidRcFormat { path: String, reason: String },

    #[error("Failed to load RC file {path}: {source}")]
    RcRead {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to load environment file {path}: {source}")]
    EnvFileRead {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to load environment file {path}: line {line}: {message}")]
    EnvFileParse { path: String, line: usize, message: String },

    #[error("No command specified")]
    NoCommand,

    #[error("Failed to execute command: {source}")]
    CommandLaunch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The child ran but did not succeed. `code` is `None` when it was
    /// terminated by a signal.
    #[error("{}", exit_message(*code))]
    CommandExit { code: Option<i32> },
}

fn exit_message(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("Command exited with code {}", code),
        None => "Command terminated by signal".to_string(),
    }
}
