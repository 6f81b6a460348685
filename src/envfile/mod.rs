//! Dotenv file loading with variable expansion

use crate::domain::EnvironmentMap;
use crate::error::{Error, Result};
use crate::utils::{absolute_path, display_path};
use std::fs;

pub mod expand;
pub mod parser;

pub use parser::{Entry, ParseError};

/// Load a dotenv file, expanding references against the process environment.
pub fn load_env_file(path: &str) -> Result<EnvironmentMap> {
    load_env_file_with(path, &crate::resolve::ambient_environment())
}

/// Load a dotenv file, expanding references against `base`.
///
/// Errors name `path` exactly as given, even though the file is opened through
/// its absolute form.
pub fn load_env_file_with(path: &str, base: &EnvironmentMap) -> Result<EnvironmentMap> {
    let resolved = absolute_path(path);
    if !resolved.exists() {
        return Err(Error::FileNotFound { path: path.to_string() });
    }

    let content = fs::read_to_string(&resolved)
        .map_err(|source| Error::EnvFileRead { path: path.to_string(), source })?;

    let env = parse_str(&content, base).map_err(|err| Error::EnvFileParse {
        path: path.to_string(),
        line: err.line,
        message: err.message,
    })?;

    tracing::debug!("Loaded {} variables from {}", env.len(), display_path(&resolved));
    Ok(env)
}

/// Parse and expand dotenv content that is already in memory.
pub fn parse_str(
    content: &str,
    base: &EnvironmentMap,
) -> std::result::Result<EnvironmentMap, ParseError> {
    let entries = parser::parse(content)?;
    Ok(expand::expand_entries(&entries, base))
}
