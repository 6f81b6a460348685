//! Environment resolution
//!
//! Precedence, lowest to highest:
//! 1. the process environment
//! 2. the named environment block of the RC file
//! 3. dotenv files, in the order given
//! 4. inline variables

use crate::domain::{EnvironmentMap, ResolutionOptions};
use crate::envfile::load_env_file_with;
use crate::error::{Error, Result};
use crate::rc::RcLoader;
use tracing::debug;

/// Snapshot of the process environment. Entries that are not valid UTF-8 are
/// skipped.
pub fn ambient_environment() -> EnvironmentMap {
    std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}

/// Resolve the final environment on top of the current process environment.
pub fn load_environment(options: &ResolutionOptions) -> Result<EnvironmentMap> {
    resolve_from(ambient_environment(), options)
}

/// Resolve the final environment on top of `base`.
///
/// `base` also serves as the fallback for `$NAME` references in dotenv files.
/// Any failure aborts the whole resolution; no partial map is returned.
pub fn resolve_from(base: EnvironmentMap, options: &ResolutionOptions) -> Result<EnvironmentMap> {
    let mut env = base.clone();

    // An empty name counts as no environment
    if let Some(environment) = options.environment.as_deref().filter(|name| !name.is_empty()) {
        let block = RcLoader::new(options.rc_trust)
            .load(&options.rc_file)?
            .and_then(|cfg| cfg.environment(environment).cloned())
            .ok_or_else(|| Error::EnvironmentNotFound {
                environment: environment.to_string(),
                rc_file: options.rc_file.clone(),
            })?;

        debug!("Applying {} variables from environment '{}'", block.len(), environment);
        overlay(&mut env, block);
    }

    for file in &options.files {
        let vars = load_env_file_with(file, &base)?;
        debug!("Applying {} variables from {}", vars.len(), file);
        overlay(&mut env, vars);
    }

    if !options.inline_vars.is_empty() {
        debug!("Applying {} inline variables", options.inline_vars.len());
        overlay(&mut env, options.inline_vars.clone());
    }

    Ok(env)
}

fn overlay(target: &mut EnvironmentMap, source: EnvironmentMap) {
    target.extend(source);
}
