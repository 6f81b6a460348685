//! RC file loading
//!
//! An RC file is either JSON or a module-style file exporting the same shape.
//! JSON is tried first, then the restricted literal evaluator, and finally (only
//! with [`RcTrust::Execute`]) an external `node` process.

use crate::domain::{RcConfig, RcTrust};
use crate::error::{Error, Result};
use crate::utils::{absolute_path, display_path};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

pub mod module;
pub mod node;

/// Load an RC file without executing any code.
pub fn load_rc_config(path: &str) -> Result<Option<RcConfig>> {
    RcLoader::default().load(path)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RcLoader {
    trust: RcTrust,
}

impl RcLoader {
    pub fn new(trust: RcTrust) -> Self {
        Self { trust }
    }

    /// Read and interpret `path`.
    ///
    /// Returns `Ok(None)` when the file does not exist, so callers can tell "no
    /// RC file" apart from a malformed one.
    pub fn load(&self, path: &str) -> Result<Option<RcConfig>> {
        let resolved = absolute_path(path);
        if !resolved.exists() {
            debug!("No RC file at {}", display_path(&resolved));
            return Ok(None);
        }

        let content = fs::read_to_string(&resolved)
            .map_err(|source| Error::RcRead { path: path.to_string(), source })?;

        let invalid = |reason: String| {
            debug!("Rejecting RC file {}: {}", path, reason);
            Error::InvalidRcFormat { path: path.to_string(), reason }
        };

        let value = self.interpret(&content, &resolved).map_err(invalid)?;
        let config = RcConfig::from_value(value).map_err(invalid)?;

        debug!(
            "Loaded RC file {} with {} environment(s)",
            display_path(&resolved),
            config.environments.len()
        );
        Ok(Some(config))
    }

    fn interpret(&self, content: &str, resolved: &Path) -> std::result::Result<Value, String> {
        let json_err = match serde_json::from_str::<Value>(content) {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };
        debug!("RC file is not JSON ({}), trying module form", json_err);

        let static_err = match module::evaluate(content) {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        match self.trust {
            RcTrust::Static => Err(format!(
                "not JSON ({}); not a literal module export ({})",
                json_err, static_err
            )),
            RcTrust::Execute => node::evaluate(resolved).map_err(|node_err| {
                format!("not JSON ({}); module evaluation failed ({})", json_err, node_err)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TEST_CONFIG: &str = r#"{
  "environments": {
    "development": { "NODE_ENV": "development", "LOG_LEVEL": "debug" },
    "production": { "NODE_ENV": "production", "LOG_LEVEL": "error" }
  }
}"#;

    fn write_rc(tmp: &TempDir, content: &str) -> String {
        let path = tmp.path().join(".cross-env-cmdrc");
        fs::write(&path, content).expect("write");
        path.to_str().expect("utf8 path").to_string()
    }

    #[test]
    fn loads_json_rc_file() {
        let tmp = TempDir::new().expect("tmp");
        let path = write_rc(&tmp, TEST_CONFIG);

        let cfg = load_rc_config(&path).expect("load").expect("present");
        let prod = cfg.environment("production").expect("production");
        assert_eq!(prod["LOG_LEVEL"], "error");
        assert_eq!(cfg.environments.len(), 2);
    }

    #[test]
    fn missing_rc_file_is_none() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("absent.rc");
        let cfg = load_rc_config(path.to_str().expect("utf8")).expect("load");
        assert!(cfg.is_none());
    }

    #[test]
    fn loads_module_rc_file() {
        let tmp = TempDir::new().expect("tmp");
        let json_cfg = write_rc(&tmp, TEST_CONFIG);
        let expected = load_rc_config(&json_cfg).expect("json").expect("present");

        let path = write_rc(&tmp, &format!("module.exports = {};", TEST_CONFIG));
        let cfg = load_rc_config(&path).expect("load").expect("present");
        assert_eq!(cfg, expected);
    }

    #[test]
    fn module_numbers_keep_integer_form() {
        let tmp = TempDir::new().expect("tmp");
        let path =
            write_rc(&tmp, "module.exports = { environments: { dev: { PORT: 1e3, N: 3 } } };");

        let cfg = load_rc_config(&path).expect("load").expect("present");
        let dev = cfg.environment("dev").expect("dev");
        assert_eq!(dev["PORT"], "1000");
        assert_eq!(dev["N"], "3");
    }

    #[test]
    fn invalid_json_is_invalid_format() {
        let tmp = TempDir::new().expect("tmp");
        let path = write_rc(&tmp, "invalid json {");

        let err = load_rc_config(&path).expect_err("invalid");
        assert!(matches!(err, Error::InvalidRcFormat { .. }));
        assert_eq!(
            err.to_string(),
            format!("Invalid RC file format: {}. Expected JSON or JavaScript module.", path)
        );
    }

    #[test]
    fn invalid_javascript_is_invalid_format() {
        let tmp = TempDir::new().expect("tmp");
        let path = write_rc(&tmp, "invalid javascript syntax");
        let err = load_rc_config(&path).expect_err("invalid");
        assert!(matches!(err, Error::InvalidRcFormat { .. }));
    }

    #[test]
    fn wrong_shape_is_invalid_format() {
        let tmp = TempDir::new().expect("tmp");
        let path = write_rc(&tmp, r#"{"environments": {"dev": ["A=1"]}}"#);

        match load_rc_config(&path).expect_err("invalid") {
            Error::InvalidRcFormat { reason, .. } => assert!(reason.contains("dev"), "{reason}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unreadable_rc_is_read_error() {
        let tmp = TempDir::new().expect("tmp");
        let dir = tmp.path().join("rc-dir");
        fs::create_dir(&dir).expect("mkdir");

        let err = load_rc_config(dir.to_str().expect("utf8")).expect_err("directory");
        assert!(matches!(err, Error::RcRead { .. }));
        assert!(err.to_string().starts_with("Failed to load RC file"));
    }

    #[test]
    fn loading_twice_is_identical() {
        let tmp = TempDir::new().expect("tmp");
        let path = write_rc(&tmp, TEST_CONFIG);
        let first = load_rc_config(&path).expect("first");
        let second = load_rc_config(&path).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn static_trust_never_runs_code() {
        let tmp = TempDir::new().expect("tmp");
        let path = write_rc(
            &tmp,
            "module.exports = { environments: { dev: { HOME_DIR: process.env.HOME } } };",
        );
        let err = RcLoader::new(RcTrust::Static).load(&path).expect_err("computed");
        assert!(matches!(err, Error::InvalidRcFormat { .. }));
    }

    #[test]
    fn execute_trust_evaluates_computed_module() {
        if which::which("node").is_err() {
            return;
        }
        let tmp = TempDir::new().expect("tmp");
        let path = write_rc(
            &tmp,
            "const base = { LOG_LEVEL: 'info' };\n\
             module.exports = { environments: { staging: { ...base, NODE_ENV: 'staging' } } };\n",
        );

        let cfg = RcLoader::new(RcTrust::Execute).load(&path).expect("load").expect("present");
        let staging = cfg.environment("staging").expect("staging");
        assert_eq!(staging["LOG_LEVEL"], "info");
        assert_eq!(staging["NODE_ENV"], "staging");
    }
}
