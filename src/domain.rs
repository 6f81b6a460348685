//! Core data types shared by the loaders, the resolver and the CLI

use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// RC file looked up when no `--rc` path is given.
pub const DEFAULT_RC_FILE: &str = ".cross-env-cmdrc";

/// Flat variable name → value mapping.
///
/// A `BTreeMap` keeps iteration and comparison deterministic, so loading the
/// same sources twice yields identical maps.
pub type EnvironmentMap = BTreeMap<String, String>;

/// Named environments declared in an RC file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RcConfig {
    pub environments: BTreeMap<String, EnvironmentMap>,
}

impl RcConfig {
    pub fn environment(&self, name: &str) -> Option<&EnvironmentMap> {
        self.environments.get(name)
    }

    /// Build a config from an already parsed document.
    ///
    /// The document must be an object; `environments` may be missing, in which
    /// case no environment can be found later. Numbers and booleans become
    /// their textual form, any other non-string value is rejected.
    pub fn from_value(value: Value) -> std::result::Result<Self, String> {
        let mut root = match value {
            Value::Object(root) => root,
            other => {
                return Err(format!("expected an object at the top level, found {}", kind(&other)))
            }
        };

        let environments = match root.remove("environments") {
            None => return Ok(Self::default()),
            Some(Value::Object(envs)) => envs,
            Some(other) => {
                return Err(format!("'environments' must be an object, found {}", kind(&other)))
            }
        };

        let mut config = Self::default();
        for (name, block) in environments {
            let vars = match block {
                Value::Object(vars) => vars,
                other => {
                    return Err(format!(
                        "environment '{}' must be an object, found {}",
                        name,
                        kind(&other)
                    ))
                }
            };
            let mut map = EnvironmentMap::new();
            for (key, value) in vars {
                let text = match value {
                    Value::String(s) => s,
                    Value::Number(n) => number_text(&n),
                    Value::Bool(b) => b.to_string(),
                    other => {
                        return Err(format!(
                            "variable '{}' in environment '{}' must be a string, number or boolean, found {}",
                            key,
                            name,
                            kind(&other)
                        ))
                    }
                };
                map.insert(key, text);
            }
            config.environments.insert(name, map);
        }
        Ok(config)
    }
}

/// Largest integer an `f64` holds exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Integral floats (`1.0`, `1e3`) print without a fraction, as JavaScript does.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            format!("{}", f as i64)
        }
        _ => n.to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// How far the RC loader may go to interpret a module-style RC file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RcTrust {
    /// JSON and literal `module.exports = {...}` forms only. No code runs.
    #[default]
    Static,
    /// Additionally evaluate the file with an external JavaScript runtime.
    Execute,
}

/// Input contract of the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionOptions {
    /// Environment block to load from the RC file.
    pub environment: Option<String>,
    /// Dotenv files, applied in order (later files win).
    pub files: Vec<String>,
    pub rc_file: String,
    /// Highest-precedence overrides.
    pub inline_vars: EnvironmentMap,
    pub rc_trust: RcTrust,
}

impl Default for ResolutionOptions {
    fn default() -> Self {
        Self {
            environment: None,
            files: Vec::new(),
            rc_file: DEFAULT_RC_FILE.to_string(),
            inline_vars: EnvironmentMap::new(),
            rc_trust: RcTrust::Static,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_reads_environments() {
        let cfg = RcConfig::from_value(json!({
            "environments": {
                "development": { "NODE_ENV": "development", "LOG_LEVEL": "debug" },
                "production": { "NODE_ENV": "production" }
            }
        }))
        .expect("config");

        assert_eq!(cfg.environments.len(), 2);
        let dev = cfg.environment("development").expect("development");
        assert_eq!(dev.get("LOG_LEVEL").map(String::as_str), Some("debug"));
        assert!(cfg.environment("staging").is_none());
    }

    #[test]
    fn from_value_coerces_scalars() {
        let cfg = RcConfig::from_value(json!({
            "environments": { "dev": { "PORT": 3000, "DEBUG": true, "RATIO": 0.5 } }
        }))
        .expect("config");

        let dev = cfg.environment("dev").expect("dev");
        assert_eq!(dev["PORT"], "3000");
        assert_eq!(dev["DEBUG"], "true");
        assert_eq!(dev["RATIO"], "0.5");
    }

    #[test]
    fn from_value_prints_integral_floats_as_integers() {
        let cfg = RcConfig::from_value(json!({
            "environments": { "dev": { "R": 1.0, "K": 1e3, "NEG": -2.0, "HALF": 2.5 } }
        }))
        .expect("config");

        let dev = cfg.environment("dev").expect("dev");
        assert_eq!(dev["R"], "1");
        assert_eq!(dev["K"], "1000");
        assert_eq!(dev["NEG"], "-2");
        assert_eq!(dev["HALF"], "2.5");
    }

    #[test]
    fn from_value_without_environments_is_empty() {
        let cfg = RcConfig::from_value(json!({ "name": "project" })).expect("config");
        assert!(cfg.environments.is_empty());
    }

    #[test]
    fn from_value_rejects_bad_shapes() {
        assert!(RcConfig::from_value(json!([1, 2])).is_err());
        assert!(RcConfig::from_value(json!({ "environments": "dev" })).is_err());
        assert!(RcConfig::from_value(json!({ "environments": { "dev": 1 } })).is_err());

        let err = RcConfig::from_value(json!({ "environments": { "dev": { "LIST": [1] } } }))
            .expect_err("array value");
        assert!(err.contains("LIST"));
        assert!(err.contains("dev"));
    }

    #[test]
    fn default_options_use_default_rc_file() {
        let options = ResolutionOptions::default();
        assert_eq!(options.rc_file, DEFAULT_RC_FILE);
        assert_eq!(options.rc_trust, RcTrust::Static);
        assert!(options.environment.is_none());
    }
}
