//! Evaluate module-style RC files with an external `node` runtime
//!
//! Only reached with [`RcTrust::Execute`](crate::domain::RcTrust::Execute).
//! The file runs as a CommonJS module with `require` rooted at its own
//! directory; the exported value is printed back as JSON.

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;
use which::which;

const EVALUATOR: &str = r#"
const fs = require('fs');
const path = require('path');
const { createRequire } = require('module');
const file = path.resolve(process.argv[1]);
const source = fs.readFileSync(file, 'utf8');
const mod = { exports: {} };
new Function('module', 'exports', 'require', '__filename', '__dirname', source)(
  mod, mod.exports, createRequire(file), file, path.dirname(file));
const value = mod.exports === undefined ? null : mod.exports;
process.stdout.write(JSON.stringify(value));
"#;

pub fn evaluate(path: &Path) -> Result<Value, String> {
    let node = which("node").map_err(|e| format!("node executable not found: {}", e))?;
    debug!("Evaluating {} with {}", path.display(), node.display());

    let output = Command::new(&node)
        .arg("-e")
        .arg(EVALUATOR)
        .arg(path)
        .current_dir(path.parent().unwrap_or_else(|| Path::new(".")))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| format!("failed to start node: {}", e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "node evaluation failed with status {:?}: {}",
            output.status.code(),
            stderr.trim()
        ));
    }

    serde_json::from_slice(&output.stdout)
        .map_err(|e| format!("evaluator output is not valid JSON: {}", e))
}
