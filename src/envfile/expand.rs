//! `$NAME` / `${NAME}` expansion
//!
//! References resolve against the file's own entries first (expanded
//! recursively) and then against a base environment. Unresolved references are
//! kept verbatim. A reference back into a key that is still being expanded
//! (`PATH=$PATH:/opt/bin`) skips the file and only consults the base.
//!
//! `\\` yields a backslash and `\$` a literal dollar, resolved in one pass so
//! that `\\$HOME` is a backslash followed by the value of `HOME`.

use crate::domain::EnvironmentMap;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::HashMap;

use super::parser::Entry;

static REFERENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\\\|\\\$|\$\{([A-Za-z_][A-Za-z0-9_]*)(?:(:?-)([^}]*))?\}|\$([A-Za-z_][A-Za-z0-9_]*)",
    )
    .expect("valid reference regex")
});

/// Expand every entry and collapse duplicates (last assignment wins).
pub fn expand_entries(entries: &[Entry], base: &EnvironmentMap) -> EnvironmentMap {
    let mut expander = Expander::new(entries, base);
    let mut env = EnvironmentMap::new();
    for entry in entries {
        if env.contains_key(&entry.key) {
            continue;
        }
        let value = expander.value_of(&entry.key);
        env.insert(entry.key.clone(), value);
    }
    env
}

struct Expander<'a> {
    raw: HashMap<&'a str, &'a Entry>,
    base: &'a EnvironmentMap,
    resolved: HashMap<String, String>,
    stack: Vec<String>,
}

impl<'a> Expander<'a> {
    fn new(entries: &'a [Entry], base: &'a EnvironmentMap) -> Self {
        // Later entries overwrite earlier ones
        let raw = entries.iter().map(|e| (e.key.as_str(), e)).collect();
        Self { raw, base, resolved: HashMap::new(), stack: Vec::new() }
    }

    fn value_of(&mut self, key: &str) -> String {
        if let Some(value) = self.resolved.get(key) {
            return value.clone();
        }
        let Some(entry) = self.raw.get(key).copied() else {
            return String::new();
        };

        let value = if entry.expand {
            self.stack.push(key.to_string());
            let value = self.substitute(&entry.value);
            self.stack.pop();
            value
        } else {
            entry.value.clone()
        };

        self.resolved.insert(key.to_string(), value.clone());
        value
    }

    fn lookup(&mut self, name: &str) -> Option<String> {
        let in_progress = self.stack.iter().any(|k| k == name);
        if self.raw.contains_key(name) && !in_progress {
            return Some(self.value_of(name));
        }
        if in_progress {
            tracing::debug!("Reference cycle on '{}', using base environment", name);
        }
        self.base.get(name).cloned()
    }

    fn substitute(&mut self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut last = 0;
        for caps in REFERENCE_RE.captures_iter(input) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(&input[last..whole.start()]);
            last = whole.end();

            match whole.as_str() {
                "\\\\" => out.push('\\'),
                "\\$" => out.push('$'),
                _ => out.push_str(&self.replacement(&caps)),
            }
        }
        out.push_str(&input[last..]);
        out
    }

    fn replacement(&mut self, caps: &Captures<'_>) -> String {
        let name = caps.get(1).or_else(|| caps.get(4)).map(|m| m.as_str()).unwrap_or_default();
        let operator = caps.get(2).map(|m| m.as_str());
        let value = self.lookup(name);

        match (operator, value) {
            (Some(":-"), Some(value)) if value.is_empty() => self.default_value(caps),
            (Some(_), None) => self.default_value(caps),
            (_, Some(value)) => value,
            (None, None) => {
                tracing::debug!("Unresolved reference '{}' left as is", name);
                caps[0].to_string()
            }
        }
    }

    fn default_value(&mut self, caps: &Captures<'_>) -> String {
        let default = caps.get(3).map(|m| m.as_str()).unwrap_or_default();
        self.substitute(default)
    }
}
