//! Shared CLI utilities.

use crate::domain::EnvironmentMap;
use std::ffi::OsString;

/// Flags that take a separate value token.
const VALUE_FLAGS: &[&str] = &["-e", "--env", "-f", "--file", "--rc"];

/// Flags that stand alone (or carry their value after `=`).
const SWITCH_FLAGS: &[&str] =
    &["-v", "--version", "-h", "--help", "--verbose", "--allow-exec-rc"];

/// Move the tool's own flags in front of any inline `KEY=VALUE` tokens.
///
/// Flags and assignments may be interleaved on the command line
/// (`A=1 -e staging B=2 npm test`), but clap stops option parsing at the first
/// positional token. Scanning stops at the first token that is neither, which
/// starts the command; everything from there on is left untouched.
pub fn hoist_flags(args: Vec<OsString>) -> Vec<OsString> {
    let mut iter = args.into_iter();
    let mut out: Vec<OsString> = iter.next().into_iter().collect();
    let mut assignments = Vec::new();
    let mut rest = Vec::new();

    while let Some(arg) = iter.next() {
        let Some(text) = arg.to_str() else {
            rest.push(arg);
            break;
        };

        if VALUE_FLAGS.contains(&text) {
            // A trailing flag without a value is left where it is
            let Some(value) = iter.next() else {
                rest.push(arg);
                break;
            };
            out.push(arg);
            out.push(value);
        } else if SWITCH_FLAGS.contains(&text) || is_attached_value_flag(text) {
            out.push(arg);
        } else if is_assignment(text) {
            assignments.push(arg);
        } else {
            rest.push(arg);
            break;
        }
    }

    out.extend(assignments);
    out.extend(rest);
    out.extend(iter);
    out
}

fn is_attached_value_flag(text: &str) -> bool {
    ["--env=", "--file=", "--rc="].iter().any(|prefix| text.starts_with(prefix))
}

fn is_assignment(token: &str) -> bool {
    token.contains('=') && !token.starts_with('-')
}

/// Split trailing tokens into leading inline assignments and the command.
///
/// A token counts as an assignment when it contains `=` and does not start
/// with `-`. The value is everything after the first `=`. Tokens with an empty
/// name are dropped.
pub fn split_inline_vars(tokens: Vec<String>) -> (EnvironmentMap, Vec<String>) {
    let mut vars = EnvironmentMap::new();
    let mut tokens = tokens.into_iter().peekable();

    while let Some(token) = tokens.next_if(|t| is_assignment(t)) {
        if let Some((key, value)) = token.split_once('=') {
            if key.is_empty() {
                tracing::warn!("Ignoring inline assignment without a name: {}", token);
                continue;
            }
            vars.insert(key.to_string(), value.to_string());
        }
    }

    (vars, tokens.collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn hoist_moves_flags_before_assignments() {
        let args =
            os(&["cross-env-cmd", "A=1", "-e", "staging", "B=2", "-f", "x.env", "npm", "test"]);
        assert_eq!(
            hoist_flags(args),
            os(&["cross-env-cmd", "-e", "staging", "-f", "x.env", "A=1", "B=2", "npm", "test"])
        );
    }

    #[test]
    fn hoist_leaves_command_tokens_alone() {
        let args = os(&["cross-env-cmd", "-e", "dev", "npm", "run", "-e", "X=1", "--help"]);
        assert_eq!(hoist_flags(args.clone()), args);
    }

    #[test]
    fn hoist_handles_attached_values_and_switches() {
        let args = os(&["cross-env-cmd", "A=1", "--rc=custom.rc", "--verbose", "echo"]);
        assert_eq!(
            hoist_flags(args),
            os(&["cross-env-cmd", "--rc=custom.rc", "--verbose", "A=1", "echo"])
        );
    }

    #[test]
    fn hoist_tolerates_missing_flag_value() {
        let args = os(&["cross-env-cmd", "-e"]);
        assert_eq!(hoist_flags(args.clone()), args);
    }

    #[test]
    fn hoist_keeps_valueless_flag_after_assignments() {
        let args = os(&["cross-env-cmd", "A=1", "-f"]);
        assert_eq!(hoist_flags(args.clone()), args);

        let args = os(&["cross-env-cmd", "A=1", "B=2", "--env"]);
        assert_eq!(hoist_flags(args.clone()), args);
    }

    #[test]
    fn split_reads_leading_assignments() {
        let tokens = strings(&["TEST=value", "DEBUG=true", "npm", "start"]);
        let (vars, command) = split_inline_vars(tokens);
        assert_eq!(vars.get("TEST").map(String::as_str), Some("value"));
        assert_eq!(vars.get("DEBUG").map(String::as_str), Some("true"));
        assert_eq!(command, strings(&["npm", "start"]));
    }

    #[test]
    fn split_keeps_everything_after_command_start() {
        let (vars, command) = split_inline_vars(strings(&["A=1", "node", "B=2", "-e", "x"]));
        assert_eq!(vars.len(), 1);
        assert_eq!(command, strings(&["node", "B=2", "-e", "x"]));
    }

    #[test]
    fn split_uses_first_equals_only() {
        let (vars, _) = split_inline_vars(strings(&["URL=http://x?a=b", "EMPTY=", "cmd"]));
        assert_eq!(vars["URL"], "http://x?a=b");
        assert_eq!(vars["EMPTY"], "");
    }

    #[test]
    fn split_drops_nameless_assignment() {
        let (vars, command) = split_inline_vars(strings(&["=oops", "cmd"]));
        assert!(vars.is_empty());
        assert_eq!(command, strings(&["cmd"]));
    }

    #[test]
    fn split_without_command() {
        let (vars, command) = split_inline_vars(strings(&["A=1"]));
        assert_eq!(vars.len(), 1);
        assert!(command.is_empty());
    }
}
