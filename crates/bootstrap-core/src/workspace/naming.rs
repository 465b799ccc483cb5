//! Package naming rules for new projects

use crate::error::{BootstrapError, Result};

/// Longest name the registry accepts
const MAX_NAME_LENGTH: usize = 214;

const BLACKLIST: &[&str] = &["node_modules", "favicon.ico"];

/// Node.js core module names; a package with one of these names can never be required
const BUILTIN_MODULES: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Collect every naming rule `name` breaks for a newly published package
pub fn naming_problems(name: &str) -> Vec<String> {
    let mut problems = Vec::new();

    if name.is_empty() {
        problems.push("name length must be greater than zero".to_string());
        return problems;
    }
    if name.starts_with('.') {
        problems.push("name cannot start with a period".to_string());
    }
    if name.starts_with('_') {
        problems.push("name cannot start with an underscore".to_string());
    }
    if name.trim() != name {
        problems.push("name cannot contain leading or trailing spaces".to_string());
    }
    if BLACKLIST.iter().any(|b| b.eq_ignore_ascii_case(name)) {
        problems.push(format!("{} is a blacklisted name", name));
    }
    if BUILTIN_MODULES.contains(&name.to_lowercase().as_str()) {
        problems.push(format!("{} is a core module name", name));
    }
    if name.len() > MAX_NAME_LENGTH {
        problems.push(format!(
            "name can no longer contain more than {} characters",
            MAX_NAME_LENGTH
        ));
    }
    if name.to_lowercase() != name {
        problems.push("name can no longer contain capital letters".to_string());
    }

    let last_segment = name.rsplit('/').next().unwrap_or(name);
    if last_segment.contains(['~', '\'', '!', '(', ')', '*']) {
        problems.push(r#"name can no longer contain special characters ("~'!()*")"#.to_string());
    }

    if !is_url_friendly(name) {
        let scoped_ok = name
            .strip_prefix('@')
            .and_then(|rest| rest.split_once('/'))
            .map(|(user, pkg)| is_url_friendly(user) && is_url_friendly(pkg))
            .unwrap_or(false);
        if !scoped_ok {
            problems.push("name can only contain URL-friendly characters".to_string());
        }
    }

    problems
}

/// Characters left untouched by JavaScript's `encodeURIComponent`
fn is_url_friendly(s: &str) -> bool {
    s.chars().all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')')
    })
}

/// Validate a project name against naming rules and the reserved package names.
/// Performs no I/O.
pub fn check_app_name(name: &str, reserved: &[&str]) -> Result<()> {
    let problems = naming_problems(name);
    if !problems.is_empty() {
        return Err(BootstrapError::InvalidName {
            name: name.to_string(),
            problems,
        });
    }

    if reserved.contains(&name) {
        let mut reserved: Vec<String> = reserved.iter().map(|s| s.to_string()).collect();
        reserved.sort();
        return Err(BootstrapError::ReservedName {
            name: name.to_string(),
            reserved,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESERVED: &[&str] = &["test-scripts", "test-cli"];

    #[test]
    fn test_valid_names() {
        for name in ["my-app", "app2", "some.app", "@scope/app", "a_b"] {
            assert!(check_app_name(name, RESERVED).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in [
            "", ".hidden", "_private", " spaced", "MyApp", "node_modules", "http", "hello world",
            "crazy!", "a/b/c",
        ] {
            assert!(
                matches!(
                    check_app_name(name, RESERVED),
                    Err(BootstrapError::InvalidName { .. })
                ),
                "{:?} should be invalid",
                name
            );
        }
    }

    #[test]
    fn test_too_long() {
        let name = "a".repeat(MAX_NAME_LENGTH + 1);
        assert!(naming_problems(&name)
            .iter()
            .any(|p| p.contains("more than 214")));
    }

    #[test]
    fn test_reserved_names_sorted() {
        match check_app_name("test-scripts", RESERVED) {
            Err(BootstrapError::ReservedName { name, reserved }) => {
                assert_eq!(name, "test-scripts");
                assert_eq!(reserved, vec!["test-cli", "test-scripts"]);
            }
            other => panic!("expected reserved name error, got {:?}", other),
        }
    }

    #[test]
    fn test_collects_multiple_problems() {
        let problems = naming_problems("_Bad(");
        assert!(problems.len() >= 3, "{:?}", problems);
    }
}
