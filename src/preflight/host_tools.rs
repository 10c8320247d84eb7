//! Host tool validation.
//!
//! Checks that the external tools the build shells out to are installed.

use super::CheckResult;
use crate::process::{exists, which};

/// Required host tools with their install suggestions.
const REQUIRED_TOOLS: &[(&str, &str, &str)] = &[
    (
        "ssh-keygen",
        "Generate SSH host keys",
        "sudo apt install openssh-client",
    ),
    (
        "openssl",
        "Hash the root password",
        "sudo apt install openssl",
    ),
    ("df", "Check disk space", "sudo apt install coreutils"),
];

/// Check that all required host tools are installed.
pub fn check_host_tools() -> Vec<CheckResult> {
    REQUIRED_TOOLS
        .iter()
        .map(|(tool, purpose, install)| check_tool(tool, purpose, install))
        .collect()
}

/// Check a single tool.
fn check_tool(tool: &str, purpose: &str, install_cmd: &str) -> CheckResult {
    match which(tool) {
        Some(path) => CheckResult::pass(
            format!("{} tool", tool),
            format!("Found at {} ({})", path.display(), purpose),
        ),
        None => CheckResult::fail(
            format!("{} tool", tool),
            format!("Not found (needed for: {})", purpose),
            install_cmd,
        ),
    }
}

/// Check if a specific tool is available (returns bool for quick checks).
#[allow(dead_code)]
pub fn has_tool(tool: &str) -> bool {
    exists(tool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_tool_existing() {
        // ls should exist on any Unix system
        assert!(has_tool("ls"));
    }

    #[test]
    fn test_has_tool_nonexistent() {
        assert!(!has_tool("definitely_not_a_real_command_12345"));
    }

    #[test]
    fn test_check_host_tools_returns_results() {
        let results = check_host_tools();
        assert_eq!(results.len(), REQUIRED_TOOLS.len());
    }
}
