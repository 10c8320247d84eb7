//! Preflight checks for image build prerequisites.
//!
//! Validates host tools, disk space, the base rootfs and the build context
//! BEFORE the staging directory is touched.
//!
//! # Checks Performed
//!
//! - **Host tools**: ssh-keygen, openssl, df are installed
//! - **Disk space**: sufficient space for the staged root and archive
//! - **Base rootfs**: present and carrying the required binaries
//! - **Build context**: application files present, template parses

mod build_context;
mod disk_space;
mod host_tools;
mod rootfs;

pub use build_context::check_build_context;
pub use disk_space::check_disk_space;
pub use host_tools::check_host_tools;
pub use rootfs::check_base_rootfs;

use crate::component::BuildContext;

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check
    pub name: String,
    /// Whether the check passed
    pub passed: bool,
    /// Human-readable message
    pub message: String,
    /// Optional suggestion for fixing the issue
    pub suggestion: Option<String>,
}

impl CheckResult {
    /// Create a passing check result.
    pub fn pass(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Create a failing check result.
    pub fn fail(
        name: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
            suggestion: Some(suggestion.into()),
        }
    }
}

/// Comprehensive preflight report.
#[derive(Debug, Default)]
pub struct PreflightReport {
    /// All check results
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    /// Check if all preflight checks passed.
    pub fn is_ok(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }

    /// Get all failing checks.
    pub fn errors(&self) -> Vec<&CheckResult> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    /// Get count of passing checks.
    pub fn passed_count(&self) -> usize {
        self.checks.iter().filter(|c| c.passed).count()
    }

    /// Get total check count.
    pub fn total_count(&self) -> usize {
        self.checks.len()
    }

    /// Print a summary of the preflight checks.
    pub fn print_summary(&self) {
        println!("=== Preflight Check Results ===\n");

        for check in &self.checks {
            let status = if check.passed { "[OK]" } else { "[FAIL]" };
            println!("{} {}: {}", status, check.name, check.message);
            if let Some(suggestion) = &check.suggestion {
                println!("     Suggestion: {}", suggestion);
            }
        }

        println!();
        if self.is_ok() {
            println!(
                "All preflight checks passed ({}/{})",
                self.passed_count(),
                self.total_count()
            );
        } else {
            println!(
                "Preflight checks failed: {} of {} passed",
                self.passed_count(),
                self.total_count()
            );
        }
    }
}

/// Run all preflight checks and return a comprehensive report.
pub fn run_all(ctx: &BuildContext) -> PreflightReport {
    let mut report = PreflightReport::default();

    report.checks.extend(check_host_tools());
    report.checks.push(check_disk_space(&ctx.base_dir));
    report.checks.extend(check_base_rootfs(ctx));
    report.checks.extend(check_build_context(ctx));

    report
}
