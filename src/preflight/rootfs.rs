//! Base rootfs validation.
//!
//! The build copies binaries out of the base rootfs; anything the
//! component tables list has to be there before the build starts.

use super::CheckResult;
use crate::component::definitions::{PACKAGE_BINS, PACKAGE_SBINS};
use crate::component::BuildContext;

/// Check the base rootfs and the binaries the build will copy from it.
pub fn check_base_rootfs(ctx: &BuildContext) -> Vec<CheckResult> {
    let mut results = Vec::new();

    if !ctx.source.join("bin").exists() && !ctx.source.join("usr/bin").exists() {
        results.push(CheckResult::fail(
            "Base rootfs",
            format!("Not found at {}", ctx.source.display()),
            "Extract a Debian base rootfs there (e.g. from a debootstrap tarball)",
        ));
        return results;
    }

    results.push(CheckResult::pass(
        "Base rootfs",
        format!("Found at {}", ctx.source.display()),
    ));

    for name in PACKAGE_BINS.iter().chain(PACKAGE_SBINS) {
        match ctx.find_binary(name) {
            Some(path) => results.push(CheckResult::pass(
                format!("{} binary", name),
                format!("Found at {}", path.display()),
            )),
            None => results.push(CheckResult::fail(
                format!("{} binary", name),
                "Not found in base rootfs",
                format!("Install the providing package into the base rootfs ({})", name),
            )),
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildArgs;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn test_ctx(dir: &Path) -> BuildContext {
        BuildContext::for_testing(
            &dir.join("source"),
            &dir.join("context"),
            &dir.join("staging"),
            dir,
            BuildArgs::default(),
        )
    }

    #[test]
    fn test_missing_rootfs_is_single_failure() {
        let dir = tempdir().unwrap();
        let ctx = test_ctx(dir.path());

        let results = check_base_rootfs(&ctx);
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
    }

    #[test]
    fn test_reports_each_missing_binary() {
        let dir = tempdir().unwrap();
        let ctx = test_ctx(dir.path());

        for dir_name in ["usr/bin", "usr/sbin"] {
            fs::create_dir_all(ctx.source.join(dir_name)).unwrap();
        }
        fs::write(ctx.source.join("usr/bin/bash"), "").unwrap();
        fs::write(ctx.source.join("usr/sbin/sshd"), "").unwrap();

        let results = check_base_rootfs(&ctx);
        let failed: Vec<&str> = results
            .iter()
            .filter(|r| !r.passed)
            .map(|r| r.name.as_str())
            .collect();

        assert!(failed.contains(&"python3 binary"));
        assert!(failed.contains(&"cron binary"));
        assert!(!failed.contains(&"bash binary"));
        assert!(!failed.contains(&"sshd binary"));
    }
}
