//! Component definitions for the zipatoserver image.
//!
//! Static tables describing every operation needed to stage the image root.
//! Components execute in declaration order:
//! - FILESYSTEM: FHS skeleton, merged-usr symlinks, host mount points
//! - PACKAGES: binaries and support trees out of the base rootfs
//! - SSH / CRON: service configuration
//! - SYSTEM: identity, locale, timezone, root account, prompt
//! - APPLICATION: zipatoserver program files and config template
//! - START_SCRIPTS: generated start scripts

use crate::config::{APP_DIR, ROOT_SHELL};

use super::{
    bins, copy_tree, custom, dir, dir_mode, dirs, group, sbins, symlink, user, write_file,
    Component, CustomOp, Phase,
};

// =============================================================================
// Phase 1: Filesystem
// =============================================================================

/// Standard FHS directories.
///
/// Top-level bin, sbin and lib are merged-usr symlinks, created below.
const FHS_DIRS: &[&str] = &[
    // Core directories
    "etc",
    "home",
    "root",
    "tmp",
    "var",
    "run",
    "mnt",
    "media",
    "srv",
    "opt",
    // /usr hierarchy (merged-usr)
    "usr/bin",
    "usr/sbin",
    "usr/lib",
    "usr/share",
    "usr/local/bin",
    "usr/local/lib",
    // /var hierarchy
    "var/log",
    "var/tmp",
    "var/cache",
    "var/spool",
    "var/lib",
    // Device directories
    "dev",
    "proc",
    "sys",
];

/// Host bind-mount points. Pre-created, never populated by the build.
const HOST_MOUNT_DIRS: &[&str] = &["mnt/host/var/log", "mnt/host/etc"];

/// Filesystem setup component.
pub static FILESYSTEM: Component = Component {
    name: "filesystem",
    phase: Phase::Filesystem,
    ops: &[
        dirs(FHS_DIRS),
        // Merged /usr symlinks, Debian layout
        symlink("bin", "usr/bin"),
        symlink("sbin", "usr/sbin"),
        symlink("lib", "usr/lib"),
        symlink("var/run", "/run"),
        // /tmp and /var/tmp with sticky bit
        dir_mode("tmp", 0o1777),
        dir_mode("var/tmp", 0o1777),
        // /root with restricted permissions
        dir_mode("root", 0o700),
        dirs(HOST_MOUNT_DIRS),
        // Copy ALL shared libraries from the base rootfs. Resolving
        // individual dependencies against a foreign rootfs is unreliable,
        // so the library directories come over as-is, before any binaries.
        custom(CustomOp::CopySharedLibraries),
    ],
};

// =============================================================================
// Phase 2: Packages
// =============================================================================

/// Binaries copied from the base rootfs into usr/bin.
pub const PACKAGE_BINS: &[&str] = &["bash", "python3", "ssh-keygen"];

/// Daemons copied from the base rootfs into usr/sbin.
pub const PACKAGE_SBINS: &[&str] = &["sshd", "cron"];

/// Package payload component.
///
/// A listed binary missing from the base rootfs fails the build. The
/// support trees warn when absent, matching optional base image content.
pub static PACKAGES: Component = Component {
    name: "packages",
    phase: Phase::Packages,
    ops: &[
        bins(PACKAGE_BINS),
        sbins(PACKAGE_SBINS),
        symlink("usr/bin/sh", "bash"),
        // Python stdlib and dist-packages (version dir discovered at runtime)
        custom(CustomOp::CopyPythonRuntime),
        // tzdata and terminal descriptions
        copy_tree("usr/share/zoneinfo"),
        copy_tree("usr/share/terminfo"),
        copy_tree("lib/terminfo"),
    ],
};

// =============================================================================
// Phase 3: Services (SSH, cron)
// =============================================================================

/// sshd configuration baked into the image.
///
/// Root login with the fixed password is the supported access path, so
/// password authentication stays on. The listen port is given on the sshd
/// command line by the services start script.
const SSHD_CONFIG: &str = "\
PermitRootLogin yes
PasswordAuthentication yes
UsePAM no
UseDNS no
Subsystem sftp internal-sftp
";

/// SSH daemon component.
pub static SSH: Component = Component {
    name: "ssh",
    phase: Phase::Services,
    ops: &[
        dir("etc/ssh"),
        // privilege separation directory, sshd refuses to start without it
        dir_mode("run/sshd", 0o755),
        write_file("etc/ssh/sshd_config", SSHD_CONFIG),
        custom(CustomOp::GenerateSshHostKeys),
    ],
};

/// System crontab. Empty of jobs; the image ships cron running but idle.
const CRONTAB: &str = "\
SHELL=/bin/bash
PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin

# m h dom mon dow user  command
";

/// Cron daemon component.
pub static CRON: Component = Component {
    name: "cron",
    phase: Phase::Services,
    ops: &[
        dir("etc/cron.d"),
        dir("etc/cron.daily"),
        dir_mode("var/spool/cron/crontabs", 0o1730),
        write_file("etc/crontab", CRONTAB),
    ],
};

// =============================================================================
// Phase 4: System configuration
// =============================================================================

/// System identity component.
///
/// Root account, fixed password, locale, timezone and the tagged prompt.
pub static SYSTEM: Component = Component {
    name: "system",
    phase: Phase::System,
    ops: &[
        group("root", 0),
        user("root", 0, 0, "/root", ROOT_SHELL),
        custom(CustomOp::CreateEtcFiles),
        custom(CustomOp::SetRootPassword),
        custom(CustomOp::CreateLocale),
        custom(CustomOp::SetTimezone),
        custom(CustomOp::ConfigureShellPrompt),
    ],
};

// =============================================================================
// Phase 5: Application
// =============================================================================

/// Application payload component.
pub static APPLICATION: Component = Component {
    name: "application",
    phase: Phase::Application,
    ops: &[dir(APP_DIR), custom(CustomOp::InstallApplication)],
};

// =============================================================================
// Phase 6: Start scripts
// =============================================================================

/// Generated start scripts component.
pub static START_SCRIPTS: Component = Component {
    name: "start-scripts",
    phase: Phase::Scripts,
    ops: &[custom(CustomOp::WriteStartScripts)],
};

/// All components in execution order.
pub static ALL_COMPONENTS: &[&Component] = &[
    &FILESYSTEM,
    &PACKAGES,
    &SSH,
    &CRON,
    &SYSTEM,
    &APPLICATION,
    &START_SCRIPTS,
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{executor, BuildContext};
    use crate::config::BuildArgs;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    #[test]
    fn test_filesystem_component_stages_skeleton() {
        let dir = tempdir().unwrap();
        let ctx = BuildContext::for_testing(
            &dir.path().join("source"),
            &dir.path().join("context"),
            &dir.path().join("staging"),
            dir.path(),
            BuildArgs::default(),
        );

        executor::execute(&ctx, &FILESYSTEM).unwrap();

        // host bind-mount points exist and are empty
        for mount in HOST_MOUNT_DIRS {
            let path = ctx.staging.join(mount);
            assert!(path.is_dir(), "{} missing", mount);
            assert_eq!(fs::read_dir(&path).unwrap().count(), 0);
        }

        // merged-usr layout
        assert!(ctx.staging.join("bin").is_symlink());
        assert!(ctx.staging.join("sbin").is_symlink());
        assert!(ctx.staging.join("lib").is_symlink());

        // sticky /tmp, restricted /root
        let mode = |p: &str| {
            fs::metadata(ctx.staging.join(p))
                .unwrap()
                .permissions()
                .mode()
        };
        assert_eq!(mode("tmp") & 0o7777, 0o1777);
        assert_eq!(mode("root") & 0o777, 0o700);
    }

    #[test]
    fn test_components_in_phase_order() {
        let phases: Vec<Phase> = ALL_COMPONENTS.iter().map(|c| c.phase).collect();
        let mut sorted = phases.clone();
        sorted.sort();
        assert_eq!(phases, sorted);
    }

    #[test]
    fn test_host_mount_points_declared() {
        assert!(HOST_MOUNT_DIRS.contains(&"mnt/host/var/log"));
        assert!(HOST_MOUNT_DIRS.contains(&"mnt/host/etc"));
    }

    #[test]
    fn test_required_daemons_listed() {
        assert!(PACKAGE_SBINS.contains(&"sshd"));
        assert!(PACKAGE_SBINS.contains(&"cron"));
    }

    #[test]
    fn test_sshd_config_permits_root_login() {
        assert!(SSHD_CONFIG.contains("PermitRootLogin yes"));
        assert!(SSHD_CONFIG.contains("PasswordAuthentication yes"));
    }

    #[test]
    fn test_no_component_is_empty() {
        for component in ALL_COMPONENTS {
            assert!(!component.ops.is_empty(), "component {}", component.name);
        }
    }
}
