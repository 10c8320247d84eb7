//! Builder orchestration - executes all components in order.
//!
//! Entry point for staging the zipatoserver image root. The staging
//! directory is recreated from scratch on every build; output is
//! deterministic for a given base rootfs, build context and arguments.

use anyhow::Result;
use std::fs;
use std::path::Path;

use super::definitions::ALL_COMPONENTS;
use super::executor;
use super::BuildContext;

/// Stage the complete image root.
///
/// Executes all components in order:
/// 1. Filesystem - FHS skeleton, merged-usr symlinks, host mount points
/// 2. Packages - binaries and support trees out of the base rootfs
/// 3. SSH / Cron - service configuration
/// 4. System - root account, locale, timezone, tagged prompt
/// 5. Application - program files and config template
/// 6. Start scripts - generated with the build arguments
///
/// # Errors
///
/// Returns an error if any component fails to execute. ALL operations are
/// required - there is no "optional", and no partial-image fallback.
pub fn build_system(ctx: &BuildContext) -> Result<()> {
    println!("\n=== Staging zipatoserver image root ===\n");

    prepare_staging(ctx)?;

    for component in ALL_COMPONENTS {
        executor::execute(ctx, component)?;
    }

    println!("\n=== Image root complete ===\n");

    print_summary(ctx)?;

    Ok(())
}

/// Prepare a clean staging directory.
fn prepare_staging(ctx: &BuildContext) -> Result<()> {
    println!("Preparing staging directory: {}", ctx.staging.display());

    if ctx.staging.exists() {
        fs::remove_dir_all(&ctx.staging)?;
    }
    fs::create_dir_all(&ctx.staging)?;

    Ok(())
}

/// Print a summary of the staged image root.
fn print_summary(ctx: &BuildContext) -> Result<()> {
    let (files, dirs, symlinks) = count_items(&ctx.staging)?;

    println!("Build Summary:");
    println!("  Staging: {}", ctx.staging.display());
    println!("  Files: {}", files);
    println!("  Directories: {}", dirs);
    println!("  Symlinks: {}", symlinks);

    let size = dir_size(&ctx.staging)?;
    println!("  Total size: {:.1} MB", size as f64 / 1024.0 / 1024.0);

    // Files every usable image must carry
    let essential_files = [
        "etc/hostname",
        "etc/passwd",
        "etc/shadow",
        "etc/ssh/sshd_config",
        "etc/localtime",
        "usr/local/bin/zipatoserver/zipatoserver.py",
        "tmp/start_services.sh",
        "tmp/start_main.sh",
    ];

    let mut missing = Vec::new();
    for file in &essential_files {
        // symlink_metadata so a dangling localtime link still counts as present
        if fs::symlink_metadata(ctx.staging.join(file)).is_err() {
            missing.push(*file);
        }
    }

    if !missing.is_empty() {
        println!("\n  WARNING: Missing essential files:");
        for file in &missing {
            println!("    - {}", file);
        }
    }

    Ok(())
}

/// Count files, directories, and symlinks in a path.
pub fn count_items(path: &Path) -> Result<(usize, usize, usize)> {
    let mut files = 0;
    let mut dirs = 0;
    let mut symlinks = 0;

    if path.is_dir() {
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_symlink() {
                symlinks += 1;
            } else if path.is_dir() {
                dirs += 1;
                let (f, d, s) = count_items(&path)?;
                files += f;
                dirs += d;
                symlinks += s;
            } else {
                files += 1;
            }
        }
    }

    Ok((files, dirs, symlinks))
}

/// Calculate total size of a directory, excluding symlinks.
pub fn dir_size(path: &Path) -> Result<u64> {
    let mut size = 0;

    if path.is_file() {
        return Ok(fs::metadata(path)?.len());
    }

    if path.is_dir() {
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let path = entry.path();

            if path.is_symlink() {
                // Symlinks are tiny, skip
            } else if path.is_dir() {
                size += dir_size(&path)?;
            } else {
                size += fs::metadata(&path)?.len();
            }
        }
    }

    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_count_items() {
        let dir = tempdir().unwrap();
        let path = dir.path();

        fs::write(path.join("file1.txt"), "test").unwrap();
        fs::write(path.join("file2.txt"), "test").unwrap();
        fs::create_dir(path.join("subdir")).unwrap();
        fs::write(path.join("subdir/file3.txt"), "test").unwrap();
        std::os::unix::fs::symlink("file1.txt", path.join("link")).unwrap();

        let (files, dirs, symlinks) = count_items(path).unwrap();
        assert_eq!(files, 3);
        assert_eq!(dirs, 1);
        assert_eq!(symlinks, 1);
    }

    #[test]
    fn test_dir_size() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a"), "12345").unwrap();
        fs::write(dir.path().join("b"), "12345").unwrap();
        assert_eq!(dir_size(dir.path()).unwrap(), 10);
    }

    #[test]
    fn test_prepare_staging_recreates() {
        let dir = tempdir().unwrap();
        let ctx = crate::component::BuildContext::for_testing(
            &dir.path().join("source"),
            &dir.path().join("context"),
            &dir.path().join("staging"),
            dir.path(),
            crate::config::BuildArgs::default(),
        );

        fs::create_dir_all(ctx.staging.join("stale")).unwrap();
        prepare_staging(&ctx).unwrap();

        assert!(ctx.staging.exists());
        assert!(!ctx.staging.join("stale").exists());
    }
}
