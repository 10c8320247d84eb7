//! Component executor - interprets Op variants and performs the actual
//! filesystem operations.
//!
//! This is the single place where all build operations are implemented.
//! ALL operations are required: a listed binary or file must exist in the
//! base rootfs, and any failure aborts the build.

use anyhow::{bail, Context, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use super::context::BuildContext;
use super::{custom, Component, Op};

/// Execute all operations in a component.
pub fn execute(ctx: &BuildContext, component: &Component) -> Result<()> {
    println!("Installing {}...", component.name);

    for op in component.ops {
        execute_op(ctx, op)
            .with_context(|| format!("in component '{}': {:?}", component.name, op))?;
    }

    Ok(())
}

/// Execute a single operation.
fn execute_op(ctx: &BuildContext, op: &Op) -> Result<()> {
    match op {
        // ─────────────────────────────────────────────────────────────────────
        // Directory operations
        // ─────────────────────────────────────────────────────────────────────
        Op::Dir(path) => {
            fs::create_dir_all(ctx.staging.join(path))?;
        }

        Op::DirMode(path, mode) => {
            let full_path = ctx.staging.join(path);
            fs::create_dir_all(&full_path)?;
            fs::set_permissions(&full_path, fs::Permissions::from_mode(*mode))?;
        }

        Op::Dirs(paths) => {
            for path in *paths {
                fs::create_dir_all(ctx.staging.join(path))?;
            }
        }

        // ─────────────────────────────────────────────────────────────────────
        // File operations
        // ─────────────────────────────────────────────────────────────────────
        Op::WriteFile(path, content) => {
            let full_path = ctx.staging.join(path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&full_path, content)?;
        }

        Op::WriteFileMode(path, content, mode) => {
            let full_path = ctx.staging.join(path);
            if let Some(parent) = full_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&full_path, content)?;
            fs::set_permissions(&full_path, fs::Permissions::from_mode(*mode))?;
        }

        Op::Symlink(link, target) => {
            let link_path = ctx.staging.join(link);
            if let Some(parent) = link_path.parent() {
                fs::create_dir_all(parent)?;
            }
            // Always overwrite existing symlinks - later components take precedence
            if link_path.is_symlink() || link_path.exists() {
                fs::remove_file(&link_path)?;
            }
            std::os::unix::fs::symlink(target, &link_path)?;
        }

        Op::CopyFile(path) => {
            let src = ctx.source.join(path);
            let dst = ctx.staging.join(path);

            if !src.exists() {
                bail!("file not found in base rootfs: {}", src.display());
            }

            if let Some(parent) = dst.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&src, &dst)?;
        }

        Op::CopyTree(path) => {
            copy_tree(&ctx.source.join(path), &ctx.staging.join(path))?;
        }

        // ─────────────────────────────────────────────────────────────────────
        // Binary operations
        // ─────────────────────────────────────────────────────────────────────
        Op::Bin(name) => {
            copy_binary(ctx, name, "usr/bin")?;
        }

        Op::Sbin(name) => {
            copy_binary(ctx, name, "usr/sbin")?;
        }

        Op::Bins(names) => {
            let mut errors = Vec::new();
            for name in *names {
                if let Err(e) = copy_binary(ctx, name, "usr/bin") {
                    errors.push(format!("{}: {}", name, e));
                }
            }
            if !errors.is_empty() {
                bail!("Missing binaries:\n  {}", errors.join("\n  "));
            }
        }

        Op::Sbins(names) => {
            let mut missing = Vec::new();
            for name in *names {
                if copy_binary(ctx, name, "usr/sbin").is_err() {
                    missing.push(*name);
                }
            }
            if !missing.is_empty() {
                bail!("Missing sbin binaries: {}", missing.join(", "));
            }
        }

        // ─────────────────────────────────────────────────────────────────────
        // User/group operations
        // ─────────────────────────────────────────────────────────────────────
        Op::User {
            name,
            uid,
            gid,
            home,
            shell,
        } => {
            ensure_user(ctx, name, *uid, *gid, home, shell)?;
        }

        Op::Group { name, gid } => {
            ensure_group(ctx, name, *gid)?;
        }

        // ─────────────────────────────────────────────────────────────────────
        // Custom operations
        // ─────────────────────────────────────────────────────────────────────
        Op::Custom(custom_op) => {
            custom::execute(ctx, *custom_op)?;
        }
    }

    Ok(())
}

/// Copy a binary from the base rootfs.
///
/// Symlinked binaries (python3 -> python3.11) are resolved and copied as
/// regular files, so the staged binary never dangles.
fn copy_binary(ctx: &BuildContext, name: &str, dest_dir: &str) -> Result<()> {
    let src_path = ctx.find_binary(name).ok_or_else(|| {
        anyhow::anyhow!(
            "binary not found in base rootfs: {} (checked usr/bin, bin, usr/sbin, sbin)",
            name
        )
    })?;

    let src = ctx.source.join(&src_path);
    let dst = ctx.staging.join(dest_dir).join(name);

    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }

    if dst.exists() || dst.is_symlink() {
        fs::remove_file(&dst)?;
    }

    // fs::copy follows symlinks, copying the resolved file content
    fs::copy(&src, &dst)
        .with_context(|| format!("copying {} to {}", src.display(), dst.display()))?;
    make_executable(&dst)?;

    Ok(())
}

/// Make a file executable.
pub(crate) fn make_executable(path: &Path) -> Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o111);
    fs::set_permissions(path, perms)?;
    Ok(())
}

/// Copy a directory tree recursively, preserving symlinks.
///
/// NOTE: Logs a warning but continues if the source doesn't exist. This is
/// intentional for support trees the base image may not ship (terminfo,
/// compiled locales). Required files go through Op::CopyFile/Op::Bins,
/// which fail hard.
pub(crate) fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    if !src.exists() {
        println!("  [WARN] copy_tree: source not found: {}", src.display());
        return Ok(());
    }

    if src.is_file() {
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(src, dst)?;
        return Ok(());
    }

    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_symlink() {
            let target = fs::read_link(&src_path)?;
            if dst_path.exists() || dst_path.is_symlink() {
                fs::remove_file(&dst_path)?;
            }
            std::os::unix::fs::symlink(&target, &dst_path)?;
        } else if src_path.is_dir() {
            copy_tree(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}

/// Ensure a user exists in etc/passwd.
fn ensure_user(
    ctx: &BuildContext,
    name: &str,
    uid: u32,
    gid: u32,
    home: &str,
    shell: &str,
) -> Result<()> {
    let passwd_path = ctx.staging.join("etc/passwd");

    let content = if passwd_path.exists() {
        fs::read_to_string(&passwd_path)?
    } else {
        String::new()
    };

    if content
        .lines()
        .any(|line| line.starts_with(&format!("{}:", name)))
    {
        return Ok(());
    }

    if let Some(parent) = passwd_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&passwd_path)?;
    use std::io::Write;
    writeln!(file, "{}:x:{}:{}::{}:{}", name, uid, gid, home, shell)?;

    Ok(())
}

/// Ensure a group exists in etc/group.
fn ensure_group(ctx: &BuildContext, name: &str, gid: u32) -> Result<()> {
    let group_path = ctx.staging.join("etc/group");

    let content = if group_path.exists() {
        fs::read_to_string(&group_path)?
    } else {
        String::new()
    };

    if content
        .lines()
        .any(|line| line.starts_with(&format!("{}:", name)))
    {
        return Ok(());
    }

    if let Some(parent) = group_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&group_path)?;
    use std::io::Write;
    writeln!(file, "{}:x:{}:", name, gid)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Phase;
    use crate::config::BuildArgs;
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

    static BASIC: Component = Component {
        name: "basic",
        phase: Phase::Filesystem,
        ops: &[
            Op::Dir("etc"),
            Op::DirMode("root", 0o700),
            Op::WriteFile("etc/hostname", "test\n"),
            Op::WriteFileMode("tmp/run.sh", "#!/bin/bash\n", 0o755),
            Op::Symlink("bin", "usr/bin"),
            Op::User {
                name: "root",
                uid: 0,
                gid: 0,
                home: "/root",
                shell: "/bin/bash",
            },
            Op::Group { name: "root", gid: 0 },
        ],
    };

    #[test]
    fn test_basic_component() {
        let dir = tempdir().unwrap();
        let ctx = test_ctx(dir.path());

        execute(&ctx, &BASIC).unwrap();

        let staging = &ctx.staging;
        assert_eq!(
            fs::read_to_string(staging.join("etc/hostname")).unwrap(),
            "test\n"
        );
        let mode = fs::metadata(staging.join("root")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
        let mode = fs::metadata(staging.join("tmp/run.sh"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o755);
        assert!(staging.join("bin").is_symlink());

        let passwd = fs::read_to_string(staging.join("etc/passwd")).unwrap();
        assert_eq!(passwd, "root:x:0:0::/root:/bin/bash\n");
        let group = fs::read_to_string(staging.join("etc/group")).unwrap();
        assert_eq!(group, "root:x:0:\n");
    }

    #[test]
    fn test_user_not_duplicated() {
        let dir = tempdir().unwrap();
        let ctx = test_ctx(dir.path());

        execute(&ctx, &BASIC).unwrap();
        execute(&ctx, &BASIC).unwrap();

        let passwd = fs::read_to_string(ctx.staging.join("etc/passwd")).unwrap();
        assert_eq!(passwd.lines().count(), 1);
    }

    #[test]
    fn test_missing_binary_fails() {
        let dir = tempdir().unwrap();
        let ctx = test_ctx(dir.path());
        fs::create_dir_all(ctx.source.join("usr/bin")).unwrap();

        static NEEDS_BIN: Component = Component {
            name: "needs-bin",
            phase: Phase::Packages,
            ops: &[Op::Bins(&["no_such_binary"])],
        };

        let err = execute(&ctx, &NEEDS_BIN).unwrap_err();
        assert!(format!("{:#}", err).contains("no_such_binary"));
    }

    #[test]
    fn test_copy_binary_resolves_symlink() {
        let dir = tempdir().unwrap();
        let ctx = test_ctx(dir.path());

        let bin_dir = ctx.source.join("usr/bin");
        fs::create_dir_all(&bin_dir).unwrap();
        fs::write(bin_dir.join("python3.11"), "interpreter").unwrap();
        std::os::unix::fs::symlink("python3.11", bin_dir.join("python3")).unwrap();

        copy_binary(&ctx, "python3", "usr/bin").unwrap();

        let dst = ctx.staging.join("usr/bin/python3");
        assert!(!dst.is_symlink());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "interpreter");
        let mode = fs::metadata(&dst).unwrap().permissions().mode();
        assert_ne!(mode & 0o111, 0);
    }

    #[test]
    fn test_copy_tree_preserves_symlinks() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("sub/file"), "data").unwrap();
        std::os::unix::fs::symlink("sub/file", src.join("link")).unwrap();

        copy_tree(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("sub/file")).unwrap(), "data");
        assert!(dst.join("link").is_symlink());
    }

    #[test]
    fn test_copy_tree_missing_source_is_ok() {
        let dir = tempdir().unwrap();
        copy_tree(&dir.path().join("missing"), &dir.path().join("dst")).unwrap();
        assert!(!dir.path().join("dst").exists());
    }
}
