//! Package payload: shared libraries and the python runtime.
//!
//! The staged binaries keep their dynamic linkage, and resolving individual
//! dependencies against a foreign rootfs is unreliable. The library
//! directories come over wholesale instead.

use anyhow::Result;
use std::fs;

use crate::component::executor::copy_tree;
use crate::component::BuildContext;

/// Shared library directories in a Debian merged-usr layout.
const LIBRARY_TREES: &[&str] = &["usr/lib/x86_64-linux-gnu", "usr/lib64"];

/// Pre-merged-usr fallback locations.
const LEGACY_LIBRARY_TREES: &[&str] = &["lib/x86_64-linux-gnu", "lib64"];

/// Copy the shared library directories from the base rootfs.
pub fn copy_shared_libraries(ctx: &BuildContext) -> Result<()> {
    let trees = if ctx.source_exists(LIBRARY_TREES[0]) {
        LIBRARY_TREES
    } else {
        LEGACY_LIBRARY_TREES
    };

    let mut copied = 0;
    for tree in trees {
        let src = ctx.source.join(tree);
        if src.exists() {
            copy_tree(&src, &ctx.staging.join(tree))?;
            copied += 1;
        }
    }

    if copied == 0 {
        println!("  [WARN] no shared library directories found in base rootfs");
    }

    Ok(())
}

/// Copy the python runtime trees from the base rootfs.
///
/// Debian splits python across a versioned stdlib directory (python3.11)
/// and an unversioned dist-packages directory (python3). Both match the
/// python3 prefix, so the version never needs to be pinned here.
pub fn copy_python_runtime(ctx: &BuildContext) -> Result<()> {
    let lib_dir = ctx.source.join("usr/lib");
    if !lib_dir.exists() {
        println!("  [WARN] no usr/lib in base rootfs, python runtime skipped");
        return Ok(());
    }

    let mut copied = 0;
    for entry in fs::read_dir(&lib_dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };

        if name.starts_with("python3") && entry.path().is_dir() {
            copy_tree(&entry.path(), &ctx.staging.join("usr/lib").join(name))?;
            copied += 1;
        }
    }

    if copied == 0 {
        println!("  [WARN] no python runtime found under usr/lib in base rootfs");
    }

    Ok(())
}
