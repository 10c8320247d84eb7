//! Build context shared across all build modules.
//!
//! Provides the paths and build arguments needed to stage the image root:
//! binaries come out of the base rootfs, application files out of the build
//! context directory, and everything lands in staging.

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::BuildArgs;

/// Shared context for all build operations.
pub struct BuildContext {
    /// Extracted base OS rootfs (source of binaries and support trees).
    pub source: PathBuf,
    /// Build context directory with the application files.
    pub context: PathBuf,
    /// Staging directory (the image root being built).
    pub staging: PathBuf,
    /// Project base directory.
    pub base_dir: PathBuf,
    /// Output directory for the packed image.
    pub output: PathBuf,
    /// Build-time arguments.
    pub args: BuildArgs,
}

impl BuildContext {
    /// Create a new build context.
    ///
    /// # Errors
    ///
    /// Returns an error if the base rootfs doesn't exist. Extract a Debian
    /// base rootfs to the source directory first.
    pub fn new(base_dir: &Path, source: &Path, context: &Path, args: BuildArgs) -> Result<Self> {
        let ctx = Self::unvalidated(base_dir, source, context, args);

        if !ctx.source.join("bin").exists() && !ctx.source.join("usr/bin").exists() {
            anyhow::bail!(
                "base rootfs not found at {}.\n\
                 Extract a Debian base rootfs there first (e.g. from a debootstrap tarball).",
                ctx.source.display()
            );
        }

        Ok(ctx)
    }

    /// Create a build context without validating the base rootfs.
    ///
    /// Used by preflight and status reporting, where a missing rootfs is
    /// reported rather than fatal.
    pub fn unvalidated(base_dir: &Path, source: &Path, context: &Path, args: BuildArgs) -> Self {
        let output = base_dir.join("output");
        let staging = output.join("rootfs");

        Self {
            source: source.to_path_buf(),
            context: context.to_path_buf(),
            staging,
            base_dir: base_dir.to_path_buf(),
            output,
            args,
        }
    }

    /// Create a build context with the default layout under a base directory:
    /// `rootfs/` for the base image tree and `context/` for the app files.
    pub fn from_base_dir(base_dir: &Path, args: BuildArgs) -> Result<Self> {
        let source = base_dir.join("rootfs");
        let context = base_dir.join("context");
        Self::new(base_dir, &source, &context, args)
    }

    /// Create a build context for testing without validation.
    #[allow(dead_code)]
    pub fn for_testing(
        source: &Path,
        context: &Path,
        staging: &Path,
        base_dir: &Path,
        args: BuildArgs,
    ) -> Self {
        Self {
            source: source.to_path_buf(),
            context: context.to_path_buf(),
            staging: staging.to_path_buf(),
            base_dir: base_dir.to_path_buf(),
            output: base_dir.join("output"),
            args,
        }
    }

    /// Path of a file inside the build context.
    pub fn context_file(&self, name: &str) -> PathBuf {
        self.context.join(name)
    }

    /// Check if a file exists in the base rootfs.
    pub fn source_exists(&self, path: &str) -> bool {
        self.source.join(path).exists()
    }

    /// Find a binary in the base rootfs.
    ///
    /// Returns the relative path to the binary if found.
    pub fn find_binary(&self, name: &str) -> Option<PathBuf> {
        let candidates = [
            PathBuf::from("usr/bin").join(name),
            PathBuf::from("bin").join(name),
            PathBuf::from("usr/sbin").join(name),
            PathBuf::from("sbin").join(name),
        ];

        for candidate in candidates {
            if self.source.join(&candidate).exists() {
                return Some(candidate);
            }
        }
        None
    }
}
