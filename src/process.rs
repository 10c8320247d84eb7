//! Host tool invocation.
//!
//! Thin builder over [`std::process::Command`] used for the few build steps
//! that shell out (`ssh-keygen`, `openssl`, `df`). A failing command is an
//! error unless explicitly allowed to fail.

use anyhow::{bail, Context, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Command builder.
pub struct Cmd {
    program: String,
    command: Command,
    allow_fail: bool,
}

/// Captured output of a finished command.
pub struct CmdOutput {
    pub stdout: String,
    pub stderr: String,
    success: bool,
}

impl CmdOutput {
    pub fn success(&self) -> bool {
        self.success
    }
}

impl Cmd {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            command: Command::new(program),
            allow_fail: false,
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.command.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.command.args(args);
        self
    }

    pub fn arg_path(mut self, path: &Path) -> Self {
        self.command.arg(path);
        self
    }

    /// A non-zero exit becomes a normal [`CmdOutput`] instead of an error.
    pub fn allow_fail(mut self) -> Self {
        self.allow_fail = true;
        self
    }

    /// Run to completion and capture output.
    pub fn run(mut self) -> Result<CmdOutput> {
        let output = self
            .command
            .output()
            .with_context(|| format!("failed to spawn {}", self.program))?;

        let result = CmdOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !result.success && !self.allow_fail {
            bail!("{} failed: {}", self.program, result.stderr.trim());
        }

        Ok(result)
    }
}

/// Locate a tool on the host PATH.
pub fn which(tool: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    for dir in std::env::split_paths(&path) {
        let candidate = dir.join(tool);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// Check whether a tool is available on the host PATH.
pub fn exists(tool: &str) -> bool {
    which(tool).is_some()
}
