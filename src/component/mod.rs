//! Declarative component model for the zipatoserver image.
//!
//! A component is a named, ordered table of operations. The executor
//! interprets operations against the build context; custom operations cover
//! the imperative steps that need build arguments or host tools.

pub mod builder;
mod context;
pub mod custom;
pub mod definitions;
pub mod executor;

pub use context::BuildContext;

/// Build phase. Components execute in phase order, then declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// FHS skeleton, host mount points, shared libraries
    Filesystem,
    /// Binaries and support trees out of the base rootfs
    Packages,
    /// SSH daemon and cron layout
    Services,
    /// Identity, locale, timezone, root account, prompt
    System,
    /// zipatoserver program files and config template
    Application,
    /// Generated start scripts
    Scripts,
}

/// A named set of build operations.
pub struct Component {
    pub name: &'static str,
    pub phase: Phase,
    pub ops: &'static [Op],
}

/// A single build operation, interpreted by the executor.
#[derive(Debug, Clone)]
pub enum Op {
    /// Create a directory (and parents) in staging.
    Dir(&'static str),
    /// Create a directory with an explicit mode.
    DirMode(&'static str, u32),
    /// Create several directories.
    Dirs(&'static [&'static str]),
    /// Write a file with default permissions.
    WriteFile(&'static str, &'static str),
    /// Write a file with an explicit mode.
    WriteFileMode(&'static str, &'static str, u32),
    /// Create a symlink (link, target). Later components overwrite earlier links.
    Symlink(&'static str, &'static str),
    /// Copy a single file from the base rootfs, same relative path.
    CopyFile(&'static str),
    /// Recursively copy a tree from the base rootfs. A missing tree warns.
    CopyTree(&'static str),
    /// Copy a binary from the base rootfs into usr/bin.
    Bin(&'static str),
    /// Copy a binary from the base rootfs into usr/sbin.
    Sbin(&'static str),
    /// Copy several binaries into usr/bin. All must exist.
    Bins(&'static [&'static str]),
    /// Copy several binaries into usr/sbin. All must exist.
    Sbins(&'static [&'static str]),
    /// Ensure a user line exists in etc/passwd.
    User {
        name: &'static str,
        uid: u32,
        gid: u32,
        home: &'static str,
        shell: &'static str,
    },
    /// Ensure a group line exists in etc/group.
    Group { name: &'static str, gid: u32 },
    /// Imperative operation.
    Custom(CustomOp),
}

/// Operations with logic that doesn't fit the declarative pattern.
#[derive(Debug, Clone, Copy)]
pub enum CustomOp {
    /// Copy the shared library directories wholesale from the base rootfs.
    CopySharedLibraries,
    /// Copy the python interpreter's runtime trees (version dir discovered).
    CopyPythonRuntime,
    /// hostname and hosts files.
    CreateEtcFiles,
    /// locale.gen, default locale, compiled locale data.
    CreateLocale,
    /// localtime symlink and timezone file.
    SetTimezone,
    /// Hash the fixed root password and write etc/shadow.
    SetRootPassword,
    /// Bake the build tag into the interactive shell prompt.
    ConfigureShellPrompt,
    /// Generate SSH host keys into the staged etc/ssh.
    GenerateSshHostKeys,
    /// Copy the application files and validated config template.
    InstallApplication,
    /// Render and write the start scripts with the build arguments.
    WriteStartScripts,
}

// Constructors used by the static definition tables.

pub const fn dir(path: &'static str) -> Op {
    Op::Dir(path)
}

pub const fn dir_mode(path: &'static str, mode: u32) -> Op {
    Op::DirMode(path, mode)
}

pub const fn dirs(paths: &'static [&'static str]) -> Op {
    Op::Dirs(paths)
}

pub const fn write_file(path: &'static str, content: &'static str) -> Op {
    Op::WriteFile(path, content)
}

pub const fn write_file_mode(path: &'static str, content: &'static str, mode: u32) -> Op {
    Op::WriteFileMode(path, content, mode)
}

pub const fn symlink(link: &'static str, target: &'static str) -> Op {
    Op::Symlink(link, target)
}

pub const fn copy_file(path: &'static str) -> Op {
    Op::CopyFile(path)
}

pub const fn copy_tree(path: &'static str) -> Op {
    Op::CopyTree(path)
}

pub const fn bin(name: &'static str) -> Op {
    Op::Bin(name)
}

pub const fn sbin(name: &'static str) -> Op {
    Op::Sbin(name)
}

pub const fn bins(names: &'static [&'static str]) -> Op {
    Op::Bins(names)
}

pub const fn sbins(names: &'static [&'static str]) -> Op {
    Op::Sbins(names)
}

pub const fn user(
    name: &'static str,
    uid: u32,
    gid: u32,
    home: &'static str,
    shell: &'static str,
) -> Op {
    Op::User {
        name,
        uid,
        gid,
        home,
        shell,
    }
}

pub const fn group(name: &'static str, gid: u32) -> Op {
    Op::Group { name, gid }
}

pub const fn custom(op: CustomOp) -> Op {
    Op::Custom(op)
}
