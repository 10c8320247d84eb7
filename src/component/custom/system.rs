//! System configuration: identity files, locale, timezone, root account,
//! tagged shell prompt.

use anyhow::{bail, Context, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::component::executor::copy_tree;
use crate::component::BuildContext;
use crate::config::{APP_NAME, LOCALE, ROOT_PASSWORD, TIMEZONE};
use crate::process::Cmd;

/// Create hostname and hosts files.
pub fn create_etc_files(ctx: &BuildContext) -> Result<()> {
    let staging = &ctx.staging;
    fs::create_dir_all(staging.join("etc"))?;

    fs::write(staging.join("etc/hostname"), format!("{}\n", APP_NAME))?;

    let hosts = format!(
        "127.0.0.1\tlocalhost\n\
         127.0.1.1\t{}\n\
         ::1\tlocalhost ip6-localhost ip6-loopback\n",
        APP_NAME
    );
    fs::write(staging.join("etc/hosts"), hosts)?;

    Ok(())
}

/// Select the image locale.
///
/// Writes locale.gen and the default locale; the compiled locale archive
/// comes over from the base rootfs when it ships one.
pub fn create_locale(ctx: &BuildContext) -> Result<()> {
    let staging = &ctx.staging;
    fs::create_dir_all(staging.join("etc/default"))?;

    fs::write(staging.join("etc/locale.gen"), format!("{} UTF-8\n", LOCALE))?;
    fs::write(
        staging.join("etc/default/locale"),
        format!("LANG={}\n", LOCALE),
    )?;

    let locale_archive = ctx.source.join("usr/lib/locale");
    if locale_archive.exists() {
        copy_tree(&locale_archive, &staging.join("usr/lib/locale"))?;
    }

    Ok(())
}

/// Pin the image timezone.
pub fn set_timezone(ctx: &BuildContext) -> Result<()> {
    let staging = &ctx.staging;
    fs::create_dir_all(staging.join("etc"))?;

    fs::write(staging.join("etc/timezone"), format!("{}\n", TIMEZONE))?;

    let link = staging.join("etc/localtime");
    if link.is_symlink() || link.exists() {
        fs::remove_file(&link)?;
    }
    std::os::unix::fs::symlink(format!("/usr/share/zoneinfo/{}", TIMEZONE), &link)?;

    Ok(())
}

/// Hash the fixed root password and write it into etc/shadow.
///
/// The hash is computed at build time with the host openssl, so only the
/// hash lands in the image. Baked into image layers, not reversible at
/// runtime.
pub fn set_root_password(ctx: &BuildContext) -> Result<()> {
    let result = Cmd::new("openssl")
        .args(["passwd", "-6", ROOT_PASSWORD])
        .run()
        .context("failed to hash root password with openssl")?;

    let hash = result.stdout.trim().to_string();
    if !hash.starts_with("$6$") {
        bail!("unexpected openssl passwd output: {}", hash);
    }

    write_shadow_entry(&ctx.staging, "root", &hash)
}

/// Insert or replace a user's line in etc/shadow.
fn write_shadow_entry(staging: &Path, name: &str, hash: &str) -> Result<()> {
    let shadow_path = staging.join("etc/shadow");

    let mut lines: Vec<String> = if shadow_path.exists() {
        fs::read_to_string(&shadow_path)?
            .lines()
            .map(str::to_string)
            .collect()
    } else {
        Vec::new()
    };

    let entry = format!("{}:{}::0:99999:7:::", name, hash);
    let prefix = format!("{}:", name);
    if let Some(line) = lines.iter_mut().find(|l| l.starts_with(&prefix)) {
        *line = entry;
    } else {
        lines.push(entry);
    }

    if let Some(parent) = shadow_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&shadow_path, format!("{}\n", lines.join("\n")))?;
    fs::set_permissions(&shadow_path, fs::Permissions::from_mode(0o640))?;

    Ok(())
}

/// Bake the build tag into root's interactive shell prompt.
pub fn configure_shell_prompt(ctx: &BuildContext) -> Result<()> {
    let root_home = ctx.staging.join("root");
    fs::create_dir_all(&root_home)?;

    let bashrc = format!(
        "export PS1=\"\\u@{}# \"\n\
         export TERM=xterm\n",
        ctx.args.tag
    );
    fs::write(root_home.join(".bashrc"), bashrc)?;

    Ok(())
}
