//! Application payload installation.
//!
//! Copies the externally supplied program files from the build context and
//! validates the config template before it goes in verbatim.

use anyhow::{bail, Context, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::component::BuildContext;
use crate::config::{APP_DIR, APP_FILES, APP_TEMPLATE};
use crate::settings::Settings;

/// Install the application directory.
///
/// FAIL FAST: a program file missing from the build context aborts the
/// build. The program files are opaque payload; nothing inspects them
/// beyond marking them executable.
pub fn install_application(ctx: &BuildContext) -> Result<()> {
    let app_dir = ctx.staging.join(APP_DIR);
    fs::create_dir_all(&app_dir)?;

    for file in APP_FILES {
        let src = ctx.context_file(file);
        if !src.exists() {
            bail!(
                "application file not found in build context: {}",
                src.display()
            );
        }

        let dst = app_dir.join(file);
        fs::copy(&src, &dst).with_context(|| format!("copying {}", file))?;

        let mut perms = fs::metadata(&dst)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&dst, perms)?;
    }

    install_template(ctx, &app_dir)
}

/// Validate the settings template, then copy it byte-for-byte.
///
/// The build never rewrites the template; validation only guards against
/// shipping an image the program can't start from.
fn install_template(ctx: &BuildContext, app_dir: &Path) -> Result<()> {
    let src = ctx.context_file(APP_TEMPLATE);
    if !src.exists() {
        bail!(
            "config template not found in build context: {}",
            src.display()
        );
    }

    let raw = fs::read_to_string(&src)
        .with_context(|| format!("reading {}", src.display()))?;
    let settings = Settings::parse(&raw)
        .with_context(|| format!("invalid config template {}", src.display()))?;
    println!("  template OK ({} parameters)", settings.len());

    fs::write(app_dir.join(APP_TEMPLATE), raw)?;

    Ok(())
}
