//! Image archive packing and manifest.
//!
//! The staged root becomes a tar archive plus a JSON manifest; together
//! they are the distributable image (filesystem + metadata). Symlinks are
//! archived as symlinks, never followed.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::path::PathBuf;
use tar::Builder as TarBuilder;

use crate::component::builder::{count_items, dir_size};
use crate::component::BuildContext;
use crate::config;

/// Image metadata written next to the archive.
#[derive(Debug, Serialize)]
pub struct Manifest {
    pub name: String,
    pub tag: String,
    /// Listening port baked into the main start script.
    pub port: u16,
    /// Default container entry: an interactive shell. The start scripts
    /// are invoked explicitly by the caller.
    pub cmd: String,
    pub scripts: Vec<String>,
    pub files: usize,
    pub size_bytes: u64,
}

/// Pack the staged root into the output archive and write the manifest.
pub fn pack_image(ctx: &BuildContext) -> Result<PathBuf> {
    fs::create_dir_all(&ctx.output)?;

    let archive_path = ctx.output.join(config::IMAGE_FILENAME);
    let file = File::create(&archive_path)
        .with_context(|| format!("creating {}", archive_path.display()))?;

    let mut tar = TarBuilder::new(file);
    tar.follow_symlinks(false);
    tar.append_dir_all(".", &ctx.staging)
        .context("archiving staged rootfs")?;
    tar.finish().context("finalizing image archive")?;

    let (files, _, _) = count_items(&ctx.staging)?;
    let manifest = Manifest {
        name: config::APP_NAME.to_string(),
        tag: ctx.args.tag.clone(),
        port: ctx.args.port,
        cmd: config::DEFAULT_CMD.to_string(),
        scripts: vec![
            "/tmp/start_services.sh".to_string(),
            "/tmp/start_main.sh".to_string(),
        ],
        files,
        size_bytes: dir_size(&ctx.staging)?,
    };

    let manifest_path = ctx.output.join("manifest.json");
    let json = serde_json::to_string_pretty(&manifest)?;
    fs::write(&manifest_path, format!("{}\n", json))?;

    println!("  Image:    {}", archive_path.display());
    println!("  Manifest: {}", manifest_path.display());

    Ok(archive_path)
}
