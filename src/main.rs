//! zipatoserver image builder CLI
//!
//! Produces the zipatoserver deployment image: a Debian-based root
//! filesystem with SSH and cron daemons, a fixed-password root account,
//! Stockholm time and the en_US.UTF-8 locale, the zipatoserver program
//! files, and generated start scripts - packed into a tar archive with a
//! JSON manifest.
//!
//! # Usage
//!
//! ```bash
//! # Validate host tools, base rootfs and build context
//! zipimage check
//!
//! # Build the image
//! zipimage build --port 8080 --tag dev
//!
//! # Show what exists and the next step
//! zipimage status
//! ```
//!
//! Inputs under the base directory (overridable per command):
//!
//! | Path       | Content                                              |
//! |------------|------------------------------------------------------|
//! | `rootfs/`  | extracted Debian base rootfs                         |
//! | `context/` | zipatoserver.py, ping.py, zipatoserver_template.conf |
//! | `output/`  | staged root, image archive, manifest                 |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Instant;

use zipimage::component::{builder, BuildContext};
use zipimage::config::{self, BuildArgs};
use zipimage::{image, preflight, Timer};

#[derive(Parser)]
#[command(name = "zipimage")]
#[command(author, version, about = "zipatoserver deployment image builder", long_about = None)]
struct Cli {
    /// Project base directory (defaults to the current directory)
    #[arg(long, global = true)]
    base_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the image (stage the root filesystem and pack the archive)
    Build {
        /// Listening port for the main application
        #[arg(short, long)]
        port: u16,

        /// Label embedded in the interactive shell prompt
        #[arg(short, long)]
        tag: String,

        /// Base rootfs directory (default: <base>/rootfs)
        #[arg(long)]
        rootfs: Option<PathBuf>,

        /// Build context directory (default: <base>/context)
        #[arg(long)]
        context: Option<PathBuf>,

        /// Skip preflight checks
        #[arg(long)]
        skip_preflight: bool,
    },

    /// Run preflight checks and exit
    Check {
        /// Base rootfs directory (default: <base>/rootfs)
        #[arg(long)]
        rootfs: Option<PathBuf>,

        /// Build context directory (default: <base>/context)
        #[arg(long)]
        context: Option<PathBuf>,
    },

    /// Show build status and next steps
    Status,
}

fn main() {
    let cli = Cli::parse();
    let base_dir = cli.base_dir.clone().unwrap_or_else(|| PathBuf::from("."));

    let result = match cli.command {
        Commands::Build {
            port,
            tag,
            rootfs,
            context,
            skip_preflight,
        } => cmd_build(&base_dir, port, tag, rootfs, context, skip_preflight),
        Commands::Check { rootfs, context } => cmd_check(&base_dir, rootfs, context),
        Commands::Status => cmd_status(&base_dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn resolve_inputs(
    base_dir: &PathBuf,
    rootfs: Option<PathBuf>,
    context: Option<PathBuf>,
) -> (PathBuf, PathBuf) {
    let source = rootfs.unwrap_or_else(|| base_dir.join("rootfs"));
    let context = context.unwrap_or_else(|| base_dir.join("context"));
    (source, context)
}

fn cmd_build(
    base_dir: &PathBuf,
    port: u16,
    tag: String,
    rootfs: Option<PathBuf>,
    context: Option<PathBuf>,
    skip_preflight: bool,
) -> Result<()> {
    let args = BuildArgs { port, tag };
    let (source, context) = resolve_inputs(base_dir, rootfs, context);
    let build_start = Instant::now();

    println!(
        "=== zipatoserver image build (port {}, tag {}) ===",
        args.port, args.tag
    );

    if skip_preflight {
        println!("[SKIP] Preflight checks");
    } else {
        let ctx = BuildContext::unvalidated(base_dir, &source, &context, args.clone());
        let report = preflight::run_all(&ctx);
        if !report.is_ok() {
            report.print_summary();
            anyhow::bail!("preflight checks failed");
        }
        println!(
            "Preflight OK ({}/{} checks)",
            report.passed_count(),
            report.total_count()
        );
    }

    let ctx = BuildContext::new(base_dir, &source, &context, args)?;

    let t = Timer::start("Stage");
    builder::build_system(&ctx)?;
    t.finish();

    println!("Packing image archive...");
    let t = Timer::start("Pack");
    image::pack_image(&ctx)?;
    t.finish();

    let total = build_start.elapsed().as_secs_f64();
    if total >= 60.0 {
        println!("\n=== Build Complete ({:.1}m) ===", total / 60.0);
    } else {
        println!("\n=== Build Complete ({:.1}s) ===", total);
    }
    println!("  Image: output/{}", config::IMAGE_FILENAME);

    Ok(())
}

fn cmd_check(
    base_dir: &PathBuf,
    rootfs: Option<PathBuf>,
    context: Option<PathBuf>,
) -> Result<()> {
    let (source, context) = resolve_inputs(base_dir, rootfs, context);
    let ctx = BuildContext::unvalidated(base_dir, &source, &context, BuildArgs::default());

    let report = preflight::run_all(&ctx);
    report.print_summary();

    if !report.is_ok() {
        anyhow::bail!("preflight checks failed");
    }
    Ok(())
}

fn cmd_status(base_dir: &PathBuf) -> Result<()> {
    let (source, context) = resolve_inputs(base_dir, None, None);
    let ctx = BuildContext::unvalidated(base_dir, &source, &context, BuildArgs::default());

    println!("zipimage Builder Status");
    println!("=======================");
    println!();
    println!("Configuration:");
    println!("  App Name:  {}", config::APP_NAME);
    println!("  App Dir:   /{}", config::APP_DIR);
    println!("  SSH Port:  {}", config::SSH_PORT);
    println!("  Locale:    {}", config::LOCALE);
    println!("  Timezone:  {}", config::TIMEZONE);
    println!("  Shell:     {}", config::ROOT_SHELL);
    println!();

    println!("Inputs:");
    if ctx.source.join("bin").exists() || ctx.source.join("usr/bin").exists() {
        println!("  Base rootfs:     FOUND at {}", ctx.source.display());
    } else {
        println!(
            "  Base rootfs:     NOT FOUND (extract a Debian base rootfs to {})",
            ctx.source.display()
        );
    }

    let mut context_complete = ctx.context.exists();
    for file in config::APP_FILES.iter().chain([&config::APP_TEMPLATE]) {
        let path = ctx.context_file(file);
        if path.exists() {
            println!("  {:16} FOUND", format!("{}:", file));
        } else {
            println!("  {:16} NOT FOUND in {}", format!("{}:", file), ctx.context.display());
            context_complete = false;
        }
    }
    println!();

    // Build artifacts
    let staged = ctx.staging.join("tmp/start_main.sh").exists();
    let archive = ctx.output.join(config::IMAGE_FILENAME);

    println!("Build Artifacts:");
    if staged {
        let (files, _, _) = builder::count_items(&ctx.staging)?;
        println!("  Staged root:     BUILT ({} files)", files);
    } else {
        println!("  Staged root:     NOT BUILT");
    }
    if archive.exists() {
        let size = std::fs::metadata(&archive).map(|m| m.len() / 1024 / 1024).unwrap_or(0);
        println!("  Image archive:   BUILT ({} MB)", size);
    } else {
        println!("  Image archive:   NOT BUILT");
    }
    println!();

    println!("Next steps:");
    if !ctx.source.exists() {
        println!("  1. Extract a Debian base rootfs to {}", ctx.source.display());
    } else if !context_complete {
        println!("  1. Populate the build context at {}", ctx.context.display());
    } else if !archive.exists() {
        println!("  1. Run 'zipimage build --port <PORT> --tag <TAG>'");
    } else {
        println!("  Image ready! Load output/{} into your container runtime.", config::IMAGE_FILENAME);
    }

    Ok(())
}
