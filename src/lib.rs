//! zipimage library.
//!
//! Building blocks for producing the zipatoserver deployment image:
//! a root filesystem staged from a Debian base rootfs plus a build context,
//! packed into a tar archive with a JSON manifest.

pub mod component;
pub mod config;
pub mod image;
pub mod preflight;
pub mod process;
pub mod scripts;
pub mod settings;

use std::time::Instant;

/// Wall-clock timer for build phases.
pub struct Timer {
    label: String,
    start: Instant,
}

impl Timer {
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start: Instant::now(),
        }
    }

    /// Print the elapsed time and consume the timer.
    pub fn finish(self) {
        let secs = self.start.elapsed().as_secs_f64();
        if secs >= 60.0 {
            println!("  [{}] {:.1}m", self.label, secs / 60.0);
        } else {
            println!("  [{}] {:.1}s", self.label, secs);
        }
    }
}
