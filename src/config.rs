//! Image configuration.
//!
//! Constants baked into every image plus the two build-time arguments
//! that vary per build.

/// Application name; also used as the image hostname.
pub const APP_NAME: &str = "zipatoserver";

/// Application install directory inside the image, relative to the image root.
pub const APP_DIR: &str = "usr/local/bin/zipatoserver";

/// Executable program files copied from the build context.
pub const APP_FILES: &[&str] = &["zipatoserver.py", "ping.py"];

/// Config template copied verbatim from the build context.
pub const APP_TEMPLATE: &str = "zipatoserver_template.conf";

/// Port the SSH daemon listens on inside the container.
pub const SSH_PORT: u16 = 23;

/// Locale generated into the image.
pub const LOCALE: &str = "en_US.UTF-8";

/// Timezone the image is pinned to.
pub const TIMEZONE: &str = "Europe/Stockholm";

/// Fixed root password, hashed at build time and baked into the image.
pub const ROOT_PASSWORD: &str = "zipato";

/// Login shell for root.
pub const ROOT_SHELL: &str = "/bin/bash";

/// Default container entry recorded in the image manifest.
/// The start scripts are invoked explicitly by the caller.
pub const DEFAULT_CMD: &str = "/bin/bash";

/// Image archive filename under the output directory.
pub const IMAGE_FILENAME: &str = "zipatoserver-image.tar";

/// Build-time arguments baked into the image.
#[derive(Debug, Clone)]
pub struct BuildArgs {
    /// Listening port passed to the main program's `-p` flag.
    pub port: u16,
    /// Label embedded in the interactive shell prompt.
    pub tag: String,
}

impl Default for BuildArgs {
    fn default() -> Self {
        Self {
            port: 8080,
            tag: "latest".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_constants() {
        assert_eq!(APP_NAME, "zipatoserver");
        assert_eq!(APP_DIR, "usr/local/bin/zipatoserver");
        assert_eq!(SSH_PORT, 23);
        assert_eq!(LOCALE, "en_US.UTF-8");
        assert_eq!(TIMEZONE, "Europe/Stockholm");
        assert_eq!(ROOT_SHELL, "/bin/bash");
    }

    #[test]
    fn test_app_files_are_scripts() {
        assert_eq!(APP_FILES, &["zipatoserver.py", "ping.py"]);
        assert!(APP_TEMPLATE.ends_with(".conf"));
    }

    #[test]
    fn test_default_build_args() {
        let args = BuildArgs::default();
        assert_eq!(args.port, 8080);
        assert_eq!(args.tag, "latest");
    }
}
