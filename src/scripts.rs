//! Generated start scripts.
//!
//! Both scripts are written at build time with the build arguments already
//! substituted; nothing re-renders them at container start. The services
//! script runs before the main script, and neither runs automatically -
//! the caller invokes them after starting the container.

use anyhow::Result;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use crate::component::BuildContext;
use crate::config::{APP_DIR, SSH_PORT};

/// Script that starts the background services: cron, then sshd.
pub fn render_services_script() -> String {
    format!("#!/bin/bash\ncron\n/usr/sbin/sshd -p {}\n", SSH_PORT)
}

/// Script that launches the main program on the built-in port.
pub fn render_main_script(port: u16) -> String {
    format!("#!/bin/bash\n/{}/zipatoserver.py -p {} -n\n", APP_DIR, port)
}

/// Write both start scripts into the staged /tmp, marked executable.
pub fn write_start_scripts(ctx: &BuildContext) -> Result<()> {
    let tmp = ctx.staging.join("tmp");
    fs::create_dir_all(&tmp)?;

    write_executable(&tmp.join("start_services.sh"), &render_services_script())?;
    write_executable(
        &tmp.join("start_main.sh"),
        &render_main_script(ctx.args.port),
    )?;

    Ok(())
}

fn write_executable(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content)?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildArgs;
    use tempfile::tempdir;

    #[test]
    fn test_main_script_exact_content() {
        assert_eq!(
            render_main_script(8080),
            "#!/bin/bash\n/usr/local/bin/zipatoserver/zipatoserver.py -p 8080 -n\n"
        );
    }

    #[test]
    fn test_main_script_substitutes_port() {
        for port in [1u16, 80, 8080, 65535] {
            let script = render_main_script(port);
            assert!(script.contains(&format!(
                "/usr/local/bin/zipatoserver/zipatoserver.py -p {} -n",
                port
            )));
        }
    }

    #[test]
    fn test_services_script_starts_cron_then_sshd() {
        let script = render_services_script();
        assert_eq!(script, "#!/bin/bash\ncron\n/usr/sbin/sshd -p 23\n");
        let cron = script.find("cron").unwrap();
        let sshd = script.find("sshd").unwrap();
        assert!(cron < sshd);
    }

    #[test]
    fn test_write_start_scripts() {
        let dir = tempdir().unwrap();
        let ctx = BuildContext::for_testing(
            &dir.path().join("source"),
            &dir.path().join("context"),
            &dir.path().join("staging"),
            dir.path(),
            BuildArgs {
                port: 9000,
                tag: "dev".to_string(),
            },
        );

        write_start_scripts(&ctx).unwrap();

        for name in ["start_services.sh", "start_main.sh"] {
            let path = ctx.staging.join("tmp").join(name);
            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755, "{} mode", name);
        }

        let main = fs::read_to_string(ctx.staging.join("tmp/start_main.sh")).unwrap();
        assert!(main.contains("-p 9000 -n"));
    }
}
