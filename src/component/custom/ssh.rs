//! SSH host key generation.
//!
//! The sshd configuration itself is declarative (see the SSH component);
//! host keys need the host ssh-keygen tool.

use anyhow::{Context, Result};
use std::fs;

use crate::component::BuildContext;
use crate::process::Cmd;

/// Key types generated into the staged etc/ssh.
const HOST_KEY_TYPES: &[(&str, &str)] = &[
    ("rsa", "ssh_host_rsa_key"),
    ("ed25519", "ssh_host_ed25519_key"),
];

/// Generate SSH host keys into the staged etc/ssh.
///
/// Keys are baked into image layers; every container started from the same
/// image shares them. Existing keys are kept so repacking an image doesn't
/// rotate its host identity.
pub fn generate_host_keys(ctx: &BuildContext) -> Result<()> {
    let ssh_dir = ctx.staging.join("etc/ssh");
    fs::create_dir_all(&ssh_dir)?;

    for &(kind, file) in HOST_KEY_TYPES {
        let key_path = ssh_dir.join(file);
        if key_path.exists() {
            continue;
        }

        Cmd::new("ssh-keygen")
            .args(["-q", "-t", kind, "-N", "", "-C", "root@zipatoserver", "-f"])
            .arg_path(&key_path)
            .run()
            .with_context(|| format!("generating {} host key", kind))?;
    }

    Ok(())
}
