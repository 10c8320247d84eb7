//! Custom operations that require imperative code.
//!
//! These operations need build arguments, host tools, or discovery against
//! the base rootfs, so they don't fit the declarative tables.

mod application;
mod packages;
mod ssh;
mod system;

use anyhow::Result;

use super::BuildContext;
use super::CustomOp;

/// Execute a custom operation.
pub fn execute(ctx: &BuildContext, op: CustomOp) -> Result<()> {
    match op {
        // Package payload
        CustomOp::CopySharedLibraries => packages::copy_shared_libraries(ctx),
        CustomOp::CopyPythonRuntime => packages::copy_python_runtime(ctx),

        // System configuration
        CustomOp::CreateEtcFiles => system::create_etc_files(ctx),
        CustomOp::CreateLocale => system::create_locale(ctx),
        CustomOp::SetTimezone => system::set_timezone(ctx),
        CustomOp::SetRootPassword => system::set_root_password(ctx),
        CustomOp::ConfigureShellPrompt => system::configure_shell_prompt(ctx),

        // SSH
        CustomOp::GenerateSshHostKeys => ssh::generate_host_keys(ctx),

        // Application
        CustomOp::InstallApplication => application::install_application(ctx),
        CustomOp::WriteStartScripts => crate::scripts::write_start_scripts(ctx),
    }
}
