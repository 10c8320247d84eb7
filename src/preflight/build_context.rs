//! Build context validation.
//!
//! The application files are supplied externally; a build without them
//! would only fail later, after staging work has been done.

use super::CheckResult;
use crate::component::BuildContext;
use crate::config::{APP_FILES, APP_TEMPLATE};
use crate::settings::Settings;

/// Check the build context directory and the files the build copies in.
pub fn check_build_context(ctx: &BuildContext) -> Vec<CheckResult> {
    let mut results = Vec::new();

    if !ctx.context.exists() {
        results.push(CheckResult::fail(
            "Build context",
            format!("Not found at {}", ctx.context.display()),
            "Create the context directory with the application files",
        ));
        return results;
    }

    results.push(CheckResult::pass(
        "Build context",
        format!("Found at {}", ctx.context.display()),
    ));

    for file in APP_FILES {
        let path = ctx.context_file(file);
        if path.exists() {
            results.push(CheckResult::pass(
                format!("{} file", file),
                format!("Found at {}", path.display()),
            ));
        } else {
            results.push(CheckResult::fail(
                format!("{} file", file),
                "Not found in build context",
                format!("Copy {} into the build context", file),
            ));
        }
    }

    let template = ctx.context_file(APP_TEMPLATE);
    if !template.exists() {
        results.push(CheckResult::fail(
            "Config template",
            format!("Not found at {}", template.display()),
            format!("Copy {} into the build context", APP_TEMPLATE),
        ));
    } else {
        match Settings::load(&template) {
            Ok(settings) => results.push(CheckResult::pass(
                "Config template",
                format!("Parsed ({} parameters)", settings.len()),
            )),
            Err(e) => results.push(CheckResult::fail(
                "Config template",
                format!("Invalid: {:#}", e),
                "Fix the YAML in the template",
            )),
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildArgs;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn test_ctx(dir: &Path) -> BuildContext {
        BuildContext::for_testing(
            &dir.join("source"),
            &dir.join("context"),
            &dir.join("staging"),
            dir,
            BuildArgs::default(),
        )
    }

    #[test]
    fn test_missing_context_is_single_failure() {
        let dir = tempdir().unwrap();
        let ctx = test_ctx(dir.path());

        let results = check_build_context(&ctx);
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
    }

    #[test]
    fn test_complete_context_passes() {
        let dir = tempdir().unwrap();
        let ctx = test_ctx(dir.path());

        fs::create_dir_all(&ctx.context).unwrap();
        fs::write(ctx.context_file("zipatoserver.py"), "").unwrap();
        fs::write(ctx.context_file("ping.py"), "").unwrap();
        fs::write(
            ctx.context_file("zipatoserver_template.conf"),
            "WEB_API_PATH: /api\n",
        )
        .unwrap();

        let results = check_build_context(&ctx);
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn test_bad_template_fails() {
        let dir = tempdir().unwrap();
        let ctx = test_ctx(dir.path());

        fs::create_dir_all(&ctx.context).unwrap();
        fs::write(ctx.context_file("zipatoserver.py"), "").unwrap();
        fs::write(ctx.context_file("ping.py"), "").unwrap();
        fs::write(ctx.context_file("zipatoserver_template.conf"), "- a list\n").unwrap();

        let results = check_build_context(&ctx);
        let template = results
            .iter()
            .find(|r| r.name == "Config template")
            .unwrap();
        assert!(!template.passed);
    }
}
