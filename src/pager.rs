//! Recipe review through the configured terminal pager.

use log::{debug, warn};
use std::path::Path;

use crate::config::Config;
use crate::runtime::{CommandSpec, Runtime};

/// The build-description file at the root of every mirror.
pub const RECIPE_FILE: &str = "PKGBUILD";

/// Show the recipe to the user before a rebuild. Review has no decline
/// path; a disabled or broken pager degrades to "no review".
#[tracing::instrument(skip(runtime, config, mirror))]
pub fn review_recipe<R: Runtime>(runtime: &R, config: &Config, name: &str, mirror: &Path) {
    let Some(pager) = &config.pager else {
        debug!("Paging disabled; skipping recipe review for {}", name);
        return;
    };

    // The pager setting is a command line: split into program and arguments
    let mut words = pager.split_whitespace();
    let Some(program) = words.next() else {
        return;
    };
    let mut cmd = CommandSpec::new(program);
    for word in words {
        cmd = cmd.arg(word);
    }
    cmd = cmd.arg(RECIPE_FILE).cwd(mirror);

    match runtime.run_interactive(&cmd) {
        Ok(Some(0)) => {}
        Ok(code) => warn!("Pager '{}' exited with {:?}", program, code),
        Err(err) => warn!("Could not run pager '{}': {:#}", program, err),
    }
}
