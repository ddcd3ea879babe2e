//! Reconciliation of foreign-installed packages against the mirror set.

use anyhow::Result;
use log::warn;

use crate::config::Config;
use crate::pacman::PackageDb;
use crate::runtime::Runtime;
use crate::workspace::Workspace;

/// List every installed package of foreign origin and clone a mirror for
/// each one that lacks it. One failed clone is reported and skipped; the
/// loop always finishes. Ends with a count of the mirrors present.
#[tracing::instrument(skip(runtime, config, db))]
pub fn reconcile<R: Runtime, D: PackageDb>(runtime: &R, config: &Config, db: &D) -> Result<()> {
    let foreign = db.foreign_packages()?;
    let workspace = Workspace::new(runtime, config);

    for package in &foreign {
        if runtime.is_dir(&config.mirror_dir(&package.name)) {
            println!("{} {}", package.name, package.version);
            continue;
        }
        println!("{} {} (no mirror, cloning)", package.name, package.version);
        if let Err(err) = workspace.clone_mirror(&package.name) {
            warn!("Could not clone a mirror for {}: {:#}", package.name, err);
        }
    }

    let mirrors = workspace.mirrors()?;
    println!("{} mirrors present under {:?}", mirrors.len(), config.pkgdir);
    Ok(())
}
