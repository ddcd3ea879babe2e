//! Update orchestration.
//!
//! The only component that mutates state (clones, builds, cleans), and it
//! does so one package at a time, strictly sequentially: the build tool and
//! the VCS share each mirror's working tree, so nothing here may interleave.

use anyhow::Result;
use log::{debug, info, warn};

use crate::config::Config;
use crate::error::PkgError;
use crate::oracle::VersionOracle;
use crate::pacman::PackageDb;
use crate::pager;
use crate::plan::{Classification, PlanEntry, Planner};
use crate::recipe::RecipeEval;
use crate::runtime::{CommandSpec, Runtime};
use crate::workspace::Workspace;

#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Skip the clone/pull step; the caller already refreshed the mirror.
    pub skip_refresh: bool,
    /// Skip the per-package prompt; the caller already confirmed a batch.
    pub skip_confirm: bool,
}

pub struct Syncer<'a, R: Runtime, D: PackageDb, E: RecipeEval> {
    runtime: &'a R,
    config: &'a Config,
    db: &'a D,
    eval: &'a E,
}

impl<'a, R: Runtime, D: PackageDb, E: RecipeEval> Syncer<'a, R, D, E> {
    pub fn new(runtime: &'a R, config: &'a Config, db: &'a D, eval: &'a E) -> Self {
        Self {
            runtime,
            config,
            db,
            eval,
        }
    }

    fn workspace(&self) -> Workspace<'a, R> {
        Workspace::new(self.runtime, self.config)
    }

    fn oracle(&self) -> VersionOracle<'a, D, E> {
        VersionOracle::new(self.db, self.eval, self.config)
    }

    /// Sync one package: acquire the mirror, surface the recipe for review,
    /// check versions, confirm, build, clean up. A declined confirmation is
    /// a clean early return, not an error.
    #[tracing::instrument(skip(self, options))]
    pub fn sync_one(&self, name: &str, options: SyncOptions) -> Result<()> {
        let workspace = self.workspace();
        let mirror = if options.skip_refresh {
            self.config.mirror_dir(name)
        } else {
            workspace.ensure(name)?
        };

        pager::review_recipe(self.runtime, self.config, name, &mirror);

        match self.oracle().resolve(name) {
            Ok(pair) if pair.installed == pair.recipe => {
                warn!("{} {} is up to date -- reinstalling", name, pair.installed);
            }
            Ok(pair) => {
                debug!("{}: installed {}, recipe {}", name, pair.installed, pair.recipe);
            }
            // Comparison state is unknown: no warning, the rebuild decides
            Err(err) => {
                debug!("Version check for {} failed ({:#}); continuing", name, err);
            }
        }

        if !options.skip_confirm
            && !self
                .runtime
                .confirm(&format!("Build and install {}?", name))?
        {
            info!("Sync of {} aborted at confirmation", name);
            return Ok(());
        }

        info!("Building {} in {:?}", name, mirror);
        let build = CommandSpec::new("makepkg")
            .arg("-si")
            .arg("--noconfirm")
            .cwd(&mirror);
        let code = self.runtime.run_interactive(&build)?;
        if code != Some(0) {
            return Err(PkgError::Build {
                name: name.to_string(),
                code: code.unwrap_or(1),
            }
            .into());
        }

        workspace.cleanup(name);
        Ok(())
    }

    /// Sync every mirrored package that needs it: enumerate the mirrors,
    /// optionally pull each, plan, show the plan, confirm once, rebuild the
    /// out-of-date entries. Mirrored-but-not-installed packages are reported
    /// and never auto-built.
    #[tracing::instrument(skip(self))]
    pub fn sync_all(&self, pull_first: bool) -> Result<()> {
        let workspace = self.workspace();
        let names = workspace.mirrors()?;

        if pull_first {
            for name in &names {
                if let Err(err) = workspace.pull(name) {
                    warn!("Could not refresh the mirror for {}: {:#}", name, err);
                }
            }
        }

        let entries = Planner::new(self.oracle()).plan(&names)?;
        let needs_update: Vec<&PlanEntry> = entries
            .iter()
            .filter(|e| e.classification == Classification::NeedsUpdate)
            .collect();
        let not_installed: Vec<&PlanEntry> = entries
            .iter()
            .filter(|e| e.classification == Classification::NotInstalled)
            .collect();

        if needs_update.is_empty() && not_installed.is_empty() {
            println!("Nothing to do.");
            return Ok(());
        }

        if !needs_update.is_empty() {
            println!("Out of date:");
            for entry in &needs_update {
                println!("  {} {} -> {}", entry.name, entry.installed, entry.recipe);
            }
        }
        if !not_installed.is_empty() {
            println!("Mirrored but not installed:");
            for entry in &not_installed {
                println!("  {}", entry.name);
            }
        }

        if !self.runtime.confirm("Rebuild the out-of-date packages?")? {
            info!("Batch update aborted at confirmation");
            return Ok(());
        }

        // Mirrors are already refreshed and the batch confirmed as a whole
        let options = SyncOptions {
            skip_refresh: true,
            skip_confirm: true,
        };
        for entry in &needs_update {
            self.sync_one(&entry.name, options)?;
        }
        Ok(())
    }
}
