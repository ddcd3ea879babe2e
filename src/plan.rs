//! Classification and update-plan construction.

use anyhow::Result;
use log::{debug, warn};

use crate::error::PkgError;
use crate::oracle::{VersionOracle, VersionPair};
use crate::pacman::PackageDb;
use crate::recipe::RecipeEval;

/// Three-way outcome of comparing installed vs. recipe versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    UpToDate,
    NeedsUpdate,
    NotInstalled,
}

/// One row of an update plan. Created here, consumed once by the
/// orchestrator, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub name: String,
    pub installed: String,
    pub recipe: String,
    pub classification: Classification,
}

impl PlanEntry {
    fn resolved(name: &str, pair: VersionPair) -> Self {
        let classification = classify(&pair.installed, &pair.recipe);
        Self {
            name: name.to_string(),
            installed: pair.installed,
            recipe: pair.recipe,
            classification,
        }
    }

    fn not_installed(name: &str) -> Self {
        Self {
            name: name.to_string(),
            installed: String::new(),
            recipe: String::new(),
            classification: Classification::NotInstalled,
        }
    }
}

/// Pure string equality; versions are never ordered or parsed.
pub fn classify(installed: &str, recipe: &str) -> Classification {
    if installed == recipe {
        Classification::UpToDate
    } else {
        Classification::NeedsUpdate
    }
}

pub struct Planner<'a, D: PackageDb, E: RecipeEval> {
    oracle: VersionOracle<'a, D, E>,
}

impl<'a, D: PackageDb, E: RecipeEval> Planner<'a, D, E> {
    pub fn new(oracle: VersionOracle<'a, D, E>) -> Self {
        Self { oracle }
    }

    /// One entry per distinct input name, sorted by name ascending.
    ///
    /// A missing install classifies as NotInstalled with blank versions. An
    /// evaluator failure classifies the same way, so a broken recipe is
    /// listed for attention instead of silently looking up to date. Any
    /// other failure propagates.
    #[tracing::instrument(skip(self, names))]
    pub fn plan(&self, names: &[String]) -> Result<Vec<PlanEntry>> {
        let mut names: Vec<&String> = names.iter().collect();
        names.sort();
        names.dedup();

        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let entry = match self.oracle.resolve(name) {
                Ok(pair) => PlanEntry::resolved(name, pair),
                Err(err) => match err.downcast_ref::<PkgError>() {
                    Some(PkgError::NotInstalled(_)) => {
                        debug!("{} is not installed", name);
                        PlanEntry::not_installed(name)
                    }
                    Some(PkgError::RecipeEval { .. }) => {
                        warn!("{:#}; listing {} as not installed", err, name);
                        PlanEntry::not_installed(name)
                    }
                    _ => return Err(err),
                },
            };
            entries.push(entry);
        }
        Ok(entries)
    }
}
