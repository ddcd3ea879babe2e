//! Installed-vs-recipe version resolution.

use anyhow::Result;
use log::debug;

use crate::config::Config;
use crate::pacman::PackageDb;
use crate::recipe::RecipeEval;

/// The two versions that decide a package's fate. Opaque strings, compared
/// only for equality; ordering is the recipe evaluator's business.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionPair {
    pub installed: String,
    pub recipe: String,
}

/// Pure query over the package database and the recipe evaluator. Safe to
/// call repeatedly; nothing is cached, nothing is mutated.
pub struct VersionOracle<'a, D: PackageDb, E: RecipeEval> {
    db: &'a D,
    eval: &'a E,
    config: &'a Config,
}

impl<'a, D: PackageDb, E: RecipeEval> VersionOracle<'a, D, E> {
    pub fn new(db: &'a D, eval: &'a E, config: &'a Config) -> Self {
        Self { db, eval, config }
    }

    /// Resolve both versions for one package. A missing install surfaces as
    /// [`crate::error::PkgError::NotInstalled`], an evaluator failure as
    /// [`crate::error::PkgError::RecipeEval`]; neither is masked here.
    #[tracing::instrument(skip(self))]
    pub fn resolve(&self, name: &str) -> Result<VersionPair> {
        let installed = self.db.installed_version(name)?;
        let recipe = self
            .eval
            .recipe_version(name, &self.config.mirror_dir(name))?;

        debug!("{}: installed {}, recipe {}", name, installed, recipe);
        Ok(VersionPair { installed, recipe })
    }
}
