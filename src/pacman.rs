//! Installed-package database queries, driven through pacman.

use anyhow::{Context, Result, bail};
use log::{debug, warn};

use crate::error::PkgError;
use crate::runtime::{CommandSpec, Runtime};

/// One installed package as reported by the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
}

#[cfg_attr(test, mockall::automock)]
pub trait PackageDb: Send + Sync {
    /// Version of one installed package. Surfaces
    /// [`PkgError::NotInstalled`] when the database has no entry.
    fn installed_version(&self, name: &str) -> Result<String>;

    /// All installed packages of foreign origin, sorted by name.
    fn foreign_packages(&self) -> Result<Vec<InstalledPackage>>;
}

pub struct Pacman<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> Pacman<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }
}

impl<R: Runtime> PackageDb for Pacman<'_, R> {
    #[tracing::instrument(skip(self))]
    fn installed_version(&self, name: &str) -> Result<String> {
        debug!("Querying installed version of {}", name);

        let output = self
            .runtime
            .run(&CommandSpec::new("pacman").arg("-Q").arg(name))
            .context("Failed to run pacman")?;

        if !output.success() {
            return Err(PkgError::NotInstalled(name.to_string()).into());
        }

        let version = parse_query_line(output.stdout.trim())
            .map(|package| package.version)
            .with_context(|| format!("Unexpected pacman -Q output for '{}'", name))?;
        Ok(version)
    }

    #[tracing::instrument(skip(self))]
    fn foreign_packages(&self) -> Result<Vec<InstalledPackage>> {
        debug!("Querying foreign installed packages");

        let output = self
            .runtime
            .run(&CommandSpec::new("pacman").arg("-Qm"))
            .context("Failed to run pacman")?;

        // pacman -Qm exits nonzero when nothing matches; only a diagnostic
        // on stderr marks a real failure
        if !output.success() && !output.stderr.trim().is_empty() {
            bail!("pacman -Qm failed: {}", output.stderr.trim());
        }

        let mut packages = Vec::new();
        for line in output.stdout.lines() {
            if line.trim().is_empty() {
                continue;
            }
            match parse_query_line(line) {
                Some(package) => packages.push(package),
                None => warn!("Skipping malformed pacman output line: {}", line),
            }
        }

        packages.sort_by(|a, b| a.name.cmp(&b.name));
        debug!("Found {} foreign packages", packages.len());
        Ok(packages)
    }
}

/// Parses one `name version` line of query output.
fn parse_query_line(line: &str) -> Option<InstalledPackage> {
    let mut parts = line.split_whitespace();
    let name = parts.next()?;
    let version = parts.next()?;
    Some(InstalledPackage {
        name: name.to_string(),
        version: version.to_string(),
    })
}
