//! Mirror acquisition and post-build cleanup.

use anyhow::Result;
use glob::Pattern;
use log::{debug, info, warn};
use std::path::PathBuf;

use crate::config::Config;
use crate::error::PkgError;
use crate::runtime::{CommandSpec, Runtime};

/// Build-output directories the recipe's ignore rules usually hide from the
/// VCS clean step.
const BUILD_DIRS: [&str; 2] = ["src", "pkg"];

/// Archive files left at the mirror root by a build.
const ARCHIVE_PATTERNS: [&str; 6] = [
    "*.tar.gz",
    "*.tgz",
    "*.tar.xz",
    "*.tar.bz2",
    "*.tar.zst",
    "*.zip",
];

pub struct Workspace<'a, R: Runtime> {
    runtime: &'a R,
    config: &'a Config,
}

impl<'a, R: Runtime> Workspace<'a, R> {
    pub fn new(runtime: &'a R, config: &'a Config) -> Self {
        Self { runtime, config }
    }

    /// Make sure the package's mirror exists and is current: clone when
    /// absent, pull when present. Idempotent; an existing mirror is always
    /// pulled, never re-cloned.
    #[tracing::instrument(skip(self))]
    pub fn ensure(&self, name: &str) -> Result<PathBuf> {
        let mirror = self.config.mirror_dir(name);
        if self.runtime.is_dir(&mirror) {
            self.pull(name)?;
        } else {
            self.clone_mirror(name)?;
        }
        Ok(mirror)
    }

    /// Clone the package's canonical repository into the mirror root.
    #[tracing::instrument(skip(self))]
    pub fn clone_mirror(&self, name: &str) -> Result<PathBuf> {
        let url = self.config.clone_url(name);
        info!("Cloning {} into {:?}", url, self.config.pkgdir);

        let cmd = CommandSpec::new("git")
            .arg("clone")
            .arg("--quiet")
            .arg(url)
            .arg(name)
            .cwd(&self.config.pkgdir);
        self.git(name, &cmd)?;
        Ok(self.config.mirror_dir(name))
    }

    /// Pull the latest recipe into an existing mirror.
    #[tracing::instrument(skip(self))]
    pub fn pull(&self, name: &str) -> Result<()> {
        debug!("Pulling mirror for {}", name);

        let cmd = CommandSpec::new("git")
            .arg("pull")
            .arg("--quiet")
            .cwd(self.config.mirror_dir(name));
        self.git(name, &cmd)
    }

    fn git(&self, name: &str, cmd: &CommandSpec) -> Result<()> {
        let output = match self.runtime.run(cmd) {
            Ok(output) => output,
            Err(err) => {
                return Err(PkgError::Workspace {
                    name: name.to_string(),
                    reason: err.to_string(),
                    code: None,
                }
                .into());
            }
        };

        if output.success() {
            return Ok(());
        }
        let reason = match output.stderr.lines().next() {
            Some(line) if !line.trim().is_empty() => line.trim().to_string(),
            _ => format!("'{}' exited with {:?}", cmd, output.code),
        };
        Err(PkgError::Workspace {
            name: name.to_string(),
            reason,
            code: output.code,
        }
        .into())
    }

    /// Remove build outputs after a successful build: VCS-untracked files
    /// first, then the build-output directories and any leftover archives
    /// the ignore rules kept out of the clean step's sight. Best-effort;
    /// failures are logged and never abort the sync.
    #[tracing::instrument(skip(self))]
    pub fn cleanup(&self, name: &str) {
        let mirror = self.config.mirror_dir(name);
        debug!("Cleaning build outputs in {:?}", mirror);

        let clean = CommandSpec::new("git").arg("clean").arg("-fdq").cwd(&mirror);
        match self.runtime.run(&clean) {
            Ok(output) if !output.success() => {
                warn!("git clean in {:?} exited with {:?}", mirror, output.code)
            }
            Err(err) => warn!("git clean in {:?} failed: {:#}", mirror, err),
            Ok(_) => {}
        }

        for dir in BUILD_DIRS {
            let path = mirror.join(dir);
            if !self.runtime.is_dir(&path) {
                continue;
            }
            if let Err(err) = self.runtime.remove_dir_all(&path) {
                warn!("Could not remove {:?}: {:#}", path, err);
            }
        }

        let entries = match self.runtime.read_dir(&mirror) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("Could not list {:?}: {:#}", mirror, err);
                return;
            }
        };
        for entry in entries {
            let Some(file_name) = entry.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !is_build_archive(file_name) || self.runtime.is_dir(&entry) {
                continue;
            }
            if let Err(err) = self.runtime.remove_file(&entry) {
                warn!("Could not remove {:?}: {:#}", entry, err);
            }
        }
    }

    /// Sorted names of all package mirrors; empty when the mirror root does
    /// not exist yet.
    #[tracing::instrument(skip(self))]
    pub fn mirrors(&self) -> Result<Vec<String>> {
        if !self.runtime.is_dir(&self.config.pkgdir) {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in self.runtime.read_dir(&self.config.pkgdir)? {
            if !self.runtime.is_dir(&entry) {
                continue;
            }
            if let Some(name) = entry.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

fn is_build_archive(file_name: &str) -> bool {
    ARCHIVE_PATTERNS.iter().any(|pattern| {
        Pattern::new(pattern)
            .map(|pattern| pattern.matches(file_name))
            .unwrap_or(false)
    })
}
