//! Recipe-version evaluation, delegated to the build tool.
//!
//! The version a recipe would build is whatever `makepkg --printsrcinfo`
//! reports; nothing here parses or orders version strings.

use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::error::PkgError;
use crate::runtime::{CommandSpec, Runtime};

#[cfg_attr(test, mockall::automock)]
pub trait RecipeEval: Send + Sync {
    /// Version string a fresh build of the recipe in `mirror` would
    /// produce. Any failure surfaces as [`PkgError::RecipeEval`].
    fn recipe_version(&self, name: &str, mirror: &Path) -> Result<String>;
}

pub struct Makepkg<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> Makepkg<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }
}

impl<R: Runtime> RecipeEval for Makepkg<'_, R> {
    #[tracing::instrument(skip(self, mirror))]
    fn recipe_version(&self, name: &str, mirror: &Path) -> Result<String> {
        debug!("Evaluating recipe version for {} in {:?}", name, mirror);

        let cmd = CommandSpec::new("makepkg").arg("--printsrcinfo").cwd(mirror);
        let output = match self.runtime.run(&cmd) {
            Ok(output) => output,
            Err(err) => return Err(eval_error(name, &err.to_string())),
        };

        if !output.success() {
            let reason = match output.stderr.lines().next() {
                Some(line) if !line.trim().is_empty() => line.trim().to_string(),
                _ => format!("makepkg exited with {:?}", output.code),
            };
            return Err(eval_error(name, &reason));
        }

        match parse_srcinfo_version(&output.stdout) {
            Some(version) => Ok(version),
            None => Err(eval_error(name, "no pkgver in --printsrcinfo output")),
        }
    }
}

fn eval_error(name: &str, reason: &str) -> anyhow::Error {
    PkgError::RecipeEval {
        name: name.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Extracts `[epoch:]pkgver-pkgrel` from `--printsrcinfo` output. Only the
/// first occurrence of each key counts (split packages repeat them).
fn parse_srcinfo_version(srcinfo: &str) -> Option<String> {
    let mut pkgver = None;
    let mut pkgrel = None;
    let mut epoch = None;

    for line in srcinfo.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "pkgver" if pkgver.is_none() => pkgver = Some(value.to_string()),
            "pkgrel" if pkgrel.is_none() => pkgrel = Some(value.to_string()),
            "epoch" if epoch.is_none() => epoch = Some(value.to_string()),
            _ => {}
        }
    }

    let version = match (pkgver, pkgrel) {
        (Some(ver), Some(rel)) => format!("{}-{}", ver, rel),
        (Some(ver), None) => ver,
        (None, _) => return None,
    };
    Some(match epoch {
        Some(epoch) => format!("{}:{}", epoch, version),
        None => version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ExecOutput, MockRuntime};
    use mockall::predicate::eq;
    use std::path::PathBuf;

    const SRCINFO: &str = "\
pkgbase = foo-bin
\tpkgdesc = Foo, prebuilt
\tpkgver = 1.0
\tpkgrel = 1
\tarch = x86_64

pkgname = foo-bin
";

    #[test]
    fn test_parse_srcinfo_version() {
        assert_eq!(parse_srcinfo_version(SRCINFO).as_deref(), Some("1.0-1"));
    }

    #[test]
    fn test_parse_srcinfo_version_with_epoch() {
        let srcinfo = "pkgbase = foo\n\tpkgver = 2.4\n\tpkgrel = 3\n\tepoch = 1\n";
        assert_eq!(parse_srcinfo_version(srcinfo).as_deref(), Some("1:2.4-3"));
    }

    #[test]
    fn test_parse_srcinfo_version_without_pkgrel() {
        let srcinfo = "pkgbase = foo\n\tpkgver = 2.4\n";
        assert_eq!(parse_srcinfo_version(srcinfo).as_deref(), Some("2.4"));
    }

    #[test]
    fn test_parse_srcinfo_first_occurrence_wins() {
        let srcinfo = "pkgver = 1.0\npkgrel = 1\npkgver = 9.9\npkgrel = 9\n";
        assert_eq!(parse_srcinfo_version(srcinfo).as_deref(), Some("1.0-1"));
    }

    #[test]
    fn test_parse_srcinfo_version_missing_pkgver() {
        assert_eq!(parse_srcinfo_version("pkgbase = foo\n"), None);
    }

    #[test]
    fn test_recipe_version_runs_makepkg_in_mirror() {
        let mirror = PathBuf::from("/mirrors/foo-bin");
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run()
            .with(eq(CommandSpec::new("makepkg")
                .arg("--printsrcinfo")
                .cwd(mirror.clone())))
            .returning(|_| {
                Ok(ExecOutput {
                    code: Some(0),
                    stdout: SRCINFO.to_string(),
                    stderr: String::new(),
                })
            });

        let eval = Makepkg::new(&runtime);
        assert_eq!(eval.recipe_version("foo-bin", &mirror).unwrap(), "1.0-1");
    }

    #[test]
    fn test_recipe_version_failure_surfaces_recipe_eval() {
        let mut runtime = MockRuntime::new();
        runtime.expect_run().returning(|_| {
            Ok(ExecOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: "==> ERROR: PKGBUILD does not exist.\n".to_string(),
            })
        });

        let eval = Makepkg::new(&runtime);
        let err = eval
            .recipe_version("foo-bin", &PathBuf::from("/mirrors/foo-bin"))
            .unwrap_err();
        match err.downcast_ref::<PkgError>() {
            Some(PkgError::RecipeEval { name, reason }) => {
                assert_eq!(name, "foo-bin");
                assert!(reason.contains("PKGBUILD does not exist"));
            }
            other => panic!("expected RecipeEval, got {:?}", other),
        }
    }

    #[test]
    fn test_recipe_version_spawn_failure_surfaces_recipe_eval() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_run()
            .returning(|_| Err(anyhow::anyhow!("Failed to run 'makepkg'")));

        let eval = Makepkg::new(&runtime);
        let err = eval
            .recipe_version("foo-bin", &PathBuf::from("/mirrors/foo-bin"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PkgError>(),
            Some(PkgError::RecipeEval { .. })
        ));
    }
}
