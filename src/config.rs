//! Process-wide configuration, resolved once at startup.
//!
//! There is no ambient global state: the resolved [`Config`] is threaded by
//! reference into every component that needs it.

use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::runtime::Runtime;

pub const DEFAULT_AUR_URL: &str = "https://aur.archlinux.org";

/// Environment keys consulted for the pager, in order. An empty value
/// disables paging entirely.
const PAGER_KEYS: [&str; 2] = ["AURSMITH_PAGER", "PAGER"];
const DEFAULT_PAGER: &str = "less";

pub struct Config {
    /// Root of the package mirrors, one git checkout per package.
    pub pkgdir: PathBuf,
    /// Pager command line for recipe review; `None` disables review.
    pub pager: Option<String>,
    /// Base URL of the package index (RPC and git remotes).
    pub aur_url: String,
}

impl Config {
    /// Resolve the configuration from CLI overrides, the environment, and
    /// platform defaults. Creates the mirror root if it does not exist yet.
    pub fn new<R: Runtime>(
        runtime: &R,
        pkgdir: Option<PathBuf>,
        aur_url: Option<String>,
    ) -> Result<Self> {
        let pkgdir = match pkgdir {
            Some(dir) => dir,
            None => runtime
                .data_dir()
                .context("Could not determine a data directory for the package mirrors")?
                .join("aursmith"),
        };
        runtime
            .create_dir_all(&pkgdir)
            .with_context(|| format!("Could not create the mirror root {:?}", pkgdir))?;

        let pager = resolve_pager(runtime);
        let aur_url = aur_url
            .unwrap_or_else(|| DEFAULT_AUR_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        debug!("Using mirror root {:?}, index {}", pkgdir, aur_url);
        Ok(Self {
            pkgdir,
            pager,
            aur_url,
        })
    }

    /// Mirror directory for one package: `<pkgdir>/<name>`.
    pub fn mirror_dir(&self, name: &str) -> PathBuf {
        self.pkgdir.join(name)
    }

    /// Canonical git remote for one package: `<aur_url>/<name>.git`.
    pub fn clone_url(&self, name: &str) -> String {
        format!("{}/{}.git", self.aur_url, name)
    }
}

fn resolve_pager<R: Runtime>(runtime: &R) -> Option<String> {
    for key in PAGER_KEYS {
        if let Ok(value) = runtime.env_var(key) {
            let value = value.trim().to_string();
            if value.is_empty() {
                debug!("{} is empty; paging disabled", key);
                return None;
            }
            return Some(value);
        }
    }
    Some(DEFAULT_PAGER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::env::VarError;

    fn runtime_with_env(vars: Vec<(&'static str, Option<&'static str>)>) -> MockRuntime {
        let mut runtime = MockRuntime::new();
        for (key, value) in vars {
            runtime
                .expect_env_var()
                .with(eq(key))
                .returning(move |_| match value {
                    Some(v) => Ok(v.to_string()),
                    None => Err(VarError::NotPresent),
                });
        }
        runtime.expect_create_dir_all().returning(|_| Ok(()));
        runtime
    }

    #[test]
    fn test_pkgdir_override_wins() {
        let runtime = runtime_with_env(vec![
            ("AURSMITH_PAGER", None),
            ("PAGER", None),
        ]);

        let config =
            Config::new(&runtime, Some(PathBuf::from("/custom/mirrors")), None).unwrap();
        assert_eq!(config.pkgdir, PathBuf::from("/custom/mirrors"));
        assert_eq!(config.mirror_dir("foo"), PathBuf::from("/custom/mirrors/foo"));
    }

    #[test]
    fn test_pkgdir_defaults_to_data_dir() {
        let mut runtime = runtime_with_env(vec![
            ("AURSMITH_PAGER", None),
            ("PAGER", None),
        ]);
        runtime
            .expect_data_dir()
            .returning(|| Some(PathBuf::from("/home/user/.local/share")));

        let config = Config::new(&runtime, None, None).unwrap();
        assert_eq!(
            config.pkgdir,
            PathBuf::from("/home/user/.local/share/aursmith")
        );
    }

    #[test]
    fn test_pkgdir_without_data_dir_is_an_error() {
        let mut runtime = MockRuntime::new();
        runtime.expect_data_dir().returning(|| None);

        assert!(Config::new(&runtime, None, None).is_err());
    }

    #[test]
    fn test_pager_resolution_order() {
        let runtime = runtime_with_env(vec![("AURSMITH_PAGER", Some("bat -p"))]);
        let config = Config::new(&runtime, Some("/m".into()), None).unwrap();
        assert_eq!(config.pager.as_deref(), Some("bat -p"));

        let runtime = runtime_with_env(vec![
            ("AURSMITH_PAGER", None),
            ("PAGER", Some("more")),
        ]);
        let config = Config::new(&runtime, Some("/m".into()), None).unwrap();
        assert_eq!(config.pager.as_deref(), Some("more"));

        let runtime = runtime_with_env(vec![
            ("AURSMITH_PAGER", None),
            ("PAGER", None),
        ]);
        let config = Config::new(&runtime, Some("/m".into()), None).unwrap();
        assert_eq!(config.pager.as_deref(), Some("less"));
    }

    #[test]
    fn test_empty_pager_disables_paging() {
        let runtime = runtime_with_env(vec![("AURSMITH_PAGER", Some(""))]);
        let config = Config::new(&runtime, Some("/m".into()), None).unwrap();
        assert_eq!(config.pager, None);

        // An empty PAGER disables too, without falling back to the default
        let runtime = runtime_with_env(vec![
            ("AURSMITH_PAGER", None),
            ("PAGER", Some("  ")),
        ]);
        let config = Config::new(&runtime, Some("/m".into()), None).unwrap();
        assert_eq!(config.pager, None);
    }

    #[test]
    fn test_clone_url_and_trailing_slash() {
        let runtime = runtime_with_env(vec![
            ("AURSMITH_PAGER", None),
            ("PAGER", None),
        ]);
        let config = Config::new(
            &runtime,
            Some("/m".into()),
            Some("https://aur.example.org/".to_string()),
        )
        .unwrap();

        assert_eq!(config.aur_url, "https://aur.example.org");
        assert_eq!(config.clone_url("foo-bin"), "https://aur.example.org/foo-bin.git");
    }
}
