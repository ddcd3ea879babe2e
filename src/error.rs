//! Domain error taxonomy.
//!
//! Callers classify these with `downcast_ref::<PkgError>()` on an
//! `anyhow::Error`: query paths recover by classification, orchestration
//! paths propagate to `main`, which exits with [`PkgError::exit_code`].

use std::fmt;

#[derive(Debug)]
pub enum PkgError {
    /// The package database has no entry for this name. Expected and
    /// recoverable: classification logic maps it to NotInstalled.
    NotInstalled(String),
    /// The recipe evaluator could not produce a version string.
    RecipeEval { name: String, reason: String },
    /// Clone or pull of the package mirror failed. Fatal for that
    /// package's sync; reconciliation loops catch and continue.
    Workspace {
        name: String,
        reason: String,
        code: Option<i32>,
    },
    /// The build tool exited nonzero. Always fatal.
    Build { name: String, code: i32 },
}

impl fmt::Display for PkgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PkgError::NotInstalled(name) => {
                write!(f, "package '{}' is not installed", name)
            }
            PkgError::RecipeEval { name, reason } => {
                write!(f, "could not evaluate the recipe for '{}': {}", name, reason)
            }
            PkgError::Workspace { name, reason, .. } => {
                write!(f, "workspace operation failed for '{}': {}", name, reason)
            }
            PkgError::Build { name, code } => {
                write!(f, "build of '{}' failed with exit status {}", name, code)
            }
        }
    }
}

impl std::error::Error for PkgError {}

impl PkgError {
    /// Process exit code for this failure: the underlying subprocess's code
    /// when one is known, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            PkgError::Build { code, .. } => *code,
            PkgError::Workspace { code: Some(code), .. } => *code,
            _ => 1,
        }
    }
}
