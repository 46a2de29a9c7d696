//! CLI command implementations.

mod check;
mod resolve;

pub use check::{CheckArgs, check_dictionaries, run_check};
pub use resolve::{ResolveArgs, run_resolve};

use crate::error::{CliError, ConfigNotFoundError};
use clap::Args;
use es_l10n_toml::{CONFIG_FILE_NAME, L10nConfig, L10nConfigError};
use std::path::{Path, PathBuf};

/// Where to look for `l10n.toml`.
#[derive(Args, Clone, Debug)]
pub struct PathArgs {
    /// Directory containing l10n.toml (defaults to the current directory).
    #[arg(short, long)]
    pub path: Option<PathBuf>,
}

impl PathArgs {
    pub fn base_dir(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Reads `l10n.toml` from `base_dir`, mapping a missing file to a diagnostic.
pub fn load_config(base_dir: &Path) -> Result<L10nConfig, CliError> {
    L10nConfig::from_manifest_dir(base_dir).map_err(|e| match e {
        L10nConfigError::NotFound => ConfigNotFoundError {
            expected_path: base_dir.join(CONFIG_FILE_NAME).display().to_string(),
        }
        .into(),
        other => other.into(),
    })
}
