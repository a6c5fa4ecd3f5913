//! Configuration support for forcetest.

use crate::errors::ConfigParseError;
use camino::Utf8Path;
use config::{Config, File, FileFormat};
use serde::Deserialize;

/// Configuration for forcetest, read from the workspace.
///
/// Loaded from `.config/forcetest.toml` in the workspace root, layered over
/// the embedded defaults. A missing file is not an error; the defaults apply.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ForcetestConfig {
    /// Namespace prefix used when resolving artifacts in the remote
    /// registry. Empty means the default (unmanaged) namespace.
    pub namespace_prefix: String,

    /// Whether to fetch and display the execution log after a run.
    pub show_test_log: bool,

    /// Whether to filter the displayed log down to debug lines.
    pub debug_only: bool,

    /// The pattern applied to log lines when `debug_only` is set.
    pub debug_filter: String,
}

impl ForcetestConfig {
    /// The location of the config within the workspace:
    /// `.config/forcetest.toml`.
    pub const CONFIG_PATH: &'static str = ".config/forcetest.toml";

    /// Contains the default config as a TOML file.
    ///
    /// Workspace-specific configuration is layered on top of the default
    /// config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the forcetest config for the given workspace root, or the
    /// defaults if the workspace has no config file.
    pub fn from_sources(workspace_root: &Utf8Path) -> Result<Self, ConfigParseError> {
        let config_file = workspace_root.join(Self::CONFIG_PATH);
        let config = Config::builder()
            .add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::new(config_file.as_str(), FileFormat::Toml).required(false))
            .build()
            .map_err(|err| ConfigParseError::new(config_file.clone(), err))?;
        config
            .try_deserialize()
            .map_err(|err| ConfigParseError::new(config_file, err))
    }

    /// Returns the built-in defaults without consulting the filesystem.
    pub fn default_config() -> Self {
        Self {
            namespace_prefix: String::new(),
            show_test_log: true,
            debug_only: false,
            debug_filter: "USER_DEBUG".to_owned(),
        }
    }
}
