use crate::cli::{Cli, ColorMode};
use crate::pipeline::LltsvOptions;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    Parse { path: String, message: String },
}

/// Default options loaded from a json5 profile.
///
/// ```json5
/// {
///   keys: ["time", "status", "uri", "diff_ms"],
///   exprs: ["diff_ms = (resptime - upstream_resptime) * 1000"],
///   filters: ["status >= 500"],
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LltsvConfig {
    pub keys: Vec<String>,
    pub ignore_keys: Vec<String>,
    pub no_key: bool,
    pub filters: Vec<String>,
    pub exprs: Vec<String>,
    pub timegreps: Vec<String>,
    pub color: Option<ColorMode>,
}

impl LltsvConfig {
    /// Merge with the command line.
    ///
    /// Key lists, `no_key` and color given on the command line replace the
    /// profile's; filters, expressions and time ranges from both apply,
    /// profile first.
    pub fn merge(&self, cli: &Cli) -> (LltsvOptions, ColorMode) {
        // `-k ""` and `-k foo,,bar` leave empty entries behind
        let non_empty = |list: &Vec<String>| -> Vec<String> {
            list.iter().filter(|s| !s.is_empty()).cloned().collect()
        };
        let pick = |cli_list: &Vec<String>, profile_list: &Vec<String>| -> Vec<String> {
            let cli_list = non_empty(cli_list);
            if cli_list.is_empty() {
                non_empty(profile_list)
            } else {
                cli_list
            }
        };
        let chain = |profile_list: &Vec<String>, cli_list: &Vec<String>| -> Vec<String> {
            profile_list.iter().chain(cli_list).cloned().collect()
        };

        let keys = pick(&cli.keys, &self.keys);
        // an explicit key list disables ignore keys
        let ignore_keys = if keys.is_empty() {
            pick(&cli.ignore_keys, &self.ignore_keys)
        } else {
            Vec::new()
        };

        let options = LltsvOptions {
            keys,
            ignore_keys,
            no_key: cli.no_key || self.no_key,
            filters: chain(&self.filters, &cli.filters),
            exprs: chain(&self.exprs, &cli.exprs),
            timegreps: chain(&self.timegreps, &cli.timegreps),
        };
        let color = cli.color.or(self.color).unwrap_or_default();

        (options, color)
    }
}

pub fn load_config(path: Option<&Path>) -> Result<LltsvConfig, ConfigError> {
    match path {
        Some(path) => load_config_from_path(path),
        None => Ok(LltsvConfig::default()),
    }
}

pub fn load_config_from_path(path: &Path) -> Result<LltsvConfig, ConfigError> {
    let path_display = path.display().to_string();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path_display.clone(),
        source,
    })?;

    json5::from_str::<LltsvConfig>(&raw).map_err(|e| ConfigError::Parse {
        path: path_display,
        message: e.to_string(),
    })
}
