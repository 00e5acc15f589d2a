use std::fs;
use std::path::Path;

use anyhow::Result;
use serde::Deserialize;
use tracing::{error, info};

use crate::config::{Language, OutputMode};

/// Optional YAML defaults file. Every field may be omitted; CLI flags win
/// over anything set here.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub output_mode: Option<OutputMode>,
    #[serde(default)]
    pub include_all: Option<bool>,
    #[serde(default)]
    pub keep_comments: Option<bool>,
    #[serde(default)]
    pub file_list: Option<bool>,
    #[serde(default)]
    pub min_lines: Option<usize>,
    #[serde(default)]
    pub output_dir: Option<std::path::PathBuf>,
    #[serde(default)]
    pub branch_or_tag: Option<String>,
}

/// Load a YAML defaults file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let content = match fs::read_to_string(path_ref) {
        Ok(content) => content,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: FileConfig = match serde_yaml::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    info!(config_path = ?path_ref, "Config file parsed successfully");
    Ok(config)
}
