use std::{fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::correlation::DEFAULT_MAX_COLUMNS;

/// Knobs for a profiling run.
///
/// Plot quotas are carried through for the rendering layer; the analyzers
/// never read them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProfileConfig {
    /// Numeric columns (in role order) kept for the correlation matrices.
    pub max_corr_cols: usize,
    pub max_numeric_plots: usize,
    pub max_categorical_plots: usize,
    /// Run the analyzers on scoped worker threads.
    pub parallel: bool,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            max_corr_cols: DEFAULT_MAX_COLUMNS,
            max_numeric_plots: 12,
            max_categorical_plots: 12,
            parallel: true,
        }
    }
}

impl ProfileConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Parsing profile config JSON")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        let config = serde_json::from_reader(reader)
            .with_context(|| format!("Parsing profile config {path:?}"))?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating config file {path:?}"))?;
        serde_json::to_writer_pretty(file, self).context("Writing profile config JSON")
    }
}
