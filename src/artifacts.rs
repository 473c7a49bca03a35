//! On-disk layout of training artifacts
//!
//! ```text
//! {root}/{YYYYMMDD}/scaler.json
//! {root}/{YYYYMMDD}/{model}/model.json
//! {root}/{YYYYMMDD}/{model}/model_params.json
//! {root}/{YYYYMMDD}/{model}/metrics.json
//! {root}/{YYYYMMDD}/{model}/study.json
//! ```
//!
//! Training writes and serving reads through the same layout, so both sides
//! always agree on paths.

use crate::error::{HousePriceError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Dated artifact directory under a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    root: PathBuf,
    date: String,
}

impl ArtifactLayout {
    pub fn new(root: impl Into<PathBuf>, date: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            date: date.into(),
        }
    }

    /// Layout dated with the local calendar day
    pub fn today(root: impl Into<PathBuf>) -> Self {
        Self::new(root, chrono::Local::now().format("%Y%m%d").to_string())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn run_dir(&self) -> PathBuf {
        self.root.join(&self.date)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.run_dir().join("scaler.json")
    }

    pub fn model_dir(&self, model_name: &str) -> PathBuf {
        self.run_dir().join(model_name)
    }

    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.model_dir(model_name).join("model.json")
    }

    pub fn params_path(&self, model_name: &str) -> PathBuf {
        self.model_dir(model_name).join("model_params.json")
    }

    pub fn metrics_path(&self, model_name: &str) -> PathBuf {
        self.model_dir(model_name).join("metrics.json")
    }

    pub fn study_path(&self, model_name: &str) -> PathBuf {
        self.model_dir(model_name).join("study.json")
    }

    /// True for names shaped like `YYYYMMDD` that parse as a calendar date
    pub fn is_date_name(name: &str) -> bool {
        name.len() == 8
            && name.bytes().all(|b| b.is_ascii_digit())
            && chrono::NaiveDate::parse_from_str(name, "%Y%m%d").is_ok()
    }

    /// Most recent dated directory under `root`
    pub fn latest_date(root: &Path) -> Result<String> {
        let entries = std::fs::read_dir(root).map_err(|e| HousePriceError::artifact(root, e))?;

        let mut latest: Option<String> = None;
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if Self::is_date_name(&name) && latest.as_deref().map_or(true, |l| name.as_str() > l) {
                latest = Some(name);
            }
        }

        latest.ok_or_else(|| HousePriceError::artifact(root, "no dated artifact directory found"))
    }
}

/// Serialize `value` as pretty JSON at `path`, creating parent directories
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Read and deserialize JSON from `path`, tagging failures with the path
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path).map_err(|e| HousePriceError::artifact(path, e))?;
    serde_json::from_str(&json).map_err(|e| HousePriceError::artifact(path, e))
}
