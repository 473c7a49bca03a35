//! Persists the trained model and its records into the dated run directory

use crate::artifacts::{write_json, ArtifactLayout};
use crate::error::Result;
use crate::optimizer::Study;
use super::models::{ModelMetrics, Regressor};
use std::path::PathBuf;
use tracing::{error, info};

/// Paths written by [`ModelSaver::save`]
#[derive(Debug, Clone, serde::Serialize)]
pub struct SavedArtifacts {
    pub model: PathBuf,
    pub params: PathBuf,
    pub metrics: PathBuf,
    pub study: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ModelSaver {
    layout: ArtifactLayout,
}

impl ModelSaver {
    pub fn new(layout: ArtifactLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    /// Write model, parameters, metrics and (when given) the search study
    pub fn save(
        &self,
        model: &Regressor,
        metrics: &ModelMetrics,
        study: Option<&Study>,
    ) -> Result<SavedArtifacts> {
        let name = model.name();
        let artifacts = SavedArtifacts {
            model: self.layout.model_path(name),
            params: self.layout.params_path(name),
            metrics: self.layout.metrics_path(name),
            study: study.map(|_| self.layout.study_path(name)),
        };

        let written = model
            .save(&artifacts.model)
            .and_then(|_| write_json(&artifacts.params, model.params()))
            .and_then(|_| write_json(&artifacts.metrics, metrics))
            .and_then(|_| match (study, &artifacts.study) {
                (Some(study), Some(path)) => study.save(path),
                _ => Ok(()),
            });

        if let Err(e) = written {
            error!(dir = %self.layout.model_dir(name).display(), error = %e, "Failed to save model artifacts");
            return Err(e);
        }

        info!(dir = %self.layout.model_dir(name).display(), "Saved model artifacts");
        Ok(artifacts)
    }
}
