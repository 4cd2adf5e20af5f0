//! JSON report writer for cross-validation, classification and scoring runs.

use std::fs;
use std::path::{Path, PathBuf};

use grove_rf::{CrossValidationResult, Metrics, Prediction};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::IoError;

/// Writes run reports as pretty-printed JSON files.
///
/// Creates the output directory on construction if it does not exist.
/// Output files are named `{name}_cv.json`, `{name}_predictions.json` and
/// `{name}_scores.json`.
pub struct ReportWriter {
    output_dir: PathBuf,
    name: String,
}

#[derive(Serialize)]
struct CvArtifact<'a> {
    name: &'a str,
    positive_label: String,
    #[serde(flatten)]
    result: &'a CrossValidationResult,
}

#[derive(Serialize)]
struct PredictionArtifact<'a> {
    name: &'a str,
    n_predictions: usize,
    predictions: &'a [Prediction],
}

#[derive(Serialize)]
struct ScoreArtifact<'a> {
    name: &'a str,
    n_scores: usize,
    scores: &'a [f64],
    #[serde(skip_serializing_if = "Option::is_none")]
    metrics: Option<&'a Metrics>,
}

impl ReportWriter {
    /// Create a new writer targeting the given directory and run name.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::OutputDirCreate`] if the directory cannot be created.
    #[instrument(skip_all, fields(dir = %output_dir.display(), name = name))]
    pub fn new(output_dir: &Path, name: &str) -> Result<Self, IoError> {
        fs::create_dir_all(output_dir).map_err(|e| IoError::OutputDirCreate {
            path: output_dir.to_path_buf(),
            source: e,
        })?;
        debug!("output directory ready");
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            name: name.to_string(),
        })
    }

    /// Write a cross-validation result to `{name}_cv.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all)]
    pub fn write_cv(
        &self,
        positive_label: &impl ToString,
        result: &CrossValidationResult,
    ) -> Result<PathBuf, IoError> {
        let artifact = CvArtifact {
            name: &self.name,
            positive_label: positive_label.to_string(),
            result,
        };
        self.write_json("cv", &artifact)
    }

    /// Write per-row predictions to `{name}_predictions.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all, fields(n_predictions = predictions.len()))]
    pub fn write_predictions(&self, predictions: &[Prediction]) -> Result<PathBuf, IoError> {
        let artifact = PredictionArtifact {
            name: &self.name,
            n_predictions: predictions.len(),
            predictions,
        };
        self.write_json("predictions", &artifact)
    }

    /// Write anomaly scores, and metrics when labels were available, to
    /// `{name}_scores.json`.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Serialize`] or [`IoError::WriteFile`].
    #[instrument(skip_all, fields(n_scores = scores.len()))]
    pub fn write_scores(
        &self,
        scores: &[f64],
        metrics: Option<&Metrics>,
    ) -> Result<PathBuf, IoError> {
        let artifact = ScoreArtifact {
            name: &self.name,
            n_scores: scores.len(),
            scores,
            metrics,
        };
        self.write_json("scores", &artifact)
    }

    fn write_json<T: Serialize>(&self, suffix: &str, artifact: &T) -> Result<PathBuf, IoError> {
        let path = self.output_dir.join(format!("{}_{suffix}.json", self.name));
        let json = serde_json::to_string_pretty(artifact).map_err(|e| IoError::Serialize {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, &json).map_err(|e| IoError::WriteFile {
            path: path.clone(),
            source: e,
        })?;
        info!(path = %path.display(), "report written");
        Ok(path)
    }
}
