//! Trained Artifact Persistence

use crate::boosting::BoostedModel;
use crate::model::RulModel;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Bumped whenever the serialized layout changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Errors while saving or loading an artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Artifact encoding failed: {0}")]
    Encode(postcard::Error),
    #[error("Artifact is corrupt: {0}")]
    Decode(postcard::Error),
    #[error("Unsupported artifact format version {0}")]
    UnsupportedVersion(u32),
    #[error("Model expects {model} features but artifact lists {columns} columns")]
    SchemaMismatch { model: usize, columns: usize },
}

/// Model plus the exact feature schema it was trained on.
///
/// Built once by training and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedArtifact<M = BoostedModel> {
    format_version: u32,
    model: M,
    expected_feature_columns: Vec<String>,
    base_sensor_list: Vec<String>,
}

impl<M> TrainedArtifact<M> {
    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn expected_feature_columns(&self) -> &[String] {
        &self.expected_feature_columns
    }

    pub fn base_sensor_list(&self) -> &[String] {
        &self.base_sensor_list
    }
}

impl<M: RulModel> TrainedArtifact<M> {
    /// Bundle a fitted model with its schema
    pub fn new(
        model: M,
        expected_feature_columns: Vec<String>,
        base_sensor_list: Vec<String>,
    ) -> Result<Self, ArtifactError> {
        let artifact = Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            model,
            expected_feature_columns,
            base_sensor_list,
        };
        artifact.check()?;
        Ok(artifact)
    }

    fn check(&self) -> Result<(), ArtifactError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion(self.format_version));
        }
        if self.model.n_features() != self.expected_feature_columns.len() {
            return Err(ArtifactError::SchemaMismatch {
                model: self.model.n_features(),
                columns: self.expected_feature_columns.len(),
            });
        }
        Ok(())
    }
}

impl<M> TrainedArtifact<M>
where
    M: RulModel + Serialize + DeserializeOwned,
{
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        postcard::to_allocvec(self).map_err(ArtifactError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let artifact: Self = postcard::from_bytes(bytes).map_err(ArtifactError::Decode)?;
        artifact.check()?;
        Ok(artifact)
    }

    /// Write the artifact to a single file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        info!("Saved artifact to {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    /// Read an artifact; any failure here must stop the serving process
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let artifact = Self::from_bytes(&bytes)?;
        info!(
            "Loaded artifact from {} ({} features, {} base sensors)",
            path.display(),
            artifact.expected_feature_columns.len(),
            artifact.base_sensor_list.len()
        );
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boosting::{BoostingParams, GradientBoostedTrees};
    use crate::model::RulRegressor;
    use ndarray::{Array1, Array2};

    fn small_artifact() -> TrainedArtifact {
        let x = Array2::from_shape_fn((20, 2), |(i, j)| (i * (j + 1)) as f64);
        let y = Array1::from_iter((0..20).map(|i| 125.0 - i as f64));
        let params = BoostingParams {
            n_estimators: 5,
            ..Default::default()
        };
        let model = GradientBoostedTrees::new(params).fit(x.view(), y.view()).unwrap();
        TrainedArtifact::new(
            model,
            vec!["s_2".to_string(), "s_2_diff".to_string()],
            vec!["s_2".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_save_and_load_file() {
        let artifact = small_artifact();
        let path = std::env::temp_dir().join(format!("rul-artifact-{}.bin", std::process::id()));

        artifact.save(&path).unwrap();
        let loaded = TrainedArtifact::<BoostedModel>::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, artifact);
        assert_eq!(loaded.base_sensor_list(), ["s_2".to_string()]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = TrainedArtifact::<BoostedModel>::load("/nonexistent/model.bin").unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }

    #[test]
    fn test_corrupt_bytes_rejected() {
        let mut bytes = small_artifact().to_bytes().unwrap();
        bytes.truncate(bytes.len() / 2);
        let err = TrainedArtifact::<BoostedModel>::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, ArtifactError::Decode(_)));
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let model = small_artifact().model().clone();
        let err = TrainedArtifact::new(model, vec!["s_2".to_string()], vec![]).unwrap_err();
        assert!(matches!(err, ArtifactError::SchemaMismatch { model: 2, columns: 1 }));
    }
}
