use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use log::{info, warn};
use serde::Serialize;
use crate::errors::{ArtifactError, ForecastError};
use crate::models::artifact::ModelArtifact;

/// The weather variables that each have their own model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    Temperature,
    Precipitation,
    Humidity,
    Cloud,
    Wind,
}

/// Implementation of the Display Trait for pretty print
impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Variable {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Variable::ALL.into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| ForecastError::UnknownVariable(s.to_string()))
    }
}

impl Variable {
    pub const ALL: [Variable; 5] = [
        Variable::Temperature,
        Variable::Precipitation,
        Variable::Humidity,
        Variable::Cloud,
        Variable::Wind,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Variable::Temperature   => "temperature",
            Variable::Precipitation => "precipitation",
            Variable::Humidity      => "humidity",
            Variable::Cloud         => "cloud",
            Variable::Wind          => "wind",
        }
    }

    /// Artifact file names in order of preference
    pub fn file_candidates(&self) -> &'static [&'static str] {
        match self {
            Variable::Temperature   => &["temperature_model_finetuned.json", "temperature_model_full.json"],
            Variable::Precipitation => &["precipitation_model_full.json"],
            Variable::Humidity      => &["humidity_model_full.json"],
            Variable::Cloud         => &["cloud_model_full.json"],
            Variable::Wind          => &["wind_model_full.json"],
        }
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

/// Returns the models directory used when none is configured: `../data/Modis` when running
/// from a directory named `prediction`, `backend/data/Modis` otherwise
pub fn default_models_dir() -> PathBuf {
    let in_prediction = env::current_dir()
        .ok()
        .and_then(|d| d.file_name().map(|n| n == "prediction"))
        .unwrap_or(false);

    if in_prediction {
        PathBuf::from("../data/Modis")
    } else {
        PathBuf::from("backend/data/Modis")
    }
}

/// Returns the first existing artifact file for the variable
///
/// # Arguments
///
/// * 'dir' - directory holding the artifact files
/// * 'variable' - the variable to find an artifact for
pub fn resolve_artifact_path(dir: &Path, variable: Variable) -> Result<PathBuf, ArtifactError> {
    variable.file_candidates().iter()
        .map(|f| dir.join(f))
        .find(|p| p.exists())
        .ok_or(ArtifactError::NotFound(variable))
}

/// Holds the five model artifacts. Each artifact is read from disk the first time it is
/// asked for and kept for the life of the registry, also when loading failed.
///
/// The registry is shared read-only between predictions; concurrent first calls still load
/// each artifact exactly once.
pub struct ModelRegistry {
    dir: PathBuf,
    slots: [OnceLock<Option<ModelArtifact>>; 5],
}

impl ModelRegistry {
    /// Returns a registry that lazily loads artifacts from the given directory
    ///
    /// # Arguments
    ///
    /// * 'dir' - directory holding the artifact files
    pub fn new(dir: impl Into<PathBuf>) -> ModelRegistry {
        ModelRegistry {
            dir: dir.into(),
            slots: std::array::from_fn(|_| OnceLock::new()),
        }
    }

    /// Returns a registry holding the given artifacts. Variables not given are unavailable
    /// and never read from disk.
    ///
    /// # Arguments
    ///
    /// * 'artifacts' - already loaded artifacts per variable
    pub fn from_artifacts(artifacts: Vec<(Variable, ModelArtifact)>) -> ModelRegistry {
        let registry = ModelRegistry::new(PathBuf::new());
        for (variable, artifact) in artifacts {
            let _ = registry.slots[variable.index()].set(Some(artifact));
        }
        for slot in registry.slots.iter() {
            let _ = slot.set(None);
        }

        registry
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the artifact for a variable, loading it on first call.
    /// `None` means the artifact is missing or could not be read.
    ///
    /// # Arguments
    ///
    /// * 'variable' - the variable to get the model for
    pub fn get(&self, variable: Variable) -> Option<&ModelArtifact> {
        self.slots[variable.index()]
            .get_or_init(|| self.load(variable))
            .as_ref()
    }

    /// Same as `get` but with the variable given by name
    ///
    /// # Arguments
    ///
    /// * 'name' - one of temperature, precipitation, humidity, cloud or wind
    pub fn get_by_name(&self, name: &str) -> Result<Option<&ModelArtifact>, ForecastError> {
        Ok(self.get(Variable::from_str(name)?))
    }

    /// Loads all artifacts and returns how many are available
    pub fn preload(&self) -> usize {
        let available = Variable::ALL.iter().filter(|v| self.get(**v).is_some()).count();
        info!("{} of {} weather models available", available, Variable::ALL.len());

        available
    }

    fn load(&self, variable: Variable) -> Option<ModelArtifact> {
        let result = resolve_artifact_path(&self.dir, variable)
            .and_then(|path| ModelArtifact::load(&path).map(|a| (path, a)));

        match result {
            Ok((path, artifact)) => {
                info!("{} model loaded from {}", variable, path.display());
                Some(artifact)
            }
            Err(e) => {
                warn!("{} model unavailable: {}", variable, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use super::*;
    use crate::models::artifact::tests::constant_artifact;

    fn write_artifact(dir: &Path, file: &str, value: f64) {
        let json = serde_json::to_string(&constant_artifact(value)).unwrap();
        fs::write(dir.join(file), json).unwrap();
    }

    #[test]
    fn parses_variable_names() {
        for v in Variable::ALL {
            assert_eq!(Variable::from_str(v.name()).unwrap(), v);
        }
        assert!(matches!(Variable::from_str("pressure"), Err(ForecastError::UnknownVariable(_))));
    }

    #[test]
    fn loads_available_and_marks_missing() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "temperature_model_full.json", 12.0);
        write_artifact(dir.path(), "wind_model_full.json", 335.0);
        fs::write(dir.path().join("humidity_model_full.json"), "{ not json").unwrap();

        let registry = ModelRegistry::new(dir.path());
        assert_eq!(registry.preload(), 2);
        assert_eq!(registry.get(Variable::Temperature).unwrap().predict(&[1.0]).unwrap(), 12.0);
        assert!(registry.get(Variable::Humidity).is_none());
        assert!(registry.get(Variable::Precipitation).is_none());
        assert!(registry.get_by_name("wind").unwrap().is_some());
    }

    #[test]
    fn prefers_finetuned_temperature() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "temperature_model_full.json", 1.0);
        write_artifact(dir.path(), "temperature_model_finetuned.json", 2.0);

        let registry = ModelRegistry::new(dir.path());
        assert_eq!(registry.get(Variable::Temperature).unwrap().predict(&[1.0]).unwrap(), 2.0);
    }

    #[test]
    fn loads_once_and_keeps_result() {
        let dir = tempfile::tempdir().unwrap();
        let registry = ModelRegistry::new(dir.path());
        assert!(registry.get(Variable::Cloud).is_none());

        // Files appearing later are not picked up by the same registry
        write_artifact(dir.path(), "cloud_model_full.json", 5.0);
        assert!(registry.get(Variable::Cloud).is_none());
        assert!(ModelRegistry::new(dir.path()).get(Variable::Cloud).is_some());
    }

    #[test]
    fn injected_artifacts_skip_disk() {
        let registry = ModelRegistry::from_artifacts(vec![(Variable::Temperature, constant_artifact(3.0))]);
        assert!(registry.get(Variable::Temperature).is_some());
        assert!(registry.get(Variable::Wind).is_none());
    }

    #[test]
    fn concurrent_first_access() {
        let dir = tempfile::tempdir().unwrap();
        write_artifact(dir.path(), "temperature_model_full.json", 7.0);
        let registry = ModelRegistry::new(dir.path());

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| assert!(registry.get(Variable::Temperature).is_some()));
            }
        });
    }
}
