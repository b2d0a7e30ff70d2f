//! Sample set loading and validation.

use crate::record::PlaneTemplate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Built-in plane templates, embedded at compile time.
const BUILTIN_PLANES: &str = include_str!("../data/planes.yaml");

/// Error type for sample set operations.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// Sample set file could not be read
    #[error("Failed to read sample set {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Sample set is not valid YAML or has the wrong shape
    #[error("Failed to parse sample set: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Sample set has no templates
    #[error("Sample set contains no templates")]
    Empty,

    /// A template has an out-of-range or non-finite field
    #[error("Invalid template at index {index}: {reason}")]
    InvalidTemplate { index: usize, reason: String },
}

/// A fixed, ordered set of templates that records are generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    planes: Vec<PlaneTemplate>,
}

impl SampleSet {
    /// Build a validated sample set from templates.
    pub fn new(planes: Vec<PlaneTemplate>) -> Result<Self, GeneratorError> {
        let set = Self { planes };
        set.validate()?;
        Ok(set)
    }

    /// The built-in set of 101 planes.
    pub fn builtin() -> Result<Self, GeneratorError> {
        Self::from_yaml(BUILTIN_PLANES)
    }

    /// Parse and validate a sample set from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, GeneratorError> {
        let set: SampleSet = serde_yaml::from_str(yaml)?;
        set.validate()?;
        Ok(set)
    }

    /// Load a sample set from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GeneratorError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| GeneratorError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Number of templates in the set.
    pub fn len(&self) -> usize {
        self.planes.len()
    }

    /// Always false for a validated set.
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    /// Get the template at `index`.
    pub fn get(&self, index: usize) -> Option<&PlaneTemplate> {
        self.planes.get(index)
    }

    /// All templates in replay order.
    pub fn templates(&self) -> &[PlaneTemplate] {
        &self.planes
    }

    fn validate(&self) -> Result<(), GeneratorError> {
        if self.planes.is_empty() {
            return Err(GeneratorError::Empty);
        }

        for (index, plane) in self.planes.iter().enumerate() {
            let invalid = |reason: String| GeneratorError::InvalidTemplate { index, reason };

            for (name, value) in [
                ("speed", plane.speed),
                ("dist", plane.dist),
                ("bearing", plane.bearing),
            ] {
                if !value.is_finite() {
                    return Err(invalid(format!("{name} is not finite")));
                }
            }
            if !(-180.0..=180.0).contains(&plane.lon) {
                return Err(invalid(format!("lon {} outside [-180, 180]", plane.lon)));
            }
            if !(-90.0..=90.0).contains(&plane.lat) {
                return Err(invalid(format!("lat {} outside [-90, 90]", plane.lat)));
            }
        }

        Ok(())
    }
}
