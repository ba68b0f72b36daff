//! Startup configuration for the concept finder.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConceptError, Result};
use crate::spelling::SpellingConfig;

/// Files and correction bounds used to build a [`ConceptFinder`](crate::finder::ConceptFinder).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Concept dictionary (`CUI <field> term` lines).
    pub concept_dictionary: PathBuf,
    /// General `word frequency` list; `None` disables it.
    pub frequency_dictionary: Option<PathBuf>,
    /// Frequency given to concept vocabulary words missing from the
    /// general list.
    pub vocabulary_frequency: u64,
    /// Disable spelling correction and split sentences on whitespace only.
    pub disable_correction: bool,
    /// Corrector search bounds.
    pub spelling: SpellingConfig,
}

impl Default for FinderConfig {
    fn default() -> Self {
        FinderConfig {
            concept_dictionary: PathBuf::from("meddict"),
            frequency_dictionary: Some(PathBuf::from("frequency_dictionary_en_82_765.txt")),
            vocabulary_frequency: 1,
            disable_correction: false,
            spelling: SpellingConfig::default(),
        }
    }
}

impl FinderConfig {
    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConceptError::config(format!(
                "Failed to read configuration file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: FinderConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the correction bounds.
    pub fn validate(&self) -> Result<()> {
        if self.spelling.prefix_length == 0 {
            return Err(ConceptError::config("prefix_length must be at least 1"));
        }
        if self.spelling.max_edit_distance >= self.spelling.prefix_length {
            return Err(ConceptError::config(format!(
                "max_edit_distance ({}) must be smaller than prefix_length ({})",
                self.spelling.max_edit_distance, self.spelling.prefix_length
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = FinderConfig::default();
        assert_eq!(config.concept_dictionary, PathBuf::from("meddict"));
        assert_eq!(config.vocabulary_frequency, 1);
        assert_eq!(config.spelling.max_edit_distance, 2);
        assert_eq!(config.spelling.prefix_length, 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            r#"{{"concept_dictionary": "terms.txt", "frequency_dictionary": null,
                "spelling": {{"max_edit_distance": 1, "prefix_length": 5}}}}"#
        )
        .unwrap();
        temp_file.flush().unwrap();

        let config = FinderConfig::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.concept_dictionary, PathBuf::from("terms.txt"));
        assert!(config.frequency_dictionary.is_none());
        assert_eq!(config.spelling.max_edit_distance, 1);
        assert_eq!(config.vocabulary_frequency, 1);
    }

    #[test]
    fn test_validate_rejects_bad_bounds() {
        let mut config = FinderConfig::default();
        config.spelling.prefix_length = 2;
        assert!(matches!(config.validate(), Err(ConceptError::Config(_))));
    }
}
