//! Configuration loading.

use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{LsaError, Result};
use crate::lsa::annotator::{CommandAnnotator, PlainAnnotator, TaggedAnnotator};
use crate::lsa::report::ReportFormat;
use crate::lsa::token::Annotator;
use crate::utils::datastruct::trie::StopWordTrie;

/// Which annotator turns raw lines into lemma/tag tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotatorKind {
    /// whitespace split, lemma = surface form
    #[default]
    Plain,
    /// pre-tagged `word_TAG` text
    Tagged,
    /// external program (see `annotator_command`)
    Command,
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LsaConfig {
    /// Number of latent dimensions kept.
    pub rank: usize,
    /// Newline-separated stop-word list.
    pub stop_words: Option<PathBuf>,
    /// Annotator selection.
    pub annotator: AnnotatorKind,
    /// Program and arguments for the command annotator.
    pub annotator_command: Option<String>,
    /// Report encoding.
    pub format: ReportFormat,
}

impl Default for LsaConfig {
    fn default() -> Self {
        Self {
            rank: 2,
            stop_words: None,
            annotator: AnnotatorKind::default(),
            annotator_command: None,
            format: ReportFormat::default(),
        }
    }
}

impl LsaConfig {
    /// Load configuration from an explicit file path.
    ///
    /// Missing keys fall back to the defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(LsaError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load the stop-word trie, empty when no list is configured.
    pub fn load_stop_words(&self) -> Result<StopWordTrie> {
        match &self.stop_words {
            Some(path) => {
                let file = fs::File::open(path).map_err(|e| {
                    LsaError::config(format!("cannot open stop words {}: {}", path.display(), e))
                })?;
                Ok(StopWordTrie::load(std::io::BufReader::new(file))?)
            }
            None => Ok(StopWordTrie::new()),
        }
    }

    /// Build the configured annotator.
    ///
    /// # Errors
    /// * `Config` - `command` selected without `annotator_command`
    pub fn annotator(&self) -> Result<Box<dyn Annotator + Send + Sync>> {
        Ok(match self.annotator {
            AnnotatorKind::Plain => Box::new(PlainAnnotator),
            AnnotatorKind::Tagged => Box::new(TaggedAnnotator),
            AnnotatorKind::Command => {
                let command_line = self
                    .annotator_command
                    .as_deref()
                    .ok_or_else(|| LsaError::config("annotator = \"command\" requires annotator_command"))?;
                Box::new(CommandAnnotator::from_command_line(command_line)?)
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = LsaConfig::default();
        assert_eq!(config.rank, 2);
        assert_eq!(config.annotator, AnnotatorKind::Plain);
        assert_eq!(config.format, ReportFormat::Text);
        assert!(config.stop_words.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = LsaConfig::from_toml("rank = 3\nformat = \"json\"\n").unwrap();
        assert_eq!(config.rank, 3);
        assert_eq!(config.format, ReportFormat::Json);
        assert_eq!(config.annotator, AnnotatorKind::Plain);
    }

    #[test]
    fn test_from_file_and_stop_words() {
        let mut words = NamedTempFile::new().unwrap();
        writeln!(words, "The\n\n  of  \na").unwrap();

        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "annotator = \"tagged\"\nstop_words = {:?}",
            words.path().display().to_string()
        )
        .unwrap();

        let config = LsaConfig::from_file(file.path()).unwrap();
        assert_eq!(config.annotator, AnnotatorKind::Tagged);
        let trie = config.load_stop_words().unwrap();
        assert_eq!(trie.words(), vec!["a", "of", "the"]);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = LsaConfig::from_file("/nonexistent/lsa.toml").unwrap_err();
        assert!(matches!(err, LsaError::Config(_)));
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = LsaConfig::from_toml("rank = \"two\"").unwrap_err();
        assert!(matches!(err, LsaError::Config(_)));
    }

    #[test]
    fn test_command_annotator_requires_command() {
        let config = LsaConfig {
            annotator: AnnotatorKind::Command,
            ..LsaConfig::default()
        };
        assert!(matches!(config.annotator(), Err(LsaError::Config(_))));
    }
}
