//! Command line argument parsing for the medconcept CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::config::FinderConfig;
use crate::error::Result;

/// medconcept - find medical concepts in free text
#[derive(Parser, Debug, Clone)]
#[command(name = "medconcept")]
#[command(about = "Find medical concepts in free text and encode them as CUIs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct MedConceptArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format for one-shot commands
    #[arg(short = 'f', long = "format", default_value = "human", global = true)]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// JSON configuration file
    #[arg(short, long, value_name = "CONFIG_FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Concept dictionary file (`CUI <field> term` per line)
    #[arg(short, long, value_name = "DICT_FILE", env = "MEDCONCEPT_DICTIONARY", global = true)]
    pub dictionary: Option<PathBuf>,

    /// General `word frequency` list used for spelling correction
    #[arg(long, value_name = "FREQ_FILE", env = "MEDCONCEPT_FREQUENCY_DICTIONARY", global = true)]
    pub frequency_dictionary: Option<PathBuf>,

    /// Do not load a general frequency list
    #[arg(long, conflicts_with = "frequency_dictionary", global = true)]
    pub no_frequency_dictionary: bool,

    /// Maximum edit distance of a spelling correction
    #[arg(long, global = true)]
    pub max_edit_distance: Option<usize>,

    /// Prefix length used to index correction candidates
    #[arg(long, global = true)]
    pub prefix_length: Option<usize>,

    /// Split sentences on whitespace without spelling correction
    #[arg(long, global = true)]
    pub no_correction: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl MedConceptArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }

    /// The finder configuration: the config file if given, otherwise the
    /// defaults, with command line flags applied on top.
    pub fn finder_config(&self) -> Result<FinderConfig> {
        let mut config = match &self.config {
            Some(path) => FinderConfig::load_from_file(path)?,
            None => FinderConfig::default(),
        };

        if let Some(dictionary) = &self.dictionary {
            config.concept_dictionary = dictionary.clone();
        }
        if let Some(frequency) = &self.frequency_dictionary {
            config.frequency_dictionary = Some(frequency.clone());
        }
        if self.no_frequency_dictionary {
            config.frequency_dictionary = None;
        }
        if let Some(distance) = self.max_edit_distance {
            config.spelling.max_edit_distance = distance;
        }
        if let Some(length) = self.prefix_length {
            config.spelling.prefix_length = length;
        }
        if self.no_correction {
            config.disable_correction = true;
        }

        config.validate()?;
        Ok(config)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Serve batch requests on stdin/stdout
    Serve,

    /// Report the concepts found in sentences
    Extract(SentencesArgs),

    /// Rewrite sentences with concepts replaced by CUIs
    Encode(SentencesArgs),

    /// Build a concept dictionary from UMLS tables
    #[command(name = "build-dictionary")]
    BuildDictionary(BuildDictionaryArgs),

    /// Show dictionary statistics
    Stats,
}

/// Sentences given on the command line or in a file
#[derive(Parser, Debug, Clone)]
pub struct SentencesArgs {
    /// Sentences to process
    #[arg(value_name = "SENTENCE", required_unless_present = "input")]
    pub sentences: Vec<String>,

    /// File with one sentence per line
    #[arg(short, long, value_name = "INPUT_FILE")]
    pub input: Option<PathBuf>,
}

/// Arguments for building a dictionary from UMLS
#[derive(Parser, Debug, Clone)]
pub struct BuildDictionaryArgs {
    /// Directory containing MRSTY.RRF and MRCONSO.RRF
    #[arg(long, value_name = "UMLS_DIR")]
    pub umls: PathBuf,

    /// Output dictionary file
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Semantic types to keep (comma-separated TUIs)
    #[arg(long, value_delimiter = ',')]
    pub semantic_types: Vec<String>,
}

/// Output formats available in CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
