//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{MedConceptArgs, OutputFormat};
use crate::error::Result;
use crate::matcher::ConceptMatch;
use crate::umls::BuildStats;

/// Concepts found in one sentence.
#[derive(Debug, Serialize, Deserialize)]
pub struct SentenceConcepts {
    pub sentence: String,
    pub tokens: Vec<String>,
    pub concepts: Vec<ConceptMatch>,
}

/// Result structure for concept extraction.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractResults {
    pub sentences: Vec<SentenceConcepts>,
    pub total_concepts: usize,
}

/// Result structure for sentence encoding.
#[derive(Debug, Serialize, Deserialize)]
pub struct EncodeResults {
    pub lines: Vec<String>,
}

/// Dictionary statistics.
#[derive(Debug, Serialize, Deserialize)]
pub struct DictionaryStats {
    pub dictionary: String,
    pub terms: usize,
    pub nodes: usize,
    pub transitions: usize,
    pub vocabulary: usize,
}

/// Result structure for a UMLS dictionary build.
#[derive(Debug, Serialize, Deserialize)]
pub struct DictionaryBuildResult {
    pub output: String,
    #[serde(flatten)]
    pub stats: BuildStats,
}

/// Results that have a dedicated human-readable rendering.
pub trait HumanOutput {
    /// Print `self` for a terminal reader.
    fn print_human(&self);
}

impl HumanOutput for ExtractResults {
    fn print_human(&self) {
        for sentence in &self.sentences {
            println!("{}", sentence.sentence);
            if sentence.concepts.is_empty() {
                println!("  (no concepts)");
            }
            for concept in &sentence.concepts {
                let span = &sentence.tokens[concept.start..concept.end()];
                println!("  {} {}  [{}]", concept.cui, concept.length, span.join(" "));
            }
        }
        println!();
        println!("Total concepts: {}", self.total_concepts);
    }
}

impl HumanOutput for EncodeResults {
    fn print_human(&self) {
        for line in &self.lines {
            println!("{line}");
        }
    }
}

impl HumanOutput for DictionaryStats {
    fn print_human(&self) {
        println!("Dictionary Statistics:");
        println!("══════════════════════");
        println!("Dictionary: {}", self.dictionary);
        println!("Terms: {}", self.terms);
        println!("Trie nodes: {}", self.nodes);
        println!("Transitions: {}", self.transitions);
        println!("Vocabulary words: {}", self.vocabulary);
    }
}

impl HumanOutput for DictionaryBuildResult {
    fn print_human(&self) {
        println!("Output: {}", self.output);
        println!("Matching concepts: {}", self.stats.matching_concepts);
        println!("Name rows read: {}", self.stats.rows_read);
        println!("Terms written: {}", self.stats.terms_written);
    }
}

/// Output a result in the specified format.
pub fn output_result<T: Serialize + HumanOutput>(
    message: &str,
    result: &T,
    args: &MedConceptArgs,
) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            output_human(message, result, args);
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in human-readable format.
fn output_human<T: HumanOutput>(message: &str, result: &T, args: &MedConceptArgs) {
    if args.verbosity() > 1 {
        println!("{message}");
        println!();
    }
    result.print_human();
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &MedConceptArgs) -> Result<()> {
    println!("{}", to_json(result, args.pretty)?);
    Ok(())
}

fn to_json<T: Serialize>(result: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(json)
}
