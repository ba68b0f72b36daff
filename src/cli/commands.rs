//! Command implementations for the medconcept CLI.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use log::info;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{ConceptError, Result};
use crate::finder::ConceptFinder;
use crate::protocol::{ProtocolServer, SessionEnd};
use crate::umls::{UmlsConfig, UmlsDictionaryBuilder};

/// Execute a CLI command.
pub fn execute_command(args: MedConceptArgs) -> Result<()> {
    match &args.command {
        Command::Serve => serve(&args),
        Command::Extract(sentence_args) => extract(sentence_args, &args),
        Command::Encode(sentence_args) => encode(sentence_args, &args),
        Command::BuildDictionary(build_args) => build_dictionary(build_args, &args),
        Command::Stats => show_stats(&args),
    }
}

/// Answer batch requests on stdin/stdout until input ends.
fn serve(cli_args: &MedConceptArgs) -> Result<()> {
    let finder = load_finder(cli_args)?;

    let stdin = io::stdin();
    let stdout = io::stdout();
    // A rejected request is answered on stdout and still ends with success.
    if let SessionEnd::Rejected(diagnostic) =
        ProtocolServer::new(&finder).serve(stdin.lock(), stdout.lock())?
    {
        info!("Session ended by malformed request: {diagnostic}");
    }
    Ok(())
}

/// Report the concepts of each sentence.
fn extract(args: &SentencesArgs, cli_args: &MedConceptArgs) -> Result<()> {
    let finder = load_finder(cli_args)?;
    let sentences = read_sentences(args)?;

    let results: Vec<SentenceConcepts> = sentences
        .into_iter()
        .map(|sentence| {
            let (tokens, concepts) = finder.find(&sentence);
            SentenceConcepts {
                sentence,
                tokens,
                concepts,
            }
        })
        .collect();
    let total_concepts = results.iter().map(|s| s.concepts.len()).sum();

    output_result(
        "Extracted concepts",
        &ExtractResults {
            sentences: results,
            total_concepts,
        },
        cli_args,
    )
}

/// Print each sentence with its concepts replaced by CUIs.
fn encode(args: &SentencesArgs, cli_args: &MedConceptArgs) -> Result<()> {
    let finder = load_finder(cli_args)?;
    let sentences = read_sentences(args)?;

    let lines = finder.encode(&sentences);

    output_result("Encoded sentences", &EncodeResults { lines }, cli_args)
}

/// Write a concept dictionary from the UMLS tables.
fn build_dictionary(args: &BuildDictionaryArgs, cli_args: &MedConceptArgs) -> Result<()> {
    let mut config = UmlsConfig::default();
    if !args.semantic_types.is_empty() {
        config.semantic_types = args.semantic_types.clone();
    }

    let start = Instant::now();
    let stats = UmlsDictionaryBuilder::new(config).build_from_dir(&args.umls, &args.output)?;
    info!("Dictionary built in {}ms", start.elapsed().as_millis());

    output_result(
        "Dictionary built successfully",
        &DictionaryBuildResult {
            output: args.output.to_string_lossy().to_string(),
            stats,
        },
        cli_args,
    )
}

/// Show statistics of the configured concept dictionary.
fn show_stats(cli_args: &MedConceptArgs) -> Result<()> {
    let mut config = cli_args.finder_config()?;
    config.disable_correction = true;
    let finder = ConceptFinder::from_config(&config)?;

    let dictionary = finder.dictionary();
    let index = dictionary.index();
    output_result(
        "Dictionary statistics",
        &DictionaryStats {
            dictionary: config.concept_dictionary.to_string_lossy().to_string(),
            terms: index.term_count(),
            nodes: index.node_count(),
            transitions: index.transition_count(),
            vocabulary: dictionary.vocabulary_size(),
        },
        cli_args,
    )
}

fn load_finder(cli_args: &MedConceptArgs) -> Result<ConceptFinder> {
    let config = cli_args.finder_config()?;
    let start = Instant::now();
    let finder = ConceptFinder::from_config(&config)?;
    info!("Finder ready in {}ms", start.elapsed().as_millis());
    Ok(finder)
}

/// Sentences from the command line, followed by those of the input file.
fn read_sentences(args: &SentencesArgs) -> Result<Vec<String>> {
    let mut sentences = args.sentences.clone();
    if let Some(path) = &args.input {
        sentences.extend(read_lines(path)?);
    }
    Ok(sentences)
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConceptError::not_found(path.display().to_string()),
        _ => ConceptError::Io(e),
    })?;

    let mut lines = Vec::new();
    for line in BufReader::new(file).lines() {
        lines.push(line?);
    }
    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    #[test]
    fn test_read_sentences_appends_file_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chest pain").unwrap();
        writeln!(file, "fever").unwrap();

        let args = SentencesArgs {
            sentences: vec!["headache".to_string()],
            input: Some(file.path().to_path_buf()),
        };
        assert_eq!(
            read_sentences(&args).unwrap(),
            vec!["headache", "chest pain", "fever"]
        );
    }

    #[test]
    fn test_read_sentences_missing_file() {
        let args = SentencesArgs {
            sentences: Vec::new(),
            input: Some(PathBuf::from("/nonexistent/notes.txt")),
        };
        assert!(matches!(
            read_sentences(&args),
            Err(ConceptError::NotFound(_))
        ));
    }
}
