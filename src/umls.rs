//! Builds concept dictionaries from UMLS Metathesaurus tables.
//!
//! Two pipe-delimited `.RRF` files are read from a UMLS release directory:
//! `MRSTY.RRF` assigns semantic types to concepts and `MRCONSO.RRF` lists
//! concept names per source vocabulary. Names of concepts with a selected
//! semantic type, taken from selected sources, are tokenized and written
//! as `CUI priority term` lines ready for [`DictionaryLoader`](crate::dictionary::DictionaryLoader).

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use ahash::AHashSet;
use log::info;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{ConceptError, Result};

const MRSTY_FILE: &str = "MRSTY.RRF";
const MRCONSO_FILE: &str = "MRCONSO.RRF";

// MRCONSO.RRF columns.
const CONSO_CUI: usize = 0;
const CONSO_SAB: usize = 11;
const CONSO_TTY: usize = 12;
const CONSO_STR: usize = 14;

/// A source vocabulary and term type to harvest, with the priority written
/// into the dictionary's second field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePriority {
    /// Source abbreviation, e.g. `SNOMEDCT_US`.
    pub source: String,
    /// Term type, e.g. `PT` (preferred term) or `SY` (synonym).
    pub term_type: String,
    /// Value written as the dictionary's second field.
    pub priority: String,
}

impl SourcePriority {
    /// Create a new source priority entry.
    pub fn new(source: &str, term_type: &str, priority: &str) -> Self {
        SourcePriority {
            source: source.to_string(),
            term_type: term_type.to_string(),
            priority: priority.to_string(),
        }
    }
}

/// Selection of concepts and names to export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UmlsConfig {
    /// Semantic type identifiers (TUIs) whose concepts are kept.
    pub semantic_types: Vec<String>,
    /// Source vocabularies whose names are kept.
    pub sources: Vec<SourcePriority>,
}

impl Default for UmlsConfig {
    fn default() -> Self {
        UmlsConfig {
            semantic_types: [
                "T047", // Disease or Syndrome
                "T184", // Sign or Symptom
                "T046", // Pathologic Function
                "T200", // Clinical Drug
                "T121", // Pharmacologic Substance
                "T195", // Antibiotic
            ]
            .iter()
            .map(|tui| tui.to_string())
            .collect(),
            sources: vec![
                SourcePriority::new("SNOMEDCT_US", "PT", "1"),
                SourcePriority::new("SNOMEDCT_US", "SY", "1"),
            ],
        }
    }
}

/// Expands a normalized word into the spellings accepted for it.
pub trait VariantGenerator {
    /// All accepted spellings of `word`, `word` itself included.
    fn variants(&self, word: &str) -> Vec<String>;
}

/// Accepts each word only as written.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityVariants;

impl VariantGenerator for IdentityVariants {
    fn variants(&self, word: &str) -> Vec<String> {
        vec![word.to_string()]
    }
}

/// Counts reported after a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    /// Concepts with a selected semantic type.
    pub matching_concepts: usize,
    /// Concept name rows read.
    pub rows_read: usize,
    /// Dictionary lines written.
    pub terms_written: usize,
}

/// Writes concept dictionaries from UMLS tables.
pub struct UmlsDictionaryBuilder<V: VariantGenerator = IdentityVariants> {
    config: UmlsConfig,
    variants: V,
}

impl UmlsDictionaryBuilder<IdentityVariants> {
    /// Create a builder that keeps words as written.
    pub fn new(config: UmlsConfig) -> Self {
        Self::with_variants(config, IdentityVariants)
    }
}

impl<V: VariantGenerator> UmlsDictionaryBuilder<V> {
    /// Create a builder expanding words through `variants`.
    pub fn with_variants(config: UmlsConfig, variants: V) -> Self {
        UmlsDictionaryBuilder { config, variants }
    }

    /// Build `output` from the tables found in `umls_dir`.
    pub fn build_from_dir<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        umls_dir: P,
        output: Q,
    ) -> Result<BuildStats> {
        let umls_dir = umls_dir.as_ref();
        let mrsty = open_table(&umls_dir.join(MRSTY_FILE))?;
        let cuis = self.matching_cuis(mrsty)?;
        info!("{} concepts have a selected semantic type", cuis.len());

        let mrconso = open_table(&umls_dir.join(MRCONSO_FILE))?;
        let mut writer = BufWriter::new(File::create(output.as_ref())?);
        let mut stats = self.write_terms(&cuis, mrconso, &mut writer)?;
        writer.flush()?;

        stats.matching_concepts = cuis.len();
        info!(
            "Wrote {} terms from {} name rows to {}",
            stats.terms_written,
            stats.rows_read,
            output.as_ref().display()
        );
        Ok(stats)
    }

    /// CUIs whose semantic type is selected, read from `MRSTY.RRF` rows.
    pub fn matching_cuis<R: BufRead>(&self, mrsty: R) -> Result<AHashSet<String>> {
        let mut cuis = AHashSet::new();

        for (line_num, line) in mrsty.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let mut fields = line.split('|');
            let (Some(cui), Some(tui)) = (fields.next(), fields.next()) else {
                return Err(ConceptError::dictionary(format!(
                    "{MRSTY_FILE} line {}: expected CUI|TUI",
                    line_num + 1
                )));
            };
            if self.config.semantic_types.iter().any(|t| t == tui) {
                cuis.insert(cui.to_string());
            }
        }

        Ok(cuis)
    }

    /// Write one dictionary line per selected `MRCONSO.RRF` row.
    pub fn write_terms<R: BufRead, W: Write>(
        &self,
        cuis: &AHashSet<String>,
        mrconso: R,
        writer: &mut W,
    ) -> Result<BuildStats> {
        let mut stats = BuildStats::default();

        for (line_num, line) in mrconso.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            stats.rows_read += 1;

            let fields: Vec<&str> = line.split('|').collect();
            if fields.len() <= CONSO_STR {
                return Err(ConceptError::dictionary(format!(
                    "{MRCONSO_FILE} line {}: expected at least {} fields, found {}",
                    line_num + 1,
                    CONSO_STR + 1,
                    fields.len()
                )));
            }

            let cui = fields[CONSO_CUI];
            if !cuis.contains(cui) {
                continue;
            }
            let Some(source) = self.source_priority(fields[CONSO_SAB], fields[CONSO_TTY]) else {
                continue;
            };

            let term = self.format_term(fields[CONSO_STR]);
            if term.is_empty() {
                continue;
            }
            writeln!(writer, "{} {} {}", cui, source.priority, term)?;
            stats.terms_written += 1;
        }

        Ok(stats)
    }

    fn source_priority(&self, source: &str, term_type: &str) -> Option<&SourcePriority> {
        self.config
            .sources
            .iter()
            .find(|s| s.source == source && s.term_type == term_type)
    }

    /// Tokenize a concept name into dictionary term text: slots separated
    /// by spaces, variants within a slot separated by commas.
    pub fn format_term(&self, name: &str) -> String {
        normalize_words(name)
            .iter()
            .map(|word| self.variants.variants(word).join(","))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Split a concept name on word boundaries, lowercase it and strip ASCII
/// punctuation. Empty tokens are dropped.
pub fn normalize_words(text: &str) -> Vec<String> {
    text.split_word_bounds()
        .map(|segment| {
            segment
                .chars()
                .filter(|c| !c.is_ascii_punctuation() && !c.is_whitespace())
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

fn open_table(path: &Path) -> Result<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ConceptError::not_found(path.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn conso_row(cui: &str, sab: &str, tty: &str, name: &str) -> String {
        format!("{cui}|ENG|P|L1|PF|S1|Y|A1||||{sab}|{tty}|123|{name}|0|N||")
    }

    struct PluralVariants;

    impl VariantGenerator for PluralVariants {
        fn variants(&self, word: &str) -> Vec<String> {
            vec![word.to_string(), format!("{word}s")]
        }
    }

    #[test]
    fn test_normalize_words() {
        assert_eq!(normalize_words("Pain, chest"), vec!["pain", "chest"]);
        assert_eq!(
            normalize_words("Type 2 diabetes mellitus (disorder)"),
            vec!["type", "2", "diabetes", "mellitus", "disorder"]
        );
        assert!(normalize_words(" - ").is_empty());
    }

    #[test]
    fn test_matching_cuis() {
        let builder = UmlsDictionaryBuilder::new(UmlsConfig::default());
        let mrsty = Cursor::new("C001|T184|A1.2|Sign or Symptom|AT1||\nC002|T023|A1|Body Part|AT2||\n");

        let cuis = builder.matching_cuis(mrsty).unwrap();
        assert!(cuis.contains("C001"));
        assert!(!cuis.contains("C002"));
    }

    #[test]
    fn test_write_terms_filters_sources() {
        let builder = UmlsDictionaryBuilder::new(UmlsConfig::default());
        let cuis: AHashSet<String> = ["C001".to_string()].into_iter().collect();
        let rows = [
            conso_row("C001", "SNOMEDCT_US", "PT", "Chest pain"),
            conso_row("C001", "MSH", "PT", "Pain, Chest"),
            conso_row("C002", "SNOMEDCT_US", "PT", "Arm"),
            conso_row("C001", "SNOMEDCT_US", "SY", "Thoracic pain"),
        ]
        .join("\n");

        let mut output = Vec::new();
        let stats = builder
            .write_terms(&cuis, Cursor::new(rows), &mut output)
            .unwrap();

        assert_eq!(stats.rows_read, 4);
        assert_eq!(stats.terms_written, 2);
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "C001 1 chest pain\nC001 1 thoracic pain\n"
        );
    }

    #[test]
    fn test_short_rows_are_rejected() {
        let builder = UmlsDictionaryBuilder::new(UmlsConfig::default());
        let cuis = AHashSet::new();
        let result = builder.write_terms(&cuis, Cursor::new("C001|ENG|P"), &mut Vec::<u8>::new());
        assert!(matches!(result, Err(ConceptError::Dictionary(_))));
    }

    #[test]
    fn test_variants_expand_slots() {
        let builder = UmlsDictionaryBuilder::with_variants(UmlsConfig::default(), PluralVariants);
        assert_eq!(builder.format_term("Headache"), "headache,headaches");
        assert_eq!(builder.format_term("Chest pain"), "chest,chests pain,pains");
    }

    #[test]
    fn test_build_from_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join(MRSTY_FILE), "C001|T184|A1|Sign or Symptom|AT1||\n").unwrap();
        std::fs::write(
            dir.path().join(MRCONSO_FILE),
            conso_row("C001", "SNOMEDCT_US", "PT", "Headache") + "\n",
        )
        .unwrap();
        let output = dir.path().join("meddict");

        let builder = UmlsDictionaryBuilder::new(UmlsConfig::default());
        let stats = builder.build_from_dir(dir.path(), &output).unwrap();

        assert_eq!(stats.matching_concepts, 1);
        assert_eq!(stats.terms_written, 1);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "C001 1 headache\n");
    }

    #[test]
    fn test_missing_tables() {
        let dir = tempfile::TempDir::new().unwrap();
        let builder = UmlsDictionaryBuilder::new(UmlsConfig::default());
        let result = builder.build_from_dir(dir.path(), dir.path().join("out"));
        assert!(matches!(result, Err(ConceptError::NotFound(_))));
    }
}
