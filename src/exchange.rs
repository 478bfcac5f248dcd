use std::path::Path;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use crate::file_utils::FileManager;
use crate::segment_engine::{SubstitutionRule, export_ordering};

// @module: Flat translation exchange format

// @struct: One exchange record
//
// The wire field names are fixed for compatibility with existing exchange
// files, including the historical misspelling of the translated-content
// field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslationEntry {
    // @field: Source text as extracted from the document
    #[serde(rename = "originContent")]
    pub origin_content: String,

    // @field: Replacement text; null or absent reads as empty
    #[serde(rename = "tranlastedContent", default)]
    pub tranlasted_content: Option<String>,
}

impl TranslationEntry {
    /// Creates a new entry - used by tests and external consumers
    #[allow(dead_code)]
    pub fn new(origin_content: impl Into<String>, tranlasted_content: impl Into<String>) -> Self {
        TranslationEntry {
            origin_content: origin_content.into(),
            tranlasted_content: Some(tranlasted_content.into()),
        }
    }

    /// Create an entry awaiting translation
    pub fn untranslated(origin_content: impl Into<String>) -> Self {
        TranslationEntry {
            origin_content: origin_content.into(),
            tranlasted_content: Some(String::new()),
        }
    }

    /// The replacement text, treating null/absent as empty
    pub fn replacement(&self) -> &str {
        self.tranlasted_content.as_deref().unwrap_or("")
    }
}

/// Build the export list from extracted lines, in their given order
pub fn entries_from_lines<I>(lines: I) -> Vec<TranslationEntry>
where
    I: IntoIterator<Item = String>,
{
    lines.into_iter().map(TranslationEntry::untranslated).collect()
}

/// Parse exchange JSON: records with a blank origin are dropped and the
/// survivors are put into rule application order
pub fn parse_entries(json: &str) -> Result<Vec<TranslationEntry>> {
    let mut entries: Vec<TranslationEntry> =
        serde_json::from_str(json).context("Failed to parse translation entries")?;

    entries.retain(|entry| !entry.origin_content.trim().is_empty());
    sort_entries(&mut entries);

    Ok(entries)
}

/// Read and parse an exchange file
pub fn read_entries<P: AsRef<Path>>(path: P) -> Result<Vec<TranslationEntry>> {
    let json = FileManager::read_to_string(path.as_ref())?;
    parse_entries(&json)
}

/// Serialize entries to the exchange file, pretty-printed
pub fn write_entries<P: AsRef<Path>>(path: P, entries: &[TranslationEntry]) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)
        .context("Failed to serialize translation entries")?;
    FileManager::write_to_file(path, &json)
}

/// Order entries the way the match engine consumes them: longest origin
/// first, ties broken ordinal-ascending
pub fn sort_entries(entries: &mut [TranslationEntry]) {
    entries.sort_by(|a, b| export_ordering(&a.origin_content, &b.origin_content));
}

/// Compile entries into the engine's substitution rules
pub fn rules_from_entries(entries: &[TranslationEntry]) -> Vec<SubstitutionRule> {
    SubstitutionRule::compile(
        entries
            .iter()
            .map(|entry| (entry.origin_content.clone(), entry.replacement().to_string())),
    )
}
