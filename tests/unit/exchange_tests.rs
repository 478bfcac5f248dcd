/*!
 * Tests for the translation exchange format
 */

use anyhow::Result;
use doctrans::exchange::{
    TranslationEntry, entries_from_lines, parse_entries, read_entries, rules_from_entries,
    sort_entries, write_entries,
};
use crate::common;

/// Test that the wire field names are preserved verbatim
#[test]
fn test_serialize_withEntry_shouldUseVerbatimFieldNames() -> Result<()> {
    let entry = TranslationEntry::new("Hello", "Bonjour");
    let json = serde_json::to_string(&entry)?;

    assert!(json.contains("\"originContent\":\"Hello\""));
    // The historical misspelling is part of the wire format
    assert!(json.contains("\"tranlastedContent\":\"Bonjour\""));
    assert!(!json.contains("translatedContent"));

    Ok(())
}

/// Test that blank origins are dropped on read
#[test]
fn test_parse_withBlankOrigins_shouldDropRecords() -> Result<()> {
    let json = r#"[
        {"originContent": "keep", "tranlastedContent": "k"},
        {"originContent": "", "tranlastedContent": "x"},
        {"originContent": "   ", "tranlastedContent": "y"}
    ]"#;

    let entries = parse_entries(json)?;

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].origin_content, "keep");

    Ok(())
}

/// Test that a null translated field reads as the empty string
#[test]
fn test_parse_withNullTranslation_shouldReadAsEmpty() -> Result<()> {
    let json = r#"[{"originContent": "a", "tranlastedContent": null}]"#;
    let entries = parse_entries(json)?;

    assert_eq!(entries[0].replacement(), "");

    Ok(())
}

/// Test that an absent translated field reads as the empty string
#[test]
fn test_parse_withAbsentTranslation_shouldReadAsEmpty() -> Result<()> {
    let json = r#"[{"originContent": "a"}]"#;
    let entries = parse_entries(json)?;

    assert_eq!(entries[0].replacement(), "");

    Ok(())
}

/// Test that parsing orders entries longest-origin-first
#[test]
fn test_parse_withMixedLengths_shouldSortIntoRuleOrder() -> Result<()> {
    let json = r#"[
        {"originContent": "b", "tranlastedContent": "1"},
        {"originContent": "aa", "tranlastedContent": "2"},
        {"originContent": "ab", "tranlastedContent": "3"}
    ]"#;

    let entries = parse_entries(json)?;
    let origins: Vec<&str> = entries.iter().map(|e| e.origin_content.as_str()).collect();

    assert_eq!(origins, vec!["aa", "ab", "b"]);

    Ok(())
}

/// Test explicit sorting of an entry list
#[test]
fn test_sort_entries_withUnsortedList_shouldOrderDeterministically() {
    let mut entries = vec![
        TranslationEntry::new("z", "1"),
        TranslationEntry::new("longest", "2"),
        TranslationEntry::new("a", "3"),
    ];

    sort_entries(&mut entries);

    assert_eq!(entries[0].origin_content, "longest");
    assert_eq!(entries[1].origin_content, "a");
    assert_eq!(entries[2].origin_content, "z");
}

/// Test building export entries from extracted lines
#[test]
fn test_entries_from_lines_withLines_shouldAwaitTranslation() {
    let entries = entries_from_lines(vec!["one".to_string(), "two".to_string()]);

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].origin_content, "one");
    assert_eq!(entries[0].replacement(), "");
}

/// Test compiling entries into substitution rules
#[test]
fn test_rules_from_entries_withEntries_shouldCompileInOrder() {
    let entries = vec![
        TranslationEntry::new("a", "Y"),
        TranslationEntry::new("ab", "X"),
    ];

    let rules = rules_from_entries(&entries);

    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].original, "ab");
    assert_eq!(rules[0].replacement, "X");
    assert_eq!(rules[1].original, "a");
}

/// Test a write/read round trip through a file
#[test]
fn test_write_read_roundtrip_withEntries_shouldPreserveContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("exchange.json");

    let entries = vec![
        TranslationEntry::new("Hello world", "Bonjour le monde"),
        TranslationEntry::new("Hi", ""),
    ];
    write_entries(&path, &entries)?;

    let read_back = read_entries(&path)?;
    assert_eq!(read_back, entries);

    // The file itself carries the verbatim field names
    let raw = std::fs::read_to_string(&path)?;
    assert!(raw.contains("originContent"));
    assert!(raw.contains("tranlastedContent"));

    Ok(())
}

/// Test that untranslated entries serialize an empty string, not null
#[test]
fn test_untranslated_entry_withSerialization_shouldWriteEmptyString() -> Result<()> {
    let entry = TranslationEntry::untranslated("source");
    let json = serde_json::to_string(&entry)?;

    assert!(json.contains("\"tranlastedContent\":\"\""));

    Ok(())
}
