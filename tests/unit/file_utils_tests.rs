/*!
 * Tests for file utility functions
 */

use std::fs;
use std::path::Path;
use anyhow::Result;
use doctrans::file_utils::{FileManager, FileType};
use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    // Create a temporary test file
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(temp_dir.path(), "test_file_exists.tmp", "test content")?;

    // Test that file_exists works correctly
    assert!(FileManager::file_exists(test_file.to_str().unwrap()));

    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

/// Test that generate_output_path creates the correct path
#[test]
fn test_generate_output_path_withValidInputs_shouldCreateCorrectPath() {
    let input_file = Path::new("/tmp/input/report.docx");
    let output_dir = Path::new("/tmp/output");

    let exchange_path = FileManager::generate_output_path(input_file, output_dir, "translation", "json");
    assert_eq!(exchange_path, Path::new("/tmp/output/report.translation.json"));

    let document_path = FileManager::generate_output_path(input_file, output_dir, "translated", "docx");
    assert_eq!(document_path, Path::new("/tmp/output/report.translated.docx"));
}

/// Test that dir_exists returns true for existing directories
#[test]
fn test_dir_exists_withExistingDir_shouldReturnTrue() -> Result<()> {
    // Use the current directory which definitely exists
    let current_dir = ".";

    // Test that dir_exists works correctly
    assert!(FileManager::dir_exists(current_dir));

    Ok(())
}

/// Test that dir_exists returns false for non-existent directories
#[test]
fn test_dir_exists_withNonExistentDir_shouldReturnFalse() {
    assert!(!FileManager::dir_exists("./non_existent_directory_12345"));
}

/// Test that ensure_dir creates directories as needed
#[test]
fn test_ensure_dir_withNonExistentDir_shouldCreateDirectory() -> Result<()> {
    // Create a temporary directory for testing
    let temp_dir = common::create_temp_dir()?;
    let test_subdir = temp_dir.path().join("test_subdir");

    // Ensure the subdirectory exists (should create it)
    FileManager::ensure_dir(test_subdir.to_str().unwrap())?;

    // Verify the directory was created
    assert!(test_subdir.exists());
    assert!(test_subdir.is_dir());

    Ok(())
}

/// Test that read_to_string returns file content correctly
#[test]
fn test_read_to_string_withValidFile_shouldReturnContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let content = "line one\nline two";
    let test_file = common::create_test_file(temp_dir.path(), "readable.txt", content)?;

    assert_eq!(FileManager::read_to_string(&test_file)?, content);

    Ok(())
}

/// Test that write_to_file creates parent directories as needed
#[test]
fn test_write_to_file_withNestedPath_shouldCreateParents() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested_path = temp_dir.path().join("a").join("b").join("out.json");

    FileManager::write_to_file(&nested_path, "{}")?;

    assert!(nested_path.exists());
    assert_eq!(fs::read_to_string(&nested_path)?, "{}");

    Ok(())
}

/// Test that copy_file copies content and fails on missing sources
#[test]
fn test_copy_file_withValidSource_shouldCopyContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "source.bin", "payload")?;
    let target = temp_dir.path().join("copies").join("target.bin");

    FileManager::copy_file(&source, &target)?;
    assert_eq!(fs::read_to_string(&target)?, "payload");

    let missing = temp_dir.path().join("missing.bin");
    assert!(FileManager::copy_file(&missing, &target).is_err());

    Ok(())
}

/// Test that find_files locates files by extension, case-insensitively
#[test]
fn test_find_files_withMixedExtensions_shouldMatchCaseInsensitive() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_document(temp_dir.path(), "one.docx", &[&["x"]])?;
    common::create_test_file(temp_dir.path(), "two.DOCX", "not a real container")?;
    common::create_test_file(temp_dir.path(), "three.txt", "other")?;

    let mut found = FileManager::find_files(temp_dir.path(), "docx")?;
    found.sort();

    assert_eq!(found.len(), 2);

    Ok(())
}

/// Test file type detection by extension
#[test]
fn test_detect_file_type_withKnownExtensions_shouldClassify() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let document = common::create_test_document(temp_dir.path(), "typed.docx", &[&["x"]])?;
    let xml = common::create_test_file(temp_dir.path(), "typed.xml", "<w:document/>")?;
    let json = common::create_test_file(temp_dir.path(), "typed.json", "[]")?;

    assert_eq!(FileManager::detect_file_type(&document)?, FileType::Document);
    assert_eq!(FileManager::detect_file_type(&xml)?, FileType::Xml);
    assert_eq!(FileManager::detect_file_type(&json)?, FileType::Translations);

    Ok(())
}

/// Test file type detection falls back to content sniffing
#[test]
fn test_detect_file_type_withoutExtension_shouldSniffContent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let container = temp_dir.path().join("container");
    common::write_docx(&container, &common::document_xml(""))?;
    assert_eq!(FileManager::detect_file_type(&container)?, FileType::Document);

    let xml = common::create_test_file(temp_dir.path(), "markup", "  <root/>")?;
    assert_eq!(FileManager::detect_file_type(&xml)?, FileType::Xml);

    let json = common::create_test_file(temp_dir.path(), "records", "[{}]")?;
    assert_eq!(FileManager::detect_file_type(&json)?, FileType::Translations);

    let unknown = common::create_test_file(temp_dir.path(), "opaque", "plain words")?;
    assert_eq!(FileManager::detect_file_type(&unknown)?, FileType::Unknown);

    Ok(())
}

/// Test detection errors on missing files
#[test]
fn test_detect_file_type_withMissingFile_shouldFail() {
    assert!(FileManager::detect_file_type("does_not_exist.anything").is_err());
}
