/*!
 * Common test utilities for the doctrans test suite
 */

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use anyhow::Result;
use tempfile::TempDir;

/// Minimal [Content_Types].xml for a test document container
pub const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

/// Minimal package relationships for a test document container
pub const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Wrap body content into a complete main document part
pub fn document_xml(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    )
}

/// Build a paragraph whose text is fragmented across one run per item
pub fn paragraph(run_texts: &[&str]) -> String {
    let runs: String = run_texts
        .iter()
        .map(|text| format!("<w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\">{}</w:t></w:r>", text))
        .collect();
    format!("<w:p>{}</w:p>", runs)
}

/// Write a minimal but valid document container with the given main part
pub fn write_docx(path: &Path, main_document_xml: &str) -> Result<()> {
    write_docx_with_parts(path, main_document_xml, &[])
}

/// Write a document container with the main part plus extra named parts
pub fn write_docx_with_parts(
    path: &Path,
    main_document_xml: &str,
    extra_parts: &[(&str, &str)],
) -> Result<()> {
    let file = fs::File::create(path)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    writer.start_file("[Content_Types].xml", options)?;
    writer.write_all(CONTENT_TYPES_XML.as_bytes())?;

    writer.start_file("_rels/.rels", options)?;
    writer.write_all(PACKAGE_RELS_XML.as_bytes())?;

    writer.start_file("word/document.xml", options)?;
    writer.write_all(main_document_xml.as_bytes())?;

    for (name, content) in extra_parts {
        writer.start_file(*name, options)?;
        writer.write_all(content.as_bytes())?;
    }

    writer.finish()?;
    Ok(())
}

/// Create a ready-to-use test document with the given paragraphs, each
/// fragmented into the given runs
pub fn create_test_document(dir: &Path, filename: &str, paragraphs: &[&[&str]]) -> Result<PathBuf> {
    let body: String = paragraphs.iter().map(|runs| paragraph(runs)).collect();
    let path = dir.join(filename);
    write_docx(&path, &document_xml(&body))?;
    Ok(path)
}
