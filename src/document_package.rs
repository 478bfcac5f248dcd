use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use anyhow::{Context, Result};
use crate::errors::DocumentError;

// @module: DOCX container access

/// The main document part every replacement operation targets
pub const MAIN_DOCUMENT_PART: &str = "word/document.xml";

/// Part-name prefixes (under `word/`) whose XML may carry user-visible text
const TRANSLATABLE_PREFIXES: [&str; 6] = [
    "document",
    "header",
    "footer",
    "footnotes",
    "endnotes",
    "comments",
];

/// An opened DOCX container: every entry read into memory, order preserved
/// so an untouched document writes back byte-for-byte part-identical.
#[derive(Debug)]
pub struct DocumentPackage {
    parts: Vec<(String, Vec<u8>)>,
}

impl DocumentPackage {
    /// Read every entry of the container into memory, preserving order
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open document: {}", path.display()))?;
        let mut archive = zip::ZipArchive::new(file)
            .with_context(|| format!("Failed to read document container: {}", path.display()))?;

        let mut parts = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .with_context(|| format!("Failed to read container entry {}", index))?;
            if entry.is_dir() {
                continue;
            }

            let name = entry.name().to_string();
            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut bytes)
                .with_context(|| format!("Failed to read container entry: {}", name))?;
            parts.push((name, bytes));
        }

        Ok(DocumentPackage { parts })
    }

    /// Number of parts in the container
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// True when the container holds no parts
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Part names in container order
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }

    /// Bytes of a named part
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(part_name, _)| part_name.as_str() == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Bytes of the main document part
    pub fn main_document(&self) -> Result<&[u8], DocumentError> {
        self.part(MAIN_DOCUMENT_PART)
            .ok_or_else(|| DocumentError::MissingPart(MAIN_DOCUMENT_PART.to_string()))
    }

    /// Replace the bytes of a named part in place
    pub fn replace_part(&mut self, name: &str, bytes: Vec<u8>) -> Result<(), DocumentError> {
        let slot = self
            .parts
            .iter_mut()
            .find(|(part_name, _)| part_name.as_str() == name)
            .ok_or_else(|| DocumentError::MissingPart(name.to_string()))?;
        slot.1 = bytes;
        Ok(())
    }

    /// Names of every part whose XML may carry user-visible text, sorted
    /// case-insensitively for a stable extraction order
    pub fn translatable_parts(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .part_names()
            .filter(|name| Self::is_translatable_part(name))
            .map(str::to_string)
            .collect();
        names.sort_by_key(|name| name.to_ascii_lowercase());
        names
    }

    /// Whether a container entry is one of the translatable XML parts
    pub fn is_translatable_part(name: &str) -> bool {
        let lower = name.to_ascii_lowercase();

        let Some(relative) = lower.strip_prefix("word/") else {
            return false;
        };
        if lower.contains("/_rels/") {
            return false;
        }
        if !relative.ends_with(".xml") {
            return false;
        }
        if relative == "glossary/document.xml" {
            return true;
        }

        TRANSLATABLE_PREFIXES
            .iter()
            .any(|prefix| relative.starts_with(prefix))
    }

    /// Write the container back to disk, preserving entry order. The
    /// archive is assembled in a temporary file next to the target and
    /// moved into place once complete.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let directory = path.parent().filter(|p| !p.as_os_str().is_empty());

        let mut staged = match directory {
            Some(directory) => tempfile::NamedTempFile::new_in(directory),
            None => tempfile::NamedTempFile::new_in("."),
        }
        .context("Failed to create staging file for document output")?;

        {
            let mut writer = zip::ZipWriter::new(staged.as_file_mut());
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated);

            for (name, bytes) in &self.parts {
                writer
                    .start_file(name.as_str(), options)
                    .with_context(|| format!("Failed to start container entry: {}", name))?;
                writer
                    .write_all(bytes)
                    .with_context(|| format!("Failed to write container entry: {}", name))?;
            }

            writer.finish().context("Failed to finish document container")?;
        }

        staged
            .persist(path)
            .with_context(|| format!("Failed to write document: {}", path.display()))?;

        Ok(())
    }
}
