use anyhow::{Result, Context};
use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::document_package::{DocumentPackage, MAIN_DOCUMENT_PART};
use crate::document_tree::{
    self, XmlDocument, collect_container_lines, collect_literal_text_mut, collect_paragraphs_mut,
    collect_raw_text_runs, document_body, document_body_mut,
};
use crate::exchange::{self, TranslationEntry};
use crate::file_utils::{FileManager, FileType};
use crate::segment_engine::{
    LineCollector, SubstitutionRule, apply_rules, build_segments, is_ascii_only, logical_string,
};

// @module: Application controller for document translation round trips

/// Outcome counters for one document's replacement pass
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplaceStats {
    /// Paragraphs carrying at least one literal text run
    pub paragraphs: usize,
    /// Paragraphs whose logical string changed
    pub changed: usize,
    /// Paragraphs skipped because a logical position failed to map
    pub skipped: usize,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Extract translatable lines from a document or a directory of documents
    pub fn run_extract(&self, input_path: &Path, output: Option<PathBuf>, force_overwrite: bool) -> Result<()> {
        if input_path.is_dir() {
            return self.run_extract_folder(input_path, force_overwrite);
        }
        if !input_path.is_file() {
            return Err(anyhow::anyhow!("Input path does not exist: {:?}", input_path));
        }

        self.extract_file(input_path, output, force_overwrite)
    }

    fn extract_file(&self, input_file: &Path, output: Option<PathBuf>, force_overwrite: bool) -> Result<()> {
        let output_path = output.unwrap_or_else(|| {
            let output_dir = input_file.parent().unwrap_or(Path::new("."));
            FileManager::generate_output_path(input_file, output_dir, "translation", "json")
        });

        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, extraction already exists (use -f to force overwrite)");
            return Ok(());
        }

        info!("🔍 Extracting translatable text from: {:?}", input_file);

        let lines = self.extract_lines(input_file)?;
        if lines.is_empty() {
            warn!("No translatable text found in {:?}", input_file);
        }

        let entries = exchange::entries_from_lines(lines);
        exchange::write_entries(&output_path, &entries)?;

        info!("Success: {} ({} entries)", output_path.display(), entries.len());
        Ok(())
    }

    /// Extract the normalized lines of one input, dispatching on its type
    pub fn extract_lines(&self, input_file: &Path) -> Result<Vec<String>> {
        match FileManager::detect_file_type(input_file)? {
            FileType::Document => self.extract_from_package(input_file),
            FileType::Xml => self.extract_from_raw_xml(input_file),
            other => Err(anyhow::anyhow!(
                "Unsupported input type {:?} for extraction: {:?}",
                other,
                input_file
            )),
        }
    }

    fn line_collector(&self) -> LineCollector {
        let dedup = self.config.extraction.dedup;
        if self.config.extraction.only_translatable {
            LineCollector::with_skip_predicate(dedup, is_ascii_only)
        } else {
            LineCollector::new(dedup)
        }
    }

    fn extract_from_package(&self, input_file: &Path) -> Result<Vec<String>> {
        let package = DocumentPackage::open(input_file)?;

        let part_names: Vec<String> = if self.config.extraction.all_parts {
            package.translatable_parts()
        } else {
            package.main_document()?;
            vec![MAIN_DOCUMENT_PART.to_string()]
        };

        if part_names.is_empty() {
            return Err(crate::errors::DocumentError::MissingPart(MAIN_DOCUMENT_PART.to_string()).into());
        }

        let mut collector = self.line_collector();

        for part_name in &part_names {
            let bytes = package
                .part(part_name)
                .ok_or_else(|| crate::errors::DocumentError::MissingPart(part_name.clone()))?;
            let xml = String::from_utf8_lossy(bytes);
            let document = XmlDocument::parse(&xml)?;

            // The main document part must have its body anchor; auxiliary
            // parts (headers, footnotes, ...) have their own root containers
            let container = if part_name == MAIN_DOCUMENT_PART {
                document_body(&document)?
            } else {
                match document.root() {
                    Some(root) => root,
                    None => {
                        debug!("Part {} has no root element, skipping", part_name);
                        continue;
                    }
                }
            };

            collect_container_lines(container, &mut collector);
        }

        debug!("Collected {} lines from {} part(s)", collector.len(), part_names.len());
        Ok(collector.finish(self.config.extraction.sorted))
    }

    fn extract_from_raw_xml(&self, input_file: &Path) -> Result<Vec<String>> {
        let xml = FileManager::read_to_string(input_file)?;

        let mut collector = self.line_collector();
        collect_raw_text_runs(&xml, &mut collector);

        Ok(collector.finish(self.config.extraction.sorted))
    }

    /// Apply a translation exchange file to a document or a directory of documents
    pub fn run_replace(
        &self,
        input_path: &Path,
        translations_path: &Path,
        output: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<()> {
        let entries = exchange::read_entries(translations_path)?;

        if input_path.is_dir() {
            return self.run_replace_folder(input_path, &entries, force_overwrite);
        }
        if !input_path.is_file() {
            return Err(anyhow::anyhow!("Input path does not exist: {:?}", input_path));
        }

        self.replace_file(input_path, &entries, output, force_overwrite)
    }

    fn replace_file(
        &self,
        input_file: &Path,
        entries: &[TranslationEntry],
        output: Option<PathBuf>,
        force_overwrite: bool,
    ) -> Result<()> {
        let output_path = output.unwrap_or_else(|| {
            let output_dir = input_file.parent().unwrap_or(Path::new("."));
            FileManager::generate_output_path(input_file, output_dir, "translated", "docx")
        });

        if output_path.exists() && !force_overwrite {
            warn!("Skipping file, translation already exists (use -f to force overwrite)");
            return Ok(());
        }

        let rules = exchange::rules_from_entries(entries);
        if rules.is_empty() {
            // Zero usable rules: the document is copied through unchanged
            FileManager::copy_file(input_file, &output_path)?;
            info!("No translations to apply, copied document unchanged: {}", output_path.display());
            return Ok(());
        }

        info!("🔁 Applying {} translation(s) to: {:?}", rules.len(), input_file);

        let start_time = std::time::Instant::now();

        let mut package = DocumentPackage::open(input_file)?;
        let xml = String::from_utf8_lossy(package.main_document()?).into_owned();

        let mut document = XmlDocument::parse(&xml)?;
        let stats = {
            let body = document_body_mut(&mut document)?;
            self.replace_in_container(body, &rules)
        };

        document.ensure_declaration();
        let rewritten = document.to_bytes()?;
        package.replace_part(MAIN_DOCUMENT_PART, rewritten)?;
        package.save(&output_path)?;

        if stats.skipped > 0 {
            warn!(
                "Skipped {} of {} paragraph(s) that could not be mapped back to runs",
                stats.skipped, stats.paragraphs
            );
        }

        info!(
            "Success: {} ({} of {} paragraphs rewritten in {})",
            output_path.display(),
            stats.changed,
            stats.paragraphs,
            Self::format_duration(start_time.elapsed())
        );

        Ok(())
    }

    /// Rewrite every paragraph under a container against the rule list.
    /// Paragraphs whose positions fail to map are left untouched; the rest
    /// of the document is still transformed.
    pub fn replace_in_container(&self, container: &mut document_tree::Element, rules: &[SubstitutionRule]) -> ReplaceStats {
        let mut paragraphs = Vec::new();
        collect_paragraphs_mut(container, &mut paragraphs);

        let progress_bar = ProgressBar::new(paragraphs.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} paragraphs ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Rewriting");

        let mut stats = ReplaceStats::default();

        for paragraph in paragraphs {
            progress_bar.inc(1);

            let mut text_runs = Vec::new();
            collect_literal_text_mut(paragraph, &mut text_runs);
            if text_runs.is_empty() {
                continue;
            }

            stats.paragraphs += 1;

            let mut segments = build_segments(text_runs.iter().map(|run| run.text_value()));
            let before = logical_string(&segments);

            match apply_rules(&mut segments, rules, self.config.redistribution) {
                Ok(()) => {
                    if logical_string(&segments) != before {
                        for (run, segment) in text_runs.iter_mut().zip(&segments) {
                            run.set_text(&segment.text);
                        }
                        stats.changed += 1;
                    }
                }
                Err(e) => {
                    warn!("Skipping paragraph: {}", e);
                    stats.skipped += 1;
                }
            }
        }

        progress_bar.finish_and_clear();
        stats
    }

    /// Run extraction over every document in a directory
    pub fn run_extract_folder(&self, input_dir: &Path, force_overwrite: bool) -> Result<()> {
        let start_time = std::time::Instant::now();

        let documents = Self::find_documents(input_dir)?;
        info!("Found {} document(s) in {:?}", documents.len(), input_dir);

        let folder_pb = Self::folder_progress_bar(documents.len());

        let mut success_count = 0;
        let mut error_count = 0;

        for document in &documents {
            let file_name = document.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Extracting: {}", file_name));

            match self.extract_file(document, None, force_overwrite) {
                Ok(_) => success_count += 1,
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    error_count += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder extraction complete");

        info!(
            "Folder extraction completed: {} processed, {} errors in {}",
            success_count,
            error_count,
            Self::format_duration(start_time.elapsed())
        );

        Ok(())
    }

    /// Run replacement over every document in a directory
    fn run_replace_folder(&self, input_dir: &Path, entries: &[TranslationEntry], force_overwrite: bool) -> Result<()> {
        let start_time = std::time::Instant::now();

        let documents = Self::find_documents(input_dir)?;
        info!("Found {} document(s) in {:?}", documents.len(), input_dir);

        let folder_pb = Self::folder_progress_bar(documents.len());

        let mut success_count = 0;
        let mut error_count = 0;

        for document in &documents {
            let file_name = document.file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Translating: {}", file_name));

            match self.replace_file(document, entries, None, force_overwrite) {
                Ok(_) => success_count += 1,
                Err(e) => {
                    error!("Error processing file {}: {}", file_name, e);
                    error_count += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder translation complete");

        info!(
            "Folder translation completed: {} processed, {} errors in {}",
            success_count,
            error_count,
            Self::format_duration(start_time.elapsed())
        );

        Ok(())
    }

    /// Find all documents in a directory (recursive)
    fn find_documents(input_dir: &Path) -> Result<Vec<PathBuf>> {
        if !input_dir.exists() {
            return Err(anyhow::anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let documents = FileManager::find_files(input_dir, "docx")
            .with_context(|| format!("Failed to scan directory: {:?}", input_dir))?;

        if documents.is_empty() {
            return Err(anyhow::anyhow!("No documents found in directory: {:?}", input_dir));
        }

        Ok(documents)
    }

    fn folder_progress_bar(total: usize) -> ProgressBar {
        let progress_bar = ProgressBar::new(total as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Processing files");
        progress_bar
    }

    // Format duration in a human-readable format (HH:MM:SS)
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
