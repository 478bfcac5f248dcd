/*!
 * Error types for the doctrans application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Fatal structural errors: the document cannot be understood, so the whole
/// operation is aborted rather than risking partial silent corruption
#[derive(Error, Debug)]
pub enum DocumentError {
    /// A required part is missing from the document container
    #[error("Unable to locate part within the document container: {0}")]
    MissingPart(String),

    /// A required structural anchor is missing from the content tree
    #[error("Document is missing the required {0} element")]
    MissingAnchor(&'static str),

    /// The part's XML could not be parsed or serialized
    #[error("Malformed document XML: {0}")]
    Xml(String),
}

/// Recoverable engine errors, isolated to a single paragraph
#[derive(Error, Debug)]
pub enum EngineError {
    /// A computed logical position could not be mapped back to any segment;
    /// the affected paragraph is skipped and the rest of the document is
    /// still transformed
    #[error("Logical position {position} does not map to any segment")]
    SegmentLookup {
        /// Byte offset into the paragraph's logical string
        position: usize,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from document structure
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from the replacement engine
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
