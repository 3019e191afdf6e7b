use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to build the signature database from its source list.
///
/// Fatal to startup, never to an individual file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read signature list {}: {source}", .path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Per-file detection failure. All variants are expected outcomes and
/// recoverable at the batch level.
#[derive(Debug, Error)]
pub enum DetectError {
    /// The file's declared extension is not one the database knows about.
    /// Decided without reading any file content.
    #[error("unsupported file format: {0}")]
    UnsupportedExtension(String),

    /// The leading bytes match no registered signature.
    #[error("unrecognized magic number {0}")]
    UnrecognizedMagic(String),

    /// Fewer bytes available than a signature covers, or the read failed.
    #[error("failed to read file header: {0}")]
    Read(#[from] io::Error),
}

/// Per-file correction failure.
#[derive(Debug, Error)]
pub enum CorrectError {
    #[error(transparent)]
    Detect(#[from] DetectError),

    #[error("failed to rename {} to {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}
