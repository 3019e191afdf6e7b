use std::fs;
use std::path::{Path, PathBuf};

use crate::database::SignatureDatabase;
use crate::detector::{FormatDetector, declared_extension, file_name};
use crate::error::CorrectError;

/// Result of a single correction pass over one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The file was renamed to carry the detected extension.
    Renamed(PathBuf),
    /// The declared extension already matches the detected one.
    NoChangeNeeded,
}

/// Renames a file so its name carries the extension matching its
/// content.
///
/// The detected extension is appended after the current name; an
/// existing suffix is preserved, not replaced. `skip_when_correct`
/// opts into leaving already-correct files untouched.
pub struct ExtensionCorrector<'a> {
    detector: FormatDetector<'a>,
    skip_when_correct: bool,
}

impl<'a> ExtensionCorrector<'a> {
    pub fn new(database: &'a SignatureDatabase) -> Self {
        Self {
            detector: FormatDetector::new(database),
            skip_when_correct: false,
        }
    }

    pub fn skip_when_correct(mut self, skip: bool) -> Self {
        self.skip_when_correct = skip;
        self
    }

    /// Detects the file's true format and performs at most one rename.
    ///
    /// Detection failures propagate unchanged; a failed rename reports
    /// both paths and leaves the file as it was.
    pub fn correct(&self, path: &Path) -> Result<Outcome, CorrectError> {
        let detected = self.detector.detect(path)?;

        if self.skip_when_correct
            && declared_extension(&file_name(path)).as_deref() == Some(detected)
        {
            return Ok(Outcome::NoChangeNeeded);
        }

        let mut renamed = path.as_os_str().to_owned();
        renamed.push(".");
        renamed.push(detected);
        let renamed = PathBuf::from(renamed);

        fs::rename(path, &renamed).map_err(|source| CorrectError::Rename {
            from: path.to_path_buf(),
            to: renamed.clone(),
            source,
        })?;

        Ok(Outcome::Renamed(renamed))
    }
}
