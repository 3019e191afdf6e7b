//! Format detection from magic numbers.
//!
//! A file is only inspected when its declared extension is one the
//! database knows about; clearly out-of-scope files are rejected
//! without any I/O.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::database::SignatureDatabase;
use crate::error::DetectError;

/// Length of the byte prefix a signature covers.
pub const MAGIC_LEN: usize = 4;

/// Resolves a file's true extension from its leading bytes.
#[derive(Debug, Clone, Copy)]
pub struct FormatDetector<'a> {
    database: &'a SignatureDatabase,
}

impl<'a> FormatDetector<'a> {
    pub fn new(database: &'a SignatureDatabase) -> Self {
        Self { database }
    }

    /// Detects the extension matching the content of the file at `path`.
    ///
    /// The declared extension is checked before the file is opened;
    /// open failures and short files surface as [`DetectError::Read`].
    pub fn detect(&self, path: &Path) -> Result<&'a str, DetectError> {
        let name = file_name(path);
        self.check_declared(&name)?;
        let file = File::open(path)?;
        self.resolve_magic(&name, file)
    }

    /// Same algorithm over an already-open byte stream. `name` supplies
    /// the declared extension.
    pub fn detect_from(&self, name: &str, reader: impl Read) -> Result<&'a str, DetectError> {
        self.check_declared(name)?;
        self.resolve_magic(name, reader)
    }

    fn check_declared(&self, name: &str) -> Result<(), DetectError> {
        match declared_extension(name) {
            Some(extension) if self.database.is_known_extension(&extension) => Ok(()),
            _ => Err(DetectError::UnsupportedExtension(name.to_owned())),
        }
    }

    fn resolve_magic(&self, name: &str, reader: impl Read) -> Result<&'a str, DetectError> {
        let magic = read_magic(reader)?;
        debug!(file = name, magic = %magic, "analyzing file");
        self.database
            .resolve(&magic)
            .ok_or(DetectError::UnrecognizedMagic(magic))
    }
}

/// Declared extension: the lowercased substring after the last `.`.
/// `None` when the name carries no dot at all.
pub(crate) fn declared_extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, extension)| extension.to_ascii_lowercase())
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Reads exactly [`MAGIC_LEN`] bytes and encodes them as uppercase hex,
/// two digits per byte, matching the database key convention.
fn read_magic(mut reader: impl Read) -> Result<String, DetectError> {
    let mut prefix = [0u8; MAGIC_LEN];
    reader.read_exact(&mut prefix)?;
    Ok(hex::encode_upper(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};
    use tempfile::TempDir;

    /// Proves the extension gate runs before any content I/O.
    struct PanicReader;

    impl Read for PanicReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            panic!("content must not be read for unsupported extensions");
        }
    }

    fn test_database() -> SignatureDatabase {
        let source = "89504E47:png\n25504446:pdf\nFFD8FFE0:jpg\n";
        SignatureDatabase::from_reader(source.as_bytes()).unwrap()
    }

    #[test]
    fn test_detects_known_magic() {
        let db = test_database();
        let detector = FormatDetector::new(&db);
        let content: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

        assert_eq!(detector.detect_from("image.png", content).unwrap(), "png");
    }

    #[test]
    fn test_reports_content_not_declared_extension() {
        let db = test_database();
        let detector = FormatDetector::new(&db);
        // Declared pdf, actual content PNG.
        let content: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

        assert_eq!(detector.detect_from("doc.pdf", content).unwrap(), "png");
    }

    #[test]
    fn test_unsupported_extension_skips_read() {
        let db = test_database();
        let detector = FormatDetector::new(&db);

        let result = detector.detect_from("photo.dat", PanicReader);
        assert!(matches!(result, Err(DetectError::UnsupportedExtension(_))));
    }

    #[test]
    fn test_name_without_dot_is_unsupported() {
        let db = test_database();
        let detector = FormatDetector::new(&db);

        let result = detector.detect_from("README", PanicReader);
        assert!(matches!(result, Err(DetectError::UnsupportedExtension(_))));
    }

    #[test]
    fn test_declared_extension_is_lowercased() {
        let db = test_database();
        let detector = FormatDetector::new(&db);
        let content: &[u8] = &[0x89, 0x50, 0x4E, 0x47];

        assert_eq!(detector.detect_from("IMAGE.PNG", content).unwrap(), "png");
    }

    #[test]
    fn test_short_content_is_read_failure() {
        let db = test_database();
        let detector = FormatDetector::new(&db);
        let content: &[u8] = &[0x25, 0x50, 0x44];

        let result = detector.detect_from("doc.pdf", content);
        assert!(matches!(result, Err(DetectError::Read(_))));
    }

    #[test]
    fn test_unknown_magic() {
        let db = test_database();
        let detector = FormatDetector::new(&db);
        let content: &[u8] = &[0x00, 0x00, 0x00, 0x00];

        let result = detector.detect_from("doc.pdf", content);
        match result {
            Err(DetectError::UnrecognizedMagic(magic)) => assert_eq!(magic, "00000000"),
            other => panic!("expected UnrecognizedMagic, got {other:?}"),
        }
    }

    #[test]
    fn test_detect_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("image.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]).unwrap();
        file.sync_all().unwrap();

        let db = test_database();
        let detector = FormatDetector::new(&db);
        assert_eq!(detector.detect(&path).unwrap(), "png");
    }

    #[test]
    fn test_missing_file_is_read_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.png");

        let db = test_database();
        let detector = FormatDetector::new(&db);
        let result = detector.detect(&path);
        assert!(matches!(result, Err(DetectError::Read(_))));
    }
}
