use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use crate::error::LoadError;

/// Default signature set, one `MAGIC:extension` entry per line, same
/// grammar as an external source list.
const BUILTIN_SIGNATURES: &str = "\
89504E47:png
FFD8FFE0:jpg
FFD8FFE1:jpg
FFD8FFDB:jpg
FFD8FFEE:jpg
47494638:gif
25504446:pdf
504B0304:zip
52617221:rar
377ABCAF:7z
49492A00:tif
4D4D002A:tif
664C6143:flac
4F676753:ogg
0061736D:wasm
CAFEBABE:class
1F8B0800:gz
1F8B0808:gz
";

/// Maps magic-number prefixes to canonical extensions.
///
/// Built once at startup, immutable afterward. Queries never fail;
/// absence is an expected outcome, not an error.
#[derive(Debug, Default)]
pub struct SignatureDatabase {
    by_magic: HashMap<String, String>,
    known_extensions: HashSet<String>,
}

impl SignatureDatabase {
    /// Loads a signature list from a file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let source_read = |source| LoadError::SourceRead {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(source_read)?;
        Self::from_reader(BufReader::new(file)).map_err(source_read)
    }

    /// Parses a signature list from a buffered reader. Malformed lines
    /// are skipped, not errors.
    pub fn from_reader(reader: impl BufRead) -> io::Result<Self> {
        let mut by_magic = HashMap::new();
        for line in reader.lines() {
            let line = line?;
            match parse_line(&line) {
                // Duplicate magic numbers: last entry wins.
                Some((magic, extension)) => {
                    by_magic.insert(magic, extension);
                }
                None => {
                    if !line.trim().is_empty() {
                        debug!(line = %line, "skipping malformed signature entry");
                    }
                }
            }
        }
        Ok(Self::from_entries(by_magic))
    }

    /// The embedded default set, used when no external list is given.
    pub fn builtin() -> Self {
        let entries = BUILTIN_SIGNATURES.lines().filter_map(parse_line).collect();
        Self::from_entries(entries)
    }

    fn from_entries(by_magic: HashMap<String, String>) -> Self {
        let known_extensions = by_magic.values().cloned().collect();
        Self {
            by_magic,
            known_extensions,
        }
    }

    /// Whether `extension` appears as a value in the database.
    ///
    /// Case-sensitive against stored lowercase extensions; callers
    /// lowercase their input first.
    pub fn is_known_extension(&self, extension: &str) -> bool {
        self.known_extensions.contains(extension)
    }

    /// Resolves an uppercase hex prefix to its extension. Exact match
    /// only.
    pub fn resolve(&self, magic: &str) -> Option<&str> {
        self.by_magic.get(magic).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_magic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_magic.is_empty()
    }
}

/// Splits `MAGIC:extension`, trimming both sides. Lines without exactly
/// two non-empty parts yield `None`.
fn parse_line(line: &str) -> Option<(String, String)> {
    let mut parts = line.split(':');
    let magic = parts.next()?.trim();
    let extension = parts.next()?.trim();
    if parts.next().is_some() || magic.is_empty() || extension.is_empty() {
        return None;
    }
    Some((magic.to_owned(), extension.to_owned()))
}
