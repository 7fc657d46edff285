
// imports
use crate::error::{Error, Result};

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// The raw corpus: all matched files concatenated in path order.
#[derive(Clone, Debug, Default)]
pub struct LoadedText {
    pub text: String,
    pub files: Vec<PathBuf>,
    pub dropped_bytes: usize,
}

/// Reads every file with a given extension from one directory (non-recursive).
pub struct CorpusLoader {
    dir: PathBuf,
    extension: String,
}

impl CorpusLoader {

    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    // None when the directory does not exist, any other failure is an error
    fn list_files(&self) -> Result<Option<Vec<PathBuf>>> {

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Error::io(&self.dir, e)),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::io(&self.dir, e))?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str()) {
                paths.push(path);
            }
        }

        // enumeration order of read_dir is platform dependent
        paths.sort();
        Ok(Some(paths))
    }

    pub fn load(&self) -> Result<LoadedText> {

        let paths = match self.list_files()? {
            Some(paths) => paths,
            None => {
                warn!("corpus directory '{}' does not exist, returning empty corpus", self.dir.display());
                return Ok(LoadedText::default());
            }
        };

        let mut loaded = LoadedText::default();
        for path in paths {

            // one bad file does not fail the whole corpus
            let bytes = match fs::read(&path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("skipping '{}': {}", path.display(), e);
                    continue;
                }
            };

            let (text, dropped) = decode_dropping_invalid(&bytes);
            if dropped > 0 {
                warn!("'{}' had {} bytes of invalid utf-8, dropped", path.display(), dropped);
            }
            debug!("loaded '{}' ({} chars)", path.display(), text.chars().count());

            loaded.text.push_str(&text);
            loaded.dropped_bytes += dropped;
            loaded.files.push(path);
        }

        info!("loaded {} files from '{}'", loaded.files.len(), self.dir.display());
        Ok(loaded)
    }
}

/// Convenience wrapper around [`CorpusLoader::load`].
pub fn load_dir(dir: impl AsRef<Path>, extension: &str) -> Result<LoadedText> {
    CorpusLoader::new(dir.as_ref(), extension).load()
}

/// Decodes utf-8, stripping a leading byte-order mark and omitting every
/// invalid byte sequence. Returns the text and the number of omitted bytes.
pub fn decode_dropping_invalid(bytes: &[u8]) -> (String, usize) {

    let bytes = bytes.strip_prefix(BOM).unwrap_or(bytes);

    let mut text = String::with_capacity(bytes.len());
    let mut dropped = 0;
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
        dropped += chunk.invalid().len();
    }
    (text, dropped)
}
