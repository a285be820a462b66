use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::Path;

use crate::error::{GameError, Result};

static WORDS_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/words");

/// Name of the word list bundled into the binary.
pub const DEFAULT_LIST: &str = "default";

/// Immutable, non-empty list of candidate words.
#[derive(Debug, Clone, PartialEq)]
pub struct WordCatalog {
    words: Vec<String>,
}

impl WordCatalog {
    /// Builds a catalog from any sequence of words. Entries are trimmed and
    /// blank entries are dropped.
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_string())
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(GameError::EmptyCatalog);
        }

        Ok(Self { words })
    }

    /// One word per line; trailing blank lines are tolerated.
    pub fn from_lines(text: &str) -> Result<Self> {
        Self::new(text.lines())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GameError::ReadWords {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_lines(&text)?;
        log::info!(
            "loaded {} words from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn bundled(name: &str) -> Result<Self> {
        let text = WORDS_DIR
            .get_file(format!("{name}.txt"))
            .and_then(|f| f.contents_utf8())
            .ok_or_else(|| GameError::MissingBundledList {
                name: name.to_string(),
            })?;
        Self::from_lines(text)
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Uniform pick with replacement.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &str {
        // non-empty by construction
        self.words.choose(rng).map(String::as_str).unwrap_or_default()
    }
}
