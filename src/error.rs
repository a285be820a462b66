use std::io;
use std::path::PathBuf;

/// Errors surfaced by the game core before play begins.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("word catalog is empty: at least one non-blank word is required")]
    EmptyCatalog,

    #[error("unable to read word list '{}': {source}", .path.display())]
    ReadWords {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bundled word list '{name}' not found")]
    MissingBundledList { name: String },
}

pub type Result<T> = std::result::Result<T, GameError>;
