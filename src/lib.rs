// Library surface for the game core; the terminal shell in main.rs builds on it.
pub mod app_dirs;
pub mod arena;
pub mod buffer;
pub mod catalog;
pub mod config;
pub mod error;
pub mod key;
pub mod runtime;
pub mod session;
pub mod word;

pub use arena::WordArena;
pub use buffer::TypingBuffer;
pub use catalog::WordCatalog;
pub use error::GameError;
pub use key::Key;
pub use session::{GameEvent, GameSession, SessionSettings};
pub use word::{ActiveWord, Point, Viewport, WordId};
