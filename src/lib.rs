//! Bedtime Stories - story library and generation client
//!
//! This library provides everything the `bedtime` command needs to create,
//! store, generate and read bedtime stories.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `story`: The `Story` record and its reading duration
//! - `storage`: Persistence gateway with Firestore and SQLite backends
//! - `generation`: Generation gateway asking a hosted model for stories
//! - `library`: Explicit state container updated through events
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and its handlers
//!
//! # Example
//!
//! ```no_run
//! use bedtime_stories::{Config, Library, StoryGenerator, ReadingDuration};
//! use bedtime_stories::storage::create_store;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let generator = StoryGenerator::from_config(&config.generation)?;
//!     let story = generator
//!         .generate_story(ReadingDuration::Ten, Some("a brave mouse"), None)
//!         .await?;
//!
//!     let mut library = Library::new(create_store(&config.store)?);
//!     library.save(story).await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod generation;
pub mod library;
pub mod storage;
pub mod story;

// Re-export commonly used types
pub use config::Config;
pub use error::{BedtimeError, GenerationError, RecordError, Result};
pub use generation::StoryGenerator;
pub use library::{Library, LibraryEvent, LibraryState};
pub use storage::StoryStore;
pub use story::{ReadingDuration, Story, StoryId};

#[cfg(test)]
pub mod test_utils;
