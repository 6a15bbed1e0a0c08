//! Command-line interface definition for Bedtime Stories
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands to list, show, create, generate, and delete stories.

use crate::story::ReadingDuration;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bedtime Stories - create, generate, and read bedtime stories
///
/// Stories live in a Firestore collection (or a local SQLite file) and can
/// be drafted by a hosted language model.
#[derive(Parser, Debug, Clone)]
#[command(name = "bedtime")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the story store from config (firestore, sqlite)
    #[arg(long)]
    pub store: Option<String>,

    /// Path to the SQLite story database
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List stories, newest first
    List {
        /// Print stories as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show a single story with its content
    Show {
        /// Story id or a unique prefix of it (at least 4 characters)
        id: String,
    },

    /// Write a story by hand and save it
    Create {
        /// Story title
        #[arg(short, long, required_unless_present = "sample")]
        title: Option<String>,

        /// Reading duration in minutes (5, 10 or 15)
        #[arg(short, long, default_value = "10")]
        duration: ReadingDuration,

        /// Theme or description of the story
        #[arg(long)]
        description: Option<String>,

        /// Favorite characters to feature
        #[arg(long)]
        characters: Option<String>,

        /// Story body (markdown)
        #[arg(long, conflicts_with = "content_file")]
        content: Option<String>,

        /// Read the story body from a file
        #[arg(long)]
        content_file: Option<PathBuf>,

        /// Save a ready-made sample story instead
        #[arg(long, conflicts_with_all = ["title", "content", "content_file"])]
        sample: bool,
    },

    /// Generate a story with the language model
    Generate {
        /// Reading duration in minutes (5, 10 or 15)
        #[arg(short, long, default_value = "10")]
        duration: ReadingDuration,

        /// Theme or description of the story
        #[arg(long)]
        description: Option<String>,

        /// Favorite characters to feature
        #[arg(long)]
        characters: Option<String>,

        /// Replace the generated title
        #[arg(short, long)]
        title: Option<String>,

        /// Print the story without saving it
        #[arg(long)]
        no_save: bool,
    },

    /// Delete one or more stories
    Delete {
        /// Story ids or unique prefixes
        #[arg(required = true)]
        ids: Vec<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            store: None,
            db_path: None,
            command: Commands::List { json: false },
        }
    }
}
