//! SongSwipe Library
//!
//! Finds Spotify playlists by tag, lets the user swipe through their tracks,
//! and collects the accepted ones into a new or an existing playlist.
//!
//! # Modules
//!
//! - `api` - HTTP routes of the local OAuth callback server
//! - `cli` - Command-line interface implementations
//! - `commit` - Writing accepted tracks to the target playlist
//! - `config` - Configuration management and environment variables
//! - `error` - Library error type
//! - `management` - Durable local state (the token store)
//! - `search` - Playlist search by tag, dedup, enrichment and sorting
//! - `server` - Local HTTP server for OAuth callbacks
//! - `session` - The track review state machine
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers

pub mod api;
pub mod cli;
pub mod commit;
pub mod config;
pub mod error;
pub mod management;
pub mod search;
pub mod server;
pub mod session;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints an informational message with a blue bullet point.
///
/// # Example
///
/// ```
/// info!("Searching playlists for {} tags...", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Only for failures the command cannot recover from; the process exits with
/// status 1 right after printing.
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
