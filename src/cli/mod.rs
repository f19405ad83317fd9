//! # CLI Module
//!
//! User-facing commands of SongSwipe. Each command wires the library pieces
//! together and handles user interaction, progress feedback, and error
//! presentation.
//!
//! ## Commands
//!
//! - [`auth`] - sign in (PKCE via browser, or a pasted redirect URL)
//! - [`logout`] - forget the stored token
//! - [`search`] - search playlists by tags and print them
//! - [`playlists`] - list the user's own playlists
//! - [`create`] - search, review tracks, create a new playlist
//! - [`edit`] - pick an own playlist, search, review tracks, append to it
//!
//! ## Flow
//!
//! ```text
//! auth ──> token store ──> search ──> selection ──> review session ──> commit
//! ```
//!
//! Every command except `auth` and `logout` starts from the stored token and
//! validates it against the identity endpoint first. Without a token, or once
//! the provider answers 401, the token is dropped and the user is sent back
//! to `songswipe auth`.

use std::{
    future::Future,
    io::{self, BufRead, Write},
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::Settings,
    error,
    error::SwipeError,
    management::TokenStore,
    spotify::{
        SpotifyApi, SpotifyClient,
        auth::{AuthFlow, AuthState},
    },
    types::UserProfile,
    warning,
};

mod auth;
mod playlists;
mod review;
mod search;

pub use auth::auth;
pub use auth::logout;
pub use playlists::create;
pub use playlists::edit;
pub use playlists::playlists;
pub use review::{ReviewCommand, key_to_command};
pub use search::SearchOptions;
pub use search::search;

/// Validates the stored token and returns a client bound to it.
///
/// Exits with a hint to run `songswipe auth` when there is no usable token.
pub(crate) async fn authorized(settings: &Settings, store: &TokenStore) -> (SpotifyClient, UserProfile) {
    let mut flow = AuthFlow::from_settings(settings);
    flow.resume(store).await;

    let Some(token) = flow.pending_token() else {
        error!("Not authenticated. Please run songswipe auth");
    };
    let client = SpotifyClient::new(settings, token.access_token.clone());

    let lookup = with_spinner("Checking account...", client.current_user()).await;
    match flow.complete(lookup, store).await {
        Ok(AuthState::Authenticated { profile, .. }) => (client, profile.clone()),
        Ok(AuthState::Denied { reason }) => {
            error!("Access denied. {}\nPlease run songswipe auth", reason)
        }
        Ok(_) => error!("Not authenticated. Please run songswipe auth"),
        Err(e) => error!("Could not reach Spotify to verify the account: {}", e),
    }
}

/// Reports a failed operation and exits.
///
/// Authorization failures also drop the stored token, whichever request
/// produced them.
pub(crate) async fn fail<T>(store: &TokenStore, context: &str, e: SwipeError) -> T {
    if e.is_unauthorized() {
        forget_token(store).await;
        error!("{}: {}\nPlease run songswipe auth to sign in again", context, e);
    }
    error!("{}: {}", context, e)
}

/// Runs `fut` behind a spinner that is cleared once it resolves.
pub(crate) async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let output = fut.await;
    pb.finish_and_clear();
    output
}

/// Prints `message` and reads one trimmed line from stdin.
pub(crate) fn prompt(message: &str) -> io::Result<String> {
    print!("{} ", message);
    io::stdout().flush()?;

    read_answer(&mut io::stdin().lock())
}

/// Reads one trimmed line, failing once the input is closed.
pub fn read_answer(input: &mut impl BufRead) -> io::Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(io::ErrorKind::UnexpectedEof.into());
    }
    Ok(line.trim().to_string())
}

/// Drops the stored token, warning when the file could not be removed.
pub async fn forget_token(store: &TokenStore) {
    if let Err(e) = store.clear().await {
        warning!("Failed to remove the stored token: {}", e);
    }
}
