//! Interactive track review.
//!
//! Renders the session after every step and reads single key presses in raw
//! mode. Raw mode is only held while waiting for a key, so regular output
//! and the spinner behave as usual in between.

use std::io;

use colored::Colorize;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use tabled::Table;

use crate::{
    error,
    error::SwipeError,
    management::TokenStore,
    session::{Phase, ReviewSession},
    spotify::SpotifyClient,
    types::Track,
    utils, warning,
};

use super::{fail, with_spinner};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewCommand {
    Accept,
    Reject,
    SkipPlaylist,
    Undo,
    /// Print the accepted tracks so far.
    ListAccepted,
    /// Open the preview clip of the current track in the browser.
    Preview,
    Finish,
    Quit,
}

/// Maps a key press to a review command. Releases and repeats are ignored.
pub fn key_to_command(key: KeyEvent) -> Option<ReviewCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(ReviewCommand::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Right | KeyCode::Char('a') => Some(ReviewCommand::Accept),
        KeyCode::Left | KeyCode::Char('r') => Some(ReviewCommand::Reject),
        KeyCode::Char('s') => Some(ReviewCommand::SkipPlaylist),
        KeyCode::Char('u') | KeyCode::Backspace => Some(ReviewCommand::Undo),
        KeyCode::Char('l') => Some(ReviewCommand::ListAccepted),
        KeyCode::Char('p') => Some(ReviewCommand::Preview),
        KeyCode::Char('f') | KeyCode::Enter => Some(ReviewCommand::Finish),
        KeyCode::Char('q') | KeyCode::Esc => Some(ReviewCommand::Quit),
        _ => None,
    }
}

/// Runs the review until the user finishes or quits.
///
/// Returns the accepted tracks on finish, `None` when the user quit.
pub(crate) async fn review(
    client: &SpotifyClient,
    store: &TokenStore,
    mut session: ReviewSession,
) -> Option<Vec<Track>> {
    if let Err(e) = with_spinner("Loading tracks...", session.start(client)).await {
        return fail(store, "Failed to load playlist tracks", e).await;
    }

    loop {
        render(&session);

        let command = match tokio::task::spawn_blocking(read_command).await {
            Ok(Ok(command)) => command,
            Ok(Err(e)) => error!("Failed to read key press: {}", e),
            Err(e) => error!("Key reader stopped: {}", e),
        };

        if session.phase() == Phase::Loading && command != ReviewCommand::Quit {
            let result = with_spinner("Loading tracks...", session.reload(client)).await;
            report(store, result).await;
            continue;
        }

        let result = match command {
            ReviewCommand::Accept => with_spinner("Loading...", session.accept(client)).await,
            ReviewCommand::Reject => with_spinner("Loading...", session.reject(client)).await,
            ReviewCommand::SkipPlaylist => {
                with_spinner("Loading tracks...", session.skip_playlist(client)).await
            }
            ReviewCommand::Undo => {
                if session.history().is_empty() {
                    warning!("Nothing to undo.");
                    continue;
                }
                with_spinner("Loading...", session.undo(client)).await
            }
            ReviewCommand::ListAccepted => {
                list_accepted(session.accepted());
                continue;
            }
            ReviewCommand::Preview => {
                preview(session.current_track());
                continue;
            }
            ReviewCommand::Finish => {
                if session.can_commit() {
                    return Some(session.into_accepted());
                }
                warning!("No tracks accepted yet.");
                continue;
            }
            ReviewCommand::Quit => return None,
        };

        report(store, result).await;
    }
}

async fn report(store: &TokenStore, result: crate::error::Result<Phase>) {
    match result {
        Ok(_) => {}
        Err(e) if e.is_unauthorized() => fail(store, "Session expired", e).await,
        Err(SwipeError::NotPresenting) => warning!("No track on screen."),
        Err(e) => warning!("{}. Please try again.", e),
    }
}

fn read_command() -> io::Result<ReviewCommand> {
    enable_raw_mode()?;
    let command = loop {
        match event::read() {
            Ok(Event::Key(key)) => {
                if let Some(command) = key_to_command(key) {
                    break Ok(command);
                }
            }
            Ok(_) => {}
            Err(e) => break Err(e),
        }
    };
    disable_raw_mode()?;
    command
}

fn render(session: &ReviewSession) {
    let accepted = session.accepted().len();
    let rejected = session.rejected().len();
    println!();

    match session.phase() {
        Phase::Presenting => {
            let playlist = session.current_playlist();
            println!(
                "{} {}/{}: {} {} {}",
                "Playlist".bold(),
                session.cursor().playlist + 1,
                session.playlists().len(),
                playlist.name.bold(),
                format!("by {}", playlist.owner.name()).dimmed(),
                format!("({} left)", session.remaining_in_playlist()).dimmed(),
            );
            if let Some(cover) = playlist.cover_art() {
                println!("  {} {}", "Playlist cover:".dimmed(), cover);
            }

            if let Some(track) = session.current_track() {
                println!("  {} {}", "♪".green(), track.name.bold());
                println!("    {}", track.artist_names());
                match &track.preview_url {
                    Some(url) => println!("    {} {}", "Preview:".dimmed(), url),
                    None => println!("    {}", "No preview available".dimmed()),
                }
                if let Some(art) = track.album_art() {
                    println!("    {} {}", "Cover:".dimmed(), art);
                }
            }

            println!("  Accepted {} · Rejected {}", accepted, rejected);
            println!(
                "{}",
                "  [→/a] accept  [←/r] reject  [s] skip playlist  [u] undo  [p] preview  [l] list  [f] finish  [q] quit"
                    .dimmed()
            );
        }
        Phase::AwaitingCommit => {
            println!(
                "All playlists reviewed. {} tracks accepted, {} rejected.",
                accepted, rejected
            );
            println!("{}", "  [f] save  [u] undo  [l] list  [q] quit".dimmed());
        }
        Phase::PlaylistExhausted => {
            println!("All playlists reviewed, no tracks accepted.");
            println!("{}", "  [u] undo  [q] quit".dimmed());
        }
        Phase::Loading => {
            println!("The playlist could not be loaded.");
            println!("{}", "  [u] retry  [q] quit".dimmed());
        }
    }
}

fn list_accepted(accepted: &[Track]) {
    if accepted.is_empty() {
        warning!("No tracks accepted yet.");
        return;
    }
    println!("{}", Table::new(utils::track_rows(accepted)));
}

fn preview(track: Option<&Track>) {
    match track.and_then(|t| t.preview_url.as_deref()) {
        Some(url) => {
            if webbrowser::open(url).is_err() {
                warning!("Failed to open browser. Preview: {}", url);
            }
        }
        None => warning!("No preview available for this track."),
    }
}
