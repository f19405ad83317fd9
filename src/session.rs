//! Track review session.
//!
//! Walks an ordered list of playlists, presenting one unseen track at a time
//! for an accept / reject / skip-playlist decision, and keeps a linear undo
//! history over those decisions.
//!
//! Only loading a playlist touches the network. Every operation that may
//! load takes `&mut self` across its await points, so two transitions can
//! never interleave, and a failed load leaves the session as it was before
//! the operation started.

use std::collections::HashSet;

use crate::{
    error::{Result, SwipeError},
    spotify::SpotifyApi,
    types::{Playlist, Track},
};

/// Position in the session: playlist index and index into its track buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub playlist: usize,
    pub track: usize,
}

/// One undoable decision, with the cursor it was taken at.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Accept { track: Track, from: Cursor },
    Reject { track: Track, from: Cursor },
    /// `on_screen` is the id of the track that was presented when skipping.
    SkipPlaylist { from: Cursor, on_screen: String },
}

impl Action {
    pub fn taken_at(&self) -> Cursor {
        match self {
            Action::Accept { from, .. }
            | Action::Reject { from, .. }
            | Action::SkipPlaylist { from, .. } => *from,
        }
    }

    /// Id of the track that was on screen when the action was taken.
    pub fn focus_id(&self) -> &str {
        match self {
            Action::Accept { track, .. } | Action::Reject { track, .. } => &track.id,
            Action::SkipPlaylist { on_screen, .. } => on_screen,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// A playlist is being fetched, decisions are refused.
    Loading,
    /// A track is on screen awaiting a decision.
    Presenting,
    /// Nothing left to review and nothing accepted.
    PlaylistExhausted,
    /// Nothing left to review, accepted tracks are ready to commit.
    AwaitingCommit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Loading,
    Presenting,
    Exhausted,
}

/// Everything but the track buffer, for comparing session states.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub cursor: Cursor,
    pub seen: HashSet<String>,
    pub accepted: Vec<Track>,
    pub rejected: Vec<Track>,
    pub history: Vec<Action>,
}

#[derive(Debug)]
pub struct ReviewSession {
    playlists: Vec<Playlist>,
    playlist_cursor: usize,
    buffer: Vec<Track>,
    /// Playlist index the buffer was fetched for.
    loaded_for: Option<usize>,
    track_cursor: usize,
    seen: HashSet<String>,
    accepted: Vec<Track>,
    rejected: Vec<Track>,
    history: Vec<Action>,
    stage: Stage,
}

impl ReviewSession {
    /// Creates a session over `playlists`, in review order.
    ///
    /// `existing` holds the track ids already in the playlist being edited,
    /// they count as seen from the start. Empty for a new playlist.
    pub fn new(playlists: Vec<Playlist>, existing: impl IntoIterator<Item = String>) -> Result<Self> {
        if playlists.is_empty() {
            return Err(SwipeError::Validation(
                "Please select at least one playlist.".to_string(),
            ));
        }

        Ok(Self {
            playlists,
            playlist_cursor: 0,
            buffer: Vec::new(),
            loaded_for: None,
            track_cursor: 0,
            seen: existing.into_iter().collect(),
            accepted: Vec::new(),
            rejected: Vec::new(),
            history: Vec::new(),
            stage: Stage::Loading,
        })
    }

    /// Loads the first playlist with unseen tracks.
    pub async fn start<A: SpotifyApi + ?Sized>(&mut self, api: &A) -> Result<Phase> {
        self.load_playlist(api, 0).await
    }

    /// Fetches the playlist at `index` and presents its first unseen track.
    ///
    /// Tracks already seen, and repeats within the playlist, are dropped. A
    /// playlist left with nothing to show is passed over silently in favour
    /// of the next one; when none is left the session is exhausted.
    pub async fn load_playlist<A: SpotifyApi + ?Sized>(
        &mut self,
        api: &A,
        index: usize,
    ) -> Result<Phase> {
        if index >= self.playlists.len() {
            return Err(SwipeError::Validation(format!(
                "No playlist at position {}",
                index + 1
            )));
        }

        let previous = self.stage;
        self.stage = Stage::Loading;
        match self.scan_from(api, index, &self.seen).await {
            Ok(Some((found, buffer))) => self.present(found, buffer, 0),
            Ok(None) => self.stage = Stage::Exhausted,
            Err(e) => {
                self.stage = previous;
                return Err(e);
            }
        }

        Ok(self.phase())
    }

    /// Re-runs the load for the current playlist, e.g. after a failed fetch.
    pub async fn reload<A: SpotifyApi + ?Sized>(&mut self, api: &A) -> Result<Phase> {
        self.load_playlist(api, self.playlist_cursor).await
    }

    pub async fn accept<A: SpotifyApi + ?Sized>(&mut self, api: &A) -> Result<Phase> {
        self.decide(api, true).await
    }

    pub async fn reject<A: SpotifyApi + ?Sized>(&mut self, api: &A) -> Result<Phase> {
        self.decide(api, false).await
    }

    /// Leaves the current playlist regardless of the tracks left in it.
    pub async fn skip_playlist<A: SpotifyApi + ?Sized>(&mut self, api: &A) -> Result<Phase> {
        let on_screen = self
            .current_track()
            .map(|t| t.id.clone())
            .ok_or(SwipeError::NotPresenting)?;

        self.history.push(Action::SkipPlaylist {
            from: self.cursor(),
            on_screen,
        });

        if let Err(e) = self.next_playlist(api).await {
            self.history.pop();
            return Err(e);
        }

        Ok(self.phase())
    }

    /// Reverses the most recent action. A no-op on an empty history.
    ///
    /// When the action's playlist is still loaded this is pure bookkeeping.
    /// Otherwise that playlist is fetched again and the cursor is restored to
    /// where the action was taken. Should the playlist have changed on the
    /// provider meanwhile, the track that was on screen is looked up by id,
    /// falling back to the first unseen track.
    pub async fn undo<A: SpotifyApi + ?Sized>(&mut self, api: &A) -> Result<Phase> {
        let Some(action) = self.history.last().cloned() else {
            return Ok(self.phase());
        };
        let from = action.taken_at();

        let still_loaded = self.loaded_for == Some(from.playlist)
            && self
                .buffer
                .get(from.track)
                .is_some_and(|t| t.id == action.focus_id());

        if still_loaded {
            self.revert_last();
            self.playlist_cursor = from.playlist;
            self.track_cursor = from.track;
            self.stage = Stage::Presenting;
            return Ok(self.phase());
        }

        // The buffer as first loaded: decisions taken inside the playlist
        // since then must not filter it, or the track cursor would shift.
        let mut seen = self.seen.clone();
        for taken in self
            .history
            .iter()
            .filter(|a| a.taken_at().playlist == from.playlist)
        {
            if let Action::Accept { track, .. } | Action::Reject { track, .. } = taken {
                seen.remove(&track.id);
            }
        }

        let previous = self.stage;
        self.stage = Stage::Loading;
        let tracks = match api.playlist_tracks(&self.playlists[from.playlist].id).await {
            Ok(tracks) => tracks,
            Err(e) => {
                self.stage = previous;
                return Err(e);
            }
        };
        let buffer = fresh_tracks(tracks, &seen);

        if buffer.is_empty() {
            // Emptied on the provider meanwhile: continue with the next
            // playlist, judged by the seen set as it is after the undo.
            let mut after = self.seen.clone();
            if let Action::Accept { track, .. } | Action::Reject { track, .. } = &action {
                after.remove(&track.id);
            }
            let next = match self.scan_from(api, from.playlist + 1, &after).await {
                Ok(next) => next,
                Err(e) => {
                    self.stage = previous;
                    return Err(e);
                }
            };

            self.revert_last();
            match next {
                Some((found, buffer)) => self.present(found, buffer, 0),
                None => {
                    self.playlist_cursor = from.playlist;
                    self.loaded_for = Some(from.playlist);
                    self.buffer = Vec::new();
                    self.track_cursor = 0;
                    self.stage = Stage::Exhausted;
                }
            }
            return Ok(self.phase());
        }

        self.revert_last();

        let track = if buffer
            .get(from.track)
            .is_some_and(|t| t.id == action.focus_id())
        {
            from.track
        } else {
            buffer
                .iter()
                .position(|t| t.id == action.focus_id())
                .unwrap_or(0)
        };
        self.present(from.playlist, buffer, track);

        Ok(self.phase())
    }

    pub fn phase(&self) -> Phase {
        match self.stage {
            Stage::Loading => Phase::Loading,
            Stage::Presenting => Phase::Presenting,
            Stage::Exhausted if self.accepted.is_empty() => Phase::PlaylistExhausted,
            Stage::Exhausted => Phase::AwaitingCommit,
        }
    }

    /// Whether the accepted tracks may be committed right now.
    pub fn can_commit(&self) -> bool {
        self.stage != Stage::Loading && !self.accepted.is_empty()
    }

    pub fn cursor(&self) -> Cursor {
        Cursor {
            playlist: self.playlist_cursor,
            track: self.track_cursor,
        }
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn current_playlist(&self) -> &Playlist {
        &self.playlists[self.playlist_cursor]
    }

    /// The track awaiting a decision, only while presenting.
    pub fn current_track(&self) -> Option<&Track> {
        match self.stage {
            Stage::Presenting => self.buffer.get(self.track_cursor),
            _ => None,
        }
    }

    /// Unseen tracks left in the current playlist, the current one included.
    pub fn remaining_in_playlist(&self) -> usize {
        match self.stage {
            Stage::Presenting => self.buffer.len() - self.track_cursor,
            _ => 0,
        }
    }

    pub fn buffer(&self) -> &[Track] {
        &self.buffer
    }

    pub fn seen(&self) -> &HashSet<String> {
        &self.seen
    }

    pub fn accepted(&self) -> &[Track] {
        &self.accepted
    }

    pub fn rejected(&self) -> &[Track] {
        &self.rejected
    }

    pub fn history(&self) -> &[Action] {
        &self.history
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            cursor: self.cursor(),
            seen: self.seen.clone(),
            accepted: self.accepted.clone(),
            rejected: self.rejected.clone(),
            history: self.history.clone(),
        }
    }

    /// Ends the session, handing over the accepted tracks in decision order.
    pub fn into_accepted(self) -> Vec<Track> {
        self.accepted
    }

    async fn decide<A: SpotifyApi + ?Sized>(&mut self, api: &A, accept: bool) -> Result<Phase> {
        let track = self
            .current_track()
            .cloned()
            .ok_or(SwipeError::NotPresenting)?;
        let from = self.cursor();

        self.seen.insert(track.id.clone());
        let action = if accept {
            self.accepted.push(track.clone());
            Action::Accept { track, from }
        } else {
            self.rejected.push(track.clone());
            Action::Reject { track, from }
        };
        self.history.push(action);

        if let Err(e) = self.advance(api).await {
            self.revert_last();
            return Err(e);
        }

        Ok(self.phase())
    }

    /// Moves to the next track, or on to the next playlist once the buffer
    /// is used up. Running out of playlists exhausts the session.
    async fn advance<A: SpotifyApi + ?Sized>(&mut self, api: &A) -> Result<()> {
        if self.track_cursor + 1 < self.buffer.len() {
            self.track_cursor += 1;
            return Ok(());
        }

        self.next_playlist(api).await
    }

    async fn next_playlist<A: SpotifyApi + ?Sized>(&mut self, api: &A) -> Result<()> {
        let next = self.playlist_cursor + 1;
        if next >= self.playlists.len() {
            self.stage = Stage::Exhausted;
            return Ok(());
        }

        let previous = self.stage;
        self.stage = Stage::Loading;
        match self.scan_from(api, next, &self.seen).await {
            Ok(Some((found, buffer))) => self.present(found, buffer, 0),
            Ok(None) => self.stage = Stage::Exhausted,
            Err(e) => {
                self.stage = previous;
                return Err(e);
            }
        }

        Ok(())
    }

    /// First playlist at or after `from` with anything outside `seen`.
    async fn scan_from<A: SpotifyApi + ?Sized>(
        &self,
        api: &A,
        from: usize,
        seen: &HashSet<String>,
    ) -> Result<Option<(usize, Vec<Track>)>> {
        for index in from..self.playlists.len() {
            let tracks = api.playlist_tracks(&self.playlists[index].id).await?;
            let buffer = fresh_tracks(tracks, seen);
            if !buffer.is_empty() {
                return Ok(Some((index, buffer)));
            }
        }

        Ok(None)
    }

    fn present(&mut self, playlist: usize, buffer: Vec<Track>, track: usize) {
        self.playlist_cursor = playlist;
        self.loaded_for = Some(playlist);
        self.buffer = buffer;
        self.track_cursor = track;
        self.stage = Stage::Presenting;
    }

    /// Pops the last action and undoes its bookkeeping, cursors untouched.
    fn revert_last(&mut self) {
        match self.history.pop() {
            Some(Action::Accept { track, .. }) => {
                self.accepted.retain(|t| t.id != track.id);
                self.seen.remove(&track.id);
            }
            Some(Action::Reject { track, .. }) => {
                self.rejected.retain(|t| t.id != track.id);
                self.seen.remove(&track.id);
            }
            Some(Action::SkipPlaylist { .. }) | None => {}
        }
    }
}

/// Drops seen tracks and repeats, keeping playlist order.
fn fresh_tracks(tracks: Vec<Track>, seen: &HashSet<String>) -> Vec<Track> {
    let mut ids = HashSet::new();
    tracks
        .into_iter()
        .filter(|t| !seen.contains(&t.id) && ids.insert(t.id.clone()))
        .collect()
}
