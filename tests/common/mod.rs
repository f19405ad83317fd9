#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use async_trait::async_trait;
use songswipe::{
    error::{Result, SwipeError},
    spotify::SpotifyApi,
    types::{
        CreatePlaylistRequest, CreatePlaylistResponse, ExternalUrls, Playlist, PlaylistOwner,
        Track, TrackAlbum, TrackArtist, UserProfile,
    },
};

/// A request the fake received, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CurrentUser,
    Search(String),
    Followers(String),
    Tracks(String),
    MyPlaylists,
    Create(CreatePlaylistRequest),
    Add(String, Vec<String>),
}

/// In-memory provider. Failures are switched on per playlist or endpoint.
#[derive(Default)]
pub struct FakeApi {
    pub user: Option<UserProfile>,
    pub search_results: HashMap<String, Vec<Playlist>>,
    pub followers: HashMap<String, u64>,
    pub followers_unauthorized: bool,
    pub tracks: Mutex<HashMap<String, Vec<Track>>>,
    pub failing_tracks: Mutex<HashSet<String>>,
    pub own: Vec<Playlist>,
    /// Status the append call fails with, 401 maps to `Unauthorized`.
    pub add_fails_with: Option<u16>,
    pub calls: Mutex<Vec<Call>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tracks(self, playlist_id: &str, ids: &[&str]) -> Self {
        self.tracks
            .lock()
            .unwrap()
            .insert(playlist_id.to_string(), ids.iter().map(|id| track(id)).collect());
        self
    }

    pub fn with_search(mut self, tag: &str, playlists: Vec<Playlist>) -> Self {
        self.search_results.insert(tag.to_string(), playlists);
        self
    }

    pub fn set_tracks(&self, playlist_id: &str, ids: &[&str]) {
        self.tracks
            .lock()
            .unwrap()
            .insert(playlist_id.to_string(), ids.iter().map(|id| track(id)).collect());
    }

    pub fn fail_tracks(&self, playlist_id: &str) {
        self.failing_tracks
            .lock()
            .unwrap()
            .insert(playlist_id.to_string());
    }

    pub fn heal_tracks(&self, playlist_id: &str) {
        self.failing_tracks.lock().unwrap().remove(playlist_id);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn track_fetches(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Tracks(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn status_error(status: u16) -> SwipeError {
    match status {
        401 => SwipeError::Unauthorized,
        status => SwipeError::Api {
            status,
            message: "fake failure".to_string(),
        },
    }
}

#[async_trait]
impl SpotifyApi for FakeApi {
    async fn current_user(&self) -> Result<UserProfile> {
        self.record(Call::CurrentUser);
        self.user.clone().ok_or(SwipeError::Unauthorized)
    }

    async fn search_playlists(&self, query: &str, _limit: u32) -> Result<Vec<Playlist>> {
        self.record(Call::Search(query.to_string()));
        Ok(self.search_results.get(query).cloned().unwrap_or_default())
    }

    async fn playlist_followers(&self, playlist_id: &str) -> Result<u64> {
        self.record(Call::Followers(playlist_id.to_string()));
        if self.followers_unauthorized {
            return Err(SwipeError::Unauthorized);
        }
        self.followers
            .get(playlist_id)
            .copied()
            .ok_or_else(|| status_error(404))
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        self.record(Call::Tracks(playlist_id.to_string()));
        if self.failing_tracks.lock().unwrap().contains(playlist_id) {
            return Err(status_error(500));
        }
        Ok(self
            .tracks
            .lock()
            .unwrap()
            .get(playlist_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn my_playlists(&self) -> Result<Vec<Playlist>> {
        self.record(Call::MyPlaylists);
        Ok(self.own.clone())
    }

    async fn create_playlist(&self, request: &CreatePlaylistRequest) -> Result<CreatePlaylistResponse> {
        self.record(Call::Create(request.clone()));
        Ok(CreatePlaylistResponse {
            id: "new-playlist".to_string(),
            name: request.name.clone(),
            external_urls: ExternalUrls {
                spotify: Some("https://open.spotify.com/playlist/new-playlist".to_string()),
            },
        })
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        self.record(Call::Add(playlist_id.to_string(), uris.to_vec()));
        match self.add_fails_with {
            Some(status) => Err(status_error(status)),
            None => Ok(()),
        }
    }
}

pub fn track(id: &str) -> Track {
    Track {
        id: id.to_string(),
        name: format!("Track {}", id),
        uri: format!("spotify:track:{}", id),
        artists: vec![TrackArtist {
            name: "Artist".to_string(),
        }],
        preview_url: None,
        album: TrackAlbum::default(),
    }
}

pub fn playlist(id: &str, name: &str, owner_id: &str) -> Playlist {
    Playlist {
        id: id.to_string(),
        name: name.to_string(),
        owner: PlaylistOwner {
            id: owner_id.to_string(),
            display_name: Some(owner_id.to_string()),
        },
        images: None,
        external_urls: ExternalUrls::default(),
        followers: None,
    }
}

pub fn playlists(ids: &[&str]) -> Vec<Playlist> {
    ids.iter()
        .map(|id| playlist(id, &format!("Playlist {}", id), "someone"))
        .collect()
}

pub fn ids(tracks: &[Track]) -> Vec<String> {
    tracks.iter().map(|t| t.id.clone()).collect()
}
