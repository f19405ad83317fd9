//! # Spotify Integration Module
//!
//! The integration layer between SongSwipe and the Spotify Web API. It owns
//! all HTTP communication and maps provider responses onto the crate's types
//! and [`SwipeError`].
//!
//! ## Architecture
//!
//! ```text
//! Application Layer (CLI, review session, search, commit)
//!          ↓
//! SpotifyApi trait
//!          ↓
//! SpotifyClient (reqwest, bearer token)
//!     ├── Authentication (PKCE, redirect parsing, validation flow)
//!     ├── Profile (identity lookup)
//!     ├── Search (playlists by tag, follower lookup)
//!     └── Playlist (tracks, create, append, own playlists)
//!          ↓
//! Spotify Web API
//! ```
//!
//! The review session, the search pass and the commit step are generic over
//! [`SpotifyApi`], so they never see HTTP and can be driven by an in-memory
//! fake in tests.
//!
//! ## Error Handling
//!
//! Every request goes through [`SpotifyClient::check`]:
//! - `401 Unauthorized` becomes [`SwipeError::Unauthorized`], regardless of
//!   which endpoint produced it
//! - any other non-success status becomes [`SwipeError::Api`] with the body
//! - transport failures surface as [`SwipeError::Request`]
//!
//! Nothing is retried. A failure is terminal for the attempted operation.
//!
//! ## API Coverage
//!
//! - `GET /me` - identity lookup
//! - `GET /search?type=playlist` - playlist search by tag
//! - `GET /playlists/{id}?fields=followers.total` - follower enrichment
//! - `GET /playlists/{id}/tracks` - playlist track listing, all pages
//! - `GET /me/playlists` - the user's own playlists, all pages
//! - `POST /me/playlists` - create playlist
//! - `POST /playlists/{id}/tracks` - append tracks, 100 per request

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    config::Settings,
    error::{Result, SwipeError},
    types::{CreatePlaylistRequest, CreatePlaylistResponse, Playlist, Track, UserProfile},
};

pub mod auth;
pub mod playlist;
pub mod profile;
pub mod search;

/// Results requested per search call.
pub const SEARCH_LIMIT: u32 = 10;

/// Upper bound of URIs the append endpoint accepts per request.
pub const ADD_TRACKS_CHUNK: usize = 100;

/// The remote operations SongSwipe needs from the provider.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// Identity of the token's owner.
    async fn current_user(&self) -> Result<UserProfile>;

    /// One page of playlists matching `query`.
    async fn search_playlists(&self, query: &str, limit: u32) -> Result<Vec<Playlist>>;

    /// Follower count of a single playlist.
    async fn playlist_followers(&self, playlist_id: &str) -> Result<u64>;

    /// Every track of a playlist, in playlist order.
    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>>;

    /// Playlists of the current user.
    async fn my_playlists(&self) -> Result<Vec<Playlist>>;

    async fn create_playlist(
        &self,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse>;

    /// Appends `uris` to the playlist, in order.
    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()>;
}

/// HTTP client for the Spotify Web API bound to one bearer token.
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    token: String,
}

impl SpotifyClient {
    pub fn new(settings: &Settings, token: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url).bearer_auth(&self.token)
    }

    fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url).bearer_auth(&self.token)
    }

    /// Sends the request and maps error statuses onto [`SwipeError`].
    async fn check(request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(SwipeError::Unauthorized);
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SwipeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = Self::check(self.get(url)).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn current_user(&self) -> Result<UserProfile> {
        profile::get_current_user(self).await
    }

    async fn search_playlists(&self, query: &str, limit: u32) -> Result<Vec<Playlist>> {
        search::search_playlists(self, query, limit).await
    }

    async fn playlist_followers(&self, playlist_id: &str) -> Result<u64> {
        search::get_followers(self, playlist_id).await
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        playlist::get_tracks(self, playlist_id).await
    }

    async fn my_playlists(&self) -> Result<Vec<Playlist>> {
        playlist::get_own(self).await
    }

    async fn create_playlist(
        &self,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse> {
        playlist::create(self, request).await
    }

    async fn add_tracks(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        playlist::add_tracks(self, playlist_id, uris).await
    }
}
