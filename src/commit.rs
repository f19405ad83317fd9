//! Writing the accepted tracks to the provider.

use crate::{
    error::{Result, SwipeError},
    spotify::SpotifyApi,
    types::{CreatePlaylistRequest, Track},
};

/// Where accepted tracks end up. Chosen before the review starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Create {
        name: String,
        description: String,
        public: bool,
    },
    Edit {
        playlist_id: String,
        name: String,
    },
}

impl Target {
    /// Checks the target on its own, before any review work is done.
    pub fn validate(&self) -> Result<()> {
        match self {
            Target::Create { name, .. } if name.trim().is_empty() => Err(SwipeError::Validation(
                "Please enter a name for the new playlist.".to_string(),
            )),
            Target::Edit { playlist_id, .. } if playlist_id.trim().is_empty() => Err(
                SwipeError::Validation("Please choose a playlist to edit.".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

/// What the confirmation shows after a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub playlist_id: String,
    pub name: String,
    pub external_url: String,
    pub tracks_added: usize,
}

/// Public link of a playlist.
pub fn playlist_link(playlist_id: &str) -> String {
    format!("https://open.spotify.com/playlist/{}", playlist_id)
}

/// Commits `accepted` to `target`.
///
/// `Create` makes the playlist first and appends only once that succeeded.
/// An append failing after the creation is reported as
/// [`SwipeError::PartialCommit`]; the empty playlist stays. `Edit` is a
/// single append. Nothing is sent when `accepted` is empty.
pub async fn commit<A: SpotifyApi + ?Sized>(
    api: &A,
    target: &Target,
    accepted: &[Track],
) -> Result<Receipt> {
    target.validate()?;
    if accepted.is_empty() {
        return Err(SwipeError::Validation(
            "No tracks to add to the playlist. Please accept some tracks first.".to_string(),
        ));
    }

    let uris: Vec<String> = accepted.iter().map(|t| t.uri.clone()).collect();

    match target {
        Target::Create {
            name,
            description,
            public,
        } => {
            let created = api
                .create_playlist(&CreatePlaylistRequest {
                    name: name.clone(),
                    description: description.clone(),
                    public: *public,
                })
                .await?;

            if let Err(e) = api.add_tracks(&created.id, &uris).await {
                return Err(SwipeError::PartialCommit {
                    playlist_id: created.id,
                    name: created.name,
                    source: Box::new(e),
                });
            }

            let external_url = created
                .external_urls
                .spotify
                .unwrap_or_else(|| playlist_link(&created.id));
            Ok(Receipt {
                playlist_id: created.id,
                name: created.name,
                external_url,
                tracks_added: uris.len(),
            })
        }
        Target::Edit { playlist_id, name } => {
            api.add_tracks(playlist_id, &uris).await?;
            Ok(Receipt {
                playlist_id: playlist_id.clone(),
                name: name.clone(),
                external_url: playlist_link(playlist_id),
                tracks_added: uris.len(),
            })
        }
    }
}
