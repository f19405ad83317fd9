use crate::{
    error::Result,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest,
        CreatePlaylistResponse, Playlist, PlaylistPage, PlaylistTracksPage, Track,
    },
};

use super::{ADD_TRACKS_CHUNK, SpotifyClient};

/// Fetches every track of a playlist, following `next` links until the
/// listing is exhausted.
///
/// Removed tracks (`null` items) and local files (no id) are skipped, the
/// remaining tracks keep playlist order.
pub async fn get_tracks(client: &SpotifyClient, playlist_id: &str) -> Result<Vec<Track>> {
    let mut next = Some(format!(
        "{uri}?limit=100",
        uri = client.url(&format!("/playlists/{}/tracks", playlist_id))
    ));
    let mut tracks = Vec::new();

    while let Some(url) = next {
        let page = client.fetch::<PlaylistTracksPage>(&url).await?;
        tracks.extend(
            page.items
                .into_iter()
                .filter_map(|item| item.track)
                .filter_map(|raw| raw.into_track()),
        );
        next = page.next;
    }

    Ok(tracks)
}

/// Lists the playlists of the current user, all pages.
pub async fn get_own(client: &SpotifyClient) -> Result<Vec<Playlist>> {
    let mut next = Some(format!("{uri}?limit=50", uri = client.url("/me/playlists")));
    let mut playlists = Vec::new();

    while let Some(url) = next {
        let page = client.fetch::<PlaylistPage>(&url).await?;
        playlists.extend(page.items.into_iter().flatten());
        next = page.next;
    }

    Ok(playlists)
}

/// Creates a playlist for the current user.
pub async fn create(
    client: &SpotifyClient,
    request: &CreatePlaylistRequest,
) -> Result<CreatePlaylistResponse> {
    let response = SpotifyClient::check(client.post(&client.url("/me/playlists")).json(request))
        .await?;
    Ok(response.json::<CreatePlaylistResponse>().await?)
}

/// Appends tracks to a playlist.
///
/// The endpoint takes at most 100 URIs per call, so longer lists are sent in
/// consecutive chunks. Order is preserved. The first failing chunk aborts.
pub async fn add_tracks(client: &SpotifyClient, playlist_id: &str, uris: &[String]) -> Result<()> {
    let api_url = client.url(&format!("/playlists/{}/tracks", playlist_id));

    for chunk in uris.chunks(ADD_TRACKS_CHUNK) {
        let body = AddTrackToPlaylistRequest {
            uris: chunk.to_vec(),
        };
        let response = SpotifyClient::check(client.post(&api_url).json(&body)).await?;
        response.json::<AddTrackToPlaylistResponse>().await?;
    }

    Ok(())
}
