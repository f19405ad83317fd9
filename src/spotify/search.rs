use url::Url;

use crate::{
    error::{Result, SwipeError},
    types::{FollowersResponse, Playlist, SearchResponse},
};

use super::SpotifyClient;

/// Searches playlists matching `query`, returning one page of at most `limit`.
///
/// `null` entries in the result page are dropped.
pub async fn search_playlists(
    client: &SpotifyClient,
    query: &str,
    limit: u32,
) -> Result<Vec<Playlist>> {
    let limit = limit.to_string();
    let api_url = Url::parse_with_params(
        &client.url("/search"),
        &[("q", query), ("type", "playlist"), ("limit", limit.as_str())],
    )
    .map_err(|e| SwipeError::Config(format!("Invalid API url: {}", e)))?;

    let res = client.fetch::<SearchResponse>(api_url.as_str()).await?;
    Ok(res.playlists.items.into_iter().flatten().collect())
}

/// Reads the follower total of a playlist, requesting only that field.
pub async fn get_followers(client: &SpotifyClient, playlist_id: &str) -> Result<u64> {
    let api_url = format!(
        "{uri}?fields=followers.total",
        uri = client.url(&format!("/playlists/{}", playlist_id))
    );

    let res = client.fetch::<FollowersResponse>(&api_url).await?;
    Ok(res.followers.total)
}
