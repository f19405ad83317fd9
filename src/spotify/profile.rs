use crate::{error::Result, types::UserProfile};

use super::SpotifyClient;

/// Looks up the owner of the client's token via `GET /me`.
///
/// Doubles as token validation: a revoked or expired token fails with
/// [`crate::error::SwipeError::Unauthorized`].
pub async fn get_current_user(client: &SpotifyClient) -> Result<UserProfile> {
    client.fetch::<UserProfile>(&client.url("/me")).await
}
