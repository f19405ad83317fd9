//! Playlist search by tag.
//!
//! A search issues one provider query per tag, merges the pages with
//! first-occurrence-wins deduplication, drops the user's own playlists, and
//! optionally enriches every survivor with its follower count. Sorting is a
//! pure function over the assembled list.

use std::{cmp::Ordering, collections::HashSet, fmt};

use clap::ValueEnum;
use futures_util::future::join_all;

use crate::{
    error::{Result, SwipeError},
    spotify::{SEARCH_LIMIT, SpotifyApi},
    types::Playlist,
};

/// Owner id of the provider's own editorial account.
pub const PLATFORM_OWNER_ID: &str = "spotify";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortMode {
    /// Provider-curated playlists first, otherwise search order.
    #[default]
    Recommended,
    /// Playlist name, case-insensitive.
    #[value(name = "a-z")]
    Az,
    /// Owner display name, case-insensitive.
    Author,
    /// Follower count, most followed first.
    Likes,
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortMode::Recommended => "Recommended",
            SortMode::Az => "A-Z",
            SortMode::Author => "Author",
            SortMode::Likes => "Likes",
        };
        write!(f, "{}", label)
    }
}

/// Playlists found by a search plus the enrichment lookups that failed.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub playlists: Vec<Playlist>,
    /// `(playlist id, error)` for each follower lookup that failed.
    pub enrichment_failures: Vec<(String, SwipeError)>,
}

/// Splits free text like `"gym, chill,,driving "` into trimmed, non-empty tags.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Appends `found` to `merged`, skipping playlists already present and
/// playlists owned by `user_id`. Earlier sightings keep their position.
pub fn merge_results(merged: &mut Vec<Playlist>, found: Vec<Playlist>, user_id: &str) {
    let mut seen_ids: HashSet<String> = merged.iter().map(|p| p.id.clone()).collect();
    merged.extend(
        found
            .into_iter()
            .filter(|p| p.owner.id != user_id)
            .filter(|p| seen_ids.insert(p.id.clone())),
    );
}

/// Returns the playlists ordered by `mode`. All orders are stable.
pub fn sort_playlists(playlists: &[Playlist], mode: SortMode) -> Vec<Playlist> {
    let mut sorted = playlists.to_vec();
    match mode {
        SortMode::Recommended => {
            sorted.sort_by_key(|p| p.owner.id != PLATFORM_OWNER_ID);
        }
        SortMode::Az => sorted.sort_by(|a, b| cmp_ignore_case(&a.name, &b.name)),
        SortMode::Author => {
            sorted.sort_by(|a, b| cmp_ignore_case(a.owner.name(), b.owner.name()))
        }
        SortMode::Likes => {
            sorted.sort_by(|a, b| b.followers.unwrap_or(0).cmp(&a.followers.unwrap_or(0)))
        }
    }
    sorted
}

fn cmp_ignore_case(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// Runs one search per tag and merges the results.
///
/// Fails with a validation error when `input` holds no tag. Any failing
/// request aborts the whole search.
pub async fn find_playlists<A: SpotifyApi + ?Sized>(
    api: &A,
    input: &str,
    user_id: &str,
) -> Result<Vec<Playlist>> {
    let tags = parse_tags(input);
    if tags.is_empty() {
        return Err(SwipeError::Validation(
            "Please enter some tags to search for playlists.".to_string(),
        ));
    }

    let mut merged = Vec::new();
    for tag in &tags {
        let found = api.search_playlists(tag, SEARCH_LIMIT).await?;
        merge_results(&mut merged, found, user_id);
    }

    Ok(merged)
}

/// Looks up follower counts for all playlists concurrently.
///
/// A failed lookup leaves that playlist's count empty and is reported in the
/// outcome. An authorization failure aborts the batch, since every other
/// request made with the same token is bound to fail as well.
pub async fn enrich_followers<A: SpotifyApi + ?Sized>(
    api: &A,
    mut playlists: Vec<Playlist>,
) -> Result<SearchOutcome> {
    let lookups = playlists.iter().map(|p| api.playlist_followers(&p.id));
    let results = join_all(lookups).await;

    let mut enrichment_failures = Vec::new();
    for (playlist, result) in playlists.iter_mut().zip(results) {
        match result {
            Ok(total) => playlist.followers = Some(total),
            Err(SwipeError::Unauthorized) => return Err(SwipeError::Unauthorized),
            Err(e) => enrichment_failures.push((playlist.id.clone(), e)),
        }
    }

    Ok(SearchOutcome {
        playlists,
        enrichment_failures,
    })
}

/// Full search pass: tags, merge, and (optionally) follower enrichment.
pub async fn search<A: SpotifyApi + ?Sized>(
    api: &A,
    input: &str,
    user_id: &str,
    with_followers: bool,
) -> Result<SearchOutcome> {
    let playlists = find_playlists(api, input, user_id).await?;
    if with_followers {
        enrich_followers(api, playlists).await
    } else {
        Ok(SearchOutcome {
            playlists,
            enrichment_failures: Vec::new(),
        })
    }
}
