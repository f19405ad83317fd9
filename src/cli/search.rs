use tabled::Table;

use crate::{
    config::Settings,
    error, info,
    management::TokenStore,
    search::{self, SearchOutcome, SortMode},
    spotify::SpotifyClient,
    types::Playlist,
    utils, warning,
};

use super::{authorized, fail, prompt, with_spinner};

/// Search parameters shared by `search`, `create` and `edit`.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Comma separated tags; asked for interactively when absent.
    pub tags: Option<String>,
    pub sort: SortMode,
    /// Look up follower counts for every result.
    pub followers: bool,
}

/// Searches playlists by tag and prints them as a table.
pub async fn search(settings: &Settings, opts: SearchOptions) {
    let store = TokenStore::default();
    let (client, profile) = authorized(settings, &store).await;

    let playlists = find(&client, &store, &profile.id, &opts).await;
    if playlists.is_empty() {
        warning!("No playlists found.");
        return;
    }

    info!("{} playlists found, sorted by {}", playlists.len(), opts.sort);
    println!("{}", Table::new(utils::playlist_rows(&playlists)));
}

/// Runs the search, then lets the user pick the playlists to review.
///
/// Returns the picked playlists in the order they were typed. Exits when the
/// search comes back empty.
pub(crate) async fn pick_playlists(
    client: &SpotifyClient,
    store: &TokenStore,
    user_id: &str,
    opts: &SearchOptions,
) -> Vec<Playlist> {
    let playlists = find(client, store, user_id, opts).await;
    if playlists.is_empty() {
        error!("No playlists found. Try different tags.");
    }

    println!("{}", Table::new(utils::playlist_rows(&playlists)));

    loop {
        let input = match prompt("Select playlists to review (e.g. 1,3-5):") {
            Ok(input) => input,
            Err(e) => error!("Failed to read selection: {}", e),
        };

        match utils::parse_selection(&input, playlists.len()) {
            Ok(picked) => return picked.into_iter().map(|i| playlists[i].clone()).collect(),
            Err(e) => warning!("{}", e),
        }
    }
}

/// Searched and sorted playlists, with the tags asked for if needed.
async fn find(
    client: &SpotifyClient,
    store: &TokenStore,
    user_id: &str,
    opts: &SearchOptions,
) -> Vec<Playlist> {
    let mut tags = opts.tags.clone().unwrap_or_default();
    while search::parse_tags(&tags).is_empty() {
        tags = match prompt("Tags to search for (comma separated):") {
            Ok(input) => input,
            Err(e) => error!("Failed to read tags: {}", e),
        };
    }

    let outcome = with_spinner(
        "Searching playlists...",
        search::search(client, &tags, user_id, opts.followers),
    )
    .await;

    let SearchOutcome {
        playlists,
        enrichment_failures,
    } = match outcome {
        Ok(outcome) => outcome,
        Err(e) => fail(store, "Failed to search playlists", e).await,
    };

    if !enrichment_failures.is_empty() {
        warning!(
            "Could not load follower counts for {} playlists",
            enrichment_failures.len()
        );
    }

    search::sort_playlists(&playlists, opts.sort)
}
