use tabled::Table;

use crate::{
    commit::{self, Target},
    config::Settings,
    error,
    error::SwipeError,
    info,
    management::TokenStore,
    session::ReviewSession,
    spotify::{SpotifyApi, SpotifyClient},
    success,
    types::{Playlist, Track},
    utils, warning,
};

use super::{
    SearchOptions, authorized, fail, forget_token, prompt, review::review,
    search::pick_playlists, with_spinner,
};

/// Lists the user's own playlists.
pub async fn playlists(settings: &Settings) {
    let store = TokenStore::default();
    let (client, _) = authorized(settings, &store).await;

    let own = load_own(&client, &store).await;
    if own.is_empty() {
        warning!("You have no playlists yet.");
        return;
    }
    println!("{}", Table::new(utils::playlist_rows(&own)));
}

/// Reviews tracks from searched playlists into a new playlist.
pub async fn create(
    settings: &Settings,
    name: Option<String>,
    description: String,
    public: bool,
    search: SearchOptions,
) {
    let name = match name {
        Some(name) => name,
        None => match prompt("Name of the new playlist:") {
            Ok(name) => name,
            Err(e) => error!("Failed to read the playlist name: {}", e),
        },
    };
    let target = Target::Create {
        name,
        description,
        public,
    };
    if let Err(e) = target.validate() {
        error!("{}", e);
    }

    let store = TokenStore::default();
    let (client, profile) = authorized(settings, &store).await;

    let picked = pick_playlists(&client, &store, &profile.id, &search).await;
    run(&client, &store, &target, picked, Vec::new()).await;
}

/// Reviews tracks from searched playlists into one of the user's playlists.
///
/// `playlist` may be an id or a name; without it the user picks from a
/// table of their own playlists. Tracks already in the playlist are never
/// presented.
pub async fn edit(settings: &Settings, playlist: Option<String>, search: SearchOptions) {
    let store = TokenStore::default();
    let (client, profile) = authorized(settings, &store).await;

    let own = load_own(&client, &store).await;
    if own.is_empty() {
        error!("You have no playlists to edit. Use songswipe create instead.");
    }

    let chosen = match playlist {
        Some(wanted) => match own
            .iter()
            .find(|p| p.id == wanted || p.name.eq_ignore_ascii_case(&wanted))
        {
            Some(p) => p.clone(),
            None => error!("No playlist named {} found in your library.", wanted),
        },
        None => choose_own(&own),
    };

    let target = Target::Edit {
        playlist_id: chosen.id.clone(),
        name: chosen.name.clone(),
    };

    let existing = match with_spinner(
        "Loading playlist tracks...",
        client.playlist_tracks(&chosen.id),
    )
    .await
    {
        Ok(tracks) => tracks.into_iter().map(|t| t.id),
        Err(e) => fail(&store, "Failed to load the playlist", e).await,
    };
    info!("Editing {}", chosen.name);

    let picked = pick_playlists(&client, &store, &profile.id, &search).await;
    run(&client, &store, &target, picked, existing.collect()).await;
}

async fn run(
    client: &SpotifyClient,
    store: &TokenStore,
    target: &Target,
    picked: Vec<Playlist>,
    existing: Vec<String>,
) {
    let session = match ReviewSession::new(picked, existing) {
        Ok(session) => session,
        Err(e) => error!("{}", e),
    };

    let Some(accepted) = review(client, store, session).await else {
        info!("Review cancelled, nothing was saved.");
        return;
    };

    save(client, store, target, &accepted).await;
}

async fn save(client: &SpotifyClient, store: &TokenStore, target: &Target, accepted: &[Track]) {
    let result = with_spinner("Saving playlist...", commit::commit(client, target, accepted)).await;

    match result {
        Ok(receipt) => success!(
            "Added {} tracks to {}\n{}",
            receipt.tracks_added,
            receipt.name,
            receipt.external_url
        ),
        Err(SwipeError::PartialCommit {
            playlist_id,
            name,
            source,
        }) => {
            warning!(
                "Playlist {} was created but the tracks could not be added: {}",
                name,
                source
            );
            if source.is_unauthorized() {
                forget_token(store).await;
            }
            error!(
                "Run songswipe edit --playlist {} to try again.",
                playlist_id
            );
        }
        Err(e) => fail(store, "Failed to save the playlist", e).await,
    }
}

async fn load_own(client: &SpotifyClient, store: &TokenStore) -> Vec<Playlist> {
    match with_spinner("Loading your playlists...", client.my_playlists()).await {
        Ok(own) => own,
        Err(e) => fail(store, "Failed to load your playlists", e).await,
    }
}

fn choose_own(own: &[Playlist]) -> Playlist {
    println!("{}", Table::new(utils::playlist_rows(own)));

    loop {
        let input = match prompt("Playlist to edit:") {
            Ok(input) => input,
            Err(e) => error!("Failed to read selection: {}", e),
        };

        match utils::parse_selection(&input, own.len()) {
            Ok(picked) if picked.len() == 1 => return own[picked[0]].clone(),
            Ok(_) => warning!("Please select exactly one playlist."),
            Err(e) => warning!("{}", e),
        }
    }
}
