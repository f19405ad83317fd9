use std::collections::BTreeSet;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::{Playlist, PlaylistTableRow, Track, TrackTableRow};

pub fn generate_code_verifier() -> String {
    random_string(128)
}

pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Opaque value round-tripped through the authorize redirect.
pub fn generate_state() -> String {
    random_string(32)
}

fn random_string(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Parses a 1-based selection like `"1, 3-5,2"` into 0-based indices.
///
/// Keeps the order in which entries were typed and drops repeats, since the
/// order picked is the order the playlists get reviewed in. Every index must
/// be within `1..=max`.
pub fn parse_selection(input: &str, max: usize) -> Result<Vec<usize>, String> {
    let mut picked = Vec::new();
    let mut taken = BTreeSet::new();

    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((a, b)) => (parse_index(a, max)?, parse_index(b, max)?),
            None => {
                let i = parse_index(part, max)?;
                (i, i)
            }
        };
        if start > end {
            return Err(format!("Invalid range '{}'", part));
        }
        for i in start..=end {
            if taken.insert(i) {
                picked.push(i - 1);
            }
        }
    }

    if picked.is_empty() {
        return Err("Please select at least one playlist.".to_string());
    }
    Ok(picked)
}

fn parse_index(raw: &str, max: usize) -> Result<usize, String> {
    let raw = raw.trim();
    match raw.parse::<usize>() {
        Ok(i) if (1..=max).contains(&i) => Ok(i),
        _ => Err(format!("'{}' is not a number between 1 and {}", raw, max)),
    }
}

pub fn playlist_rows(playlists: &[Playlist]) -> Vec<PlaylistTableRow> {
    playlists
        .iter()
        .enumerate()
        .map(|(i, p)| PlaylistTableRow {
            index: i + 1,
            name: p.name.clone(),
            author: p.owner.name().to_string(),
            likes: p
                .followers
                .map(|f| f.to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

pub fn track_rows(tracks: &[Track]) -> Vec<TrackTableRow> {
    tracks
        .iter()
        .enumerate()
        .map(|(i, t)| TrackTableRow {
            index: i + 1,
            name: t.name.clone(),
            artists: t.artist_names(),
        })
        .collect()
}
