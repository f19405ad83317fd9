mod common;

use common::{Call, FakeApi, playlist};
use songswipe::{
    error::SwipeError,
    search::{
        SortMode, enrich_followers, find_playlists, merge_results, parse_tags, search,
        sort_playlists,
    },
    types::Playlist,
};

fn names(playlists: &[Playlist]) -> Vec<&str> {
    playlists.iter().map(|p| p.name.as_str()).collect()
}

fn with_followers(mut p: Playlist, followers: Option<u64>) -> Playlist {
    p.followers = followers;
    p
}

#[test]
fn test_parse_tags() {
    assert_eq!(parse_tags("gym, chill,,driving "), vec!["gym", "chill", "driving"]);
    assert!(parse_tags(" , ,").is_empty());
    assert!(parse_tags("").is_empty());
}

#[test]
fn test_sort_by_likes_descending() {
    let playlists = vec![
        with_followers(playlist("1", "Five", "a"), Some(5)),
        with_followers(playlist("2", "Eighty", "b"), Some(80)),
        with_followers(playlist("3", "Three", "c"), Some(3)),
    ];

    let sorted = sort_playlists(&playlists, SortMode::Likes);
    let likes: Vec<_> = sorted.iter().map(|p| p.followers.unwrap()).collect();

    assert_eq!(likes, vec![80, 5, 3]);
}

#[test]
fn test_sort_by_likes_treats_unknown_as_zero() {
    let playlists = vec![
        with_followers(playlist("1", "Unknown", "a"), None),
        with_followers(playlist("2", "One", "b"), Some(1)),
    ];

    let sorted = sort_playlists(&playlists, SortMode::Likes);
    assert_eq!(names(&sorted), vec!["One", "Unknown"]);
}

#[test]
fn test_sort_by_name_ignores_case() {
    let playlists = vec![
        playlist("1", "Zen", "a"),
        playlist("2", "Arctic", "b"),
        playlist("3", "mellow", "c"),
    ];

    let sorted = sort_playlists(&playlists, SortMode::Az);
    assert_eq!(names(&sorted), vec!["Arctic", "mellow", "Zen"]);
}

#[test]
fn test_sort_by_author() {
    let playlists = vec![
        playlist("1", "First", "zoe"),
        playlist("2", "Second", "Adam"),
        playlist("3", "Third", "mia"),
    ];

    let sorted = sort_playlists(&playlists, SortMode::Author);
    assert_eq!(names(&sorted), vec!["Second", "Third", "First"]);
}

#[test]
fn test_recommended_puts_platform_first_and_is_stable() {
    let playlists = vec![
        playlist("1", "User One", "someone"),
        playlist("2", "Editorial One", "spotify"),
        playlist("3", "User Two", "other"),
        playlist("4", "Editorial Two", "spotify"),
    ];

    let sorted = sort_playlists(&playlists, SortMode::Recommended);
    assert_eq!(
        names(&sorted),
        vec!["Editorial One", "Editorial Two", "User One", "User Two"]
    );

    // Input is left untouched
    assert_eq!(playlists[0].name, "User One");
}

#[test]
fn test_sort_is_stable_on_ties() {
    let playlists = vec![
        with_followers(playlist("1", "B", "a"), Some(10)),
        with_followers(playlist("2", "A", "a"), Some(10)),
    ];

    let sorted = sort_playlists(&playlists, SortMode::Likes);
    assert_eq!(names(&sorted), vec!["B", "A"]);
}

#[test]
fn test_merge_keeps_first_occurrence_and_drops_own() {
    let mut merged = vec![playlist("1", "First", "a")];

    merge_results(
        &mut merged,
        vec![
            playlist("2", "Mine", "me"),
            playlist("1", "First again", "a"),
            playlist("3", "Third", "b"),
        ],
        "me",
    );

    assert_eq!(names(&merged), vec!["First", "Third"]);
}

#[tokio::test]
async fn test_find_playlists_searches_every_tag() {
    let api = FakeApi::new()
        .with_search(
            "gym",
            vec![playlist("1", "Gym", "a"), playlist("2", "Shared", "b")],
        )
        .with_search(
            "chill",
            vec![playlist("2", "Shared", "b"), playlist("3", "Mine", "me")],
        );

    let found = find_playlists(&api, "gym, chill", "me").await.unwrap();

    assert_eq!(names(&found), vec!["Gym", "Shared"]);
    assert_eq!(
        api.calls(),
        vec![Call::Search("gym".to_string()), Call::Search("chill".to_string())]
    );
}

#[tokio::test]
async fn test_find_playlists_requires_tags() {
    let api = FakeApi::new();

    let result = find_playlists(&api, " , ", "me").await;

    assert!(matches!(result, Err(SwipeError::Validation(_))));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_enrichment_falls_back_per_playlist() {
    let mut api = FakeApi::new();
    api.followers.insert("1".to_string(), 42);

    let outcome = enrich_followers(
        &api,
        vec![playlist("1", "Known", "a"), playlist("2", "Missing", "b")],
    )
    .await
    .unwrap();

    assert_eq!(outcome.playlists[0].followers, Some(42));
    assert_eq!(outcome.playlists[1].followers, None);
    assert_eq!(outcome.enrichment_failures.len(), 1);
    assert_eq!(outcome.enrichment_failures[0].0, "2");

    // Order is kept
    assert_eq!(names(&outcome.playlists), vec!["Known", "Missing"]);
}

#[tokio::test]
async fn test_enrichment_aborts_on_unauthorized() {
    let mut api = FakeApi::new();
    api.followers_unauthorized = true;

    let result = enrich_followers(&api, vec![playlist("1", "Any", "a")]).await;

    assert!(matches!(result, Err(SwipeError::Unauthorized)));
}

#[tokio::test]
async fn test_search_without_followers_skips_lookups() {
    let api = FakeApi::new().with_search("gym", vec![playlist("1", "Gym", "a")]);

    let outcome = search(&api, "gym", "me", false).await.unwrap();

    assert_eq!(names(&outcome.playlists), vec!["Gym"]);
    assert!(
        !api
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Followers(_)))
    );
}

#[tokio::test]
async fn test_search_with_followers() {
    let mut api = FakeApi::new().with_search("gym", vec![playlist("1", "Gym", "a")]);
    api.followers.insert("1".to_string(), 7);

    let outcome = search(&api, "gym", "me", true).await.unwrap();

    assert_eq!(outcome.playlists[0].followers, Some(7));
    assert!(outcome.enrichment_failures.is_empty());
}
