//! Spotify client tests against a mock server.

use serde_json::json;
use songswipe::{
    config::Settings,
    error::SwipeError,
    spotify::{SpotifyApi, SpotifyClient, auth::exchange_code_pkce},
    types::CreatePlaylistRequest,
};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> SpotifyClient {
    let settings = Settings::for_base_url("client-1", &server.uri());
    SpotifyClient::new(&settings, "token-1")
}

fn raw_track(id: &str) -> serde_json::Value {
    json!({
        "track": {
            "id": id,
            "name": format!("Track {}", id),
            "uri": format!("spotify:track:{}", id),
            "artists": [{ "name": "Artist" }],
            "preview_url": null,
            "album": { "images": [{ "url": "https://img/cover" }] }
        }
    })
}

fn raw_playlist(id: &str, owner: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": format!("Playlist {}", id),
        "owner": { "id": owner, "display_name": owner },
        "images": [],
        "external_urls": { "spotify": format!("https://open.spotify.com/playlist/{}", id) }
    })
}

// =============================================================================
// Error Mapping
// =============================================================================

mod error_mapping {
    use super::*;

    #[tokio::test]
    async fn test_401_maps_to_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = client_for(&server).current_user().await;

        assert!(matches!(result, Err(SwipeError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_other_status_maps_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
            .mount(&server)
            .await;

        let err = client_for(&server).current_user().await.unwrap_err();

        match err {
            SwipeError::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "try later");
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
        assert!(!SwipeError::Api {
            status: 503,
            message: String::new()
        }
        .is_transport());
    }
}

// =============================================================================
// Endpoints
// =============================================================================

mod endpoints {
    use super::*;

    #[tokio::test]
    async fn test_current_user_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .and(header("authorization", "Bearer token-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "user-1",
                "display_name": "User One",
                "email": "one@example.com"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let profile = client_for(&server).current_user().await.unwrap();

        assert_eq!(profile.id, "user-1");
        assert_eq!(profile.email.as_deref(), Some("one@example.com"));
    }

    #[tokio::test]
    async fn test_search_drops_null_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "gym"))
            .and(query_param("type", "playlist"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "playlists": {
                    "items": [raw_playlist("p1", "a"), null, raw_playlist("p2", "b")],
                    "next": null
                }
            })))
            .mount(&server)
            .await;

        let found = client_for(&server)
            .search_playlists("gym", 10)
            .await
            .unwrap();

        let ids: Vec<_> = found.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
        assert!(found.iter().all(|p| p.followers.is_none()));
    }

    #[tokio::test]
    async fn test_followers_requests_only_the_total() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/playlists/p1"))
            .and(query_param("fields", "followers.total"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "followers": { "total": 321 } })),
            )
            .mount(&server)
            .await;

        let total = client_for(&server).playlist_followers("p1").await.unwrap();

        assert_eq!(total, 321);
    }

    #[tokio::test]
    async fn test_tracks_follow_next_and_skip_unplayable() {
        let server = MockServer::start().await;
        let next = format!("{}/playlists/p1/tracks?offset=100&limit=100", server.uri());

        Mock::given(method("GET"))
            .and(path("/playlists/p1/tracks"))
            .and(query_param("offset", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [raw_track("t3")],
                "next": null
            })))
            .with_priority(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/playlists/p1/tracks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    raw_track("t1"),
                    { "track": null },
                    { "track": { "id": null, "name": "local file", "uri": "spotify:local:x" } },
                    raw_track("t2")
                ],
                "next": next
            })))
            .mount(&server)
            .await;

        let tracks = client_for(&server).playlist_tracks("p1").await.unwrap();

        let ids: Vec<_> = tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t1", "t2", "t3"]);
        assert_eq!(tracks[0].album_art(), Some("https://img/cover"));
    }

    #[tokio::test]
    async fn test_create_playlist() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/me/playlists"))
            .and(body_json(json!({
                "name": "Gym Mix",
                "description": "",
                "public": false
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "new-1",
                "name": "Gym Mix",
                "external_urls": { "spotify": "https://open.spotify.com/playlist/new-1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client_for(&server)
            .create_playlist(&CreatePlaylistRequest {
                name: "Gym Mix".to_string(),
                description: String::new(),
                public: false,
            })
            .await
            .unwrap();

        assert_eq!(created.id, "new-1");
        assert_eq!(
            created.external_urls.spotify.as_deref(),
            Some("https://open.spotify.com/playlist/new-1")
        );
    }

    #[tokio::test]
    async fn test_add_tracks_is_chunked_by_100() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/playlists/p1/tracks"))
            .respond_with(
                ResponseTemplate::new(201).set_body_json(json!({ "snapshot_id": "snap" })),
            )
            .expect(3)
            .mount(&server)
            .await;

        let uris: Vec<String> = (0..250).map(|i| format!("spotify:track:{}", i)).collect();
        client_for(&server).add_tracks("p1", &uris).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let sizes: Vec<usize> = requests
            .iter()
            .map(|r| {
                let body: serde_json::Value = serde_json::from_slice(&r.body).unwrap();
                body["uris"].as_array().unwrap().len()
            })
            .collect();
        assert_eq!(sizes, vec![100, 100, 50]);

        let first: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(first["uris"][0], "spotify:track:0");
    }

    #[tokio::test]
    async fn test_add_tracks_stops_at_first_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/playlists/p1/tracks"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .expect(1)
            .mount(&server)
            .await;

        let uris: Vec<String> = (0..150).map(|i| format!("spotify:track:{}", i)).collect();
        let result = client_for(&server).add_tracks("p1", &uris).await;

        assert!(matches!(result, Err(SwipeError::Api { status: 403, .. })));
    }

    #[tokio::test]
    async fn test_own_playlists_follow_next() {
        let server = MockServer::start().await;
        let next = format!("{}/me/playlists?offset=50&limit=50", server.uri());

        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .and(query_param("offset", "50"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [raw_playlist("p3", "me")],
                "next": null
            })))
            .with_priority(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/me/playlists"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [raw_playlist("p1", "me"), raw_playlist("p2", "me")],
                "next": next
            })))
            .mount(&server)
            .await;

        let own = client_for(&server).my_playlists().await.unwrap();

        assert_eq!(own.len(), 3);
        assert_eq!(own[2].id, "p3");
    }
}

// =============================================================================
// Token Exchange
// =============================================================================

mod token_exchange {
    use super::*;

    #[tokio::test]
    async fn test_exchange_code_posts_verifier() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=code-1"))
            .and(body_string_contains("code_verifier=verifier-1"))
            .and(body_string_contains("client_id=client-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "access-1",
                "token_type": "Bearer",
                "scope": "user-read-email",
                "expires_in": 3600,
                "refresh_token": "refresh-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let settings = Settings::for_base_url("client-1", &server.uri());
        let token = exchange_code_pkce(&settings, "code-1", "verifier-1")
            .await
            .unwrap();

        assert_eq!(token.access_token, "access-1");
        assert_eq!(token.refresh_token.as_deref(), Some("refresh-1"));
        assert_eq!(token.expires_in, 3600);
    }

    #[tokio::test]
    async fn test_exchange_code_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let settings = Settings::for_base_url("client-1", &server.uri());
        let result = exchange_code_pkce(&settings, "used-code", "verifier-1").await;

        assert!(matches!(result, Err(SwipeError::Api { status: 400, .. })));
    }
}
