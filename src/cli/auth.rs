use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    config::Settings,
    error, info,
    management::TokenStore,
    server::start_api_server,
    spotify::{
        SpotifyApi, SpotifyClient,
        auth::{
            AuthFlow, AuthState, CALLBACK_TIMEOUT, authorize_url, parse_redirect_fragment,
            wait_for_token,
        },
    },
    success,
    types::{PkceToken, Token},
    utils, warning,
};

use super::with_spinner;

/// Signs the user in and stores the validated token.
///
/// Without `redirect_url` this runs the PKCE authorization code flow: a local
/// callback server is started, the consent page is opened in the browser and
/// the command waits for the callback. With `redirect_url` the access token
/// is read from the fragment of an implicit-grant redirect instead.
///
/// Either way the token is checked against the identity endpoint (and the
/// allow-list, when configured) before it is written to the token store.
/// Any previously stored token is dropped first.
pub async fn auth(settings: Arc<Settings>, redirect_url: Option<String>) {
    let store = TokenStore::default();
    if let Err(e) = store.clear().await {
        warning!("Failed to remove the previous token: {}", e);
    }

    let token = match redirect_url {
        Some(redirect) => match parse_redirect_fragment(&redirect) {
            Some(token) => token,
            None => error!("No access token found in the redirect URL."),
        },
        None => match pkce_login(Arc::clone(&settings)).await {
            Some(token) => token,
            None => error!("Authentication failed or timed out."),
        },
    };

    let mut flow = AuthFlow::from_settings(&settings);
    flow.observe_callback(token.clone());

    let client = SpotifyClient::new(&settings, token.access_token);
    let lookup = with_spinner("Checking account...", client.current_user()).await;

    match flow.complete(lookup, &store).await {
        Ok(AuthState::Authenticated { profile, .. }) => {
            success!(
                "Authentication successful! Signed in as {}",
                profile.display_name.as_deref().unwrap_or(&profile.id)
            );
        }
        Ok(AuthState::Denied { reason }) => error!("Access denied. {}", reason),
        Ok(_) => error!("Authentication failed."),
        Err(e) => error!(
            "Could not verify the account: {}. The token was not saved, please try again.",
            e
        ),
    }
}

/// Removes the stored token.
pub async fn logout() {
    let store = TokenStore::default();
    match store.clear().await {
        Ok(()) => success!("Logged out."),
        Err(e) => error!("Failed to remove token at {}: {}", store.path().display(), e),
    }
}

async fn pkce_login(settings: Arc<Settings>) -> Option<Token> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);
    let state = utils::generate_state();

    let auth_url = match authorize_url(&settings, &code_challenge, &state) {
        Ok(url) => url,
        Err(e) => error!("{}", e),
    };

    let shared_state: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(Some(PkceToken {
        code_verifier,
        state,
        token: None,
    })));

    let server_state = Arc::clone(&shared_state);
    let server_settings = Arc::clone(&settings);
    tokio::spawn(async move {
        if let Err(e) = start_api_server(server_state, server_settings).await {
            error!("Failed to start callback server: {}", e);
        }
    });

    if webbrowser::open(&auth_url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        );
    } else {
        info!("Waiting for the browser to complete the sign-in...");
    }

    wait_for_token(shared_state, CALLBACK_TIMEOUT).await
}
