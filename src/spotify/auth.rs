use std::{sync::Arc, time::Duration};

use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use url::{Url, form_urlencoded};

use crate::{
    config::Settings,
    error::{Result, SwipeError},
    management::TokenStore,
    types::{PkceToken, Token, UserProfile},
};

/// Permissions requested from the user: read playlists to mine tracks from,
/// modify playlists to commit into, and read the profile for validation.
pub const SCOPES: [&str; 6] = [
    "playlist-read-private",
    "playlist-read-collaborative",
    "playlist-modify-public",
    "playlist-modify-private",
    "user-read-private",
    "user-read-email",
];

/// How long `auth` waits for the browser to hit the callback route.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Builds the authorization URL the user is sent to.
///
/// Uses the PKCE authorization code flow with an S256 challenge. The consent
/// dialog is always shown, so switching accounts works after a logout.
pub fn authorize_url(settings: &Settings, code_challenge: &str, state: &str) -> Result<String> {
    let scope = SCOPES.join(" ");
    let url = Url::parse_with_params(
        &settings.auth_url,
        &[
            ("client_id", settings.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("state", state),
            ("scope", scope.as_str()),
            ("show_dialog", "true"),
        ],
    )
    .map_err(|e| SwipeError::Config(format!("Invalid authorize url: {}", e)))?;

    Ok(url.to_string())
}

/// Extracts the access token from an implicit-grant redirect.
///
/// Accepts the full redirect URL or just its fragment, with or without the
/// leading `#`. Returns `None` when no non-empty `access_token` is present.
pub fn parse_redirect_fragment(redirect: &str) -> Option<Token> {
    let fragment = match redirect.split_once('#') {
        Some((_, fragment)) => fragment,
        None => redirect,
    };

    let mut access_token = None;
    let mut expires_in = 0;
    let mut scope = String::new();
    for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
        match key.as_ref() {
            "access_token" if !value.is_empty() => access_token = Some(value.into_owned()),
            "expires_in" => expires_in = value.parse().unwrap_or(0),
            "scope" => scope = value.into_owned(),
            _ => {}
        }
    }

    access_token.map(|access_token| Token {
        access_token,
        refresh_token: None,
        scope,
        expires_in,
        obtained_at: Utc::now().timestamp() as u64,
    })
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: String,
    #[serde(default)]
    expires_in: u64,
}

/// Exchanges an authorization code for an access token using PKCE.
///
/// `verifier` must be the code verifier whose challenge went out with the
/// authorize request. The code is single-use.
pub async fn exchange_code_pkce(settings: &Settings, code: &str, verifier: &str) -> Result<Token> {
    let client = Client::new();
    let res = client
        .post(&settings.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("client_id", settings.client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", settings.redirect_uri.as_str()),
        ])
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        return Err(SwipeError::Api {
            status: status.as_u16(),
            message: res.text().await.unwrap_or_default(),
        });
    }

    let json = res.json::<TokenResponse>().await?;
    Ok(Token {
        access_token: json.access_token,
        refresh_token: json.refresh_token,
        scope: json.scope,
        expires_in: json.expires_in,
        obtained_at: Utc::now().timestamp() as u64,
    })
}

/// Polls the shared PKCE state until the callback route stored a token.
///
/// Gives up after `max_wait`, polling once per second.
pub async fn wait_for_token(
    shared_state: Arc<Mutex<Option<PkceToken>>>,
    max_wait: Duration,
) -> Option<Token> {
    use std::time::Instant;

    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(pkce_token) = lock.as_ref() {
            if let Some(token) = &pkce_token.token {
                return Some(token.clone());
            }
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Where the user stands in the sign-in process.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Unauthenticated,
    /// A token is known but the identity behind it has not been checked.
    PendingValidation { token: Token },
    Authenticated { token: Token, profile: UserProfile },
    /// The identity lookup rejected the token or the account is not approved.
    Denied { reason: String },
}

/// Sign-in state machine.
///
/// ```text
/// Unauthenticated --callback token--> PendingValidation
/// (stored token) -------------------> PendingValidation
/// PendingValidation --lookup ok + allowed--> Authenticated
/// PendingValidation --rejected / not allowed--> Denied
/// PendingValidation --transport failure--> Unauthenticated
/// ```
#[derive(Debug)]
pub struct AuthFlow {
    state: AuthState,
    allowed_emails: Option<Vec<String>>,
}

impl AuthFlow {
    pub fn new(allowed_emails: Option<Vec<String>>) -> Self {
        Self {
            state: AuthState::Unauthenticated,
            allowed_emails,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.allowed_emails.clone())
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn pending_token(&self) -> Option<&Token> {
        match &self.state {
            AuthState::PendingValidation { token } => Some(token),
            _ => None,
        }
    }

    /// Picks up a previously stored token, skipping the redirect entirely.
    pub async fn resume(&mut self, store: &TokenStore) {
        if let AuthState::Unauthenticated = self.state {
            if let Some(token) = store.load().await {
                self.state = AuthState::PendingValidation { token };
            }
        }
    }

    /// Feeds a token obtained from the redirect into the flow.
    ///
    /// Ignored unless the flow is `Unauthenticated`, so a stored token always
    /// wins over a stale redirect. Returns whether the token was taken.
    pub fn observe_callback(&mut self, token: Token) -> bool {
        match self.state {
            AuthState::Unauthenticated => {
                self.state = AuthState::PendingValidation { token };
                true
            }
            _ => false,
        }
    }

    /// Settles a pending validation with the result of the identity lookup.
    ///
    /// On admission the token is persisted. On rejection (401, 403 or an
    /// account outside the allow-list) the token is discarded and the store
    /// cleared. Anything else is indeterminate: the flow falls back to
    /// `Unauthenticated`, the store is left alone and the error is returned.
    pub async fn complete(
        &mut self,
        lookup: Result<UserProfile>,
        store: &TokenStore,
    ) -> Result<&AuthState> {
        let AuthState::PendingValidation { token } = &self.state else {
            return Err(SwipeError::Validation(
                "No token is awaiting validation".to_string(),
            ));
        };
        let token = token.clone();

        match lookup {
            Ok(profile) if self.is_allowed(&profile) => {
                store.set_token(&token).await?;
                self.state = AuthState::Authenticated { token, profile };
            }
            Ok(profile) => {
                store.clear().await?;
                self.state = AuthState::Denied {
                    reason: format!(
                        "{} is not an approved user",
                        profile.email.as_deref().unwrap_or(&profile.id)
                    ),
                };
            }
            Err(e) if e.is_rejection() => {
                store.clear().await?;
                self.state = AuthState::Denied {
                    reason: e.to_string(),
                };
            }
            Err(e) => {
                self.state = AuthState::Unauthenticated;
                return Err(e);
            }
        }

        Ok(&self.state)
    }

    fn is_allowed(&self, profile: &UserProfile) -> bool {
        match &self.allowed_emails {
            None => true,
            Some(allowed) => profile
                .email
                .as_ref()
                .map(|email| email.to_lowercase())
                .is_some_and(|email| allowed.contains(&email)),
        }
    }
}
