use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::sync::Mutex;

use crate::{
    api,
    config::Settings,
    error::{Result, SwipeError},
    types::PkceToken,
};

pub fn router(state: Arc<Mutex<Option<PkceToken>>>, settings: Arc<Settings>) -> Router {
    Router::new()
        .route("/callback", get(api::callback))
        .layer(Extension(state))
        .layer(Extension(settings))
}

/// Serves the callback route on `SERVER_ADDRESS` until the process ends.
pub async fn start_api_server(
    state: Arc<Mutex<Option<PkceToken>>>,
    settings: Arc<Settings>,
) -> Result<()> {
    let addr = SocketAddr::from_str(&settings.server_addr).map_err(|e| {
        SwipeError::Config(format!(
            "Failed to parse server address {}: {}",
            settings.server_addr, e
        ))
    })?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state, settings)).await?;
    Ok(())
}
