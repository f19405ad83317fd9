//! # API Module
//!
//! HTTP routes served by the local listener during `songswipe auth`.
//!
//! - [`callback`] - receives the provider's redirect after the user granted
//!   access, checks the `state` parameter, and exchanges the authorization
//!   code for a token with the PKCE verifier. The token is left in the shared
//!   state for the waiting `auth` command, which validates it before anything
//!   is persisted.

mod callback;

pub use callback::callback;
