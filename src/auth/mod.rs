//! Session bridging from the browser to the download client.
//!
//! The portal's pages need JavaScript, its document downloads do not. Once
//! the browser is logged in, the session-identity cookies are copied into a
//! plain HTTP client so every document can be fetched without the browser.

mod bridge;

pub use bridge::{BridgeError, CookieSet, SESSION_COOKIE_ALLOW_LIST, bridge_session};
