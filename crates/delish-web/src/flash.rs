//! One-shot flash notifications carried in a signed cookie.
//!
//! A mutation pushes a message before redirecting; the next rendered page
//! takes every pending message and clears the cookie. Bodies are rendered
//! unescaped, so the cookie is signed with the server's [`FlashKey`] and a
//! value that fails verification is ignored.

use axum_extra::extract::cookie::{Cookie, Key, SameSite, SignedCookieJar};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use maud::Markup;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::WebError;

pub const FLASH_COOKIE: &str = "delish_flash";

/// Cookie jar that only yields flashes signed by this server.
pub type FlashJar = SignedCookieJar<FlashKey>;

/// Key that signs flash cookies.
#[derive(Clone)]
pub struct FlashKey(Key);

impl FlashKey {
    /// Key from a configured secret of at least 64 bytes, or a random key
    /// when none is configured.
    pub fn from_secret(secret: Option<&str>) -> Result<Self, WebError> {
        match secret {
            Some(secret) => Key::try_from(secret.as_bytes()).map(Self).map_err(|_| {
                WebError::Config("cookie_secret must be at least 64 bytes".into())
            }),
            None => {
                warn!("No cookie_secret configured, signing flashes with a random key");
                Ok(Self(Key::generate()))
            }
        }
    }
}

impl From<FlashKey> for Key {
    fn from(key: FlashKey) -> Self {
        key.0
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlashMessage {
    pub level: FlashLevel,
    /// Pre-rendered markup. User-supplied text must already be escaped,
    /// which building it with `maud::html!` guarantees.
    pub body: String,
}

impl FlashMessage {
    pub fn success(body: Markup) -> Self {
        Self {
            level: FlashLevel::Success,
            body: body.into_string(),
        }
    }
}

/// Queue `message` for the next rendered page.
pub fn push<K>(jar: SignedCookieJar<K>, message: FlashMessage) -> SignedCookieJar<K> {
    let mut messages = read(&jar);
    messages.push(message);

    match serde_json::to_vec(&messages) {
        Ok(json) => {
            let cookie = Cookie::build((FLASH_COOKIE, URL_SAFE_NO_PAD.encode(json)))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            jar.add(cookie)
        }
        Err(e) => {
            warn!(error = %e, "Dropping flash message that failed to serialize");
            jar
        }
    }
}

/// Remove and return every pending message.
pub fn take<K>(jar: SignedCookieJar<K>) -> (SignedCookieJar<K>, Vec<FlashMessage>) {
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, Vec::new());
    }

    let messages = read(&jar);
    let jar = jar.remove(Cookie::build(FLASH_COOKIE).path("/"));
    (jar, messages)
}

fn read<K>(jar: &SignedCookieJar<K>) -> Vec<FlashMessage> {
    jar.get(FLASH_COOKIE)
        .and_then(|cookie| URL_SAFE_NO_PAD.decode(cookie.value()).ok())
        .and_then(|json| serde_json::from_slice(&json).ok())
        .unwrap_or_default()
}
