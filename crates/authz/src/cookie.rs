//! `Set-Cookie` rendering and `Cookie` parsing for the session token.

use axum::http::{header, HeaderMap};

/// Attribute policy for the session cookie.
///
/// Production deployments serve the client from another site, which needs
/// `SameSite=None; Secure`; everything else uses `SameSite=Strict`.
#[derive(Debug, Clone)]
pub struct SessionCookie {
    name: String,
    production: bool,
}

impl SessionCookie {
    pub fn new(name: impl Into<String>, production: bool) -> Self {
        Self {
            name: name.into(),
            production,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Cookie carrying `token`; no Max-Age, so it lives for the browser session.
    pub fn issue(&self, token: &str) -> String {
        format!("{}={}; Path=/; {}", self.name, token, self.attributes())
    }

    /// Cookie that makes the browser drop the session immediately.
    pub fn clear(&self) -> String {
        format!(
            "{}=; Path=/; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT; {}",
            self.name,
            self.attributes()
        )
    }

    /// Find the session token among the request's `Cookie` headers.
    pub fn read(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, value)| *name == self.name && !value.is_empty())
            .map(|(_, value)| value.to_string())
    }

    fn attributes(&self) -> &'static str {
        if self.production {
            "HttpOnly; SameSite=None; Secure"
        } else {
            "HttpOnly; SameSite=Strict"
        }
    }
}
