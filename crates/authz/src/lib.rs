//! Session authentication for EZ Booking.
//!
//! A session is a signed JWT carried exclusively in an http-only cookie. Nothing
//! is stored server side: a token stays valid until it expires, even after the
//! cookie has been cleared on logout.

pub mod cookie;
pub mod guard;
pub mod token;

use std::sync::Arc;

use ezbook_kernel::settings::Settings;

pub use cookie::SessionCookie;
pub use guard::require_session;
pub use token::{Identity, TokenError, TokenService};

/// Token service plus cookie policy, shared by the login routes and the guard.
#[derive(Clone)]
pub struct SessionAuth {
    tokens: Arc<TokenService>,
    cookie: SessionCookie,
}

impl SessionAuth {
    pub fn new(tokens: TokenService, cookie: SessionCookie) -> Self {
        Self {
            tokens: Arc::new(tokens),
            cookie,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            TokenService::new(&settings.auth.token_secret, settings.auth.token_ttl_secs),
            SessionCookie::new(
                settings.auth.cookie_name.clone(),
                settings.environment.is_production(),
            ),
        )
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn cookie(&self) -> &SessionCookie {
        &self.cookie
    }
}
