use jsonwebtoken::{
    decode, encode, errors::ErrorKind, get_current_timestamp, DecodingKey, EncodingKey, Header,
    Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token service error
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing failed; only possible with a broken key configuration
    #[error("failed to sign session token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),

    #[error("session token expired")]
    Expired,

    /// Malformed token or bad signature
    #[error("invalid session token")]
    Invalid,
}

/// Identity a caller asserts when requesting a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Identity {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    email: String,
    iat: u64,
    exp: u64,
}

/// Issues and verifies HS256 session tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl_secs: u64,
}

impl TokenService {
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::default(),
            ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    /// Sign `identity` into a token expiring `ttl_secs` from now.
    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        let now = get_current_timestamp();
        let claims = Claims {
            email: identity.email.clone(),
            iat: now,
            exp: now + self.ttl_secs,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Check signature and expiry and return the identity the token was issued for.
    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        Ok(Identity {
            email: data.claims.email,
        })
    }

    #[cfg(test)]
    fn sign_raw(&self, email: &str, iat: u64, exp: u64) -> String {
        let claims = Claims {
            email: email.to_string(),
            iat,
            exp,
        };
        encode(&Header::default(), &claims, &self.encoding_key).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            email: "a@x.com".to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let service = TokenService::new("test-secret", 3600);
        let token = service.issue(&identity()).unwrap();

        assert_eq!(service.verify(&token).unwrap(), identity());
    }

    #[test]
    fn test_token_verifies_until_end_of_window() {
        let service = TokenService::new("test-secret", 3600);
        let now = get_current_timestamp();
        let token = service.sign_raw("a@x.com", now - 3500, now + 100);

        assert_eq!(service.verify(&token).unwrap(), identity());
    }

    #[test]
    fn test_expired_token() {
        let service = TokenService::new("test-secret", 3600);
        let now = get_current_timestamp();
        let token = service.sign_raw("a@x.com", now - 7200, now - 3600);

        assert!(matches!(service.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_malformed_token() {
        let service = TokenService::new("test-secret", 3600);
        for token in ["", "invalid-token", "a.b.c"] {
            assert!(matches!(service.verify(token), Err(TokenError::Invalid)), "{token}");
        }
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = TokenService::new("secret1", 3600);
        let verifier = TokenService::new("secret2", 3600);

        let token = issuer.issue(&identity()).unwrap();
        assert!(matches!(verifier.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_identity_rejects_unknown_fields() {
        let parsed = serde_json::from_str::<Identity>(r#"{"email":"a@x.com","role":"admin"}"#);
        assert!(parsed.is_err());
    }
}
