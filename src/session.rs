//! Session credentials.
//!
//! Sessions are HS256 JWTs that carry the wallet address they were issued for. They are
//! stateless: there is no revocation list and they only stop being valid once they expire.

use crate::wallet::WalletAddress;
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long an issued session stays valid.
pub(crate) const SESSION_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

const SESSION_ALGORITHM: Algorithm = Algorithm::HS256;

/// The claims carried by a session token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    /// The wallet this session was issued for.
    pub wallet_address: WalletAddress,

    /// Issuance timestamp, in seconds since the epoch.
    pub iat: i64,

    /// Expiration timestamp, in seconds since the epoch.
    pub exp: i64,

    /// A random identifier so sessions issued within the same second still differ.
    pub jti: String,
}

/// Issues and validates session tokens.
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionIssuer {
    pub fn new(secret: &[u8]) -> Self {
        // `iat` is enforced by deserialization since the claim isn't optional.
        let mut validation = Validation::new(SESSION_ALGORITHM);
        validation.set_required_spec_claims(&["exp"]);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a session for a wallet, starting at `now`.
    pub fn issue(
        &self,
        wallet_address: WalletAddress,
        now: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let expires_at = now + SESSION_LIFETIME;
        let claims = SessionClaims {
            wallet_address,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: hex::encode(rand::random::<[u8; 16]>()),
        };
        encode(&Header::new(SESSION_ALGORITHM), &claims, &self.encoding_key)
            .map_err(SessionError::Signing)
    }

    /// Validate a session token's signature and expiration.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, SessionError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::Invalid(e),
            })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session expired")]
    Expired,

    #[error("invalid session: {0}")]
    Invalid(jsonwebtoken::errors::Error),

    #[error("failed to sign session: {0}")]
    Signing(jsonwebtoken::errors::Error),
}
