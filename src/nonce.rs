//! Challenge nonces.
//!
//! A nonce is never stored: it's a digest of the wallet address and a server secret, so the same
//! value can be recomputed when the signed challenge comes back. Rotating the secret invalidates
//! every outstanding nonce at once.

use crate::wallet::WalletAddress;
use sha1::{Digest, Sha1};

/// Derives the challenge nonce for a wallet address.
pub struct NonceGenerator {
    secret: String,
}

impl NonceGenerator {
    pub fn new(secret: impl Into<String>) -> Self {
        Self { secret: secret.into() }
    }

    /// Generate the nonce for a wallet.
    pub fn generate(&self, address: &WalletAddress) -> String {
        self.generate_raw(&address.to_string())
    }

    /// Generate the nonce for a raw address string.
    ///
    /// The input is lowercased first so letter case never changes the resulting nonce.
    pub fn generate_raw(&self, address: &str) -> String {
        let address = address.to_lowercase();
        let digest = Sha1::digest(format!("{address}:{}", self.secret).as_bytes());
        hex::encode(digest)
    }
}
