use crate::wallet::WalletAddress;
use alloy_primitives::Signature;

/// A nonce along with the wallet signature over it.
pub(crate) struct SignedNonce {
    /// The nonce string exactly as it was handed out.
    pub(crate) nonce: String,

    /// A 65 byte `r || s || v` signature in hex form, optionally `0x` prefixed.
    pub(crate) signed_message: String,
}

impl SignedNonce {
    /// Recovers the wallet that signed this nonce.
    ///
    /// The nonce is hashed as an EIP-191 personal message, which is what wallets sign when asked
    /// to `personal_sign` a string.
    pub(crate) fn recover(&self) -> Result<WalletAddress, VerificationError> {
        use VerificationError::*;
        let digits = self.signed_message.strip_prefix("0x").unwrap_or(&self.signed_message);
        let bytes = hex::decode(digits).map_err(|_| MalformedSignature)?;
        let signature = Signature::from_raw(&bytes).map_err(|_| MalformedSignature)?;
        let address = signature
            .recover_address_from_msg(self.nonce.as_bytes())
            .map_err(|_| Recovery)?;
        Ok(WalletAddress::new(address))
    }
}

#[derive(Debug, thiserror::Error)]
pub(crate) enum VerificationError {
    #[error("malformed signature")]
    MalformedSignature,

    #[error("signer recovery failed")]
    Recovery,
}
