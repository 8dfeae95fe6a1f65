use alloy_primitives::Address;
use hex::FromHex;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::{fmt, str::FromStr};

/// An EVM wallet address.
///
/// Parsing ignores letter case and rendering is always lowercase hex, so two addresses that only
/// differ in case are the same principal everywhere in the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct WalletAddress(Address);

impl WalletAddress {
    pub fn new(address: Address) -> Self {
        Self(address)
    }

    pub fn as_address(&self) -> &Address {
        &self.0
    }
}

impl FromStr for WalletAddress {
    type Err = InvalidWalletAddress;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(InvalidWalletAddress::MissingPrefix)?;
        let bytes = <[u8; 20]>::from_hex(digits).map_err(|_| InvalidWalletAddress::Malformed)?;
        Ok(Self(Address::from(bytes)))
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0.as_slice()))
    }
}

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum InvalidWalletAddress {
    #[error("wallet address must start with `0x`")]
    MissingPrefix,

    #[error("wallet address must be 40 hex digits")]
    Malformed,
}
