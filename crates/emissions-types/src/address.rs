use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountAddress([u8; 32]);

impl AccountAddress {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s.trim_start_matches("0x"))?;
        if bytes.len() != 32 {
            return Err(hex::FromHexError::InvalidStringLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountAddress(0x{}...)", &self.to_hex()[..8])
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

/// Module-owned accounts that reward and fee flows move between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModuleAccount {
    /// Escrow for inference request fees paid into topics.
    Requests,
    /// Ecosystem pool that the mint module pays out from.
    Ecosystem,
    /// Source of per-block participant rewards.
    Rewards,
    /// Escrow backing bonded reputer stake.
    Staking,
}

impl ModuleAccount {
    pub fn name(&self) -> &'static str {
        match self {
            ModuleAccount::Requests => "allorarequests",
            ModuleAccount::Ecosystem => "ecosystem",
            ModuleAccount::Rewards => "allorarewards",
            ModuleAccount::Staking => "allorastaking",
        }
    }
}

impl fmt::Display for ModuleAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
