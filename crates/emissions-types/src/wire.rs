//! Nonce messages exchanged with the rest of the chain.
//!
//! The binary form is protobuf and must not change: other modules and
//! clients decode these bytes directly.
//!
//! ```text
//! message Nonce                { int64 block_height = 1; }
//! message Nonces               { repeated Nonce nonces = 1; }
//! message ReputerRequestNonce  { Nonce reputer_nonce = 1; Nonce worker_nonce = 2; }
//! message ReputerRequestNonces { repeated ReputerRequestNonce nonces = 1; }
//! ```
//!
//! Unset message fields are omitted, so `None` and `Some(Nonce::default())`
//! encode differently.

use crate::error::WireError;
use crate::BlockHeight;
use prost::Message;
use serde::{Deserialize, Serialize};

/// Protobuf encoding with decode failures mapped into [`WireError`].
pub trait WireMessage: Message + Default {
    fn to_wire_bytes(&self) -> Vec<u8> {
        self.encode_to_vec()
    }

    fn from_wire_bytes(bytes: &[u8]) -> Result<Self, WireError> {
        Ok(Self::decode(bytes)?)
    }
}

impl<T: Message + Default> WireMessage for T {}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Message)]
pub struct Nonce {
    #[prost(int64, tag = "1")]
    pub block_height: BlockHeight,
}

impl Nonce {
    pub fn new(block_height: BlockHeight) -> Self {
        Self { block_height }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Message)]
pub struct Nonces {
    #[prost(message, repeated, tag = "1")]
    pub nonces: Vec<Nonce>,
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Message)]
pub struct ReputerRequestNonce {
    #[prost(message, optional, tag = "1")]
    pub reputer_nonce: Option<Nonce>,
    #[prost(message, optional, tag = "2")]
    pub worker_nonce: Option<Nonce>,
}

impl ReputerRequestNonce {
    pub fn new(reputer_height: BlockHeight, worker_height: BlockHeight) -> Self {
        Self {
            reputer_nonce: Some(Nonce::new(reputer_height)),
            worker_nonce: Some(Nonce::new(worker_height)),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Message)]
pub struct ReputerRequestNonces {
    #[prost(message, repeated, tag = "1")]
    pub nonces: Vec<ReputerRequestNonce>,
}

impl ReputerRequestNonces {
    /// Oldest reputer nonce among the outstanding requests.
    pub fn oldest_reputer_height(&self) -> Option<BlockHeight> {
        self.nonces
            .iter()
            .filter_map(|n| n.reputer_nonce.map(|r| r.block_height))
            .min()
    }
}
