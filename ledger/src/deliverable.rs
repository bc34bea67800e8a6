//! Deliverable records attached to accounts.

use ledgerd_common::DeliverableId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An artifact delivered by the provider under an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deliverable {
    /// Identifier, unique within the account.
    pub id: DeliverableId,
    /// Content fingerprint of the delivered model.
    pub model_root_hash: Vec<u8>,
}

impl Deliverable {
    /// Create a deliverable with a precomputed root hash.
    pub fn new(id: DeliverableId, model_root_hash: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            model_root_hash: model_root_hash.into(),
        }
    }

    /// Create a deliverable whose root hash is the SHA-256 of `content`.
    pub fn from_content(id: DeliverableId, content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self {
            id,
            model_root_hash: hasher.finalize().to_vec(),
        }
    }
}
