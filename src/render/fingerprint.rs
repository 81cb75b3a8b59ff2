//! Content fingerprints.
//!
//! A fingerprint is the hex SHA-256 of the content's JSON form. Node
//! identity is not serialized and every map or set in a node is ordered, so
//! equal content always hashes equal.

use sha2::{Digest, Sha256};

use crate::surface::Node;

pub fn fingerprint(content: &[Node]) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(content)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
