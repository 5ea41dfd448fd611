// crates/rhem-core/src/crypto.rs
//
// Hashing and Merkle proofs for the one-time claim distribution.
//
// Leaves are sha256(address || amount as 16-byte big-endian). Interior nodes
// hash the sorted pair, so a proof is just the list of sibling hashes with no
// left/right flags. An odd node at the end of a layer is promoted unchanged.

use sha2::{Digest, Sha256};

use crate::address::{Address, Amount};

/// Compute SHA-256 hash of the given bytes.
pub fn hash_bytes(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash two nodes in sorted order.
pub fn hash_pair(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut hasher = Sha256::new();
    hasher.update(lo);
    hasher.update(hi);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Leaf hash for a claim of `amount` by `account`.
pub fn claim_leaf(account: &Address, amount: Amount) -> [u8; 32] {
    let mut buf = [0u8; 48];
    buf[..32].copy_from_slice(account.as_bytes());
    buf[32..].copy_from_slice(&amount.to_be_bytes());
    hash_bytes(&buf)
}

/// Check that `proof` links `leaf` to `root`.
pub fn verify_proof(root: &[u8; 32], leaf: [u8; 32], proof: &[[u8; 32]]) -> bool {
    let computed = proof.iter().fold(leaf, |acc, sibling| hash_pair(&acc, sibling));
    &computed == root
}

/// Compute the root over a list of leaves. Returns the zero hash for no leaves.
pub fn merkle_root(leaves: &[[u8; 32]]) -> [u8; 32] {
    if leaves.is_empty() {
        return [0u8; 32];
    }
    let mut layer = leaves.to_vec();
    while layer.len() > 1 {
        layer = next_layer(&layer);
    }
    layer[0]
}

/// Build the proof for the leaf at `index`. `None` if out of range.
pub fn merkle_proof(leaves: &[[u8; 32]], index: usize) -> Option<Vec<[u8; 32]>> {
    if index >= leaves.len() {
        return None;
    }
    let mut proof = Vec::new();
    let mut layer = leaves.to_vec();
    let mut idx = index;
    while layer.len() > 1 {
        let sibling = idx ^ 1;
        if sibling < layer.len() {
            proof.push(layer[sibling]);
        }
        layer = next_layer(&layer);
        idx /= 2;
    }
    Some(proof)
}

fn next_layer(layer: &[[u8; 32]]) -> Vec<[u8; 32]> {
    layer
        .chunks(2)
        .map(|pair| match pair {
            [a, b] => hash_pair(a, b),
            [a] => *a,
            _ => unreachable!("chunks(2) yields one or two items"),
        })
        .collect()
}
