// 🌳 Balance Tree - keccak Merkle tree over (index, account, amount) leaves
// Layout matches the on-chain distributor: sorted leaves, sorted-pair hashing

use crate::address::Address;
use sha3::{Digest, Keccak256};

pub type Hash = [u8; 32];

/// Root of a tree with no leaves
pub const EMPTY_ROOT: Hash = [0u8; 32];

pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash of two nodes, smaller first. A missing sibling promotes the node.
pub fn combined_hash(first: &Hash, second: Option<&Hash>) -> Hash {
    let Some(second) = second else {
        return *first;
    };
    let (lo, hi) = if first <= second { (first, second) } else { (second, first) };

    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo);
    buf[32..].copy_from_slice(hi);
    keccak256(&buf)
}

pub fn to_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

// ============================================================================
// MERKLE TREE
// ============================================================================

#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// layers[0] = sorted, deduplicated leaves; last layer = root
    layers: Vec<Vec<Hash>>,
}

impl MerkleTree {
    pub fn new(mut leaves: Vec<Hash>) -> Self {
        leaves.sort();
        leaves.dedup();

        let mut layers = vec![leaves];
        while layers[layers.len() - 1].len() > 1 {
            let next = layers[layers.len() - 1]
                .chunks(2)
                .map(|pair| combined_hash(&pair[0], pair.get(1)))
                .collect();
            layers.push(next);
        }

        MerkleTree { layers }
    }

    pub fn root(&self) -> Hash {
        self.layers
            .last()
            .and_then(|layer| layer.first())
            .copied()
            .unwrap_or(EMPTY_ROOT)
    }

    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Sibling hashes from leaf to root, or None when the leaf is not in the tree
    pub fn proof(&self, leaf: &Hash) -> Option<Vec<Hash>> {
        let mut index = self.layers[0].binary_search(leaf).ok()?;
        let mut proof = Vec::new();

        for layer in &self.layers {
            let sibling = if index % 2 == 0 { index + 1 } else { index - 1 };
            if let Some(hash) = layer.get(sibling) {
                proof.push(*hash);
            }
            index /= 2;
        }

        Some(proof)
    }
}

// ============================================================================
// BALANCE TREE
// ============================================================================

#[derive(Debug, Clone)]
pub struct BalanceTree {
    tree: MerkleTree,
}

impl BalanceTree {
    /// Leaf i is built from `balances[i]` with index i
    pub fn new(balances: &[(Address, u64)]) -> Self {
        let leaves = balances
            .iter()
            .enumerate()
            .map(|(index, (account, amount))| Self::to_node(index as u64, account, *amount))
            .collect();

        BalanceTree {
            tree: MerkleTree::new(leaves),
        }
    }

    /// keccak256(uint256 index ‖ address account ‖ uint256 amount), packed
    pub fn to_node(index: u64, account: &Address, amount: u64) -> Hash {
        let mut buf = [0u8; 84];
        buf[24..32].copy_from_slice(&index.to_be_bytes());
        buf[32..52].copy_from_slice(account.as_bytes());
        buf[76..84].copy_from_slice(&amount.to_be_bytes());
        keccak256(&buf)
    }

    pub fn verify_proof(index: u64, account: &Address, amount: u64, proof: &[Hash], root: &Hash) -> bool {
        let computed = proof
            .iter()
            .fold(Self::to_node(index, account, amount), |node, sibling| {
                combined_hash(&node, Some(sibling))
            });
        computed == *root
    }

    pub fn root(&self) -> Hash {
        self.tree.root()
    }

    pub fn hex_root(&self) -> String {
        to_hex(&self.root())
    }

    pub fn proof(&self, index: u64, account: &Address, amount: u64) -> Option<Vec<Hash>> {
        self.tree.proof(&Self::to_node(index, account, amount))
    }
}

// ============================================================================
// TESTS
// ============================================================================
