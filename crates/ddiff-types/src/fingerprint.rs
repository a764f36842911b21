//! Structural fingerprints of nodes.
//!
//! A fingerprint is a domain-separated BLAKE3 hash over a canonical encoding of
//! a node. Tree keys are hashed in sorted order, so key order does not affect
//! the result; lists are hashed as index-keyed trees, matching how the diff
//! engine compares them. Structurally equal nodes therefore always share a
//! fingerprint, which makes fingerprints a cheap pre-filter before an exact
//! structural comparison.

use std::fmt;

use crate::node::{Node, NumericKey, Scalar, Tree};

const DOMAIN: &str = "ddiff-node-v1";

/// BLAKE3 fingerprint of a node's structure and content.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprint a node.
    pub fn of(node: &Node) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(DOMAIN.as_bytes());
        hasher.update(b":");
        feed_node(&mut hasher, node);
        Self(*hasher.finalize().as_bytes())
    }

    /// Fingerprint a tree as if it were a tree node.
    pub fn of_tree(tree: &Tree) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(DOMAIN.as_bytes());
        hasher.update(b":");
        feed_tree(&mut hasher, tree.iter());
        Self(*hasher.finalize().as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", self.short_hex())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn feed_node(hasher: &mut blake3::Hasher, node: &Node) {
    match node {
        Node::Scalar(s) => feed_scalar(hasher, s),
        Node::Tree(t) => feed_tree(hasher, t.iter()),
        Node::List(items) => {
            let keys: Vec<String> = (0..items.len()).map(|i| i.to_string()).collect();
            feed_tree(hasher, keys.iter().map(String::as_str).zip(items));
        }
        Node::Absent => {
            hasher.update(b"a");
        }
    }
}

fn feed_scalar(hasher: &mut blake3::Hasher, scalar: &Scalar) {
    match scalar {
        Scalar::Null => {
            hasher.update(b"n");
        }
        Scalar::Bool(b) => {
            hasher.update(b"b");
            hasher.update(&[u8::from(*b)]);
        }
        Scalar::Number(n) => match NumericKey::of(n) {
            NumericKey::Int(i) => {
                hasher.update(b"i");
                hasher.update(&i.to_le_bytes());
            }
            NumericKey::Float(bits) => {
                hasher.update(b"f");
                hasher.update(&bits.to_le_bytes());
            }
        },
        Scalar::String(s) => {
            hasher.update(b"s");
            feed_str(hasher, s);
        }
    }
}

fn feed_tree<'a>(hasher: &mut blake3::Hasher, entries: impl Iterator<Item = (&'a str, &'a Node)>) {
    let mut sorted: Vec<(&str, &Node)> = entries.collect();
    sorted.sort_unstable_by(|a, b| a.0.cmp(b.0));
    hasher.update(b"t");
    hasher.update(&(sorted.len() as u64).to_le_bytes());
    for (key, child) in sorted {
        feed_str(hasher, key);
        feed_node(hasher, child);
    }
}

fn feed_str(hasher: &mut blake3::Hasher, s: &str) {
    hasher.update(&(s.len() as u64).to_le_bytes());
    hasher.update(s.as_bytes());
}
