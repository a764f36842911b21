//! Foundation types for design-data diffing.
//!
//! Design tokens and component schemas arrive as decoded JSON. This crate
//! normalizes them once into an ordered tree model that the rest of the
//! workspace matches on exhaustively.
//!
//! # Key Types
//!
//! - [`Tree`] / [`Node`] / [`Scalar`] -- Ordered-key trees of scalars, trees, and lists
//! - [`Normalizer`] -- Boundary conversion from `serde_json::Value`
//! - [`MalformedTreeError`] -- Input that cannot be normalized, with its path
//! - [`TreePath`] -- Dot-joined address of a node
//! - [`Fingerprint`] -- BLAKE3 structural hash, independent of key order
//! - [`AliasRef`] -- A `{token-name}` reference, recognised but never resolved

pub mod alias;
pub mod error;
pub mod fingerprint;
pub mod node;
pub mod normalize;
pub mod path;

pub use alias::AliasRef;
pub use error::{MalformedReason, MalformedTreeError};
pub use fingerprint::Fingerprint;
pub use node::{Node, Scalar, Tree};
pub use normalize::{Normalizer, DEFAULT_MAX_DEPTH};
pub use path::TreePath;
