//! Design token change reports.
//!
//! Classifies the differences between two token snapshots into renamed,
//! deprecated, reverted, added, deleted, and per-property updated tokens.
//!
//! # Key Types
//!
//! - [`TokenDiffReport`] -- The full token report
//! - [`UpdatedTokens`] / [`TokenChanges`] / [`PropertyChange`] -- Property-level changes per token
//! - [`TokenDiffOptions`] -- Rename policy used during comparison

pub mod compare;
pub mod report;

pub use compare::{compare_tokens, TokenDiffOptions, SETS_KEY};
pub use report::{
    DeprecatedToken, PropertyChange, RenamedToken, TokenChanges, TokenDiffReport, TokenSummary,
    UpdatedTokens,
};
