//! Batch comparison of design-data files.
//!
//! Each named file pair is normalized and compared independently. Pairs that
//! fail to normalize become partial failures instead of aborting the batch,
//! and results are sorted by file name so evaluation order never shows in the
//! output. Token corpora spread over many files can instead be merged and
//! compared once, so definitions that move between files are not reported as
//! deletions.
//!
//! # Key Types
//!
//! - [`BatchRunner`] -- Runs a [`Comparison`] over many [`FilePair`]s
//! - [`BatchReport`] / [`FileResult`] / [`PartialFailure`] -- Per-file outcomes
//! - [`CorpusReport`] -- One report over the merged files
//! - [`TokenComparison`] / [`SchemaComparison`] -- The two comparison kinds
//! - [`BatchConfig`] -- Strict mode, parallelism, depth limit, rename policy

pub mod comparison;
pub mod config;
pub mod error;
pub mod runner;

pub use comparison::{Comparison, MergeReport, SchemaComparison, TokenComparison};
pub use config::BatchConfig;
pub use error::{BatchError, PartialFailure};
pub use runner::{BatchReport, BatchRunner, CorpusReport, FilePair, FileResult};
