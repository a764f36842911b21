//! Batch evaluation of named file pairs.

use ddiff_diff::{DiffError, DiffResult, Side};
use ddiff_types::{Normalizer, Tree};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::comparison::{Comparison, MergeReport};
use crate::config::BatchConfig;
use crate::error::{BatchError, PartialFailure};

/// One named pair of decoded snapshots. A missing side compares as empty.
#[derive(Clone, Debug, PartialEq)]
pub struct FilePair {
    pub name: String,
    pub original: Option<Value>,
    pub updated: Option<Value>,
}

impl FilePair {
    pub fn new(name: impl Into<String>, original: Option<Value>, updated: Option<Value>) -> Self {
        Self {
            name: name.into(),
            original,
            updated,
        }
    }
}

/// The report for one successfully compared file pair.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FileResult<O> {
    pub name: String,
    pub report: O,
}

/// Per-file reports and failures, both sorted by file name.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchReport<O> {
    pub results: Vec<FileResult<O>>,
    pub failures: Vec<PartialFailure>,
}

impl<O> BatchReport<O> {
    /// Returns `true` when every file pair was compared.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl<O: MergeReport + Clone> BatchReport<O> {
    /// Merge every per-file report in file-name order.
    pub fn combined(&self) -> O {
        self.results.iter().fold(O::default(), |mut acc, result| {
            acc.merge_from(result.report.clone());
            acc
        })
    }
}

/// One report for the merged corpus of every file that normalized, plus the
/// files that could not be included.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CorpusReport<O> {
    /// Files merged into the corpus, in merge order.
    pub files: Vec<String>,
    pub report: O,
    pub failures: Vec<PartialFailure>,
}

impl<O> CorpusReport<O> {
    /// Returns `true` when every file pair was merged.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Both sides of a file pair after normalization.
struct NormalizedPair {
    name: String,
    original: Tree,
    updated: Tree,
}

/// Runs a [`Comparison`] over many file pairs.
pub struct BatchRunner<C> {
    comparison: C,
    config: BatchConfig,
}

impl<C: Comparison> BatchRunner<C> {
    pub fn new(comparison: C, config: BatchConfig) -> Self {
        Self { comparison, config }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Compare every pair. A pair that fails to normalize is recorded as a
    /// [`PartialFailure`] and the rest of the batch continues, unless strict
    /// mode is on.
    pub fn run(&self, pairs: Vec<FilePair>) -> Result<BatchReport<C::Output>, BatchError> {
        self.run_with_failures(pairs, Vec::new())
    }

    /// Like [`run`](Self::run), with failures already found upstream (files
    /// that could not be decoded) counted alongside normalization failures.
    pub fn run_with_failures(
        &self,
        pairs: Vec<FilePair>,
        failures: Vec<PartialFailure>,
    ) -> Result<BatchReport<C::Output>, BatchError> {
        let outcomes = self.map_pairs(&pairs, |pair| self.compare_pair(pair));
        let (mut results, failures) = split(outcomes, failures);
        results.sort_by(|a: &FileResult<C::Output>, b| a.name.cmp(&b.name));
        let failures = self.settle(failures)?;

        info!(
            comparison = self.comparison.name(),
            files = results.len(),
            failures = failures.len(),
            "batch complete"
        );
        Ok(BatchReport { results, failures })
    }

    /// Merge every pair that normalizes into one original and one updated
    /// corpus, in file-name order, and compare the two once. A key defined by
    /// several files takes the value from the last one. A pair with a
    /// malformed side is left out of both corpora.
    pub fn run_corpus(
        &self,
        pairs: Vec<FilePair>,
        failures: Vec<PartialFailure>,
    ) -> Result<CorpusReport<C::Output>, BatchError> {
        let outcomes = self.map_pairs(&pairs, |pair| self.normalize_pair(pair));
        let (mut normalized, failures) = split(outcomes, failures);
        normalized.sort_by(|a: &NormalizedPair, b| a.name.cmp(&b.name));
        let failures = self.settle(failures)?;

        let mut original = Tree::new();
        let mut updated = Tree::new();
        let mut files = Vec::with_capacity(normalized.len());
        for pair in normalized {
            absorb(&mut original, pair.original, &pair.name, Side::Original);
            absorb(&mut updated, pair.updated, &pair.name, Side::Updated);
            files.push(pair.name);
        }

        let report = self.comparison.compare(&original, &updated);
        info!(
            comparison = self.comparison.name(),
            files = files.len(),
            failures = failures.len(),
            original_keys = original.len(),
            updated_keys = updated.len(),
            "corpus comparison complete"
        );
        Ok(CorpusReport {
            files,
            report,
            failures,
        })
    }

    /// Sort failures, log them, and apply strict mode.
    fn settle(&self, mut failures: Vec<PartialFailure>) -> Result<Vec<PartialFailure>, BatchError> {
        failures.sort_by(|a, b| a.path.cmp(&b.path).then(a.side.cmp(&b.side)));
        for failure in &failures {
            warn!(
                path = %failure.path,
                side = %failure.side,
                reason = %failure.reason,
                "file comparison failed"
            );
        }
        if self.config.strict && !failures.is_empty() {
            return Err(BatchError::Strict { failures });
        }
        Ok(failures)
    }

    #[cfg(feature = "parallel")]
    fn map_pairs<T, F>(&self, pairs: &[FilePair], f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&FilePair) -> T + Send + Sync,
    {
        use rayon::prelude::*;

        if self.config.parallel {
            pairs.par_iter().map(f).collect()
        } else {
            pairs.iter().map(f).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn map_pairs<T, F>(&self, pairs: &[FilePair], f: F) -> Vec<T>
    where
        F: Fn(&FilePair) -> T,
    {
        pairs.iter().map(f).collect()
    }

    fn normalize_pair(&self, pair: &FilePair) -> Result<NormalizedPair, PartialFailure> {
        let normalizer = self.config.normalizer();
        let trees = normalize(&normalizer, pair.original.as_ref(), Side::Original).and_then(|original| {
            normalize(&normalizer, pair.updated.as_ref(), Side::Updated).map(|updated| (original, updated))
        });
        let (original, updated) = trees.map_err(|err| PartialFailure::new(&pair.name, err))?;
        Ok(NormalizedPair {
            name: pair.name.clone(),
            original,
            updated,
        })
    }

    fn compare_pair(&self, pair: &FilePair) -> Result<FileResult<C::Output>, PartialFailure> {
        let NormalizedPair { name, original, updated } = self.normalize_pair(pair)?;
        debug!(
            file = %name,
            comparison = self.comparison.name(),
            "comparing file pair"
        );
        Ok(FileResult {
            report: self.comparison.compare(&original, &updated),
            name,
        })
    }
}

fn split<T>(
    outcomes: Vec<Result<T, PartialFailure>>,
    mut failures: Vec<PartialFailure>,
) -> (Vec<T>, Vec<PartialFailure>) {
    let mut ok = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Ok(value) => ok.push(value),
            Err(failure) => failures.push(failure),
        }
    }
    (ok, failures)
}

fn absorb(corpus: &mut Tree, file: Tree, name: &str, side: Side) {
    for (key, node) in file {
        if corpus.insert(key.clone(), node).is_some() {
            debug!(key = %key, file = %name, side = %side, "key redefined by a later file");
        }
    }
}

fn normalize(normalizer: &Normalizer, value: Option<&Value>, side: Side) -> DiffResult<Tree> {
    match value {
        None => Ok(Tree::new()),
        Some(value) => normalizer
            .tree(value)
            .map_err(|source| DiffError::malformed(side, source)),
    }
}
