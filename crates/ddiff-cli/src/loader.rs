//! Load file pairs from JSON files or directories of JSON files.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use ddiff_batch::{FilePair, PartialFailure};
use ddiff_diff::Side;
use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

/// Decoded file pairs, plus the sides that were not valid JSON.
#[derive(Debug, Default)]
pub struct LoadedPairs {
    pub pairs: Vec<FilePair>,
    pub failures: Vec<PartialFailure>,
}

impl LoadedPairs {
    /// Decode both sides of a pair. A side that is not valid JSON becomes a
    /// failure and the pair is dropped.
    fn push(&mut self, name: String, original: Option<&Path>, updated: Option<&Path>) -> anyhow::Result<()> {
        let before = self.decode(&name, original, Side::Original)?;
        let after = self.decode(&name, updated, Side::Updated)?;
        if let (Some(before), Some(after)) = (before, after) {
            self.pairs.push(FilePair::new(name, before, after));
        }
        Ok(())
    }

    /// `Ok(None)` means the side was undecodable; `Ok(Some(None))` means the
    /// file does not exist on that side.
    fn decode(&mut self, name: &str, path: Option<&Path>, side: Side) -> anyhow::Result<Option<Option<Value>>> {
        let Some(path) = path else {
            return Ok(Some(None));
        };
        let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        match serde_json::from_str(&text) {
            Ok(value) => Ok(Some(Some(value))),
            Err(err) => {
                debug!(file = %path.display(), error = %err, "undecodable json");
                self.failures.push(PartialFailure::undecodable(name, side, err));
                Ok(None)
            }
        }
    }
}

/// Pair up the inputs. Two files form one pair; two directories are paired
/// by relative path, with a file missing on one side compared as empty.
/// Files that cannot be read are errors; files that are not valid JSON are
/// reported as failures of their pair.
pub fn load_pairs(original: &Path, updated: &Path) -> anyhow::Result<LoadedPairs> {
    let mut loaded = LoadedPairs::default();
    match (original.is_dir(), updated.is_dir()) {
        (false, false) => {
            let name = updated
                .file_name()
                .or_else(|| original.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| updated.display().to_string());
            loaded.push(name, Some(original), Some(updated))?;
        }
        (true, true) => {
            for (name, (before, after)) in pair_directories(original, updated)? {
                loaded.push(name, before.as_deref(), after.as_deref())?;
            }
        }
        _ => bail!(
            "cannot compare a file with a directory: {} vs {}",
            original.display(),
            updated.display()
        ),
    }
    Ok(loaded)
}

type PairedPaths = BTreeMap<String, (Option<PathBuf>, Option<PathBuf>)>;

fn pair_directories(original: &Path, updated: &Path) -> anyhow::Result<PairedPaths> {
    let mut paired = PairedPaths::new();
    for (name, path) in json_files(original)? {
        paired.entry(name).or_default().0 = Some(path);
    }
    for (name, path) in json_files(updated)? {
        paired.entry(name).or_default().1 = Some(path);
    }
    Ok(paired)
}

/// Every `*.json` file under `root`, keyed by its `/`-separated relative path.
fn json_files(root: &Path) -> anyhow::Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push((name, path.to_path_buf()));
    }
    debug!(root = %root.display(), files = files.len(), "collected json files");
    Ok(files)
}
