//! Human-readable text output.

use std::io::{self, Write};

use colored::Colorize;
use ddiff_batch::PartialFailure;
use ddiff_schemas::{ComponentChangeSet, ComponentDiffReport};
use ddiff_tokens::{PropertyChange, TokenChanges, TokenDiffReport};
use ddiff_types::Node;

pub fn tokens_text(out: &mut impl Write, report: &TokenDiffReport, failures: &[PartialFailure]) -> io::Result<()> {
    writeln!(out, "{}", "Token Diff Report".bold())?;
    if report.is_empty() {
        writeln!(out, "{} No token changes", "✓".green().bold())?;
    } else {
        let summary = report.summary();
        writeln!(
            out,
            "Renamed: {}  Deprecated: {}  Reverted: {}  Added: {}  Deleted: {}  Updated: {}",
            summary.renamed, summary.deprecated, summary.reverted, summary.added, summary.deleted, summary.updated
        )?;
        if summary.alias_retargets > 0 {
            writeln!(out, "Alias retargets: {}", summary.alias_retargets)?;
        }
    }

    if !report.renamed.is_empty() {
        writeln!(out, "\n{}", "Renamed tokens:".cyan())?;
        for (new, renamed) in &report.renamed {
            writeln!(out, "  ~ {} -> {}", renamed.old_name, new.cyan())?;
        }
    }
    if !report.deprecated.is_empty() {
        writeln!(out, "\n{}", "Deprecated tokens:".yellow())?;
        for (name, token) in &report.deprecated {
            match &token.deprecated_comment {
                Some(comment) => writeln!(out, "  ! {} ({comment})", name.yellow())?,
                None => writeln!(out, "  ! {}", name.yellow())?,
            }
        }
    }
    if !report.reverted.is_empty() {
        writeln!(out, "\n{}", "Reverted deprecations:".blue())?;
        for name in report.reverted.keys() {
            writeln!(out, "  ^ {}", name.blue())?;
        }
    }
    if !report.added.is_empty() {
        writeln!(out, "\n{}", "Added tokens:".green())?;
        for name in report.added.keys() {
            writeln!(out, "  + {}", name.green())?;
        }
    }
    if !report.deleted.is_empty() {
        writeln!(out, "\n{}", "Deleted tokens:".red())?;
        for (name, entry) in report.deleted.iter() {
            let reason = entry
                .as_tree()
                .and_then(|t| t.get_str("deprecated_comment").or_else(|| t.get_str("deprecated")));
            match reason {
                Some(reason) => writeln!(out, "  - {} [deprecated: {reason}]", name.red())?,
                None => writeln!(out, "  - {}", name.red())?,
            }
        }
    }

    if !report.updated.is_empty() {
        writeln!(out, "\n{}", "Updated tokens:".bold())?;
        let buckets = [
            ("+", &report.updated.added),
            ("-", &report.updated.deleted),
            ("~", &report.updated.renamed),
            ("~", &report.updated.updated),
        ];
        let mut tokens: Vec<&str> = Vec::new();
        for (_, bucket) in &buckets {
            for name in bucket.keys() {
                if !tokens.contains(&name.as_str()) {
                    tokens.push(name);
                }
            }
        }
        for token in tokens {
            writeln!(out, "  {token}")?;
            for (marker, bucket) in &buckets {
                if let Some(changes) = bucket.get(token) {
                    property_lines(out, marker, changes)?;
                }
            }
        }
    }

    failures_text(out, failures)
}

fn property_lines(out: &mut impl Write, marker: &str, changes: &TokenChanges) -> io::Result<()> {
    for change in &changes.changes {
        writeln!(out, "    {marker} {}", describe(change))?;
    }
    Ok(())
}

fn describe(change: &PropertyChange) -> String {
    match (&change.original_value, &change.new_value) {
        (Some(before), Some(after)) => {
            format!("{}: {} -> {}", change.path, value_text(before), value_text(after))
        }
        (None, Some(after)) => format!("{}: {}", change.path, value_text(after)),
        (Some(before), None) => format!("{}: {}", change.path, value_text(before).dimmed()),
        (None, None) => change.path.to_string(),
    }
}

fn value_text(node: &Node) -> String {
    match node.as_str() {
        Some(s) => s.to_owned(),
        None => node.to_json().to_string(),
    }
}

pub fn components_text(
    out: &mut impl Write,
    report: &ComponentDiffReport,
    failures: &[PartialFailure],
) -> io::Result<()> {
    if report.has_breaking_changes() {
        writeln!(out, "{}", "BREAKING CHANGES DETECTED".red().bold())?;
    } else {
        writeln!(out, "{} No breaking changes", "✓".green().bold())?;
    }

    writeln!(out, "\n{}", "Component Schema Diff Report".bold())?;
    writeln!(out, "Breaking Changes: {}", report.summary.breaking_changes)?;
    writeln!(out, "Non-Breaking Changes: {}", report.summary.non_breaking_changes)?;

    let changes = &report.changes;
    if !changes.added.is_empty() {
        writeln!(out, "\n{}", "Added Components:".green())?;
        for name in changes.added.keys() {
            writeln!(out, "  + {}", name.green())?;
        }
    }
    if !changes.deleted.is_empty() {
        writeln!(out, "\n{}", "Deleted Components (BREAKING):".red())?;
        for name in changes.deleted.keys() {
            writeln!(out, "  - {}", name.red())?;
        }
    }
    if !changes.updated.breaking.is_empty() {
        writeln!(out, "\n{}", "Breaking Updates:".red())?;
        for (name, set) in &changes.updated.breaking {
            writeln!(out, "  ~ {}", name.red())?;
            change_lines(out, set)?;
        }
    }
    if !changes.updated.non_breaking.is_empty() {
        writeln!(out, "\n{}", "Non-Breaking Updates:".yellow())?;
        for (name, set) in &changes.updated.non_breaking {
            writeln!(out, "  ~ {}", name.yellow())?;
            change_lines(out, set)?;
        }
    }

    failures_text(out, failures)
}

fn change_lines(out: &mut impl Write, set: &ComponentChangeSet) -> io::Result<()> {
    for change in &set.changes {
        if change.is_breaking() {
            writeln!(out, "      {} {change}", "✗".red())?;
        } else {
            writeln!(out, "      {} {change}", "·".yellow())?;
        }
    }
    Ok(())
}

fn failures_text(out: &mut impl Write, failures: &[PartialFailure]) -> io::Result<()> {
    if failures.is_empty() {
        return Ok(());
    }
    writeln!(out, "\n{}", format!("{} file(s) could not be compared:", failures.len()).yellow())?;
    for failure in failures {
        writeln!(out, "  {} {failure}", "!".yellow().bold())?;
    }
    Ok(())
}
