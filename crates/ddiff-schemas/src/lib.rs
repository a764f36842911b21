//! Component schema change classification.
//!
//! Runs the detailed tree diff over two sets of component schemas and tags
//! every change as breaking or non-breaking using a fixed rule table.
//!
//! # Key Types
//!
//! - [`ComponentDiffReport`] -- Summary counts plus added/deleted/updated buckets
//! - [`ClassifiedChange`] / [`ChangeReason`] / [`ChangeClass`] -- One tagged change
//! - [`ComponentChangeSet`] -- The changes of a single component

pub mod classify;
pub mod report;

pub use classify::{classify, compare_components};
pub use report::{
    ChangeClass, ChangeReason, ClassifiedChange, ComponentChangeSet, ComponentChanges,
    ComponentDiffReport, ComponentSummary, ComponentTotals, UpdatedComponents,
};
