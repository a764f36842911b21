//! Component change report types.

use std::fmt;

use ddiff_types::Node;
use indexmap::IndexMap;
use serde::Serialize;

/// Whether a change can break existing consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeClass {
    Breaking,
    NonBreaking,
}

impl ChangeClass {
    pub fn is_breaking(self) -> bool {
        matches!(self, ChangeClass::Breaking)
    }
}

/// The rule that classified a change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeReason {
    ComponentRemoved,
    ComponentAdded,
    RequiredPropertyAdded,
    RequiredPropertyRemoved,
    PropertyRemoved,
    PropertyTypeChanged,
    EnumValuesRemoved,
    EnumValuesAdded,
    PropertyAdded,
    MetadataChanged,
    /// Any change no other rule matches.
    Other,
}

impl ChangeReason {
    /// The fixed classification of each rule. Unmatched changes are
    /// non-breaking.
    pub const fn class(self) -> ChangeClass {
        match self {
            ChangeReason::ComponentRemoved
            | ChangeReason::RequiredPropertyAdded
            | ChangeReason::PropertyRemoved
            | ChangeReason::PropertyTypeChanged
            | ChangeReason::EnumValuesRemoved => ChangeClass::Breaking,
            ChangeReason::ComponentAdded
            | ChangeReason::RequiredPropertyRemoved
            | ChangeReason::EnumValuesAdded
            | ChangeReason::PropertyAdded
            | ChangeReason::MetadataChanged
            | ChangeReason::Other => ChangeClass::NonBreaking,
        }
    }
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ChangeReason::ComponentRemoved => "component removed",
            ChangeReason::ComponentAdded => "component added",
            ChangeReason::RequiredPropertyAdded => "required property added",
            ChangeReason::RequiredPropertyRemoved => "property no longer required",
            ChangeReason::PropertyRemoved => "property removed",
            ChangeReason::PropertyTypeChanged => "property type changed",
            ChangeReason::EnumValuesRemoved => "enum values removed",
            ChangeReason::EnumValuesAdded => "enum values added",
            ChangeReason::PropertyAdded => "property added",
            ChangeReason::MetadataChanged => "metadata changed",
            ChangeReason::Other => "changed",
        };
        f.write_str(text)
    }
}

/// A single classified change to a component.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClassifiedChange {
    pub kind: ChangeClass,
    pub component: String,
    pub reason: ChangeReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ClassifiedChange {
    pub fn new(component: impl Into<String>, reason: ChangeReason) -> Self {
        Self {
            kind: reason.class(),
            component: component.into(),
            reason,
            property: None,
            detail: None,
        }
    }

    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn is_breaking(&self) -> bool {
        self.kind.is_breaking()
    }
}

impl fmt::Display for ClassifiedChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)?;
        if let Some(property) = &self.property {
            write!(f, " `{property}`")?;
        }
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

/// The classified changes of one component, with its schema when the whole
/// component was added or removed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ComponentChangeSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Node>,
    pub changes: Vec<ClassifiedChange>,
}

impl ComponentChangeSet {
    pub fn has_breaking(&self) -> bool {
        self.changes.iter().any(ClassifiedChange::is_breaking)
    }

    pub fn breaking_count(&self) -> usize {
        self.changes.iter().filter(|c| c.is_breaking()).count()
    }

    pub fn non_breaking_count(&self) -> usize {
        self.changes.len() - self.breaking_count()
    }
}

/// Updated components split by whether any of their changes break.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatedComponents {
    pub breaking: IndexMap<String, ComponentChangeSet>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub non_breaking: IndexMap<String, ComponentChangeSet>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ComponentChanges {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub added: IndexMap<String, ComponentChangeSet>,
    pub deleted: IndexMap<String, ComponentChangeSet>,
    pub updated: UpdatedComponents,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ComponentTotals {
    pub added: usize,
    pub deleted: usize,
    pub updated: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSummary {
    pub has_breaking_changes: bool,
    pub total_components: ComponentTotals,
    pub breaking_changes: usize,
    pub non_breaking_changes: usize,
}

/// Classified changes between two sets of component schemas.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ComponentDiffReport {
    pub summary: ComponentSummary,
    pub changes: ComponentChanges,
}

impl ComponentDiffReport {
    /// Build a report from its change buckets, computing the summary.
    pub fn from_changes(changes: ComponentChanges) -> Self {
        let mut report = Self {
            summary: ComponentSummary::default(),
            changes,
        };
        report.refresh_summary();
        report
    }

    pub fn has_breaking_changes(&self) -> bool {
        self.summary.has_breaking_changes
    }

    /// Every classified change, in report order.
    pub fn classified(&self) -> impl Iterator<Item = &ClassifiedChange> {
        self.sets().flat_map(|set| set.changes.iter())
    }

    /// The classified changes of one component.
    pub fn changes_for<'a>(&'a self, component: &'a str) -> impl Iterator<Item = &'a ClassifiedChange> {
        self.classified().filter(move |c| c.component == component)
    }

    /// Keep only breaking changes.
    pub fn breaking_only(&self) -> Self {
        let keep_breaking = |set: &ComponentChangeSet| ComponentChangeSet {
            schema: set.schema.clone(),
            changes: set.changes.iter().filter(|c| c.is_breaking()).cloned().collect(),
        };
        let changes = ComponentChanges {
            added: IndexMap::new(),
            deleted: self
                .changes
                .deleted
                .iter()
                .map(|(name, set)| (name.clone(), keep_breaking(set)))
                .collect(),
            updated: UpdatedComponents {
                breaking: self
                    .changes
                    .updated
                    .breaking
                    .iter()
                    .map(|(name, set)| (name.clone(), keep_breaking(set)))
                    .collect(),
                non_breaking: IndexMap::new(),
            },
        };
        Self::from_changes(changes)
    }

    /// Fold another report into this one and recompute the summary.
    pub fn merge(&mut self, other: ComponentDiffReport) {
        self.changes.added.extend(other.changes.added);
        self.changes.deleted.extend(other.changes.deleted);
        self.changes.updated.breaking.extend(other.changes.updated.breaking);
        self.changes
            .updated
            .non_breaking
            .extend(other.changes.updated.non_breaking);
        self.refresh_summary();
    }

    fn refresh_summary(&mut self) {
        let breaking = self.classified().filter(|c| c.is_breaking()).count();
        let total = self.classified().count();
        self.summary = ComponentSummary {
            has_breaking_changes: breaking > 0,
            total_components: ComponentTotals {
                added: self.changes.added.len(),
                deleted: self.changes.deleted.len(),
                updated: self.changes.updated.breaking.len() + self.changes.updated.non_breaking.len(),
            },
            breaking_changes: breaking,
            non_breaking_changes: total - breaking,
        };
    }

    fn sets(&self) -> impl Iterator<Item = &ComponentChangeSet> {
        self.changes
            .added
            .values()
            .chain(self.changes.deleted.values())
            .chain(self.changes.updated.breaking.values())
            .chain(self.changes.updated.non_breaking.values())
    }
}
