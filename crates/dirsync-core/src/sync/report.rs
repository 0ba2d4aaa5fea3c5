//! Outcome of a sync run

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Kind of mutation, in the order the executor processes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionCategory {
    Remove,
    Add,
    Overwrite,
}

impl ActionCategory {
    pub const ALL: [ActionCategory; 3] = [Self::Remove, Self::Add, Self::Overwrite];

    /// Section title used by reports.
    pub fn title(self) -> &'static str {
        match self {
            Self::Remove => "Removals",
            Self::Add => "Additions",
            Self::Overwrite => "Overwrites",
        }
    }
}

/// Why an action was not carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The target was already gone
    AlreadyAbsent,
    /// The target exists and overwriting is off
    TargetExists,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyAbsent => write!(f, "already absent"),
            Self::TargetExists => write!(f, "target exists"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Dry-run: would have been executed
    Planned,
    Executed,
    Skipped { reason: SkipReason },
    Failed { error: String },
}

/// One planned or performed filesystem operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncAction {
    pub category: ActionCategory,
    /// Copy source; `None` for removals
    pub source: Option<PathBuf>,
    pub target: PathBuf,
    /// Whatever is replaced or removed goes to the trash
    pub via_trash: bool,
    pub outcome: Outcome,
}

impl SyncAction {
    /// One-line description of the operation, without its outcome.
    pub fn describe(&self) -> String {
        let target = self.target.display();
        let trash = if self.via_trash { " (via trash)" } else { "" };
        match (self.category, self.source.as_deref()) {
            (ActionCategory::Remove, _) | (_, None) => format!("remove {target}{trash}"),
            (ActionCategory::Add, Some(source)) => {
                format!("copy {} -> {target}{trash}", source.display())
            }
            (ActionCategory::Overwrite, Some(source)) => {
                format!("overwrite {target} with {}{trash}", source.display())
            }
        }
    }

    pub fn target(&self) -> &Path {
        &self.target
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())?;
        match &self.outcome {
            Outcome::Planned | Outcome::Executed => Ok(()),
            Outcome::Skipped { reason } => write!(f, " [skipped: {reason}]"),
            Outcome::Failed { error } => write!(f, " [failed: {error}]"),
        }
    }
}

/// Per-category tally of outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub planned: usize,
    pub executed: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl CategoryCounts {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Planned => self.planned += 1,
            Outcome::Executed => self.executed += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.planned + self.executed + self.skipped + self.failed
    }
}

/// Everything a sync run did or would do, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub dry_run: bool,
    /// The run stopped early; the remaining actions were not attempted
    pub cancelled: bool,
    pub removals: CategoryCounts,
    pub additions: CategoryCounts,
    pub overwrites: CategoryCounts,
    pub actions: Vec<SyncAction>,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Append an action and update its category counts.
    pub fn push(&mut self, action: SyncAction) {
        let counts = match action.category {
            ActionCategory::Remove => &mut self.removals,
            ActionCategory::Add => &mut self.additions,
            ActionCategory::Overwrite => &mut self.overwrites,
        };
        counts.record(&action.outcome);
        self.actions.push(action);
    }

    pub fn counts(&self, category: ActionCategory) -> CategoryCounts {
        match category {
            ActionCategory::Remove => self.removals,
            ActionCategory::Add => self.additions,
            ActionCategory::Overwrite => self.overwrites,
        }
    }

    /// Actions of one category, in order.
    pub fn actions_in(&self, category: ActionCategory) -> impl Iterator<Item = &SyncAction> {
        self.actions.iter().filter(move |a| a.category == category)
    }

    pub fn failures(&self) -> impl Iterator<Item = &SyncAction> {
        self.actions
            .iter()
            .filter(|a| matches!(a.outcome, Outcome::Failed { .. }))
    }

    /// No item failed. A cancelled run can still be successful.
    pub fn success(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(category: ActionCategory, outcome: Outcome) -> SyncAction {
        SyncAction {
            category,
            source: Some(PathBuf::from("/l/a.txt")),
            target: PathBuf::from("/r/a.txt"),
            via_trash: false,
            outcome,
        }
    }

    #[test]
    fn push_updates_counts() {
        let mut report = SyncReport::new(false);
        report.push(action(ActionCategory::Add, Outcome::Executed));
        report.push(action(
            ActionCategory::Add,
            Outcome::Skipped {
                reason: SkipReason::TargetExists,
            },
        ));
        report.push(action(
            ActionCategory::Overwrite,
            Outcome::Failed {
                error: "denied".into(),
            },
        ));

        assert_eq!(report.additions.executed, 1);
        assert_eq!(report.additions.skipped, 1);
        assert_eq!(report.overwrites.failed, 1);
        assert_eq!(report.removals.total(), 0);
        assert!(!report.success());
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn display_includes_outcome() {
        let skipped = action(
            ActionCategory::Add,
            Outcome::Skipped {
                reason: SkipReason::TargetExists,
            },
        );
        assert_eq!(
            skipped.to_string(),
            "copy /l/a.txt -> /r/a.txt [skipped: target exists]"
        );

        let mut removal = action(ActionCategory::Remove, Outcome::Planned);
        removal.source = None;
        removal.via_trash = true;
        assert_eq!(removal.to_string(), "remove /r/a.txt (via trash)");
    }

    #[test]
    fn trashed_replacements_say_so() {
        let mut replacing = action(ActionCategory::Add, Outcome::Executed);
        replacing.via_trash = true;
        assert_eq!(replacing.describe(), "copy /l/a.txt -> /r/a.txt (via trash)");

        let mut overwrite = action(ActionCategory::Overwrite, Outcome::Planned);
        overwrite.via_trash = true;
        assert_eq!(
            overwrite.describe(),
            "overwrite /r/a.txt with /l/a.txt (via trash)"
        );
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(Outcome::Skipped {
            reason: SkipReason::AlreadyAbsent,
        })
        .unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "already_absent");
    }
}
