// SPDX-License-Identifier: GPL-3.0-only

use super::ArchiveOutcome;
use serde::Serialize;

/// Counts of outcomes in an archived batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArchiveSummary {
    /// Slots persisted successfully
    pub archived: usize,
    /// Slots that were empty on input
    pub empty: usize,
    /// Slots that failed
    pub failed: usize,
}

impl ArchiveSummary {
    pub fn from_outcomes(outcomes: &[ArchiveOutcome]) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome {
                ArchiveOutcome::Archived(_) => summary.archived += 1,
                ArchiveOutcome::Empty => summary.empty += 1,
                ArchiveOutcome::Failed(_) => summary.failed += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.archived + self.empty + self.failed
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }
}
