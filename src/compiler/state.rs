//! Build cycle state machine.
//!
//! ```text
//! Idle → CheckingDependencies ─┬→ SkippedNoChange
//!                              └→ Refreshing → Globbing → CompilingEntries → Done
//!                                      │           │
//!                                      └───────────┴→ Failed
//! ```

use std::fmt;

/// Where the plugin is in the current (or last) build cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CycleState {
    #[default]
    Idle,
    CheckingDependencies,
    /// Terminal: no tracked file changed.
    SkippedNoChange,
    Refreshing,
    Globbing,
    CompilingEntries,
    /// Terminal: every entry was attempted.
    Done { compiled: usize, failed: usize },
    /// Terminal: refresh or entry enumeration failed.
    Failed,
}

impl CycleState {
    /// Whether the cycle has finished.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::SkippedNoChange | Self::Done { .. } | Self::Failed
        )
    }

    /// Whether moving from `self` to `next` follows the cycle graph.
    pub fn can_advance_to(self, next: Self) -> bool {
        use CycleState::*;
        match (self, next) {
            (state, CheckingDependencies) => state == Idle || state.is_terminal(),
            (CheckingDependencies, SkippedNoChange | Refreshing) => true,
            (Refreshing, Globbing | Failed) => true,
            (Globbing, CompilingEntries | Done { .. } | Failed) => true,
            (CompilingEntries, Done { .. }) => true,
            _ => false,
        }
    }
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::CheckingDependencies => f.write_str("checking dependencies"),
            Self::SkippedNoChange => f.write_str("skipped (no change)"),
            Self::Refreshing => f.write_str("refreshing"),
            Self::Globbing => f.write_str("globbing"),
            Self::CompilingEntries => f.write_str("compiling entries"),
            Self::Done { compiled, failed } => {
                write!(f, "done ({compiled} compiled, {failed} failed)")
            }
            Self::Failed => f.write_str("failed"),
        }
    }
}
