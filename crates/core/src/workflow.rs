//! Transition-graph machinery shared by the sales and production workflows.
//!
//! A workflow is a closed status enum (see [`WorkflowStatus`]) plus one or
//! more [`TransitionTable`]s. Each table pairs the direct-reachability edges
//! with the canonical forward ordering that is used only to classify a
//! rejected request as "backward".
//!
//! Everything here is pure: tables are `'static` data and classification
//! never touches storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Status contract
// ---------------------------------------------------------------------------

/// A closed set of statuses governed by a workflow.
pub trait WorkflowStatus:
    Copy + Eq + fmt::Debug + fmt::Display + FromStr<Err = CoreError> + Send + Sync + 'static
{
    /// Workflow name used in error messages (e.g. `"sales order"`).
    const WORKFLOW: &'static str;

    /// Every status, in declaration order.
    const ALL: &'static [Self];

    /// The cancellation status. Never counted as a backward move.
    const CANCELED: Self;

    /// Whether the status is terminal.
    fn is_final(self) -> bool;

    /// Stable snake_case tag.
    fn as_str(self) -> &'static str;

    /// Human-readable label.
    fn label(self) -> &'static str;
}

// ---------------------------------------------------------------------------
// Rejection taxonomy
// ---------------------------------------------------------------------------

/// Why a requested transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum RejectionReason {
    /// The requested status equals the current one.
    SameStatus,
    /// The current status is terminal.
    FinalState,
    /// Cancellation requested after manufacturing started.
    ProductionLocked,
    /// Completion requested without the intermediate production step.
    SkippedStep,
    /// The requested status precedes the current one in the canonical order.
    BackwardTransition,
    /// Any other edge missing from the table.
    GenericInvalid,
}

impl RejectionReason {
    /// Stable machine-readable code.
    pub const fn code(self) -> &'static str {
        match self {
            RejectionReason::SameStatus => "SAME_STATUS",
            RejectionReason::FinalState => "FINAL_STATE",
            RejectionReason::ProductionLocked => "PRODUCTION_LOCKED",
            RejectionReason::SkippedStep => "SKIPPED_STEP",
            RejectionReason::BackwardTransition => "BACKWARD_TRANSITION",
            RejectionReason::GenericInvalid => "GENERIC_INVALID",
        }
    }

    /// Default English message for the reason.
    pub const fn message(self) -> &'static str {
        match self {
            RejectionReason::SameStatus => "the order is already in this status",
            RejectionReason::FinalState => "cannot alter a final-state order",
            RejectionReason::ProductionLocked => "cannot cancel an order already in production",
            RejectionReason::SkippedStep => "cannot complete without starting production first",
            RejectionReason::BackwardTransition => "cannot move an order back to an earlier status",
            RejectionReason::GenericInvalid => "transition not permitted",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// ---------------------------------------------------------------------------
// TransitionResult
// ---------------------------------------------------------------------------

/// Outcome of a transition check. `reason` is set iff `allowed` is false.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TransitionResult {
    pub allowed: bool,
    pub reason: Option<RejectionReason>,
}

impl TransitionResult {
    pub const fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub const fn rejected(reason: RejectionReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Convert into a `Result`, attaching the `from`/`to` pair to the error.
    pub fn into_result<S: WorkflowStatus>(self, from: S, to: S) -> Result<(), CoreError> {
        match self.reason {
            None if self.allowed => Ok(()),
            reason => Err(CoreError::InvalidTransition {
                workflow: S::WORKFLOW,
                from: from.as_str(),
                to: to.as_str(),
                reason: reason.unwrap_or(RejectionReason::GenericInvalid),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// TransitionTable
// ---------------------------------------------------------------------------

/// Immutable directed transition graph for one workflow variant.
pub struct TransitionTable<S: 'static> {
    name: &'static str,
    edges: fn(S) -> &'static [S],
    canonical_order: &'static [S],
}

/// One row of a table, as handed to presentation code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow<S: 'static> {
    pub status: S,
    pub is_final: bool,
    pub transitions: &'static [S],
}

impl<S: 'static> TransitionTable<S> {
    pub const fn new(
        name: &'static str,
        edges: fn(S) -> &'static [S],
        canonical_order: &'static [S],
    ) -> Self {
        Self {
            name,
            edges,
            canonical_order,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn canonical_order(&self) -> &'static [S] {
        self.canonical_order
    }
}

impl<S: WorkflowStatus> TransitionTable<S> {
    /// Statuses directly reachable from `from`, in table order.
    pub fn transitions(&self, from: S) -> &'static [S] {
        (self.edges)(from)
    }

    pub fn contains(&self, from: S, to: S) -> bool {
        self.transitions(from).contains(&to)
    }

    /// True when both statuses appear in the canonical order and `to`
    /// comes strictly before `from`.
    pub fn is_backward(&self, from: S, to: S) -> bool {
        let position = |s: S| self.canonical_order.iter().position(|&c| c == s);
        match (position(from), position(to)) {
            (Some(f), Some(t)) => t < f,
            _ => false,
        }
    }

    /// First reachable status not listed in `excluded`.
    pub fn first_transition_excluding(&self, from: S, excluded: &[S]) -> Option<S> {
        self.transitions(from)
            .iter()
            .copied()
            .find(|s| !excluded.contains(s))
    }

    /// Classify a requested transition.
    ///
    /// Precedence: same status, table hit, final state, then the
    /// workflow-specific `rule`, then backward, then generic.
    pub fn classify(
        &self,
        current: S,
        requested: S,
        rule: impl FnOnce(S, S) -> Option<RejectionReason>,
    ) -> TransitionResult {
        if current == requested {
            return TransitionResult::rejected(RejectionReason::SameStatus);
        }
        if self.contains(current, requested) {
            return TransitionResult::allowed();
        }
        if current.is_final() {
            return TransitionResult::rejected(RejectionReason::FinalState);
        }
        if let Some(reason) = rule(current, requested) {
            return TransitionResult::rejected(reason);
        }
        if requested != S::CANCELED && self.is_backward(current, requested) {
            return TransitionResult::rejected(RejectionReason::BackwardTransition);
        }
        TransitionResult::rejected(RejectionReason::GenericInvalid)
    }

    /// The whole table, one row per status in declaration order.
    pub fn snapshot(&self) -> Vec<TableRow<S>> {
        S::ALL
            .iter()
            .map(|&status| TableRow {
                status,
                is_final: status.is_final(),
                transitions: self.transitions(status),
            })
            .collect()
    }
}

impl<S: 'static> fmt::Debug for TransitionTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionTable")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Raw string boundary
// ---------------------------------------------------------------------------

/// Classify a transition given as raw stored tags.
///
/// Identical strings are `SameStatus`. A known final `current` is
/// `FinalState` whatever was requested. Otherwise a tag that does not parse
/// is absent from every table and every canonical order, so it is
/// `GenericInvalid`.
pub fn classify_raw<S: WorkflowStatus>(
    current: &str,
    requested: &str,
    classify: impl FnOnce(S, S) -> TransitionResult,
) -> TransitionResult {
    if current == requested {
        return TransitionResult::rejected(RejectionReason::SameStatus);
    }
    match (current.parse::<S>(), requested.parse::<S>()) {
        (Ok(current), Ok(requested)) => classify(current, requested),
        (Ok(current), Err(_)) if current.is_final() => {
            TransitionResult::rejected(RejectionReason::FinalState)
        }
        _ => TransitionResult::rejected(RejectionReason::GenericInvalid),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
