//! Production (manufacturing) order status workflow.
//!
//! Transition rules:
//! - `awaiting`      -> `in_production`, `canceled`
//! - `in_production` -> `partial`, `completed`
//! - `partial`       -> `in_production`, `completed`
//! - `completed`, `canceled` are final
//!
//! `partial` marks an order whose line items are only partly produced; the
//! `partial -> in_production` back-edge resumes work on the remainder.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::workflow::{self, RejectionReason, TransitionResult, TransitionTable, WorkflowStatus};

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ProductionOrderStatus {
    Awaiting,
    InProduction,
    Partial,
    Completed,
    Canceled,
}

/// Status assigned by the production-order creator.
pub const INITIAL_STATUS: ProductionOrderStatus = ProductionOrderStatus::Awaiting;

/// Terminal statuses.
pub const FINAL_STATUSES: &[ProductionOrderStatus] =
    &[ProductionOrderStatus::Completed, ProductionOrderStatus::Canceled];

impl WorkflowStatus for ProductionOrderStatus {
    const WORKFLOW: &'static str = "production order";

    const ALL: &'static [Self] = &[
        ProductionOrderStatus::Awaiting,
        ProductionOrderStatus::InProduction,
        ProductionOrderStatus::Partial,
        ProductionOrderStatus::Completed,
        ProductionOrderStatus::Canceled,
    ];

    const CANCELED: Self = ProductionOrderStatus::Canceled;

    fn is_final(self) -> bool {
        FINAL_STATUSES.contains(&self)
    }

    fn as_str(self) -> &'static str {
        match self {
            ProductionOrderStatus::Awaiting => "awaiting",
            ProductionOrderStatus::InProduction => "in_production",
            ProductionOrderStatus::Partial => "partial",
            ProductionOrderStatus::Completed => "completed",
            ProductionOrderStatus::Canceled => "canceled",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ProductionOrderStatus::Awaiting => "Awaiting",
            ProductionOrderStatus::InProduction => "In production",
            ProductionOrderStatus::Partial => "Partially produced",
            ProductionOrderStatus::Completed => "Completed",
            ProductionOrderStatus::Canceled => "Canceled",
        }
    }
}

impl fmt::Display for ProductionOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductionOrderStatus {
    type Err = CoreError;

    /// Accepts the snake_case tag or the legacy stored tag, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "awaiting" | "aguardando" => Ok(ProductionOrderStatus::Awaiting),
            "in_production" | "em_producao" => Ok(ProductionOrderStatus::InProduction),
            "partial" | "parcial" => Ok(ProductionOrderStatus::Partial),
            "completed" | "concluido" => Ok(ProductionOrderStatus::Completed),
            "canceled" | "cancelado" => Ok(ProductionOrderStatus::Canceled),
            _ => Err(CoreError::UnknownStatus {
                workflow: Self::WORKFLOW,
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Transition table
// ---------------------------------------------------------------------------

fn production_transitions(from: ProductionOrderStatus) -> &'static [ProductionOrderStatus] {
    use ProductionOrderStatus::*;
    match from {
        Awaiting => &[InProduction, Canceled],
        InProduction => &[Partial, Completed],
        Partial => &[InProduction, Completed],
        Completed | Canceled => &[],
    }
}

pub static PRODUCTION_TABLE: TransitionTable<ProductionOrderStatus> = TransitionTable::new(
    "production_order",
    production_transitions,
    &[
        ProductionOrderStatus::Awaiting,
        ProductionOrderStatus::InProduction,
        ProductionOrderStatus::Completed,
        ProductionOrderStatus::Canceled,
    ],
);

fn production_rule(
    current: ProductionOrderStatus,
    requested: ProductionOrderStatus,
) -> Option<RejectionReason> {
    use ProductionOrderStatus::*;
    match (current, requested) {
        (InProduction, Canceled) => Some(RejectionReason::ProductionLocked),
        (Awaiting, Completed) => Some(RejectionReason::SkippedStep),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Decide whether `current -> requested` is legal.
pub fn is_transition_allowed(
    current: ProductionOrderStatus,
    requested: ProductionOrderStatus,
) -> TransitionResult {
    PRODUCTION_TABLE.classify(current, requested, production_rule)
}

/// Same as [`is_transition_allowed`] for raw stored tags.
pub fn is_transition_allowed_raw(current: &str, requested: &str) -> TransitionResult {
    workflow::classify_raw(current, requested, is_transition_allowed)
}

pub fn allowed_transitions(current: ProductionOrderStatus) -> &'static [ProductionOrderStatus] {
    PRODUCTION_TABLE.transitions(current)
}

pub fn is_final_status(status: ProductionOrderStatus) -> bool {
    status.is_final()
}

/// Suggested forward step: the first allowed transition other than `canceled`.
pub fn next_status(current: ProductionOrderStatus) -> Option<ProductionOrderStatus> {
    PRODUCTION_TABLE.first_transition_excluding(current, &[ProductionOrderStatus::Canceled])
}

/// Orders can be edited before production starts or while partially produced.
pub fn can_edit(status: ProductionOrderStatus) -> bool {
    matches!(
        status,
        ProductionOrderStatus::Awaiting | ProductionOrderStatus::Partial
    )
}

pub fn can_delete(status: ProductionOrderStatus) -> bool {
    matches!(
        status,
        ProductionOrderStatus::Awaiting | ProductionOrderStatus::Canceled
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
