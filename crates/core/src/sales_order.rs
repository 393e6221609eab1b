//! Sales order and quote status workflow.
//!
//! Quotes and confirmed orders share one status vocabulary but follow
//! disjoint transition tables, selected by [`OrderKind`]:
//!
//! | current             | quote ->                     | confirmed order ->  |
//! |---------------------|------------------------------|---------------------|
//! | `pending`           | `approved, rejected, canceled` | `approved, canceled` |
//! | `approved`          | (none)                       | `canceled`          |
//! | `in_production`     | n/a                          | `finished`          |
//! | `finished`          | n/a                          | `awaiting_dispatch` |
//! | `awaiting_dispatch` | n/a                          | `delivered`         |
//!
//! `approved -> in_production` is absent from both tables. That edge is
//! taken by the production-order creator when it opens a production order
//! against an approved sales order. An approved quote is converted into a
//! confirmed order outside this module as well.

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
pub enum SalesOrderStatus {
    Pending,
    Approved,
    InProduction,
    Finished,
    AwaitingDispatch,
    Delivered,
    Canceled,
    Rejected,
}

/// Status assigned to new quotes and orders by their creator.
pub const INITIAL_STATUS: SalesOrderStatus = SalesOrderStatus::Pending;

/// Terminal statuses, regardless of kind.
pub const FINAL_STATUSES: &[SalesOrderStatus] = &[
    SalesOrderStatus::Delivered,
    SalesOrderStatus::Canceled,
    SalesOrderStatus::Rejected,
];

impl WorkflowStatus for SalesOrderStatus {
    const WORKFLOW: &'static str = "sales order";

    const ALL: &'static [Self] = &[
        SalesOrderStatus::Pending,
        SalesOrderStatus::Approved,
        SalesOrderStatus::InProduction,
        SalesOrderStatus::Finished,
        SalesOrderStatus::AwaitingDispatch,
        SalesOrderStatus::Delivered,
        SalesOrderStatus::Canceled,
        SalesOrderStatus::Rejected,
    ];

    const CANCELED: Self = SalesOrderStatus::Canceled;

    fn is_final(self) -> bool {
        FINAL_STATUSES.contains(&self)
    }

    fn as_str(self) -> &'static str {
        match self {
            SalesOrderStatus::Pending => "pending",
            SalesOrderStatus::Approved => "approved",
            SalesOrderStatus::InProduction => "in_production",
            SalesOrderStatus::Finished => "finished",
            SalesOrderStatus::AwaitingDispatch => "awaiting_dispatch",
            SalesOrderStatus::Delivered => "delivered",
            SalesOrderStatus::Canceled => "canceled",
            SalesOrderStatus::Rejected => "rejected",
        }
    }

    fn label(self) -> &'static str {
        match self {
            SalesOrderStatus::Pending => "Pending",
            SalesOrderStatus::Approved => "Approved",
            SalesOrderStatus::InProduction => "In production",
            SalesOrderStatus::Finished => "Finished",
            SalesOrderStatus::AwaitingDispatch => "Awaiting dispatch",
            SalesOrderStatus::Delivered => "Delivered",
            SalesOrderStatus::Canceled => "Canceled",
            SalesOrderStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for SalesOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SalesOrderStatus {
    type Err = CoreError;

    /// Accepts the snake_case tag or the legacy stored tag, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" | "pendente" => Ok(SalesOrderStatus::Pending),
            "approved" | "aprovado" => Ok(SalesOrderStatus::Approved),
            "in_production" | "em_producao" => Ok(SalesOrderStatus::InProduction),
            "finished" | "finalizado" => Ok(SalesOrderStatus::Finished),
            "awaiting_dispatch" | "aguardando_envio" => Ok(SalesOrderStatus::AwaitingDispatch),
            "delivered" | "entregue" => Ok(SalesOrderStatus::Delivered),
            "canceled" | "cancelado" => Ok(SalesOrderStatus::Canceled),
            "rejected" | "recusado" => Ok(SalesOrderStatus::Rejected),
            _ => Err(CoreError::UnknownStatus {
                workflow: Self::WORKFLOW,
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Order kind
// ---------------------------------------------------------------------------

/// Which sales variant an entity is. Fixed for the entity's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum OrderKind {
    Quote,
    ConfirmedOrder,
}

impl OrderKind {
    pub const ALL: &'static [OrderKind] = &[OrderKind::Quote, OrderKind::ConfirmedOrder];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderKind::Quote => "quote",
            OrderKind::ConfirmedOrder => "confirmed_order",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderKind::Quote => "Quote",
            OrderKind::ConfirmedOrder => "Order",
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quote" | "orcamento" => Ok(OrderKind::Quote),
            "confirmed_order" | "order" | "pedido" => Ok(OrderKind::ConfirmedOrder),
            _ => Err(CoreError::UnknownOrderKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Transition tables
// ---------------------------------------------------------------------------

fn quote_transitions(from: SalesOrderStatus) -> &'static [SalesOrderStatus] {
    use SalesOrderStatus::*;
    match from {
        Pending => &[Approved, Rejected, Canceled],
        // An approved quote is converted into a confirmed order externally.
        Approved => &[],
        InProduction | Finished | AwaitingDispatch | Delivered => &[],
        Canceled | Rejected => &[],
    }
}

fn confirmed_order_transitions(from: SalesOrderStatus) -> &'static [SalesOrderStatus] {
    use SalesOrderStatus::*;
    match from {
        Pending => &[Approved, Canceled],
        Approved => &[Canceled],
        InProduction => &[Finished],
        Finished => &[AwaitingDispatch],
        AwaitingDispatch => &[Delivered],
        Delivered | Canceled => &[],
        Rejected => &[],
    }
}

pub static QUOTE_TABLE: TransitionTable<SalesOrderStatus> = TransitionTable::new(
    "quote",
    quote_transitions,
    &[
        SalesOrderStatus::Pending,
        SalesOrderStatus::Approved,
        SalesOrderStatus::Rejected,
        SalesOrderStatus::Canceled,
    ],
);

pub static CONFIRMED_ORDER_TABLE: TransitionTable<SalesOrderStatus> = TransitionTable::new(
    "confirmed_order",
    confirmed_order_transitions,
    &[
        SalesOrderStatus::Pending,
        SalesOrderStatus::Approved,
        SalesOrderStatus::InProduction,
        SalesOrderStatus::Finished,
        SalesOrderStatus::AwaitingDispatch,
        SalesOrderStatus::Delivered,
        SalesOrderStatus::Canceled,
    ],
);

/// Table governing entities of `kind`.
pub fn transition_table(kind: OrderKind) -> &'static TransitionTable<SalesOrderStatus> {
    match kind {
        OrderKind::Quote => &QUOTE_TABLE,
        OrderKind::ConfirmedOrder => &CONFIRMED_ORDER_TABLE,
    }
}

fn sales_rule(current: SalesOrderStatus, requested: SalesOrderStatus) -> Option<RejectionReason> {
    match (current, requested) {
        (SalesOrderStatus::InProduction, SalesOrderStatus::Canceled) => {
            Some(RejectionReason::ProductionLocked)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Decide whether `current -> requested` is legal for an entity of `kind`.
pub fn is_transition_allowed(
    current: SalesOrderStatus,
    requested: SalesOrderStatus,
    kind: OrderKind,
) -> TransitionResult {
    transition_table(kind).classify(current, requested, sales_rule)
}

/// Same as [`is_transition_allowed`] for raw stored tags.
pub fn is_transition_allowed_raw(current: &str, requested: &str, kind: OrderKind) -> TransitionResult {
    workflow::classify_raw(current, requested, |c, r| is_transition_allowed(c, r, kind))
}

pub fn allowed_transitions(current: SalesOrderStatus, kind: OrderKind) -> &'static [SalesOrderStatus] {
    transition_table(kind).transitions(current)
}

/// Kind-independent: `rejected` is only reachable by quotes but is final
/// wherever it appears.
pub fn is_final_status(status: SalesOrderStatus) -> bool {
    status.is_final()
}

/// Suggested forward step: the first allowed transition that is neither
/// `canceled` nor `rejected`.
pub fn next_status(current: SalesOrderStatus, kind: OrderKind) -> Option<SalesOrderStatus> {
    transition_table(kind).first_transition_excluding(
        current,
        &[SalesOrderStatus::Canceled, SalesOrderStatus::Rejected],
    )
}

/// Quotes are editable while pending; confirmed orders only while approved,
/// i.e. before production starts.
pub fn can_edit(status: SalesOrderStatus, kind: OrderKind) -> bool {
    match kind {
        OrderKind::Quote => status == SalesOrderStatus::Pending,
        OrderKind::ConfirmedOrder => status == SalesOrderStatus::Approved,
    }
}

/// Confirmed orders are never deleted; cancellation is their only way out.
pub fn can_delete(status: SalesOrderStatus, kind: OrderKind) -> bool {
    match kind {
        OrderKind::Quote => matches!(
            status,
            SalesOrderStatus::Pending | SalesOrderStatus::Rejected
        ),
        OrderKind::ConfirmedOrder => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use SalesOrderStatus::*;

    fn reason(
        current: SalesOrderStatus,
        requested: SalesOrderStatus,
        kind: OrderKind,
    ) -> Option<RejectionReason> {
        is_transition_allowed(current, requested, kind).reason
    }

    #[test]
    fn quote_pending_branches() {
        let kind = OrderKind::Quote;
        assert_eq!(allowed_transitions(Pending, kind), &[Approved, Rejected, Canceled]);
        assert!(is_transition_allowed(Pending, Rejected, kind).is_allowed());
    }

    #[test]
    fn approved_quote_has_no_transitions() {
        assert!(allowed_transitions(Approved, OrderKind::Quote).is_empty());
        assert_eq!(
            reason(Approved, Canceled, OrderKind::Quote),
            Some(RejectionReason::GenericInvalid)
        );
    }

    #[test]
    fn approved_quote_back_to_pending_is_backward() {
        assert_eq!(
            reason(Approved, Pending, OrderKind::Quote),
            Some(RejectionReason::BackwardTransition)
        );
    }

    #[test]
    fn confirmed_order_forward_path() {
        let kind = OrderKind::ConfirmedOrder;
        assert!(is_transition_allowed(Pending, Approved, kind).is_allowed());
        assert!(is_transition_allowed(InProduction, Finished, kind).is_allowed());
        assert!(is_transition_allowed(Finished, AwaitingDispatch, kind).is_allowed());
        assert!(is_transition_allowed(AwaitingDispatch, Delivered, kind).is_allowed());
    }

    #[test]
    fn approved_to_in_production_is_not_owned_here() {
        for &kind in OrderKind::ALL {
            assert!(!is_transition_allowed(Approved, InProduction, kind).is_allowed());
        }
        assert_eq!(
            reason(Approved, InProduction, OrderKind::ConfirmedOrder),
            Some(RejectionReason::GenericInvalid)
        );
    }

    #[test]
    fn pending_order_cannot_jump_into_production() {
        assert_eq!(
            reason(Pending, InProduction, OrderKind::ConfirmedOrder),
            Some(RejectionReason::GenericInvalid)
        );
    }

    #[test]
    fn in_production_order_cannot_be_canceled() {
        for &kind in OrderKind::ALL {
            assert_eq!(
                reason(InProduction, Canceled, kind),
                Some(RejectionReason::ProductionLocked)
            );
        }
    }

    #[test]
    fn confirmed_order_never_rejected() {
        for &from in SalesOrderStatus::ALL {
            assert!(!allowed_transitions(from, OrderKind::ConfirmedOrder).contains(&Rejected));
        }
        assert_eq!(
            reason(Pending, Rejected, OrderKind::ConfirmedOrder),
            Some(RejectionReason::GenericInvalid)
        );
    }

    #[test]
    fn confirmed_order_backward_moves() {
        let kind = OrderKind::ConfirmedOrder;
        assert_eq!(reason(Finished, InProduction, kind), Some(RejectionReason::BackwardTransition));
        assert_eq!(reason(AwaitingDispatch, Approved, kind), Some(RejectionReason::BackwardTransition));
    }

    #[test]
    fn finished_order_cancel_is_generic_not_backward() {
        assert_eq!(
            reason(Finished, Canceled, OrderKind::ConfirmedOrder),
            Some(RejectionReason::GenericInvalid)
        );
    }

    #[test]
    fn rejected_is_final_for_both_kinds() {
        assert!(is_final_status(Rejected));
        for &kind in OrderKind::ALL {
            assert_eq!(reason(Rejected, Pending, kind), Some(RejectionReason::FinalState));
        }
    }

    #[test]
    fn next_status_suggestions() {
        assert_eq!(next_status(Pending, OrderKind::Quote), Some(Approved));
        assert_eq!(next_status(Approved, OrderKind::Quote), None);
        assert_eq!(next_status(Pending, OrderKind::ConfirmedOrder), Some(Approved));
        assert_eq!(next_status(Approved, OrderKind::ConfirmedOrder), None);
        assert_eq!(next_status(InProduction, OrderKind::ConfirmedOrder), Some(Finished));
        assert_eq!(next_status(AwaitingDispatch, OrderKind::ConfirmedOrder), Some(Delivered));
        assert_eq!(next_status(Delivered, OrderKind::ConfirmedOrder), None);
    }

    #[test]
    fn edit_permissions_depend_on_kind() {
        assert!(can_edit(Pending, OrderKind::Quote));
        assert!(!can_edit(Approved, OrderKind::Quote));
        assert!(!can_edit(Pending, OrderKind::ConfirmedOrder));
        assert!(can_edit(Approved, OrderKind::ConfirmedOrder));
        assert!(!can_edit(InProduction, OrderKind::ConfirmedOrder));
    }

    #[test]
    fn delete_permissions_depend_on_kind() {
        assert!(can_delete(Pending, OrderKind::Quote));
        assert!(can_delete(Rejected, OrderKind::Quote));
        assert!(!can_delete(Approved, OrderKind::Quote));
        assert!(!can_delete(Canceled, OrderKind::Quote));
        for &status in SalesOrderStatus::ALL {
            assert!(!can_delete(status, OrderKind::ConfirmedOrder));
        }
    }

    #[test]
    fn parses_legacy_tags_and_kinds() {
        assert_eq!("aprovado".parse::<SalesOrderStatus>().unwrap(), Approved);
        assert_eq!("Aguardando_Envio".parse::<SalesOrderStatus>().unwrap(), AwaitingDispatch);
        assert_eq!("entregue".parse::<SalesOrderStatus>().unwrap(), Delivered);
        assert_eq!("orcamento".parse::<OrderKind>().unwrap(), OrderKind::Quote);
        assert_eq!("pedido".parse::<OrderKind>().unwrap(), OrderKind::ConfirmedOrder);
        assert!("shipped".parse::<SalesOrderStatus>().is_err());
        assert!("invoice".parse::<OrderKind>().is_err());
    }

    #[test]
    fn raw_tags_classify() {
        let kind = OrderKind::Quote;
        assert!(is_transition_allowed_raw("pendente", "aprovado", kind).is_allowed());
        assert_eq!(
            is_transition_allowed_raw("pending", "shipped", kind).reason,
            Some(RejectionReason::GenericInvalid)
        );
    }

    #[test]
    fn raw_unknown_tag_from_delivered_is_final_state() {
        assert_eq!(
            is_transition_allowed_raw("delivered", "shipped", OrderKind::ConfirmedOrder).reason,
            Some(RejectionReason::FinalState)
        );
        assert_eq!(
            is_transition_allowed_raw("recusado", "reopened", OrderKind::Quote).reason,
            Some(RejectionReason::FinalState)
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for &status in SalesOrderStatus::ALL {
            assert_eq!(status.to_string().parse::<SalesOrderStatus>().unwrap(), status);
        }
    }
}
