//! Order and production status workflows.
//!
//! Pure decision logic: given a current status, a requested status and (for
//! sales) the order kind, decide whether the transition is legal, and answer
//! the read-only queries the order screens need. Nothing here reads or
//! writes storage; ordering of concurrent updates belongs to whoever owns the
//! status column.

pub mod error;
pub mod guard;
pub mod production_order;
pub mod sales_order;
pub mod workflow;

pub use error::CoreError;
pub use production_order::ProductionOrderStatus;
pub use sales_order::{OrderKind, SalesOrderStatus};
pub use workflow::{RejectionReason, TableRow, TransitionResult, TransitionTable, WorkflowStatus};
