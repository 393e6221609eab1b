//! `Result`-returning checks for code that owns order entities.
//!
//! The order-management layer calls these right before it commits a status
//! update, an edit or a removal. Rejections become [`CoreError`]s so they can
//! be propagated with `?`.

use crate::error::CoreError;
use crate::production_order::{self, ProductionOrderStatus};
use crate::sales_order::{self, OrderKind, SalesOrderStatus};
use crate::workflow::WorkflowStatus;

// ---------------------------------------------------------------------------
// Sales orders
// ---------------------------------------------------------------------------

pub fn ensure_sales_transition(
    current: SalesOrderStatus,
    requested: SalesOrderStatus,
    kind: OrderKind,
) -> Result<(), CoreError> {
    let result = sales_order::is_transition_allowed(current, requested, kind);
    if let Some(reason) = result.reason {
        tracing::debug!(
            %kind,
            from = %current,
            to = %requested,
            %reason,
            "Sales order transition rejected"
        );
    }
    result.into_result(current, requested)
}

pub fn ensure_sales_editable(status: SalesOrderStatus, kind: OrderKind) -> Result<(), CoreError> {
    if sales_order::can_edit(status, kind) {
        return Ok(());
    }
    tracing::debug!(%kind, %status, "Sales order edit refused");
    Err(CoreError::Forbidden(format!(
        "{} in status '{}' cannot be edited",
        kind.label(),
        status
    )))
}

pub fn ensure_sales_deletable(status: SalesOrderStatus, kind: OrderKind) -> Result<(), CoreError> {
    if sales_order::can_delete(status, kind) {
        return Ok(());
    }
    tracing::debug!(%kind, %status, "Sales order deletion refused");
    let hint = match kind {
        OrderKind::ConfirmedOrder => "; cancel it instead",
        OrderKind::Quote => "",
    };
    Err(CoreError::Forbidden(format!(
        "{} in status '{}' cannot be deleted{}",
        kind.label(),
        status,
        hint
    )))
}

// ---------------------------------------------------------------------------
// Production orders
// ---------------------------------------------------------------------------

pub fn ensure_production_transition(
    current: ProductionOrderStatus,
    requested: ProductionOrderStatus,
) -> Result<(), CoreError> {
    let result = production_order::is_transition_allowed(current, requested);
    if let Some(reason) = result.reason {
        tracing::debug!(
            from = %current,
            to = %requested,
            %reason,
            "Production order transition rejected"
        );
    }
    result.into_result(current, requested)
}

pub fn ensure_production_editable(status: ProductionOrderStatus) -> Result<(), CoreError> {
    if production_order::can_edit(status) {
        return Ok(());
    }
    tracing::debug!(%status, "Production order edit refused");
    Err(CoreError::Forbidden(format!(
        "Production order in status '{}' ({}) cannot be edited",
        status,
        status.label()
    )))
}

pub fn ensure_production_deletable(status: ProductionOrderStatus) -> Result<(), CoreError> {
    if production_order::can_delete(status) {
        return Ok(());
    }
    tracing::debug!(%status, "Production order deletion refused");
    Err(CoreError::Forbidden(format!(
        "Production order in status '{}' ({}) cannot be deleted",
        status,
        status.label()
    )))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
