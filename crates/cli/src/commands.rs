//! Command execution and rendering.
//!
//! Every command resolves its statuses, asks `erp_core` the question and
//! renders the answer as text or JSON. Nothing here decides workflow rules.

use std::fmt::Write as _;

use erp_core::production_order::{self, ProductionOrderStatus};
use erp_core::sales_order::{self, OrderKind, SalesOrderStatus};
use erp_core::{TableRow, TransitionResult, WorkflowStatus};
use serde::Serialize;

use crate::cli::{Command, Workflow};
use crate::config::OutputFormat;

/// Resolved settings after merging flags over [`crate::config::CliConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub format: OutputFormat,
    pub default_kind: OrderKind,
}

/// Printable result of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub output: String,
    /// False when a `check` was rejected. Maps to a non-zero exit code.
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CheckReport<'a> {
    workflow: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<OrderKind>,
    current: &'a str,
    requested: &'a str,
    #[serde(flatten)]
    result: TransitionResult,
    message: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct StatusEntry<S> {
    status: S,
    label: &'static str,
}

#[derive(Debug, Serialize)]
struct TransitionsReport<S> {
    status: S,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<OrderKind>,
    transitions: Vec<StatusEntry<S>>,
}

#[derive(Debug, Serialize)]
struct NextReport<S> {
    status: S,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<OrderKind>,
    next: Option<S>,
}

#[derive(Debug, Serialize)]
struct PermissionsReport<S> {
    status: S,
    label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<OrderKind>,
    is_initial: bool,
    is_final: bool,
    can_edit: bool,
    can_delete: bool,
}

#[derive(Debug, Serialize)]
struct TableReport<S: 'static> {
    table: &'static str,
    initial: S,
    /// Lifecycle order used to detect backward moves.
    canonical_order: &'static [S],
    rows: Vec<TableRow<S>>,
}

fn entries<S: WorkflowStatus>(statuses: &[S]) -> Vec<StatusEntry<S>> {
    statuses
        .iter()
        .map(|&status| StatusEntry {
            status,
            label: status.label(),
        })
        .collect()
}

fn join<S: WorkflowStatus>(statuses: &[S]) -> String {
    if statuses.is_empty() {
        return "(none)".to_string();
    }
    statuses
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// The `--kind` a production command was given. Production orders have no
/// kind, so the flag is ignored there.
fn ignored_kind(command: &Command) -> Option<OrderKind> {
    let (workflow, kind) = match command {
        Command::Check { workflow, kind, .. }
        | Command::Transitions { workflow, kind, .. }
        | Command::Next { workflow, kind, .. }
        | Command::Permissions { workflow, kind, .. }
        | Command::Table { workflow, kind } => (workflow, kind),
    };
    match workflow {
        Workflow::Production => kind.kind,
        Workflow::Sales => None,
    }
}

fn workflow_name(workflow: Workflow) -> &'static str {
    match workflow {
        Workflow::Sales => "sales",
        Workflow::Production => "production",
    }
}

// ---------------------------------------------------------------------------
// Execution
// ---------------------------------------------------------------------------

/// Run a parsed command against the workflows.
pub fn execute(command: &Command, settings: &Settings) -> anyhow::Result<Rendered> {
    tracing::debug!(?command, ?settings, "Executing command");
    if let Some(kind) = ignored_kind(command) {
        tracing::warn!(%kind, "--kind only applies to the sales workflow, ignoring it");
    }
    let format = settings.format;
    let kind_or_default = |kind: Option<OrderKind>| kind.unwrap_or(settings.default_kind);

    match command {
        Command::Check {
            workflow,
            current,
            requested,
            kind,
        } => {
            let (kind, result) = match workflow {
                Workflow::Sales => {
                    let kind = kind_or_default(kind.kind);
                    let result = sales_order::is_transition_allowed_raw(current, requested, kind);
                    (Some(kind), result)
                }
                Workflow::Production => {
                    (None, production_order::is_transition_allowed_raw(current, requested))
                }
            };
            let report = CheckReport {
                workflow: workflow_name(*workflow),
                kind,
                current,
                requested,
                result,
                message: result.reason.map(|r| r.message()),
            };
            Ok(Rendered {
                output: render_check(&report, format)?,
                success: result.is_allowed(),
            })
        }
        Command::Transitions {
            workflow,
            status,
            kind,
        } => match workflow {
            Workflow::Sales => {
                let kind = kind_or_default(kind.kind);
                let status: SalesOrderStatus = status.parse()?;
                let report = TransitionsReport {
                    status,
                    kind: Some(kind),
                    transitions: entries(sales_order::allowed_transitions(status, kind)),
                };
                ok(render_transitions(&report, format)?)
            }
            Workflow::Production => {
                let status: ProductionOrderStatus = status.parse()?;
                let report = TransitionsReport {
                    status,
                    kind: None,
                    transitions: entries(production_order::allowed_transitions(status)),
                };
                ok(render_transitions(&report, format)?)
            }
        },
        Command::Next {
            workflow,
            status,
            kind,
        } => match workflow {
            Workflow::Sales => {
                let kind = kind_or_default(kind.kind);
                let status: SalesOrderStatus = status.parse()?;
                let report = NextReport {
                    status,
                    kind: Some(kind),
                    next: sales_order::next_status(status, kind),
                };
                ok(render_next(&report, format)?)
            }
            Workflow::Production => {
                let status: ProductionOrderStatus = status.parse()?;
                let report = NextReport {
                    status,
                    kind: None,
                    next: production_order::next_status(status),
                };
                ok(render_next(&report, format)?)
            }
        },
        Command::Permissions {
            workflow,
            status,
            kind,
        } => match workflow {
            Workflow::Sales => {
                let kind = kind_or_default(kind.kind);
                let status: SalesOrderStatus = status.parse()?;
                let report = PermissionsReport {
                    status,
                    label: status.label(),
                    kind: Some(kind),
                    is_initial: status == sales_order::INITIAL_STATUS,
                    is_final: sales_order::is_final_status(status),
                    can_edit: sales_order::can_edit(status, kind),
                    can_delete: sales_order::can_delete(status, kind),
                };
                ok(render_permissions(&report, format)?)
            }
            Workflow::Production => {
                let status: ProductionOrderStatus = status.parse()?;
                let report = PermissionsReport {
                    status,
                    label: status.label(),
                    kind: None,
                    is_initial: status == production_order::INITIAL_STATUS,
                    is_final: production_order::is_final_status(status),
                    can_edit: production_order::can_edit(status),
                    can_delete: production_order::can_delete(status),
                };
                ok(render_permissions(&report, format)?)
            }
        },
        Command::Table { workflow, kind } => match workflow {
            Workflow::Sales => {
                let table = sales_order::transition_table(kind_or_default(kind.kind));
                let report = TableReport {
                    table: table.name(),
                    initial: sales_order::INITIAL_STATUS,
                    canonical_order: table.canonical_order(),
                    rows: table.snapshot(),
                };
                ok(render_table(&report, format)?)
            }
            Workflow::Production => {
                let table = &production_order::PRODUCTION_TABLE;
                let report = TableReport {
                    table: table.name(),
                    initial: production_order::INITIAL_STATUS,
                    canonical_order: table.canonical_order(),
                    rows: table.snapshot(),
                };
                ok(render_table(&report, format)?)
            }
        },
    }
}

fn ok(output: String) -> anyhow::Result<Rendered> {
    Ok(Rendered {
        output,
        success: true,
    })
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render_check(report: &CheckReport<'_>, format: OutputFormat) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    let scope = match report.kind {
        Some(kind) => format!(" ({kind})"),
        None => String::new(),
    };
    Ok(match report.result.reason {
        None => format!(
            "allowed: {} -> {}{}",
            report.current, report.requested, scope
        ),
        Some(reason) => format!(
            "rejected [{}]: {} -> {}{}: {}",
            reason.code(),
            report.current,
            report.requested,
            scope,
            reason.message()
        ),
    })
}

fn render_transitions<S: WorkflowStatus + Serialize>(
    report: &TransitionsReport<S>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    if report.transitions.is_empty() {
        let note = if report.status.is_final() {
            "final status"
        } else {
            "no transitions owned by this workflow"
        };
        return Ok(format!("(none: {note})"));
    }
    let mut out = String::new();
    for entry in &report.transitions {
        writeln!(out, "{}\t{}", entry.status, entry.label)?;
    }
    Ok(out.trim_end().to_string())
}

fn render_next<S: WorkflowStatus + Serialize>(
    report: &NextReport<S>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    Ok(match report.next {
        Some(next) => next.to_string(),
        None => "(none)".to_string(),
    })
}

fn render_permissions<S: WorkflowStatus + Serialize>(
    report: &PermissionsReport<S>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    let mut out = String::new();
    writeln!(out, "status:  {} ({})", report.status, report.label)?;
    if let Some(kind) = report.kind {
        writeln!(out, "kind:    {kind}")?;
    }
    writeln!(out, "initial: {}", yes_no(report.is_initial))?;
    writeln!(out, "final:   {}", yes_no(report.is_final))?;
    writeln!(out, "edit:    {}", yes_no(report.can_edit))?;
    write!(out, "delete:  {}", yes_no(report.can_delete))?;
    Ok(out)
}

fn render_table<S: WorkflowStatus + Serialize>(
    report: &TableReport<S>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    let width = S::ALL.iter().map(|s| s.as_str().len()).max().unwrap_or(0);
    let mut out = String::new();
    writeln!(out, "# {}", report.table)?;
    for row in &report.rows {
        let mut marker = String::new();
        if row.status == report.initial {
            marker.push_str(" (initial)");
        }
        if row.is_final {
            marker.push_str(" (final)");
        }
        writeln!(
            out,
            "{:<width$} -> {}{}",
            row.status.as_str(),
            join(row.transitions),
            marker,
        )?;
    }
    let order: Vec<&str> = report.canonical_order.iter().map(|s| s.as_str()).collect();
    writeln!(out, "order: {}", order.join(" < "))?;
    Ok(out.trim_end().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::KindArg;

    fn settings(format: OutputFormat) -> Settings {
        Settings {
            format,
            default_kind: OrderKind::ConfirmedOrder,
        }
    }

    fn no_kind() -> KindArg {
        KindArg { kind: None }
    }

    #[test]
    fn check_allowed_text() {
        let command = Command::Check {
            workflow: Workflow::Sales,
            current: "pending".into(),
            requested: "approved".into(),
            kind: KindArg {
                kind: Some(OrderKind::Quote),
            },
        };
        let rendered = execute(&command, &settings(OutputFormat::Text)).unwrap();
        assert!(rendered.success);
        assert_eq!(rendered.output, "allowed: pending -> approved (quote)");
    }

    #[test]
    fn check_rejected_uses_default_kind() {
        let command = Command::Check {
            workflow: Workflow::Sales,
            current: "in_production".into(),
            requested: "canceled".into(),
            kind: no_kind(),
        };
        let rendered = execute(&command, &settings(OutputFormat::Text)).unwrap();
        assert!(!rendered.success);
        assert!(rendered.output.starts_with("rejected [PRODUCTION_LOCKED]"));
        assert!(rendered.output.contains("(confirmed_order)"));
    }

    #[test]
    fn check_json_flattens_result() {
        let command = Command::Check {
            workflow: Workflow::Production,
            current: "awaiting".into(),
            requested: "completed".into(),
            kind: no_kind(),
        };
        let rendered = execute(&command, &settings(OutputFormat::Json)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered.output).unwrap();
        assert_eq!(value["workflow"], "production");
        assert_eq!(value["allowed"], false);
        assert_eq!(value["reason"], "SKIPPED_STEP");
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn check_unknown_tag_is_generic_invalid() {
        let command = Command::Check {
            workflow: Workflow::Production,
            current: "awaiting".into(),
            requested: "shipped".into(),
            kind: no_kind(),
        };
        let rendered = execute(&command, &settings(OutputFormat::Text)).unwrap();
        assert!(rendered.output.starts_with("rejected [GENERIC_INVALID]"));
    }

    #[test]
    fn transitions_lists_labels() {
        let command = Command::Transitions {
            workflow: Workflow::Production,
            status: "partial".into(),
            kind: no_kind(),
        };
        let rendered = execute(&command, &settings(OutputFormat::Text)).unwrap();
        assert_eq!(rendered.output, "in_production\tIn production\ncompleted\tCompleted");
    }

    #[test]
    fn transitions_of_final_status() {
        let command = Command::Transitions {
            workflow: Workflow::Sales,
            status: "entregue".into(),
            kind: no_kind(),
        };
        let rendered = execute(&command, &settings(OutputFormat::Text)).unwrap();
        assert_eq!(rendered.output, "(none: final status)");
    }

    #[test]
    fn transitions_unknown_status_is_error() {
        let command = Command::Transitions {
            workflow: Workflow::Sales,
            status: "shipped".into(),
            kind: no_kind(),
        };
        let err = execute(&command, &settings(OutputFormat::Text)).unwrap_err();
        assert!(err.to_string().contains("Unknown sales order status 'shipped'"));
    }

    #[test]
    fn next_json() {
        let command = Command::Next {
            workflow: Workflow::Sales,
            status: "finished".into(),
            kind: no_kind(),
        };
        let rendered = execute(&command, &settings(OutputFormat::Json)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered.output).unwrap();
        assert_eq!(value["next"], "awaiting_dispatch");
        assert_eq!(value["kind"], "confirmed_order");
    }

    #[test]
    fn permissions_text() {
        let command = Command::Permissions {
            workflow: Workflow::Sales,
            status: "rejected".into(),
            kind: KindArg {
                kind: Some(OrderKind::Quote),
            },
        };
        let rendered = execute(&command, &settings(OutputFormat::Text)).unwrap();
        assert_eq!(
            rendered.output,
            "status:  rejected (Rejected)\nkind:    quote\ninitial: no\nfinal:   yes\nedit:    no\ndelete:  yes"
        );
    }

    #[test]
    fn production_table_text() {
        let command = Command::Table {
            workflow: Workflow::Production,
            kind: no_kind(),
        };
        let rendered = execute(&command, &settings(OutputFormat::Text)).unwrap();
        let lines: Vec<&str> = rendered.output.lines().collect();
        assert_eq!(lines[0], "# production_order");
        assert_eq!(lines[1], "awaiting      -> in_production, canceled (initial)");
        assert_eq!(lines[2], "in_production -> partial, completed");
        assert_eq!(lines[4], "completed     -> (none) (final)");
        assert_eq!(lines[6], "order: awaiting < in_production < completed < canceled");
    }

    #[test]
    fn production_permissions_mark_initial_status() {
        let command = Command::Permissions {
            workflow: Workflow::Production,
            status: "aguardando".into(),
            kind: no_kind(),
        };
        let rendered = execute(&command, &settings(OutputFormat::Json)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered.output).unwrap();
        assert_eq!(value["is_initial"], true);
        assert_eq!(value["can_delete"], true);
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn kind_is_ignored_only_for_production() {
        let quote = KindArg {
            kind: Some(OrderKind::Quote),
        };
        let production = Command::Check {
            workflow: Workflow::Production,
            current: "awaiting".into(),
            requested: "in_production".into(),
            kind: quote.clone(),
        };
        assert_eq!(ignored_kind(&production), Some(OrderKind::Quote));

        let rendered = execute(&production, &settings(OutputFormat::Text)).unwrap();
        assert!(rendered.success);
        assert_eq!(rendered.output, "allowed: awaiting -> in_production");

        let sales = Command::Table {
            workflow: Workflow::Sales,
            kind: quote,
        };
        assert_eq!(ignored_kind(&sales), None);
        let table = Command::Table {
            workflow: Workflow::Production,
            kind: no_kind(),
        };
        assert_eq!(ignored_kind(&table), None);
    }

    #[test]
    fn quote_table_json() {
        let command = Command::Table {
            workflow: Workflow::Sales,
            kind: KindArg {
                kind: Some(OrderKind::Quote),
            },
        };
        let rendered = execute(&command, &settings(OutputFormat::Json)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered.output).unwrap();
        assert_eq!(value["table"], "quote");
        assert_eq!(value["initial"], "pending");
        assert_eq!(value["canonical_order"][0], "pending");
        assert_eq!(value["rows"][0]["status"], "pending");
        assert_eq!(
            value["rows"][0]["transitions"],
            serde_json::json!(["approved", "rejected", "canceled"])
        );
    }
}
