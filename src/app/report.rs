//! Terminal tables for the run summary and read-side reports

use std::io;

use prettytable::{format, Cell, Row, Table};

use crate::core::styles::StyleRole;
use crate::pipeline::{IngestSummary, RunOutcome};
use crate::store::{AnomalyUser, UserAnalytics};

fn cell(text: impl ToString, role: StyleRole, color: bool) -> Cell {
    Cell::new(&text.to_string()).style_spec(&role.table_spec(color))
}

fn labelled_row(label: &str, value: impl ToString, role: StyleRole, color: bool) -> Row {
    Row::new(vec![
        cell(label, StyleRole::Label, color),
        cell(value, role, color),
    ])
}

fn header_row(titles: &[&str], color: bool) -> Row {
    Row::new(
        titles
            .iter()
            .map(|title| cell(title, StyleRole::Header, color))
            .collect(),
    )
}

fn outcome_role(outcome: RunOutcome) -> StyleRole {
    match outcome {
        RunOutcome::Completed => StyleRole::Success,
        RunOutcome::Interrupted => StyleRole::Warning,
        RunOutcome::Failed => StyleRole::Failure,
    }
}

/// Two-column table of run totals
pub fn summary_table(summary: &IngestSummary, color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_CLEAN);

    table.add_row(labelled_row(
        "Outcome",
        summary.outcome,
        outcome_role(summary.outcome),
        color,
    ));
    table.add_row(labelled_row("Lines read", summary.lines_read, StyleRole::Value, color));
    table.add_row(labelled_row(
        "Records processed",
        summary.records_processed,
        StyleRole::Value,
        color,
    ));
    let skipped_role = if summary.records_skipped > 0 {
        StyleRole::Warning
    } else {
        StyleRole::Value
    };
    table.add_row(labelled_row(
        "Records skipped",
        summary.records_skipped,
        skipped_role,
        color,
    ));
    table.add_row(labelled_row(
        "Batches committed",
        summary.batches_committed,
        StyleRole::Value,
        color,
    ));
    table.add_row(labelled_row("Unique users", summary.unique_users, StyleRole::Value, color));
    table.add_row(labelled_row(
        "Elapsed",
        format!("{:.2}s", summary.elapsed.as_secs_f64()),
        StyleRole::Value,
        color,
    ));
    table.add_row(labelled_row(
        "Throughput",
        format!("{:.0} records/s", summary.throughput()),
        StyleRole::Value,
        color,
    ));
    table
}

/// Ranked list of users by order count
pub fn top_users_table(users: &[UserAnalytics], color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(header_row(&["#", "User", "Orders", "Spent"], color));

    for (rank, user) in users.iter().enumerate() {
        table.add_row(Row::new(vec![
            cell(rank + 1, StyleRole::Value, color).style_spec("r"),
            cell(&user.user_id, StyleRole::Literal, color),
            cell(user.total_orders, StyleRole::Value, color).style_spec("r"),
            cell(format!("{:.2}", user.total_spent), StyleRole::Value, color).style_spec("r"),
        ]));
    }
    table
}

/// Users flagged as outliers, marking which measure tripped
pub fn anomalies_table(users: &[AnomalyUser], color: bool) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(header_row(&["User", "Orders", "Spent", "Flags"], color));

    for user in users {
        let flags = match (user.order_anomaly, user.spending_anomaly) {
            (true, true) => "orders, spending",
            (true, false) => "orders",
            (false, true) => "spending",
            (false, false) => "",
        };
        table.add_row(Row::new(vec![
            cell(&user.user_id, StyleRole::Literal, color),
            cell(user.total_orders, StyleRole::Value, color),
            cell(format!("{:.2}", user.total_spent), StyleRole::Value, color),
            cell(flags, StyleRole::Warning, color),
        ]));
    }
    table
}

/// Write a table to stdout, with terminal colours only when asked
pub fn print_table(table: &Table, color: bool) -> io::Result<()> {
    if color {
        table.print_tty(true)?;
    } else {
        table.print(&mut io::stdout())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn summary(outcome: RunOutcome) -> IngestSummary {
        IngestSummary {
            lines_read: 4,
            records_processed: 3,
            records_skipped: 1,
            batches_committed: 2,
            unique_users: 2,
            elapsed: Duration::from_millis(1500),
            outcome,
        }
    }

    #[test]
    fn test_summary_table_lists_counters() {
        let rendered = summary_table(&summary(RunOutcome::Completed), false).to_string();

        assert!(rendered.contains("completed"));
        assert!(rendered.contains("Records skipped"));
        assert!(rendered.contains("1.50s"));
        assert!(rendered.contains("2 records/s"));
    }

    #[test]
    fn test_outcome_role_per_outcome() {
        assert_eq!(outcome_role(RunOutcome::Completed), StyleRole::Success);
        assert_eq!(outcome_role(RunOutcome::Interrupted), StyleRole::Warning);
        assert_eq!(outcome_role(RunOutcome::Failed), StyleRole::Failure);
    }

    #[test]
    fn test_top_users_table_ranks_rows() {
        let users = vec![
            UserAnalytics {
                user_id: "u2".to_string(),
                total_orders: 5,
                total_spent: dec!(120.5),
            },
            UserAnalytics {
                user_id: "u1".to_string(),
                total_orders: 2,
                total_spent: dec!(25),
            },
        ];
        let rendered = top_users_table(&users, false).to_string();

        assert!(rendered.contains("u2"));
        assert!(rendered.contains("120.50"));
        assert!(rendered.contains("25.00"));
        let first = rendered.find("u2").unwrap();
        let second = rendered.find("u1").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_anomalies_table_names_flags() {
        let users = vec![AnomalyUser {
            user_id: "whale".to_string(),
            total_orders: 1,
            total_spent: dec!(5000),
            order_anomaly: false,
            spending_anomaly: true,
        }];
        let rendered = anomalies_table(&users, false).to_string();

        assert!(rendered.contains("whale"));
        assert!(rendered.contains("spending"));
        assert!(!rendered.contains("orders,"));
    }
}
