// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::plans::breakdowns_for_plan;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = run_checks(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn run_checks(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Recurring rows must carry a group id; one-offs must not.
    let mut stmt = conn.prepare(
        "SELECT id FROM expenses WHERE recurrence != 'none' AND recurrence_group IS NULL",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        rows.push(vec!["recurring_without_group".into(), format!("expense {}", id)]);
    }
    let mut stmt2 = conn.prepare(
        "SELECT id FROM expenses WHERE recurrence = 'none' AND recurrence_group IS NOT NULL",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let id: i64 = r.get(0)?;
        rows.push(vec!["one_off_with_group".into(), format!("expense {}", id)]);
    }

    // 2) Instances dated past their own series end.
    let mut stmt3 = conn.prepare(
        "SELECT id, date, recurrence_end FROM expenses
         WHERE recurrence_end IS NOT NULL AND date > recurrence_end",
    )?;
    let mut cur3 = stmt3.query([])?;
    while let Some(r) = cur3.next()? {
        let id: i64 = r.get(0)?;
        let date: String = r.get(1)?;
        let end: String = r.get(2)?;
        rows.push(vec![
            "instance_past_end".into(),
            format!("expense {} dated {} after end {}", id, date, end),
        ]);
    }

    // 3) Stored plans must still satisfy the input rules, and their running
    //    totals must chain month by month.
    let mut stmt4 = conn.prepare("SELECT id FROM plans ORDER BY id")?;
    let plan_ids: Vec<i64> = stmt4
        .query_map([], |r| r.get(0))?
        .collect::<rusqlite::Result<_>>()?;
    for plan_id in plan_ids {
        if let Some(plan) = crate::commands::plans::fetch_plan(conn, plan_id)? {
            if let Err(e) = plan.validate() {
                rows.push(vec!["invalid_plan".into(), format!("plan {}: {}", plan_id, e)]);
            }
        }
        let breakdowns = breakdowns_for_plan(conn, plan_id)?;
        let mut expected = rust_decimal::Decimal::ZERO;
        for b in &breakdowns {
            expected += b.net_amount;
            if b.cumulative_net != expected {
                rows.push(vec![
                    "cumulative_mismatch".into(),
                    format!(
                        "plan {} month {}: stored {} expected {}",
                        plan_id, b.month_index, b.cumulative_net, expected
                    ),
                ]);
                // Realign so one bad row is reported once, not cascaded.
                expected = b.cumulative_net;
            }
        }
    }

    Ok(rows)
}
