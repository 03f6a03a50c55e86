// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{
    validate_plan_fields, FinancialPlan, InterestType, PlanBreakdown, PlanPosition,
};
use crate::utils::{
    add_months, fmt_money, maybe_print_json, month_first_day, month_last_day, parse_date,
    parse_decimal, pretty_table, to_currency,
};
use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::debug;

/// Plan parameters as authored by the user; persisted verbatim, then
/// projected into one breakdown row per month.
#[derive(Debug, Clone)]
pub struct PlanInput {
    pub name: String,
    pub start_date: NaiveDate,
    pub duration_months: u32,
    pub monthly_income: Decimal,
    pub manual_monthly_expenses: Decimal,
    pub use_historical: bool,
    pub apply_inflation: bool,
    pub inflation_rate: Decimal,
    pub apply_interest: bool,
    pub interest_rate: Decimal,
    pub interest_type: InterestType,
    pub currency: String,
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("set-month", sub)) => set_month(conn, sub)?,
        Some(("position", sub)) => position(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn validate_input(input: &PlanInput) -> Result<()> {
    validate_plan_fields(
        &input.name,
        input.duration_months,
        input.monthly_income,
        input.apply_inflation,
        input.inflation_rate,
        input.apply_interest,
        input.interest_rate,
    )?;
    Ok(())
}

/// Validate, insert, and project a new plan in one transaction.
pub fn create_plan(conn: &mut Connection, input: &PlanInput) -> Result<i64> {
    validate_input(input)?;
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO plans(name, start_date, duration_months, monthly_income,
            manual_monthly_expenses, use_historical, apply_inflation, inflation_rate,
            apply_interest, interest_rate, interest_type, currency)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            input.name,
            input.start_date.to_string(),
            input.duration_months,
            input.monthly_income.to_string(),
            input.manual_monthly_expenses.to_string(),
            input.use_historical,
            input.apply_inflation,
            input.inflation_rate.to_string(),
            input.apply_interest,
            input.interest_rate.to_string(),
            input.interest_type.as_str(),
            input.currency,
        ],
    )?;
    let id = tx.last_insert_rowid();
    let plan = fetch_plan(&tx, id)?.context("Plan row vanished during create")?;
    let rows = generate_breakdowns(&tx, &plan)?;
    insert_breakdowns(&tx, &rows)?;
    tx.commit()?;
    debug!(plan = id, months = rows.len(), "created plan");
    Ok(id)
}

/// Overwrite a plan's parameters and rebuild its entire projection.
pub fn update_plan(conn: &mut Connection, id: i64, input: &PlanInput) -> Result<()> {
    validate_input(input)?;
    let tx = conn.transaction()?;
    let n = tx.execute(
        "UPDATE plans SET name=?1, start_date=?2, duration_months=?3, monthly_income=?4,
            manual_monthly_expenses=?5, use_historical=?6, apply_inflation=?7,
            inflation_rate=?8, apply_interest=?9, interest_rate=?10, interest_type=?11,
            currency=?12, updated_at=datetime('now')
         WHERE id=?13",
        params![
            input.name,
            input.start_date.to_string(),
            input.duration_months,
            input.monthly_income.to_string(),
            input.manual_monthly_expenses.to_string(),
            input.use_historical,
            input.apply_inflation,
            input.inflation_rate.to_string(),
            input.apply_interest,
            input.interest_rate.to_string(),
            input.interest_type.as_str(),
            input.currency,
            id,
        ],
    )?;
    if n == 0 {
        bail!("Plan {} not found", id);
    }
    let plan = fetch_plan(&tx, id)?.context("Plan row vanished during update")?;
    tx.execute(
        "DELETE FROM plan_breakdowns WHERE plan_id=?1",
        params![id],
    )?;
    let rows = generate_breakdowns(&tx, &plan)?;
    insert_breakdowns(&tx, &rows)?;
    tx.commit()?;
    debug!(plan = id, "regenerated plan projection");
    Ok(())
}

pub fn delete_plan(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM plans WHERE id=?1", params![id])?;
    if n == 0 {
        bail!("Plan {} not found", id);
    }
    Ok(())
}

pub fn fetch_plan(conn: &Connection, id: i64) -> Result<Option<FinancialPlan>> {
    let row = conn
        .query_row(
            "SELECT id, name, start_date, duration_months, monthly_income,
                    manual_monthly_expenses, use_historical, apply_inflation, inflation_rate,
                    apply_interest, interest_rate, interest_type, currency, created_at, updated_at
             FROM plans WHERE id=?1",
            params![id],
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, u32>(3)?,
                    r.get::<_, String>(4)?,
                    r.get::<_, String>(5)?,
                    r.get::<_, bool>(6)?,
                    r.get::<_, bool>(7)?,
                    r.get::<_, String>(8)?,
                    r.get::<_, bool>(9)?,
                    r.get::<_, String>(10)?,
                    r.get::<_, String>(11)?,
                    r.get::<_, String>(12)?,
                    r.get::<_, String>(13)?,
                    r.get::<_, String>(14)?,
                ))
            },
        )
        .optional()?;
    let Some((
        id,
        name,
        start_s,
        duration_months,
        income_s,
        manual_s,
        use_historical,
        apply_inflation,
        inflation_s,
        apply_interest,
        interest_s,
        interest_type_s,
        currency,
        created_s,
        updated_s,
    )) = row
    else {
        return Ok(None);
    };
    Ok(Some(FinancialPlan {
        id,
        name,
        start_date: parse_date(&start_s)?,
        duration_months,
        monthly_income: parse_decimal(&income_s)?,
        manual_monthly_expenses: parse_decimal(&manual_s)?,
        use_historical,
        apply_inflation,
        inflation_rate: parse_decimal(&inflation_s)?,
        apply_interest,
        interest_rate: parse_decimal(&interest_s)?,
        interest_type: InterestType::parse(&interest_type_s)?,
        currency,
        created_at: parse_datetime(&created_s)?,
        updated_at: parse_datetime(&updated_s)?,
    }))
}

fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .with_context(|| format!("Invalid timestamp '{}'", s))
}

/// Project the plan into one row per month. Pure computation apart from
/// reading expense history; nothing is written here.
///
/// The inflation rate compounds monthly and is deliberately applied to the
/// income as well: there is no separate income-growth input. The interest
/// rate and type are stored and displayed but take no part in this math.
pub fn generate_breakdowns(conn: &Connection, plan: &FinancialPlan) -> Result<Vec<PlanBreakdown>> {
    let monthly_rate = if plan.apply_inflation {
        plan.inflation_rate.to_f64().unwrap_or(0.0) / 12.0 / 100.0
    } else {
        0.0
    };

    // One-time spending average over the 3 calendar months before the plan
    // starts. The denominator stays 3 even when fewer months hold any data.
    let one_time_avg = if plan.use_historical {
        let from = month_first_day(add_months(plan.start_date, -3));
        let to = month_last_day(add_months(plan.start_date, -1));
        let total = expense_total(conn, from, to, false, &plan.currency)?;
        total / Decimal::from(3)
    } else {
        Decimal::ZERO
    };

    let mut rows = Vec::with_capacity(plan.duration_months as usize);
    let mut cumulative = Decimal::ZERO;
    for month_index in 0..plan.duration_months {
        let factor = Decimal::try_from((1.0 + monthly_rate).powi(month_index as i32))
            .context("Inflation factor out of decimal range")?;
        let income = plan.monthly_income * factor;

        let (fixed, average) = if plan.use_historical {
            let anchor = add_months(plan.start_date, month_index as i32);
            let recurring = expense_total(
                conn,
                month_first_day(anchor),
                month_last_day(anchor),
                true,
                &plan.currency,
            )?;
            (recurring, one_time_avg)
        } else {
            (plan.manual_monthly_expenses, Decimal::ZERO)
        };
        let adjusted = (fixed + average) * factor;

        let net = income - adjusted;
        cumulative += net;
        rows.push(PlanBreakdown {
            id: 0,
            plan_id: plan.id,
            month_index,
            income,
            fixed_expenses: fixed,
            average_expenses: average,
            total_expenses: adjusted,
            net_amount: net,
            cumulative_net: cumulative,
        });
    }
    Ok(rows)
}

/// Sum of expenses in `[from, to]`, recurring or one-off, converted to the
/// plan currency via each expense's stored rate.
fn expense_total(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
    recurring: bool,
    plan_ccy: &str,
) -> Result<Decimal> {
    let op = if recurring { "!=" } else { "=" };
    let mut stmt = conn.prepare(&format!(
        "SELECT amount, currency, exchange_rate FROM expenses
         WHERE date >= ?1 AND date <= ?2 AND recurrence {} 'none'",
        op
    ))?;
    let mut rows = stmt.query(params![from.to_string(), to.to_string()])?;
    let mut total = Decimal::ZERO;
    while let Some(r) = rows.next()? {
        let amount_s: String = r.get(0)?;
        let ccy: String = r.get(1)?;
        let rate_s: Option<String> = r.get(2)?;
        let amount = parse_decimal(&amount_s)?;
        let rate = rate_s.as_deref().map(parse_decimal).transpose()?;
        total += to_currency(amount, &ccy, plan_ccy, rate);
    }
    Ok(total)
}

fn insert_breakdowns(conn: &Connection, rows: &[PlanBreakdown]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO plan_breakdowns(plan_id, month_index, income, fixed_expenses,
            average_expenses, total_expenses, net_amount, cumulative_net)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )?;
    for b in rows {
        stmt.execute(params![
            b.plan_id,
            b.month_index,
            b.income.to_string(),
            b.fixed_expenses.to_string(),
            b.average_expenses.to_string(),
            b.total_expenses.to_string(),
            b.net_amount.to_string(),
            b.cumulative_net.to_string(),
        ])?;
    }
    Ok(())
}

pub fn breakdowns_for_plan(conn: &Connection, plan_id: i64) -> Result<Vec<PlanBreakdown>> {
    let mut stmt = conn.prepare(
        "SELECT id, plan_id, month_index, income, fixed_expenses, average_expenses,
                total_expenses, net_amount, cumulative_net
         FROM plan_breakdowns WHERE plan_id=?1 ORDER BY month_index ASC",
    )?;
    let mut rows = stmt.query(params![plan_id])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let income_s: String = r.get(3)?;
        let fixed_s: String = r.get(4)?;
        let avg_s: String = r.get(5)?;
        let total_s: String = r.get(6)?;
        let net_s: String = r.get(7)?;
        let cum_s: String = r.get(8)?;
        data.push(PlanBreakdown {
            id: r.get(0)?,
            plan_id: r.get(1)?,
            month_index: r.get(2)?,
            income: parse_decimal(&income_s)?,
            fixed_expenses: parse_decimal(&fixed_s)?,
            average_expenses: parse_decimal(&avg_s)?,
            total_expenses: parse_decimal(&total_s)?,
            net_amount: parse_decimal(&net_s)?,
            cumulative_net: parse_decimal(&cum_s)?,
        });
    }
    Ok(data)
}

/// Edit one month's figures, then rebuild the running total for that month
/// and every later one. Earlier rows are left exactly as they were.
pub fn update_breakdown(
    conn: &mut Connection,
    plan_id: i64,
    month_index: u32,
    income: Option<Decimal>,
    expenses: Option<Decimal>,
) -> Result<()> {
    let tx = conn.transaction()?;
    let row = tx
        .query_row(
            "SELECT income, total_expenses FROM plan_breakdowns
             WHERE plan_id=?1 AND month_index=?2",
            params![plan_id, month_index],
            |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)),
        )
        .optional()?;
    let Some((income_s, expenses_s)) = row else {
        bail!("Plan {} has no month {}", plan_id, month_index);
    };
    let income = match income {
        Some(v) => v,
        None => parse_decimal(&income_s)?,
    };
    let expenses = match expenses {
        Some(v) => v,
        None => parse_decimal(&expenses_s)?,
    };
    let net = income - expenses;
    tx.execute(
        "UPDATE plan_breakdowns SET income=?1, total_expenses=?2, net_amount=?3
         WHERE plan_id=?4 AND month_index=?5",
        params![
            income.to_string(),
            expenses.to_string(),
            net.to_string(),
            plan_id,
            month_index,
        ],
    )?;
    recompute_cumulative_from(&tx, plan_id, month_index)?;
    tx.commit()?;
    Ok(())
}

/// Rewrite cumulative_net for rows `from_index..` in month order, seeded
/// from the row just before.
fn recompute_cumulative_from(conn: &Connection, plan_id: i64, from_index: u32) -> Result<()> {
    let mut cumulative = if from_index == 0 {
        Decimal::ZERO
    } else {
        let prev: Option<String> = conn
            .query_row(
                "SELECT cumulative_net FROM plan_breakdowns
                 WHERE plan_id=?1 AND month_index=?2",
                params![plan_id, from_index - 1],
                |r| r.get(0),
            )
            .optional()?;
        match prev {
            Some(s) => parse_decimal(&s)?,
            None => Decimal::ZERO,
        }
    };

    let nets: Vec<(i64, String)> = {
        let mut stmt = conn.prepare(
            "SELECT id, net_amount FROM plan_breakdowns
             WHERE plan_id=?1 AND month_index>=?2 ORDER BY month_index ASC",
        )?;
        let mut rows = stmt.query(params![plan_id, from_index])?;
        let mut v = Vec::new();
        while let Some(r) = rows.next()? {
            v.push((r.get(0)?, r.get(1)?));
        }
        v
    };
    for (id, net_s) in nets {
        cumulative += parse_decimal(&net_s)?;
        conn.execute(
            "UPDATE plan_breakdowns SET cumulative_net=?1 WHERE id=?2",
            params![cumulative.to_string(), id],
        )?;
    }
    Ok(())
}

/// Where the plan stands today: expected cumulative net from the projection
/// against the realized income/spending since the start. `None` for plans
/// that are not currently active.
pub fn current_position(
    conn: &Connection,
    plan: &FinancialPlan,
    today: NaiveDate,
) -> Result<Option<PlanPosition>> {
    if !plan.is_active(today) {
        return Ok(None);
    }
    let months_elapsed = plan.months_elapsed(today);

    let expected: Option<String> = conn
        .query_row(
            "SELECT cumulative_net FROM plan_breakdowns
             WHERE plan_id=?1 AND month_index=?2",
            params![plan.id, months_elapsed.saturating_sub(1)],
            |r| r.get(0),
        )
        .optional()?;
    let expected = match expected {
        Some(s) => parse_decimal(&s)?,
        None => Decimal::ZERO,
    };

    // Realized spending inside [start, start + elapsed months).
    let window_end = add_months(plan.start_date, months_elapsed as i32);
    let last_day = window_end
        .pred_opt()
        .context("Position window has no final day")?;
    let mut spent = Decimal::ZERO;
    for e in crate::commands::expenses::expenses_between(conn, plan.start_date, last_day)? {
        spent += to_currency(e.amount, &e.currency, &plan.currency, e.exchange_rate);
    }

    let actual = plan.monthly_income * Decimal::from(months_elapsed) - spent;
    let variance = actual - expected;
    // 10% tolerance band below the projected trajectory still counts.
    let on_track = actual >= expected * Decimal::new(9, 1);
    Ok(Some(PlanPosition {
        plan_id: plan.id,
        months_elapsed,
        expected_cumulative_net: expected,
        actual_net: actual,
        variance,
        on_track,
    }))
}

fn plan_input_from_matches(
    conn: &Connection,
    sub: &clap::ArgMatches,
    existing: Option<&FinancialPlan>,
) -> Result<PlanInput> {
    let get = |key: &str| sub.get_one::<String>(key);
    let name = match get("name") {
        Some(n) => n.clone(),
        None => existing.map(|p| p.name.clone()).unwrap_or_default(),
    };
    let start_date = match get("start") {
        Some(s) => parse_date(s)?,
        None => existing
            .map(|p| p.start_date)
            .unwrap_or_else(|| chrono::Utc::now().date_naive()),
    };
    let duration_months = match sub.get_one::<u32>("months") {
        Some(m) => *m,
        None => existing.map(|p| p.duration_months).unwrap_or(0),
    };
    let monthly_income = match get("income") {
        Some(s) => parse_decimal(s)?,
        None => existing.map(|p| p.monthly_income).unwrap_or(Decimal::ZERO),
    };
    let manual_monthly_expenses = match get("expenses") {
        Some(s) => parse_decimal(s)?,
        None => existing
            .map(|p| p.manual_monthly_expenses)
            .unwrap_or(Decimal::ZERO),
    };
    let use_historical = sub.get_flag("historical")
        || (get("expenses").is_none() && existing.map(|p| p.use_historical).unwrap_or(false));
    let inflation = get("inflation").map(|s| parse_decimal(s)).transpose()?;
    let interest = get("interest").map(|s| parse_decimal(s)).transpose()?;
    let interest_type = match get("interest-type") {
        Some(s) => InterestType::parse(s)?,
        None => existing
            .map(|p| p.interest_type)
            .unwrap_or(InterestType::Simple),
    };
    let currency = match get("currency") {
        Some(c) => c.to_uppercase(),
        None => match existing {
            Some(p) => p.currency.clone(),
            None => crate::utils::get_default_currency(conn)?,
        },
    };
    Ok(PlanInput {
        name,
        start_date,
        duration_months,
        monthly_income,
        manual_monthly_expenses,
        use_historical,
        apply_inflation: inflation.is_some()
            || existing.map(|p| p.apply_inflation).unwrap_or(false),
        inflation_rate: inflation
            .or_else(|| existing.map(|p| p.inflation_rate))
            .unwrap_or(Decimal::ZERO),
        apply_interest: interest.is_some()
            || existing.map(|p| p.apply_interest).unwrap_or(false),
        interest_rate: interest
            .or_else(|| existing.map(|p| p.interest_rate))
            .unwrap_or(Decimal::ZERO),
        interest_type,
        currency,
    })
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let input = plan_input_from_matches(conn, sub, None)?;
    let id = create_plan(conn, &input)?;
    println!("Created plan {} '{}'", id, input.name);
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let today = chrono::Utc::now().date_naive();
    let mut stmt = conn.prepare("SELECT id FROM plans ORDER BY id")?;
    let ids: Vec<i64> = stmt
        .query_map([], |r| r.get(0))?
        .collect::<rusqlite::Result<_>>()?;
    let mut plans = Vec::new();
    for id in ids {
        if let Some(p) = fetch_plan(conn, id)? {
            plans.push(p);
        }
    }
    if !maybe_print_json(json_flag, jsonl_flag, &plans)? {
        let rows = plans
            .iter()
            .map(|p| {
                vec![
                    p.id.to_string(),
                    p.name.clone(),
                    p.start_date.to_string(),
                    p.duration_months.to_string(),
                    fmt_money(&p.monthly_income, &p.currency),
                    if p.use_historical { "historical" } else { "manual" }.to_string(),
                    if p.is_active(today) { "yes" } else { "no" }.to_string(),
                    format!("{:.0}%", p.progress(today) * 100.0),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Name", "Start", "Months", "Income", "Expenses", "Active", "Progress"],
                rows
            )
        );
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let Some(plan) = fetch_plan(conn, id)? else {
        bail!("Plan {} not found", id);
    };
    let breakdowns = breakdowns_for_plan(conn, id)?;
    if !maybe_print_json(json_flag, jsonl_flag, &breakdowns)? {
        println!(
            "Plan {} '{}': {} months from {}, income {}",
            plan.id,
            plan.name,
            plan.duration_months,
            plan.start_date,
            fmt_money(&plan.monthly_income, &plan.currency)
        );
        let rows = breakdowns
            .iter()
            .map(|b| {
                vec![
                    b.month_index.to_string(),
                    format!("{:.2}", b.income),
                    format!("{:.2}", b.fixed_expenses),
                    format!("{:.2}", b.average_expenses),
                    format!("{:.2}", b.total_expenses),
                    format!("{:.2}", b.net_amount),
                    format!("{:.2}", b.cumulative_net),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Month", "Income", "Fixed", "Average", "Expenses", "Net", "Cumulative"],
                rows
            )
        );
    }
    Ok(())
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let Some(existing) = fetch_plan(conn, id)? else {
        bail!("Plan {} not found", id);
    };
    let input = plan_input_from_matches(conn, sub, Some(&existing))?;
    update_plan(conn, id, &input)?;
    println!("Updated plan {} and regenerated its projection", id);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    delete_plan(conn, id)?;
    println!("Removed plan {} and its projection", id);
    Ok(())
}

fn set_month(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let plan_id: i64 = *sub.get_one::<i64>("plan").unwrap();
    let month_index: u32 = *sub.get_one::<u32>("month-index").unwrap();
    let income = sub
        .get_one::<String>("income")
        .map(|s| parse_decimal(s))
        .transpose()?;
    let expenses = sub
        .get_one::<String>("expenses")
        .map(|s| parse_decimal(s))
        .transpose()?;
    update_breakdown(conn, plan_id, month_index, income, expenses)?;
    println!(
        "Updated month {} of plan {} and recomputed the running total",
        month_index, plan_id
    );
    Ok(())
}

fn position(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let Some(plan) = fetch_plan(conn, id)? else {
        bail!("Plan {} not found", id);
    };
    let today = chrono::Utc::now().date_naive();
    match current_position(conn, &plan, today)? {
        Some(pos) => {
            if !maybe_print_json(json_flag, jsonl_flag, &pos)? {
                println!(
                    "Plan {} month {}: expected {}, actual {}, variance {} ({})",
                    plan.name,
                    pos.months_elapsed,
                    fmt_money(&pos.expected_cumulative_net, &plan.currency),
                    fmt_money(&pos.actual_net, &plan.currency),
                    fmt_money(&pos.variance, &plan.currency),
                    if pos.on_track { "on track" } else { "behind" }
                );
            }
        }
        None => println!("Plan {} is not active today", plan.name),
    }
    Ok(())
}
