// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Expense, RecurrenceType};
use crate::recurrence::{self, RecurrenceRule};
use crate::utils::{
    add_months, get_limit, id_for_category, id_for_subcategory, maybe_print_json, parse_date,
    parse_decimal, parse_time, pretty_table,
};
use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveTime};
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// A freshly authored expense, before storage and (for recurring types)
/// before expansion into per-day instances.
#[derive(Debug, Clone)]
pub struct ExpenseInput {
    pub amount: Decimal,
    pub currency: String,
    pub category_id: i64,
    pub subcategory_id: Option<i64>,
    pub description: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub exchange_rate: Option<Decimal>,
    pub recurrence: RecurrenceType,
    pub recurrence_end: Option<NaiveDate>,
}

/// Field overrides applied across a recurrence group. `None` keeps the
/// stored value.
#[derive(Debug, Clone, Default)]
pub struct GroupUpdate {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub exchange_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddOutcome {
    pub group: Option<String>,
    pub instances: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconcileOutcome {
    pub deleted: usize,
    pub updated: usize,
    pub created: usize,
}

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("set-end", sub)) => set_end(conn, sub)?,
        Some(("update-future", sub)) => update_future(conn, sub)?,
        Some(("rm-future", sub)) => rm_future(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Store an expense. A one-off becomes a single row; a recurring template
/// is expanded into one row per active day, all sharing a fresh group id,
/// inside a single transaction. The daily/monthly limits in effect right
/// now are snapshotted onto every row.
pub fn add_expense(conn: &mut Connection, input: &ExpenseInput) -> Result<AddOutcome> {
    if input.amount <= Decimal::ZERO {
        bail!("Expense amount must be positive, got {}", input.amount);
    }
    if input.recurrence.is_recurring() {
        if let Some(end) = input.recurrence_end {
            if end < input.date {
                bail!("Recurrence end {} is before start {}", end, input.date);
            }
        }
    } else if input.recurrence_end.is_some() {
        bail!("A one-off expense cannot carry a recurrence end date");
    }

    let daily_limit = get_limit(conn, "daily_limit")?;
    let monthly_limit = get_limit(conn, "monthly_limit")?;

    if !input.recurrence.is_recurring() {
        insert_instance(
            conn,
            input,
            input.date,
            None,
            None,
            daily_limit,
            monthly_limit,
        )?;
        return Ok(AddOutcome {
            group: None,
            instances: 1,
        });
    }

    // Default horizon for an open-ended series: one year from the start.
    let end = input
        .recurrence_end
        .unwrap_or_else(|| add_months(input.date, 12));
    let rule = RecurrenceRule::new(input.recurrence, input.date, Some(end));
    let dates = recurrence::occurrence_dates(&rule, input.date, end);
    let group = Uuid::new_v4().to_string();

    let tx = conn.transaction()?;
    for date in &dates {
        insert_instance(
            &tx,
            input,
            *date,
            Some(end),
            Some(&group),
            daily_limit,
            monthly_limit,
        )?;
    }
    tx.commit()?;
    debug!(
        group = %group,
        instances = dates.len(),
        "expanded recurring expense"
    );
    Ok(AddOutcome {
        group: Some(group),
        instances: dates.len(),
    })
}

fn insert_instance(
    conn: &Connection,
    input: &ExpenseInput,
    date: NaiveDate,
    end: Option<NaiveDate>,
    group: Option<&str>,
    daily_limit: Option<Decimal>,
    monthly_limit: Option<Decimal>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO expenses(amount, currency, category_id, subcategory_id, description,
            date, time, daily_limit_at, monthly_limit_at, exchange_rate,
            recurrence, recurrence_end, recurrence_group)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        params![
            input.amount.to_string(),
            input.currency,
            input.category_id,
            input.subcategory_id,
            input.description,
            date.to_string(),
            input.time.map(|t| t.format("%H:%M:%S").to_string()),
            daily_limit.map(|d| d.to_string()),
            monthly_limit.map(|d| d.to_string()),
            input.exchange_rate.map(|d| d.to_string()),
            input.recurrence.as_str(),
            end.map(|d| d.to_string()),
            group,
        ],
    )?;
    Ok(())
}

/// Move a recurring series' end date, preserving history. Instances dated
/// before `today` are never touched; instances from `today` on take the
/// field overrides and the new end date. Shrinking deletes instances past
/// the new end; growing back-fills the schedule's missing dates up to it.
/// The whole reconcile runs in one transaction.
pub fn reconcile_end_date_change(
    conn: &mut Connection,
    group: &str,
    old_end: NaiveDate,
    new_end: NaiveDate,
    update: &GroupUpdate,
    today: NaiveDate,
) -> Result<ReconcileOutcome> {
    let tx = conn.transaction()?;

    let template = tx
        .query_row(
            "SELECT recurrence, amount, currency, category_id, subcategory_id, description,
                    time, exchange_rate
             FROM expenses WHERE recurrence_group=?1 ORDER BY date ASC LIMIT 1",
            params![group],
            |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, i64>(3)?,
                    r.get::<_, Option<i64>>(4)?,
                    r.get::<_, String>(5)?,
                    r.get::<_, Option<String>>(6)?,
                    r.get::<_, Option<String>>(7)?,
                ))
            },
        )
        .optional()?;
    let Some((rec_s, amount_s, currency, category_id, subcategory_id, description, time_s, rate_s)) =
        template
    else {
        bail!("Recurrence group '{}' not found", group);
    };
    let kind = RecurrenceType::parse(&rec_s)?;
    if !kind.is_recurring() {
        bail!("Group '{}' does not hold a recurring series", group);
    }

    let start_s: String = tx.query_row(
        "SELECT MIN(date) FROM expenses WHERE recurrence_group=?1",
        params![group],
        |r| r.get(0),
    )?;
    let start = parse_date(&start_s)?;

    let mut deleted = 0usize;
    if new_end < old_end {
        deleted = tx.execute(
            "DELETE FROM expenses WHERE recurrence_group=?1 AND date > ?2",
            params![group, new_end.to_string()],
        )?;
    }

    // Past occurrences already happened; only today-or-later rows move.
    let updated = tx.execute(
        "UPDATE expenses SET
            amount=COALESCE(?1, amount),
            description=COALESCE(?2, description),
            exchange_rate=COALESCE(?3, exchange_rate),
            recurrence_end=?4
         WHERE recurrence_group=?5 AND date >= ?6",
        params![
            update.amount.map(|d| d.to_string()),
            update.description.as_deref(),
            update.exchange_rate.map(|d| d.to_string()),
            new_end.to_string(),
            group,
            today.to_string(),
        ],
    )?;

    let mut created = 0usize;
    if new_end > old_end {
        let existing: HashSet<NaiveDate> = {
            let mut stmt =
                tx.prepare("SELECT date FROM expenses WHERE recurrence_group=?1")?;
            let mut rows = stmt.query(params![group])?;
            let mut set = HashSet::new();
            while let Some(r) = rows.next()? {
                let d: String = r.get(0)?;
                set.insert(parse_date(&d)?);
            }
            set
        };

        let rule = RecurrenceRule::new(kind, start, None);
        let from = old_end
            .succ_opt()
            .with_context(|| format!("End date {} cannot be extended", old_end))?;
        let amount = match update.amount {
            Some(a) => a,
            None => parse_decimal(&amount_s)?,
        };
        let exchange_rate = match update.exchange_rate {
            Some(r) => Some(r),
            None => rate_s.as_deref().map(parse_decimal).transpose()?,
        };
        let input = ExpenseInput {
            amount,
            currency,
            category_id,
            subcategory_id,
            description: update
                .description
                .clone()
                .unwrap_or(description),
            date: start,
            time: time_s.as_deref().map(parse_time).transpose()?,
            exchange_rate,
            recurrence: kind,
            recurrence_end: Some(new_end),
        };
        let daily_limit = get_limit(&tx, "daily_limit")?;
        let monthly_limit = get_limit(&tx, "monthly_limit")?;
        for date in recurrence::occurrence_dates_ignoring_end(&rule, from, new_end) {
            if existing.contains(&date) {
                continue;
            }
            insert_instance(
                &tx,
                &input,
                date,
                Some(new_end),
                Some(group),
                daily_limit,
                monthly_limit,
            )?;
            created += 1;
        }
    }

    tx.commit()?;
    debug!(group, deleted, updated, created, "reconciled end date change");
    Ok(ReconcileOutcome {
        deleted,
        updated,
        created,
    })
}

/// The end date the live series currently runs to: the one carried by its
/// latest instance.
pub fn current_group_end(conn: &Connection, group: &str) -> Result<NaiveDate> {
    let end_s: Option<String> = conn
        .query_row(
            "SELECT COALESCE(recurrence_end, date) FROM expenses
             WHERE recurrence_group=?1 ORDER BY date DESC LIMIT 1",
            params![group],
            |r| r.get(0),
        )
        .optional()?;
    match end_s {
        Some(s) => parse_date(&s),
        None => bail!("Recurrence group '{}' not found", group),
    }
}

/// Overwrite mutable fields on every instance of the group dated today or
/// later. Past instances are excluded by convention.
pub fn update_group_from_today(
    conn: &Connection,
    group: &str,
    update: &GroupUpdate,
    today: NaiveDate,
) -> Result<usize> {
    let n = conn.execute(
        "UPDATE expenses SET
            amount=COALESCE(?1, amount),
            description=COALESCE(?2, description),
            exchange_rate=COALESCE(?3, exchange_rate)
         WHERE recurrence_group=?4 AND date >= ?5",
        params![
            update.amount.map(|d| d.to_string()),
            update.description.as_deref(),
            update.exchange_rate.map(|d| d.to_string()),
            group,
            today.to_string(),
        ],
    )?;
    Ok(n)
}

/// Delete every instance of the group dated today or later.
pub fn delete_group_from_today(conn: &Connection, group: &str, today: NaiveDate) -> Result<usize> {
    let n = conn.execute(
        "DELETE FROM expenses WHERE recurrence_group=?1 AND date >= ?2",
        params![group, today.to_string()],
    )?;
    Ok(n)
}

/// All expenses dated in `[from, to]` inclusive, oldest first.
pub fn expenses_between(conn: &Connection, from: NaiveDate, to: NaiveDate) -> Result<Vec<Expense>> {
    let mut stmt = conn.prepare(
        "SELECT id, amount, currency, category_id, subcategory_id, description, date, time,
                daily_limit_at, monthly_limit_at, exchange_rate,
                recurrence, recurrence_end, recurrence_group
         FROM expenses WHERE date >= ?1 AND date <= ?2 ORDER BY date ASC, id ASC",
    )?;
    let mut rows = stmt.query(params![from.to_string(), to.to_string()])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let amount_s: String = r.get(1)?;
        let date_s: String = r.get(6)?;
        let time_s: Option<String> = r.get(7)?;
        let daily_s: Option<String> = r.get(8)?;
        let monthly_s: Option<String> = r.get(9)?;
        let rate_s: Option<String> = r.get(10)?;
        let rec_s: String = r.get(11)?;
        let end_s: Option<String> = r.get(12)?;
        data.push(Expense {
            id: r.get(0)?,
            amount: parse_decimal(&amount_s)?,
            currency: r.get(2)?,
            category_id: r.get(3)?,
            subcategory_id: r.get(4)?,
            description: r.get(5)?,
            date: parse_date(&date_s)?,
            time: time_s.as_deref().map(parse_time).transpose()?,
            daily_limit_at: daily_s.as_deref().map(parse_decimal).transpose()?,
            monthly_limit_at: monthly_s.as_deref().map(parse_decimal).transpose()?,
            exchange_rate: rate_s.as_deref().map(parse_decimal).transpose()?,
            recurrence: RecurrenceType::parse(&rec_s)?,
            recurrence_end: end_s.as_deref().map(parse_date).transpose()?,
            recurrence_group: r.get(13)?,
        });
    }
    Ok(data)
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap();
    let category_id = id_for_category(conn, category)?;
    let subcategory_id = sub
        .get_one::<String>("subcategory")
        .map(|s| id_for_subcategory(conn, category_id, s))
        .transpose()?;
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => chrono::Utc::now().date_naive(),
    };
    let time = sub
        .get_one::<String>("time")
        .map(|t| parse_time(t))
        .transpose()?;
    let currency = match sub.get_one::<String>("currency") {
        Some(c) => c.to_uppercase(),
        None => crate::utils::get_default_currency(conn)?,
    };
    let exchange_rate = sub
        .get_one::<String>("rate")
        .map(|s| parse_decimal(s))
        .transpose()?;
    let recurrence = match sub.get_one::<String>("recur") {
        Some(r) => RecurrenceType::parse(r)?,
        None => RecurrenceType::None,
    };
    let recurrence_end = sub
        .get_one::<String>("until")
        .map(|s| parse_date(s))
        .transpose()?;
    let description = sub
        .get_one::<String>("description")
        .cloned()
        .unwrap_or_default();

    let input = ExpenseInput {
        amount,
        currency,
        category_id,
        subcategory_id,
        description,
        date,
        time,
        exchange_rate,
        recurrence,
        recurrence_end,
    };
    let outcome = add_expense(conn, &input)?;
    match outcome.group {
        Some(group) => println!(
            "Recorded {} instance(s) of recurring expense (group {})",
            outcome.instances, group
        ),
        None => println!("Recorded {} on {} ({})", amount, date, category),
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.amount.clone(),
                    r.currency.clone(),
                    r.category.clone(),
                    r.subcategory.clone(),
                    r.description.clone(),
                    r.recurrence.clone(),
                    r.group.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Amount", "CCY", "Category", "Subcategory", "Description", "Recur", "Group"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Serialize)]
pub struct ExpenseRow {
    pub id: i64,
    pub date: String,
    pub amount: String,
    pub currency: String,
    pub category: String,
    pub subcategory: String,
    pub description: String,
    pub recurrence: String,
    pub group: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<ExpenseRow>> {
    let mut sql = String::from(
        "SELECT e.id, e.date, e.amount, e.currency, c.name, s.name, e.description, e.recurrence, e.recurrence_group
         FROM expenses e
         LEFT JOIN categories c ON e.category_id=c.id
         LEFT JOIN subcategories s ON e.subcategory_id=s.id
         WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(month) = sub.get_one::<String>("month") {
        sql.push_str(" AND substr(e.date,1,7)=?");
        params_vec.push(month.into());
    }
    if let Some(day) = sub.get_one::<String>("day") {
        sql.push_str(" AND e.date=?");
        params_vec.push(day.into());
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        sql.push_str(" AND c.name=?");
        params_vec.push(cat.into());
    }
    if let Some(group) = sub.get_one::<String>("group") {
        sql.push_str(" AND e.recurrence_group=?");
        params_vec.push(group.into());
    }
    sql.push_str(" ORDER BY e.date DESC, e.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = if params_vec.is_empty() {
        stmt.query([])?
    } else {
        let params: Vec<&dyn rusqlite::ToSql> = params_vec
            .iter()
            .map(|s| s as &dyn rusqlite::ToSql)
            .collect();
        stmt.query(rusqlite::params_from_iter(params))?
    };

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let category: Option<String> = r.get(4)?;
        let subcategory: Option<String> = r.get(5)?;
        let group: Option<String> = r.get(8)?;
        data.push(ExpenseRow {
            id: r.get(0)?,
            date: r.get(1)?,
            amount: r.get(2)?,
            currency: r.get(3)?,
            category: category.unwrap_or_default(),
            subcategory: subcategory.unwrap_or_default(),
            description: r.get(6)?,
            recurrence: r.get(7)?,
            group: group.unwrap_or_default(),
        });
    }
    Ok(data)
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let amount = sub
        .get_one::<String>("amount")
        .map(|s| parse_decimal(s))
        .transpose()?;
    let description = sub.get_one::<String>("description").cloned();
    let date = sub
        .get_one::<String>("date")
        .map(|s| parse_date(s))
        .transpose()?;
    let n = conn.execute(
        "UPDATE expenses SET
            amount=COALESCE(?1, amount),
            description=COALESCE(?2, description),
            date=COALESCE(?3, date)
         WHERE id=?4",
        params![
            amount.map(|d| d.to_string()),
            description,
            date.map(|d| d.to_string()),
            id,
        ],
    )?;
    if n == 0 {
        bail!("Expense {} not found", id);
    }
    println!("Updated expense {}", id);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let n = conn.execute("DELETE FROM expenses WHERE id=?1", params![id])?;
    if n == 0 {
        bail!("Expense {} not found", id);
    }
    println!("Removed expense {}", id);
    Ok(())
}

fn group_update_from_matches(sub: &clap::ArgMatches) -> Result<GroupUpdate> {
    Ok(GroupUpdate {
        amount: sub
            .get_one::<String>("amount")
            .map(|s| parse_decimal(s))
            .transpose()?,
        description: sub.get_one::<String>("description").cloned(),
        exchange_rate: sub
            .get_one::<String>("rate")
            .map(|s| parse_decimal(s))
            .transpose()?,
    })
}

fn set_end(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let group = sub.get_one::<String>("group").unwrap();
    let end = parse_date(sub.get_one::<String>("end").unwrap())?;
    let update = group_update_from_matches(sub)?;
    let today = chrono::Utc::now().date_naive();
    let old_end = current_group_end(conn, group)?;
    let outcome = reconcile_end_date_change(conn, group, old_end, end, &update, today)?;
    println!(
        "Reconciled group {}: {} deleted, {} updated, {} created",
        group, outcome.deleted, outcome.updated, outcome.created
    );
    Ok(())
}

fn update_future(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let group = sub.get_one::<String>("group").unwrap();
    let update = group_update_from_matches(sub)?;
    let today = chrono::Utc::now().date_naive();
    let n = update_group_from_today(conn, group, &update, today)?;
    println!("Updated {} future instance(s) in group {}", n, group);
    Ok(())
}

fn rm_future(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let group = sub.get_one::<String>("group").unwrap();
    let today = chrono::Utc::now().date_naive();
    let n = delete_group_from_today(conn, group, today)?;
    println!("Removed {} future instance(s) from group {}", n, group);
    Ok(())
}
