// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{
    get_default_currency, maybe_print_json, parse_decimal, parse_month, pretty_table, to_currency,
};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("daily", sub)) => daily(conn, sub)?,
        Some(("monthly", sub)) => monthly(conn, sub)?,
        Some(("by-category", sub)) => by_category(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Spending per day within one month, converted to the default currency.
fn daily(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let base = get_default_currency(conn)?;

    let mut stmt = conn.prepare(
        "SELECT date, amount, currency, exchange_rate FROM expenses
         WHERE substr(date,1,7)=?1 ORDER BY date",
    )?;
    let mut rows = stmt.query([month])?;
    let mut per_day: BTreeMap<String, Decimal> = BTreeMap::new();
    while let Some(r) = rows.next()? {
        let date: String = r.get(0)?;
        let amount_s: String = r.get(1)?;
        let ccy: String = r.get(2)?;
        let rate_s: Option<String> = r.get(3)?;
        let amount = parse_decimal(&amount_s)?;
        let rate = rate_s.as_deref().map(parse_decimal).transpose()?;
        *per_day.entry(date).or_insert(Decimal::ZERO) +=
            to_currency(amount, &ccy, &base, rate);
    }
    let data: Vec<Vec<String>> = per_day
        .iter()
        .map(|(d, v)| vec![d.clone(), format!("{:.2}", v)])
        .collect();
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!("{}", pretty_table(&["Date", &format!("Spent ({})", base)], data));
    }
    Ok(())
}

/// Spending per month over the last N months.
fn monthly(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let months: usize = *sub.get_one::<usize>("months").unwrap_or(&12);
    let base = get_default_currency(conn)?;

    let mut stmt = conn.prepare(
        "SELECT substr(date,1,7) AS month, amount, currency, exchange_rate
         FROM expenses ORDER BY date DESC",
    )?;
    let mut rows = stmt.query([])?;
    let mut per_month: BTreeMap<String, (Decimal, usize)> = BTreeMap::new();
    while let Some(r) = rows.next()? {
        let month: String = r.get(0)?;
        let amount_s: String = r.get(1)?;
        let ccy: String = r.get(2)?;
        let rate_s: Option<String> = r.get(3)?;
        let amount = parse_decimal(&amount_s)?;
        let rate = rate_s.as_deref().map(parse_decimal).transpose()?;
        let entry = per_month.entry(month).or_insert((Decimal::ZERO, 0));
        entry.0 += to_currency(amount, &ccy, &base, rate);
        entry.1 += 1;
    }
    let mut data = Vec::new();
    for (month, (total, count)) in per_month.iter().rev().take(months) {
        data.push(vec![
            month.clone(),
            format!("{:.2}", total),
            count.to_string(),
        ]);
    }
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!(
            "{}",
            pretty_table(&["Month", &format!("Spent ({})", base), "Expenses"], data)
        );
    }
    Ok(())
}

/// Spending per category within one month, largest first.
fn by_category(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = parse_month(sub.get_one::<String>("month").unwrap())?;
    let base = get_default_currency(conn)?;

    let mut stmt = conn.prepare(
        "SELECT c.name, e.amount, e.currency, e.exchange_rate
         FROM expenses e LEFT JOIN categories c ON e.category_id=c.id
         WHERE substr(e.date,1,7)=?1",
    )?;
    let mut rows = stmt.query([month])?;
    let mut agg: BTreeMap<String, Decimal> = BTreeMap::new();
    while let Some(r) = rows.next()? {
        let cat: Option<String> = r.get(0)?;
        let amount_s: String = r.get(1)?;
        let ccy: String = r.get(2)?;
        let rate_s: Option<String> = r.get(3)?;
        let amount = parse_decimal(&amount_s)?;
        let rate = rate_s.as_deref().map(parse_decimal).transpose()?;
        *agg.entry(cat.unwrap_or("(uncategorized)".into()))
            .or_insert(Decimal::ZERO) += to_currency(amount, &ccy, &base, rate);
    }
    let mut items: Vec<_> = agg.into_iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    let data: Vec<Vec<String>> = items
        .into_iter()
        .map(|(cat, amt)| vec![cat, format!("{:.2}", amt)])
        .collect();
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        println!(
            "{}",
            pretty_table(&["Category", &format!("Spent ({})", base)], data)
        );
    }
    Ok(())
}
