// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_default_currency, get_limit, parse_decimal, pretty_table, set_setting};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => show(conn)?,
        Some(("currency", sub)) => {
            let ccy = sub.get_one::<String>("code").unwrap().to_uppercase();
            set_setting(conn, "default_currency", &ccy)?;
            println!("Default currency set to {}", ccy);
        }
        Some(("limit", sub)) => {
            let kind = sub.get_one::<String>("kind").unwrap();
            let key = match kind.as_str() {
                "daily" => "daily_limit",
                _ => "monthly_limit",
            };
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            set_setting(conn, key, &amount.to_string())?;
            println!("{} limit set to {}", kind, amount);
        }
        _ => {}
    }
    Ok(())
}

fn show(conn: &Connection) -> Result<()> {
    let ccy = get_default_currency(conn)?;
    let daily = get_limit(conn, "daily_limit")?;
    let monthly = get_limit(conn, "monthly_limit")?;
    let fmt = |v: Option<rust_decimal::Decimal>| match v {
        Some(d) => d.to_string(),
        None => "(unset)".to_string(),
    };
    let rows = vec![
        vec!["default_currency".to_string(), ccy],
        vec!["daily_limit".to_string(), fmt(daily)],
        vec!["monthly_limit".to_string(), fmt(monthly)],
    ];
    println!("{}", pretty_table(&["Setting", "Value"], rows));
    Ok(())
}
