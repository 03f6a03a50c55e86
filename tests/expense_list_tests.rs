// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use kakeibo::{cli, commands::expenses};
use rusqlite::{params, Connection};

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    kakeibo::db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO categories(id, name, color, icon) VALUES (1, 'Cat1', '#FFFFFF', 'dots')",
        [],
    )
    .unwrap();
    for i in 1..=3 {
        conn.execute(
            "INSERT INTO expenses(amount, currency, category_id, date, recurrence) VALUES ('10', 'USD', 1, ?1, 'none')",
            params![format!("2025-01-0{}", i)],
        )
        .unwrap();
    }
    conn
}

#[test]
fn list_limit_respected() {
    let conn = setup();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from(["kakeibo", "expense", "list", "--limit", "2"]);
    if let Some(("expense", exp_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = exp_m.subcommand() {
            let rows = expenses::query_rows(&conn, list_m).unwrap();
            assert_eq!(rows.len(), 2);
            assert_eq!(rows[0].date, "2025-01-03");
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no expense subcommand");
    }
}

#[test]
fn list_filters_by_month_and_category() {
    let conn = setup();
    conn.execute(
        "INSERT INTO expenses(amount, currency, category_id, date, recurrence) VALUES ('99', 'USD', 1, '2025-02-10', 'none')",
        [],
    )
    .unwrap();
    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "kakeibo", "expense", "list", "--month", "2025-01", "--category", "Cat1",
    ]);
    if let Some(("expense", exp_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = exp_m.subcommand() {
            let rows = expenses::query_rows(&conn, list_m).unwrap();
            assert_eq!(rows.len(), 3);
            assert!(rows.iter().all(|r| r.date.starts_with("2025-01")));
        } else {
            panic!("no list subcommand");
        }
    } else {
        panic!("no expense subcommand");
    }
}
