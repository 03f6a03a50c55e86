// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use kakeibo::commands::doctor;
use kakeibo::db;
use rusqlite::Connection;

fn counts(conn: &Connection) -> (i64, i64) {
    let cats: i64 = conn
        .query_row("SELECT COUNT(*) FROM categories WHERE is_default=1", [], |r| r.get(0))
        .unwrap();
    let subs: i64 = conn
        .query_row("SELECT COUNT(*) FROM subcategories WHERE is_default=1", [], |r| r.get(0))
        .unwrap();
    (cats, subs)
}

#[test]
fn taxonomy_seed_is_idempotent_in_process() {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    assert!(db::seed_default_taxonomy(&mut conn).unwrap());
    assert_eq!(counts(&conn), (11, 60));
    // A second run is a no-op.
    assert!(!db::seed_default_taxonomy(&mut conn).unwrap());
    assert_eq!(counts(&conn), (11, 60));
}

#[test]
fn taxonomy_seed_is_idempotent_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kakeibo.sqlite");
    {
        let conn = db::open_at(&path).unwrap();
        assert_eq!(counts(&conn), (11, 60));
    }
    let conn = db::open_at(&path).unwrap();
    assert_eq!(counts(&conn), (11, 60));
}

#[test]
fn removing_a_category_cascades_to_subcategories() {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    db::seed_default_taxonomy(&mut conn).unwrap();

    let before: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM subcategories s JOIN categories c ON s.category_id=c.id WHERE c.name='Travel'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert!(before > 0);

    conn.execute("DELETE FROM categories WHERE name='Travel'", []).unwrap();
    let (cats, subs) = counts(&conn);
    assert_eq!(cats, 10);
    assert_eq!(subs, 60 - before);
}

#[test]
fn doctor_flags_a_broken_running_total() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO plans(id, name, start_date, duration_months, monthly_income, currency)
        VALUES (1, 'p', '2024-01-01', 2, '1000', 'USD');
        INSERT INTO plan_breakdowns(plan_id, month_index, income, total_expenses, net_amount, cumulative_net)
        VALUES (1, 0, '1000', '400', '600', '600'),
               (1, 1, '1000', '400', '600', '1300'); -- should be 1200
        "#,
    )
    .unwrap();
    let issues = doctor::run_checks(&conn).unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0][0], "cumulative_mismatch");
}

#[test]
fn doctor_flags_recurrence_bookkeeping_errors() {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO categories(id, name, color, icon) VALUES (1, 'Other', '#9AA0A6', 'dots')",
        [],
    )
    .unwrap();
    conn.execute_batch(
        r#"
        -- recurring without a group id
        INSERT INTO expenses(amount, currency, category_id, date, recurrence)
        VALUES ('10', 'USD', 1, '2024-01-01', 'daily');
        -- instance dated past its own series end
        INSERT INTO expenses(amount, currency, category_id, date, recurrence, recurrence_end, recurrence_group)
        VALUES ('10', 'USD', 1, '2024-03-01', 'daily', '2024-02-01', 'g1');
        "#,
    )
    .unwrap();
    let issues = doctor::run_checks(&conn).unwrap();
    let kinds: Vec<&str> = issues.iter().map(|r| r[0].as_str()).collect();
    assert!(kinds.contains(&"recurring_without_group"));
    assert!(kinds.contains(&"instance_past_end"));
}
