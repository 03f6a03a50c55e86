// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use kakeibo::commands::expenses::{
    add_expense, delete_group_from_today, reconcile_end_date_change, update_group_from_today,
    ExpenseInput, GroupUpdate,
};
use kakeibo::models::RecurrenceType;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::collections::HashSet;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    kakeibo::db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO categories(id, name, color, icon, is_default) VALUES (1, 'Housing', '#8E6E53', 'home', 1)",
        [],
    )
    .unwrap();
    conn
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn input(recurrence: RecurrenceType, date: NaiveDate, end: Option<NaiveDate>) -> ExpenseInput {
    ExpenseInput {
        amount: Decimal::new(5000, 2), // 50.00
        currency: "USD".to_string(),
        category_id: 1,
        subcategory_id: None,
        description: "rent".to_string(),
        date,
        time: None,
        exchange_rate: None,
        recurrence,
        recurrence_end: end,
    }
}

fn group_dates(conn: &Connection, group: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT date FROM expenses WHERE recurrence_group=?1 ORDER BY date")
        .unwrap();
    let rows = stmt
        .query_map(params![group], |r| r.get::<_, String>(0))
        .unwrap();
    rows.map(|r| r.unwrap()).collect()
}

#[test]
fn daily_template_expands_to_one_instance_per_day() {
    let mut conn = setup();
    let out = add_expense(
        &mut conn,
        &input(RecurrenceType::Daily, d(2024, 1, 1), Some(d(2024, 1, 5))),
    )
    .unwrap();
    assert_eq!(out.instances, 5);
    let group = out.group.unwrap();
    assert_eq!(
        group_dates(&conn, &group),
        vec!["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"]
    );

    // Fresh unique ids, one shared group id.
    let mut stmt = conn
        .prepare("SELECT id, recurrence_group FROM expenses")
        .unwrap();
    let rows: Vec<(i64, String)> = stmt
        .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    let ids: HashSet<i64> = rows.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids.len(), 5);
    assert!(rows.iter().all(|(_, g)| *g == group));
}

#[test]
fn open_ended_series_defaults_to_one_year() {
    let mut conn = setup();
    let out = add_expense(&mut conn, &input(RecurrenceType::Daily, d(2024, 1, 1), None)).unwrap();
    // 2024 is a leap year: 2024-01-01 through 2025-01-01 inclusive.
    assert_eq!(out.instances, 367);
    let end: String = conn
        .query_row(
            "SELECT DISTINCT recurrence_end FROM expenses",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(end, "2025-01-01");
}

#[test]
fn one_off_gets_no_group() {
    let mut conn = setup();
    let out = add_expense(&mut conn, &input(RecurrenceType::None, d(2024, 1, 1), None)).unwrap();
    assert_eq!(out.instances, 1);
    assert!(out.group.is_none());
    let group: Option<String> = conn
        .query_row("SELECT recurrence_group FROM expenses", [], |r| r.get(0))
        .unwrap();
    assert!(group.is_none());
}

#[test]
fn monthly_template_keeps_day_of_month() {
    let mut conn = setup();
    let out = add_expense(
        &mut conn,
        &input(RecurrenceType::Monthly, d(2024, 1, 15), Some(d(2024, 6, 30))),
    )
    .unwrap();
    let group = out.group.unwrap();
    assert_eq!(
        group_dates(&conn, &group),
        vec![
            "2024-01-15", "2024-02-15", "2024-03-15", "2024-04-15", "2024-05-15", "2024-06-15"
        ]
    );
}

#[test]
fn reconcile_with_same_end_keeps_date_set() {
    let mut conn = setup();
    let out = add_expense(
        &mut conn,
        &input(RecurrenceType::Daily, d(2024, 1, 1), Some(d(2024, 1, 10))),
    )
    .unwrap();
    let group = out.group.unwrap();
    let before = group_dates(&conn, &group);

    let update = GroupUpdate {
        amount: Some(Decimal::new(7500, 2)),
        ..Default::default()
    };
    let outcome = reconcile_end_date_change(
        &mut conn,
        &group,
        d(2024, 1, 10),
        d(2024, 1, 10),
        &update,
        d(2024, 1, 5),
    )
    .unwrap();
    assert_eq!(outcome.deleted, 0);
    assert_eq!(outcome.created, 0);
    assert_eq!(group_dates(&conn, &group), before);

    // Only today-or-later rows took the new amount.
    let past: Vec<String> = amounts_where(&conn, &group, "date < '2024-01-05'");
    let future: Vec<String> = amounts_where(&conn, &group, "date >= '2024-01-05'");
    assert!(past.iter().all(|a| a == "50.00"));
    assert!(future.iter().all(|a| a == "75.00"));
}

fn amounts_where(conn: &Connection, group: &str, clause: &str) -> Vec<String> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT amount FROM expenses WHERE recurrence_group=?1 AND {} ORDER BY date",
            clause
        ))
        .unwrap();
    stmt.query_map(params![group], |r| r.get::<_, String>(0))
        .unwrap()
        .map(|r| r.unwrap())
        .collect()
}

#[test]
fn shrinking_deletes_instances_past_new_end_only() {
    let mut conn = setup();
    // Weekly Wednesdays: 2024-04-03 .. 2024-05-29 = 9 instances.
    let out = add_expense(
        &mut conn,
        &input(RecurrenceType::Weekly, d(2024, 4, 3), Some(d(2024, 5, 29))),
    )
    .unwrap();
    assert_eq!(out.instances, 9);
    let group = out.group.unwrap();

    // Today is May 2nd; shrink to May 8th, cutting the last three Wednesdays.
    let outcome = reconcile_end_date_change(
        &mut conn,
        &group,
        d(2024, 5, 29),
        d(2024, 5, 8),
        &GroupUpdate::default(),
        d(2024, 5, 2),
    )
    .unwrap();
    assert_eq!(outcome.deleted, 3);
    assert_eq!(outcome.created, 0);
    assert_eq!(
        group_dates(&conn, &group),
        vec![
            "2024-04-03", "2024-04-10", "2024-04-17", "2024-04-24", "2024-05-01", "2024-05-08"
        ]
    );
}

#[test]
fn growing_backfills_only_missing_dates() {
    let mut conn = setup();
    let out = add_expense(
        &mut conn,
        &input(RecurrenceType::Daily, d(2024, 1, 1), Some(d(2024, 1, 5))),
    )
    .unwrap();
    let group = out.group.unwrap();

    let outcome = reconcile_end_date_change(
        &mut conn,
        &group,
        d(2024, 1, 5),
        d(2024, 1, 8),
        &GroupUpdate::default(),
        d(2024, 1, 3),
    )
    .unwrap();
    assert_eq!(outcome.deleted, 0);
    assert_eq!(outcome.created, 3);
    assert_eq!(
        group_dates(&conn, &group),
        vec![
            "2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05", "2024-01-06",
            "2024-01-07", "2024-01-08"
        ]
    );
    // Every live instance now carries the new end date.
    let ends: Vec<String> = {
        let mut stmt = conn
            .prepare("SELECT DISTINCT recurrence_end FROM expenses WHERE recurrence_group=?1 AND date >= '2024-01-03'")
            .unwrap();
        stmt.query_map(params![&group], |r| r.get::<_, String>(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    };
    assert_eq!(ends, vec!["2024-01-08"]);
}

#[test]
fn grow_then_shrink_restores_original_date_set() {
    let mut conn = setup();
    let out = add_expense(
        &mut conn,
        &input(RecurrenceType::Daily, d(2024, 1, 1), Some(d(2024, 1, 5))),
    )
    .unwrap();
    let group = out.group.unwrap();
    let original = group_dates(&conn, &group);

    let today = d(2024, 1, 3);
    reconcile_end_date_change(
        &mut conn,
        &group,
        d(2024, 1, 5),
        d(2024, 1, 9),
        &GroupUpdate::default(),
        today,
    )
    .unwrap();
    reconcile_end_date_change(
        &mut conn,
        &group,
        d(2024, 1, 9),
        d(2024, 1, 5),
        &GroupUpdate::default(),
        today,
    )
    .unwrap();
    assert_eq!(group_dates(&conn, &group), original);
}

#[test]
fn past_instances_survive_a_shrink_before_today() {
    let mut conn = setup();
    let out = add_expense(
        &mut conn,
        &input(RecurrenceType::Daily, d(2024, 1, 1), Some(d(2024, 1, 10))),
    )
    .unwrap();
    let group = out.group.unwrap();

    // Shrink to a date already behind us: everything after Jan 2 goes, the
    // two elapsed instances stay untouched.
    let outcome = reconcile_end_date_change(
        &mut conn,
        &group,
        d(2024, 1, 10),
        d(2024, 1, 2),
        &GroupUpdate {
            amount: Some(Decimal::new(9900, 2)),
            ..Default::default()
        },
        d(2024, 1, 6),
    )
    .unwrap();
    assert_eq!(outcome.deleted, 8);
    assert_eq!(group_dates(&conn, &group), vec!["2024-01-01", "2024-01-02"]);
    assert!(amounts_where(&conn, &group, "1=1").iter().all(|a| a == "50.00"));
}

#[test]
fn bulk_update_and_delete_target_today_onward() {
    let mut conn = setup();
    let out = add_expense(
        &mut conn,
        &input(RecurrenceType::Daily, d(2024, 1, 1), Some(d(2024, 1, 10))),
    )
    .unwrap();
    let group = out.group.unwrap();
    let today = d(2024, 1, 6);

    let updated = update_group_from_today(
        &conn,
        &group,
        &GroupUpdate {
            description: Some("utilities".to_string()),
            ..Default::default()
        },
        today,
    )
    .unwrap();
    assert_eq!(updated, 5); // Jan 6..10

    let removed = delete_group_from_today(&conn, &group, today).unwrap();
    assert_eq!(removed, 5);
    assert_eq!(
        group_dates(&conn, &group),
        vec!["2024-01-01", "2024-01-02", "2024-01-03", "2024-01-04", "2024-01-05"]
    );
    // Past descriptions were never rewritten.
    let descs: Vec<String> = {
        let mut stmt = conn
            .prepare("SELECT DISTINCT description FROM expenses WHERE recurrence_group=?1")
            .unwrap();
        stmt.query_map(params![&group], |r| r.get::<_, String>(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
    };
    assert_eq!(descs, vec!["rent"]);
}
