// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use kakeibo::commands::plans::{
    breakdowns_for_plan, create_plan, current_position, delete_plan, fetch_plan, update_plan,
    PlanInput,
};
use kakeibo::models::InterestType;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    kakeibo::db::init_schema(&conn).unwrap();
    conn.execute(
        "INSERT INTO categories(id, name, color, icon, is_default) VALUES (1, 'Other', '#9AA0A6', 'dots', 1)",
        [],
    )
    .unwrap();
    conn
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn plan_input(start: NaiveDate, months: u32, income: i64, expenses: i64) -> PlanInput {
    PlanInput {
        name: "house fund".to_string(),
        start_date: start,
        duration_months: months,
        monthly_income: Decimal::from(income),
        manual_monthly_expenses: Decimal::from(expenses),
        use_historical: false,
        apply_inflation: false,
        inflation_rate: Decimal::ZERO,
        apply_interest: false,
        interest_rate: Decimal::ZERO,
        interest_type: InterestType::Simple,
        currency: "USD".to_string(),
    }
}

fn plan_count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM plans", [], |r| r.get(0))
        .unwrap()
}

#[test]
fn create_persists_plan_and_projection() {
    let mut conn = setup();
    let id = create_plan(&mut conn, &plan_input(d(2024, 1, 1), 6, 2000, 1500)).unwrap();
    let plan = fetch_plan(&conn, id).unwrap().unwrap();
    assert_eq!(plan.name, "house fund");
    assert_eq!(plan.duration_months, 6);
    assert_eq!(plan.end_date(), d(2024, 7, 1));
    assert_eq!(breakdowns_for_plan(&conn, id).unwrap().len(), 6);
}

#[test]
fn update_regenerates_the_whole_projection() {
    let mut conn = setup();
    let id = create_plan(&mut conn, &plan_input(d(2024, 1, 1), 3, 1000, 400)).unwrap();
    update_plan(&mut conn, id, &plan_input(d(2024, 1, 1), 5, 1000, 300)).unwrap();
    let rows = breakdowns_for_plan(&conn, id).unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|b| b.net_amount == Decimal::from(700)));
}

#[test]
fn delete_cascades_to_breakdowns() {
    let mut conn = setup();
    let id = create_plan(&mut conn, &plan_input(d(2024, 1, 1), 4, 1000, 400)).unwrap();
    delete_plan(&conn, id).unwrap();
    assert_eq!(plan_count(&conn), 0);
    let orphans: i64 = conn
        .query_row("SELECT COUNT(*) FROM plan_breakdowns", [], |r| r.get(0))
        .unwrap();
    assert_eq!(orphans, 0);
}

#[test]
fn invalid_input_is_rejected_before_any_write() {
    let mut conn = setup();

    let mut blank = plan_input(d(2024, 1, 1), 3, 1000, 400);
    blank.name = "   ".to_string();
    assert!(create_plan(&mut conn, &blank).is_err());

    let zero_months = plan_input(d(2024, 1, 1), 0, 1000, 400);
    assert!(create_plan(&mut conn, &zero_months).is_err());

    let too_long = plan_input(d(2024, 1, 1), 121, 1000, 400);
    assert!(create_plan(&mut conn, &too_long).is_err());

    let no_income = plan_input(d(2024, 1, 1), 3, 0, 400);
    assert!(create_plan(&mut conn, &no_income).is_err());

    let mut wild_inflation = plan_input(d(2024, 1, 1), 3, 1000, 400);
    wild_inflation.apply_inflation = true;
    wild_inflation.inflation_rate = Decimal::from(150);
    assert!(create_plan(&mut conn, &wild_inflation).is_err());

    assert_eq!(plan_count(&conn), 0);
}

#[test]
fn missing_plan_reads_as_none() {
    let conn = setup();
    assert!(fetch_plan(&conn, 42).unwrap().is_none());
}

#[test]
fn position_compares_projection_to_reality() {
    let mut conn = setup();
    // 12 months from Jan 1st: income 1000, expenses 400 => net 600/month.
    let id = create_plan(&mut conn, &plan_input(d(2024, 1, 1), 12, 1000, 400)).unwrap();
    let plan = fetch_plan(&conn, id).unwrap().unwrap();

    // Really spent 600 so far.
    conn.execute(
        "INSERT INTO expenses(amount, currency, category_id, date, recurrence)
         VALUES ('600', 'USD', 1, '2024-02-01', 'none')",
        params![],
    )
    .unwrap();

    // March 15th is inside month 3 (the partial month counts).
    let pos = current_position(&conn, &plan, d(2024, 3, 15))
        .unwrap()
        .unwrap();
    assert_eq!(pos.months_elapsed, 3);
    // Expected: cumulative net of month index 2 = 1800.
    assert_eq!(pos.expected_cumulative_net, Decimal::from(1800));
    // Actual: 3 * 1000 - 600 = 2400.
    assert_eq!(pos.actual_net, Decimal::from(2400));
    assert_eq!(pos.variance, Decimal::from(600));
    assert!(pos.on_track);
}

#[test]
fn position_flags_a_plan_behind_its_trajectory() {
    let mut conn = setup();
    let id = create_plan(&mut conn, &plan_input(d(2024, 1, 1), 12, 1000, 400)).unwrap();
    let plan = fetch_plan(&conn, id).unwrap().unwrap();
    conn.execute(
        "INSERT INTO expenses(amount, currency, category_id, date, recurrence)
         VALUES ('2000', 'USD', 1, '2024-02-01', 'none')",
        params![],
    )
    .unwrap();

    // Actual: 3000 - 2000 = 1000, below 90% of the expected 1800.
    let pos = current_position(&conn, &plan, d(2024, 3, 15))
        .unwrap()
        .unwrap();
    assert_eq!(pos.actual_net, Decimal::from(1000));
    assert!(!pos.on_track);
}

#[test]
fn position_is_none_outside_the_active_window() {
    let mut conn = setup();
    let id = create_plan(&mut conn, &plan_input(d(2024, 6, 1), 3, 1000, 400)).unwrap();
    let plan = fetch_plan(&conn, id).unwrap().unwrap();
    // Before start, on the start day, and after the end.
    assert!(current_position(&conn, &plan, d(2024, 5, 1)).unwrap().is_none());
    assert!(current_position(&conn, &plan, d(2024, 6, 1)).unwrap().is_none());
    assert!(current_position(&conn, &plan, d(2024, 10, 2)).unwrap().is_none());
}
