// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{params, Connection};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Kakeibo", "kakeibo"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("kakeibo.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    open_at(&path)
}

pub fn open_at(path: &Path) -> Result<Connection> {
    let mut conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn)?;
    seed_default_taxonomy(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        color TEXT NOT NULL,
        icon TEXT NOT NULL,
        is_default INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS subcategories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        category_id INTEGER NOT NULL,
        is_default INTEGER NOT NULL DEFAULT 0,
        UNIQUE(category_id, name),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS expenses(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount TEXT NOT NULL,
        currency TEXT NOT NULL,
        category_id INTEGER NOT NULL,
        subcategory_id INTEGER,
        description TEXT NOT NULL DEFAULT '',
        date TEXT NOT NULL,
        time TEXT,
        daily_limit_at TEXT,
        monthly_limit_at TEXT,
        exchange_rate TEXT,
        recurrence TEXT NOT NULL DEFAULT 'none',
        recurrence_end TEXT,
        recurrence_group TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE,
        FOREIGN KEY(subcategory_id) REFERENCES subcategories(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);
    CREATE INDEX IF NOT EXISTS idx_expenses_group ON expenses(recurrence_group);

    CREATE TABLE IF NOT EXISTS plans(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        start_date TEXT NOT NULL,
        duration_months INTEGER NOT NULL,
        monthly_income TEXT NOT NULL,
        manual_monthly_expenses TEXT NOT NULL DEFAULT '0',
        use_historical INTEGER NOT NULL DEFAULT 0,
        apply_inflation INTEGER NOT NULL DEFAULT 0,
        inflation_rate TEXT NOT NULL DEFAULT '0',
        apply_interest INTEGER NOT NULL DEFAULT 0,
        interest_rate TEXT NOT NULL DEFAULT '0',
        interest_type TEXT NOT NULL DEFAULT 'simple',
        currency TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS plan_breakdowns(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        plan_id INTEGER NOT NULL,
        month_index INTEGER NOT NULL,
        income TEXT NOT NULL,
        fixed_expenses TEXT NOT NULL DEFAULT '0',
        average_expenses TEXT NOT NULL DEFAULT '0',
        total_expenses TEXT NOT NULL,
        net_amount TEXT NOT NULL,
        cumulative_net TEXT NOT NULL,
        UNIQUE(plan_id, month_index),
        FOREIGN KEY(plan_id) REFERENCES plans(id) ON DELETE CASCADE
    );
    "#,
    )?;
    Ok(())
}

/// Built-in classification taxonomy: 11 categories, 60 subcategories.
const DEFAULT_TAXONOMY: &[(&str, &str, &str, &[&str])] = &[
    (
        "Food & Drinks",
        "#E5734A",
        "utensils",
        &["Groceries", "Restaurants", "Cafe", "Fast Food", "Delivery", "Alcohol"],
    ),
    (
        "Transport",
        "#4A90E5",
        "bus",
        &["Fuel", "Public Transport", "Taxi", "Parking", "Maintenance", "Tolls"],
    ),
    (
        "Housing",
        "#8E6E53",
        "home",
        &["Rent", "Mortgage", "Repairs", "Furniture", "Insurance"],
    ),
    (
        "Utilities",
        "#F2B134",
        "bolt",
        &["Electricity", "Water", "Gas", "Internet", "Mobile", "Trash"],
    ),
    (
        "Shopping",
        "#B06AB3",
        "bag",
        &["Clothing", "Shoes", "Electronics", "Gifts", "Household Goods", "Hobbies"],
    ),
    (
        "Health",
        "#53B175",
        "heart",
        &["Pharmacy", "Doctor", "Dental", "Vision", "Fitness", "Supplements"],
    ),
    (
        "Entertainment",
        "#E54A7B",
        "film",
        &["Cinema", "Concerts", "Streaming", "Games", "Books", "Events"],
    ),
    (
        "Education",
        "#4AC3E5",
        "book",
        &["Tuition", "Courses", "School Supplies", "Exams"],
    ),
    (
        "Travel",
        "#2EC4B6",
        "plane",
        &["Flights", "Hotels", "Local Transport", "Sightseeing", "Visas"],
    ),
    (
        "Personal Care",
        "#F49AC2",
        "scissors",
        &["Haircut", "Cosmetics", "Spa", "Laundry"],
    ),
    (
        "Other",
        "#9AA0A6",
        "dots",
        &["Fees", "Donations", "Pets", "Subscriptions", "Taxes", "Miscellaneous"],
    ),
];

/// Seed the built-in taxonomy once. Skipped when default rows already
/// exist, so reopening the database never duplicates them. Returns whether
/// anything was inserted.
pub fn seed_default_taxonomy(conn: &mut Connection) -> Result<bool> {
    let existing: i64 = conn.query_row(
        "SELECT COUNT(*) FROM categories WHERE is_default=1",
        [],
        |r| r.get(0),
    )?;
    if existing > 0 {
        return Ok(false);
    }

    let tx = conn.transaction()?;
    for (name, color, icon, subs) in DEFAULT_TAXONOMY {
        tx.execute(
            "INSERT INTO categories(name, color, icon, is_default) VALUES (?1, ?2, ?3, 1)",
            params![name, color, icon],
        )?;
        let cat_id = tx.last_insert_rowid();
        for sub in *subs {
            tx.execute(
                "INSERT INTO subcategories(name, category_id, is_default) VALUES (?1, ?2, 1)",
                params![sub, cat_id],
            )?;
        }
    }
    tx.commit()?;
    info!("seeded default taxonomy ({} categories)", DEFAULT_TAXONOMY.len());
    Ok(true)
}
