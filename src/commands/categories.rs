// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Category, SubCategory};
use crate::utils::{id_for_category, maybe_print_json, pretty_table};
use anyhow::{bail, Result};
use rusqlite::{params, Connection};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(conn, sub)?,
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let color = sub
                .get_one::<String>("color")
                .cloned()
                .unwrap_or_else(|| "#9AA0A6".to_string());
            let icon = sub
                .get_one::<String>("icon")
                .cloned()
                .unwrap_or_else(|| "dots".to_string());
            conn.execute(
                "INSERT INTO categories(name, color, icon, is_default) VALUES (?1, ?2, ?3, 0)",
                params![name, color, icon],
            )?;
            println!("Added category '{}'", name);
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            // Subcategories go with it (FK cascade).
            let n = conn.execute("DELETE FROM categories WHERE name=?1", params![name])?;
            if n == 0 {
                bail!("Category '{}' not found", name);
            }
            println!("Removed category '{}' and its subcategories", name);
        }
        Some(("add-sub", sub)) => {
            let parent = sub.get_one::<String>("category").unwrap();
            let name = sub.get_one::<String>("name").unwrap();
            let cat_id = id_for_category(conn, parent)?;
            conn.execute(
                "INSERT INTO subcategories(name, category_id, is_default) VALUES (?1, ?2, 0)",
                params![name, cat_id],
            )?;
            println!("Added subcategory '{}' under '{}'", name, parent);
        }
        Some(("rm-sub", sub)) => {
            let parent = sub.get_one::<String>("category").unwrap();
            let name = sub.get_one::<String>("name").unwrap();
            let cat_id = id_for_category(conn, parent)?;
            let n = conn.execute(
                "DELETE FROM subcategories WHERE category_id=?1 AND name=?2",
                params![cat_id, name],
            )?;
            if n == 0 {
                bail!("Subcategory '{}' not found under '{}'", name, parent);
            }
            println!("Removed subcategory '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

pub fn all_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt =
        conn.prepare("SELECT id, name, color, icon, is_default FROM categories ORDER BY name")?;
    let rows = stmt.query_map([], |r| {
        Ok(Category {
            id: r.get(0)?,
            name: r.get(1)?,
            color: r.get(2)?,
            icon: r.get(3)?,
            is_default: r.get(4)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn subcategories_for(conn: &Connection, category_id: i64) -> Result<Vec<SubCategory>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, category_id, is_default FROM subcategories
         WHERE category_id=?1 ORDER BY name",
    )?;
    let rows = stmt.query_map(params![category_id], |r| {
        Ok(SubCategory {
            id: r.get(0)?,
            name: r.get(1)?,
            category_id: r.get(2)?,
            is_default: r.get(3)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let categories = all_categories(conn)?;

    if sub.get_flag("subs") {
        let mut subs = Vec::new();
        for cat in &categories {
            subs.extend(subcategories_for(conn, cat.id)?);
        }
        if !maybe_print_json(json_flag, jsonl_flag, &subs)? {
            let by_id = |id: i64| {
                categories
                    .iter()
                    .find(|c| c.id == id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default()
            };
            let data = subs
                .iter()
                .map(|s| vec![by_id(s.category_id), s.name.clone()])
                .collect();
            println!("{}", pretty_table(&["Category", "Subcategory"], data));
        }
        return Ok(());
    }

    if !maybe_print_json(json_flag, jsonl_flag, &categories)? {
        let mut data = Vec::new();
        for cat in &categories {
            let subs = subcategories_for(conn, cat.id)?;
            data.push(vec![
                cat.name.clone(),
                cat.color.clone(),
                cat.icon.clone(),
                if cat.is_default { "default" } else { "custom" }.to_string(),
                subs.len().to_string(),
            ]);
        }
        println!(
            "{}",
            pretty_table(&["Category", "Color", "Icon", "Kind", "Subcategories"], data)
        );
    }
    Ok(())
}
