// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

pub fn build_cli() -> Command {
    Command::new("kakeibo")
        .about("Personal expense tracking, recurring expenses, and financial plan projections")
        .version(clap::crate_version!())
        .subcommand(
            Command::new("init").about("Create the database and seed the default taxonomy"),
        )
        .subcommand(expense_cmd())
        .subcommand(category_cmd())
        .subcommand(plan_cmd())
        .subcommand(report_cmd())
        .subcommand(settings_cmd())
        .subcommand(Command::new("doctor").about("Run data integrity checks"))
}

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn group_update_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("amount").long("amount").help("New amount"))
        .arg(
            Arg::new("description")
                .long("description")
                .help("New description"),
        )
        .arg(Arg::new("rate").long("rate").help("New exchange rate"))
}

fn expense_cmd() -> Command {
    Command::new("expense")
        .about("Record and manage expenses")
        .subcommand(
            Command::new("add")
                .about("Record an expense; recurring types expand into dated instances")
                .arg(Arg::new("amount").long("amount").short('a').required(true))
                .arg(Arg::new("category").long("category").short('c').required(true))
                .arg(Arg::new("subcategory").long("subcategory"))
                .arg(Arg::new("date").long("date").help("YYYY-MM-DD, default today"))
                .arg(Arg::new("time").long("time").help("HH:MM"))
                .arg(Arg::new("description").long("description").short('d'))
                .arg(Arg::new("currency").long("currency"))
                .arg(
                    Arg::new("rate")
                        .long("rate")
                        .help("Exchange rate to the default currency"),
                )
                .arg(
                    Arg::new("recur")
                        .long("recur")
                        .help("none|daily|weekdays|weekly|monthly"),
                )
                .arg(
                    Arg::new("until")
                        .long("until")
                        .help("Last recurrence date, default one year out"),
                ),
        )
        .subcommand(json_flags(
            Command::new("list")
                .about("List expenses")
                .arg(Arg::new("month").long("month").help("YYYY-MM"))
                .arg(Arg::new("day").long("day").help("YYYY-MM-DD"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("group").long("group"))
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(
            Command::new("edit")
                .about("Edit one expense")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("amount").long("amount"))
                .arg(Arg::new("description").long("description"))
                .arg(Arg::new("date").long("date")),
        )
        .subcommand(
            Command::new("rm").about("Delete one expense").arg(
                Arg::new("id")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        )
        .subcommand(group_update_args(
            Command::new("set-end")
                .about("Move a recurring series' end date, preserving past instances")
                .arg(Arg::new("group").long("group").required(true))
                .arg(Arg::new("end").long("end").required(true).help("YYYY-MM-DD")),
        ))
        .subcommand(group_update_args(
            Command::new("update-future")
                .about("Update all of a group's instances from today onward")
                .arg(Arg::new("group").long("group").required(true)),
        ))
        .subcommand(
            Command::new("rm-future")
                .about("Delete all of a group's instances from today onward")
                .arg(Arg::new("group").long("group").required(true)),
        )
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Browse and manage the category taxonomy")
        .subcommand(json_flags(
            Command::new("list").about("List categories").arg(
                Arg::new("subs")
                    .long("subs")
                    .action(ArgAction::SetTrue)
                    .help("List subcategories instead"),
            ),
        ))
        .subcommand(
            Command::new("add")
                .about("Add a custom category")
                .arg(Arg::new("name").required(true))
                .arg(Arg::new("color").long("color").help("#RRGGBB"))
                .arg(Arg::new("icon").long("icon")),
        )
        .subcommand(
            Command::new("rm")
                .about("Remove a category and its subcategories")
                .arg(Arg::new("name").required(true)),
        )
        .subcommand(
            Command::new("add-sub")
                .about("Add a subcategory")
                .arg(Arg::new("category").long("category").required(true))
                .arg(Arg::new("name").long("name").required(true)),
        )
        .subcommand(
            Command::new("rm-sub")
                .about("Remove a subcategory")
                .arg(Arg::new("category").long("category").required(true))
                .arg(Arg::new("name").long("name").required(true)),
        )
}

fn plan_cmd() -> Command {
    let param_args = |cmd: Command| {
        cmd.arg(Arg::new("name").long("name"))
            .arg(Arg::new("start").long("start").help("YYYY-MM-DD"))
            .arg(
                Arg::new("months")
                    .long("months")
                    .value_parser(value_parser!(u32)),
            )
            .arg(Arg::new("income").long("income"))
            .arg(
                Arg::new("expenses")
                    .long("expenses")
                    .help("Manual monthly expense figure"),
            )
            .arg(
                Arg::new("historical")
                    .long("historical")
                    .action(ArgAction::SetTrue)
                    .help("Derive expenses from recorded history"),
            )
            .arg(
                Arg::new("inflation")
                    .long("inflation")
                    .help("Annual inflation rate in percent"),
            )
            .arg(
                Arg::new("interest")
                    .long("interest")
                    .help("Annual interest rate in percent"),
            )
            .arg(
                Arg::new("interest-type")
                    .long("interest-type")
                    .help("simple|compound"),
            )
            .arg(Arg::new("currency").long("currency"))
    };
    Command::new("plan")
        .about("Create and track financial plans")
        .subcommand(param_args(
            Command::new("add").about("Create a plan and project its months"),
        ))
        .subcommand(json_flags(Command::new("list").about("List plans")))
        .subcommand(json_flags(
            Command::new("show")
                .about("Show a plan's monthly breakdown")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                ),
        ))
        .subcommand(param_args(
            Command::new("edit")
                .about("Edit a plan and regenerate its projection")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                ),
        ))
        .subcommand(
            Command::new("rm").about("Delete a plan and its projection").arg(
                Arg::new("id")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        )
        .subcommand(
            Command::new("set-month")
                .about("Edit one projected month and recompute the running total")
                .arg(
                    Arg::new("plan")
                        .long("plan")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(
                    Arg::new("month-index")
                        .long("month-index")
                        .required(true)
                        .value_parser(value_parser!(u32)),
                )
                .arg(Arg::new("income").long("income"))
                .arg(Arg::new("expenses").long("expenses")),
        )
        .subcommand(json_flags(
            Command::new("position")
                .about("Compare the plan's projected trajectory to reality")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                ),
        ))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Spending summaries")
        .subcommand(json_flags(
            Command::new("daily")
                .about("Spending per day in a month")
                .arg(Arg::new("month").long("month").required(true).help("YYYY-MM")),
        ))
        .subcommand(json_flags(
            Command::new("monthly")
                .about("Spending per month")
                .arg(
                    Arg::new("months")
                        .long("months")
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(json_flags(
            Command::new("by-category")
                .about("Spending per category in a month")
                .arg(Arg::new("month").long("month").required(true).help("YYYY-MM")),
        ))
}

fn settings_cmd() -> Command {
    Command::new("settings")
        .about("Preferences: default currency and spending limits")
        .subcommand(Command::new("show").about("Show current settings"))
        .subcommand(
            Command::new("currency")
                .about("Set the default currency")
                .arg(Arg::new("code").required(true)),
        )
        .subcommand(
            Command::new("limit")
                .about("Set a spending limit")
                .arg(
                    Arg::new("kind")
                        .required(true)
                        .value_parser(["daily", "monthly"]),
                )
                .arg(Arg::new("amount").required(true)),
        )
}
