// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args(cmd: Command) -> Command {
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
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn id_arg() -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .help("Transaction id")
}

fn entry_args(cmd: Command) -> Command {
    cmd.arg(Arg::new("amount").long("amount").required(true))
        .arg(
            Arg::new("category")
                .long("category")
                .required(true),
        )
        .arg(
            Arg::new("date")
                .long("date")
                .required(true)
                .help("YYYY-MM-DD"),
        )
        .arg(Arg::new("note").long("note"))
}

pub fn build_cli() -> Command {
    Command::new("paycheck")
        .about("Income and expense log with 50/30/20 budget tracking")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("Path to the SQLite database (defaults to the platform data dir)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log debug output to stderr"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("income").about("Record income").subcommand(
                entry_args(Command::new("add")).arg(
                    Arg::new("pending")
                        .long("pending")
                        .action(ArgAction::SetTrue)
                        .help("Expected but not yet received"),
                ),
            ),
        )
        .subcommand(
            Command::new("expense").about("Record expenses").subcommand(
                entry_args(Command::new("add"))
                    .arg(
                        Arg::new("bucket")
                            .long("bucket")
                            .required(true)
                            .help("needs|wants|savings"),
                    )
                    .arg(
                        Arg::new("unfunded")
                            .long("unfunded")
                            .action(ArgAction::SetTrue)
                            .help("Planned but not yet paid"),
                    )
                    .arg(
                        Arg::new("income")
                            .long("income")
                            .help("Id of the income this expense is drawn against"),
                    ),
            ),
        )
        .subcommand(
            Command::new("tx")
                .about("Inspect and edit transactions")
                .subcommand(json_args(
                    Command::new("list")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .value_parser(["income", "expense"]),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(Command::new("rm").arg(id_arg()))
                .subcommand(
                    Command::new("fund").arg(id_arg()).arg(
                        Arg::new("undo")
                            .long("undo")
                            .action(ArgAction::SetTrue)
                            .help("Mark as not funded"),
                    ),
                )
                .subcommand(
                    Command::new("receive").arg(id_arg()).arg(
                        Arg::new("undo")
                            .long("undo")
                            .action(ArgAction::SetTrue)
                            .help("Mark as not received"),
                    ),
                ),
        )
        .subcommand(json_args(
            Command::new("summary").about("Balance cards and 50/30/20 progress"),
        ))
        .subcommand(json_args(
            Command::new("paychecks").about("Incomes with the expenses drawn against them"),
        ))
        .subcommand(
            Command::new("report")
                .about("Reports")
                .subcommand(json_args(Command::new("by-category"))),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .required(true)
                            .help("csv|json"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("import").subcommand(
                Command::new("transactions").arg(
                    Arg::new("path")
                        .long("path")
                        .required(true)
                        .help("CSV with type,date,amount,category,received,funded,bucket,linked_income_id,note"),
                ),
            ),
        )
        .subcommand(
            Command::new("settings")
                .about("Display preferences")
                .subcommand(Command::new("get").arg(Arg::new("key").long("key").required(true)))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").long("key").required(true))
                        .arg(Arg::new("value").long("value").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check stored transactions for problems"))
}
