// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn spend_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("division")
            .long("division")
            .help("personal | family | investment"),
    )
    .arg(
        Arg::new("type")
            .long("type")
            .help("essential | important | comfort | investment"),
    )
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and inspect transactions")
        .subcommand_required(true)
        .subcommand(spend_args(
            Command::new("add")
                .about("Record a transaction")
                .arg(Arg::new("date").long("date").required(true).help("YYYY-MM-DD"))
                .arg(Arg::new("description").long("description").short('d').required(true))
                .arg(Arg::new("amount").long("amount").required(true))
                .arg(
                    Arg::new("nature")
                        .long("nature")
                        .default_value("expense")
                        .help("income | expense"),
                )
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("note").long("note"))
                .arg(
                    Arg::new("unpaid")
                        .long("unpaid")
                        .action(ArgAction::SetTrue)
                        .help("Record as not yet paid"),
                )
                .arg(
                    Arg::new("installments")
                        .long("installments")
                        .value_parser(value_parser!(u32).range(1..=120))
                        .help("Split into N monthly installments"),
                ),
        ))
        .subcommand(json_flags(
            Command::new("list")
                .about("List transactions")
                .arg(Arg::new("month").long("month").help("YYYY-MM"))
                .arg(
                    Arg::new("system")
                        .long("system")
                        .action(ArgAction::SetTrue)
                        .help("Only system-generated rows"),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(value_parser!(usize)),
                ),
        ))
        .subcommand(spend_args(
            Command::new("update")
                .about("Change fields of a transaction")
                .arg(
                    Arg::new("id")
                        .required(true)
                        .value_parser(value_parser!(i64)),
                )
                .arg(Arg::new("date").long("date"))
                .arg(Arg::new("description").long("description").short('d'))
                .arg(Arg::new("amount").long("amount"))
                .arg(Arg::new("nature").long("nature"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("note").long("note"))
                .arg(
                    Arg::new("paid")
                        .long("paid")
                        .value_parser(value_parser!(bool))
                        .help("true | false"),
                ),
        ))
        .subcommand(
            Command::new("rm").about("Delete a transaction").arg(
                Arg::new("id")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        )
}

fn card_cmd() -> Command {
    let id = || {
        Arg::new("id")
            .required(true)
            .value_parser(value_parser!(i64))
    };
    Command::new("card")
        .about("Credit cards and projected invoices")
        .subcommand_required(true)
        .subcommand(spend_args(
            Command::new("add")
                .about("Add a card and project its invoices")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("brand").long("brand").required(true))
                .arg(Arg::new("limit").long("limit").default_value("0"))
                .arg(Arg::new("closing-day").long("closing-day").required(true))
                .arg(Arg::new("due-day").long("due-day").required(true))
                .arg(Arg::new("recurring").long("recurring").default_value("0"))
                .arg(Arg::new("expected").long("expected").default_value("0"))
                .arg(
                    Arg::new("shared")
                        .long("shared")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("my-percentage")
                        .long("my-percentage")
                        .default_value("100"),
                ),
        ))
        .subcommand(json_flags(Command::new("list").about("List cards")))
        .subcommand(spend_args(
            Command::new("update")
                .about("Change card settings")
                .arg(id())
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("brand").long("brand"))
                .arg(Arg::new("limit").long("limit"))
                .arg(Arg::new("closing-day").long("closing-day"))
                .arg(Arg::new("due-day").long("due-day"))
                .arg(Arg::new("recurring").long("recurring"))
                .arg(Arg::new("expected").long("expected"))
                .arg(
                    Arg::new("shared")
                        .long("shared")
                        .value_parser(value_parser!(bool)),
                )
                .arg(Arg::new("my-percentage").long("my-percentage")),
        ))
        .subcommand(Command::new("rm").about("Delete a card").arg(id()))
        .subcommand(json_flags(
            Command::new("set-total")
                .about("Set the running total of the open cycle")
                .arg(id())
                .arg(Arg::new("amount").required(true)),
        ))
        .subcommand(json_flags(
            Command::new("project")
                .about("Preview the invoice projection without writing")
                .arg(id())
                .arg(Arg::new("current").long("current").help("Override the running total")),
        ))
        .subcommand(json_flags(
            Command::new("invoices")
                .about("List the projected invoices of a card")
                .arg(id()),
        ))
}

pub fn build_cli() -> Command {
    Command::new("saldo")
        .version(clap::crate_version!())
        .about("Personal ledger with cascading monthly balances and card invoice projections")
        .arg(
            Arg::new("user")
                .long("user")
                .short('u')
                .global(true)
                .value_parser(value_parser!(i64))
                .help("User id (defaults to the configured default_user)"),
        )
        .subcommand(Command::new("init").about("Create the ledger database"))
        .subcommand(tx_cmd())
        .subcommand(
            Command::new("balance")
                .about("Opening balances")
                .subcommand_required(true)
                .subcommand(Command::new("init").about("Create every opening balance"))
                .subcommand(
                    Command::new("recalc")
                        .about("Recalculate opening balances from a month")
                        .arg(Arg::new("from").long("from").required(true).help("YYYY-MM")),
                )
                .subcommand(json_flags(
                    Command::new("show").about("Current balance and opening balances"),
                )),
        )
        .subcommand(card_cmd())
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand_required(true)
                .subcommand(spend_args(
                    Command::new("add").arg(Arg::new("name").required(true)),
                ))
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("rm").arg(Arg::new("name").required(true))),
        )
        .subcommand(
            Command::new("report")
                .about("Reports")
                .subcommand_required(true)
                .subcommand(json_flags(
                    Command::new("months")
                        .about("Income, expense and opening balance per month")
                        .arg(Arg::new("from").long("from").help("YYYY-MM"))
                        .arg(Arg::new("to").long("to").help("YYYY-MM"))
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .help("Include unpaid rows"),
                        ),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv | json"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Check the opening-balance chain"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn user_flag_reaches_nested_subcommands() {
        let m = build_cli().get_matches_from(["saldo", "tx", "rm", "7", "--user", "42"]);
        let (_, tx) = m.subcommand().unwrap();
        let (_, rm) = tx.subcommand().unwrap();
        assert_eq!(rm.get_one::<i64>("user"), Some(&42));
        assert_eq!(rm.get_one::<i64>("id"), Some(&7));
    }
}
