use crate::cli::{Commands, ExpenseCommand, RecordsCommand, RevenueCommand, TripCommand};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    const fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Revenue {
            command: RevenueCommand::Add { json, .. },
        }
        | Commands::Expense {
            command: ExpenseCommand::Add { json, .. },
        }
        | Commands::Records {
            command: RecordsCommand::List { json, .. } | RecordsCommand::Delete { json, .. },
        }
        | Commands::Summary { json, .. }
        | Commands::Trip {
            command:
                TripCommand::Start { json, .. }
                | TripCommand::End { json, .. }
                | TripCommand::Status { json },
        }
        | Commands::Periods { json }
        | Commands::Import { json, .. } => *json,
        Commands::Trip {
            command: TripCommand::Reset,
        } => false,
    };
    OutputMode::from_flag(json)
}

#[cfg(test)]
mod tests {
    use super::{OutputMode, mode_for_command};
    use crate::cli::parse_from;

    #[test]
    fn json_flag_selects_json_for_every_command_that_has_it() {
        let cases: [&[&str]; 6] = [
            &["tripledger", "records", "list", "--json"],
            &["tripledger", "records", "delete", "rec_1", "--yes", "--json"],
            &["tripledger", "summary", "--json"],
            &["tripledger", "trip", "status", "--json"],
            &["tripledger", "periods", "--json"],
            &["tripledger", "import", "--legacy", "export.json", "--json"],
        ];

        for args in cases {
            let parsed = parse_from(args);
            assert!(parsed.is_ok());
            if let Ok(cli) = parsed {
                assert_eq!(mode_for_command(&cli.command), OutputMode::Json);
            }
        }
    }

    #[test]
    fn commands_default_to_text() {
        let cases: [&[&str]; 3] = [
            &["tripledger", "summary"],
            &["tripledger", "trip", "reset"],
            &["tripledger", "expense", "add", "--category", "Fuel", "--amount", "1"],
        ];

        for args in cases {
            let parsed = parse_from(args);
            assert!(parsed.is_ok());
            if let Ok(cli) = parsed {
                assert_eq!(mode_for_command(&cli.command), OutputMode::Text);
            }
        }
    }
}
