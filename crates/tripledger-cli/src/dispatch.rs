use tripledger_client::commands;
use tripledger_client::{ClientResult, SuccessEnvelope};

use crate::cli::{
    Cli, Commands, ExpenseCommand, IsoDate, RecordsCommand, RevenueCommand, TripCommand,
};
use crate::stdout_io::confirm_on_stdin;

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Revenue { command } => match command {
            RevenueCommand::Add {
                client_name,
                destination,
                amount,
                date,
                km,
                ..
            } => commands::revenue::add(
                client_name,
                destination,
                *amount,
                date_str(date.as_ref()),
                *km,
            ),
        },
        Commands::Expense { command } => match command {
            ExpenseCommand::Add {
                category,
                amount,
                description,
                date,
                ..
            } => commands::expense::add(
                category,
                description.as_deref(),
                *amount,
                date_str(date.as_ref()),
            ),
        },
        Commands::Records { command } => match command {
            RecordsCommand::List { month, year, .. } => commands::records::list(*month, *year),
            RecordsCommand::Delete { id, yes, .. } => {
                let assume_yes = *yes;
                commands::records::delete(id, |message| assume_yes || confirm_on_stdin(message))
            }
        },
        Commands::Summary { month, year, .. } => commands::summary::run(*month, *year),
        Commands::Trip { command } => match command {
            TripCommand::Start { at, .. } => commands::trip::start(*at),
            TripCommand::End { at, round_trip, .. } => commands::trip::end(*at, *round_trip),
            TripCommand::Status { .. } => commands::trip::status(),
            TripCommand::Reset => commands::trip::reset(),
        },
        Commands::Periods { .. } => commands::periods::run(),
        Commands::Import { legacy, .. } => commands::import::run(legacy),
    }
}

fn date_str(date: Option<&IsoDate>) -> Option<&str> {
    date.map(IsoDate::as_str)
}

#[cfg(test)]
mod tests {
    use super::date_str;
    use crate::cli::IsoDate;

    #[test]
    fn date_str_borrows_the_parsed_value() {
        let date = Some(IsoDate("2024-03-10".to_string()));
        assert_eq!(date_str(date.as_ref()), Some("2024-03-10"));
        assert_eq!(date_str(None), None);
    }
}
