mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::borrowing::BorrowingArgs;
use commands::rates::PeriodicRateArgs;
use commands::schedule::ScheduleArgs;

/// Home-loan borrowing capacity and amortization schedules
#[derive(Parser)]
#[command(
    name = "lend",
    version,
    about = "Home-loan borrowing capacity and amortization schedules",
    long_about = "Estimates how much a lender would extend given income, expenses and \
                  existing debts, and builds period-by-period amortization schedules \
                  with optional insurance charges. All arithmetic is decimal."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Round displayed amounts to this many decimal places
    #[arg(long, global = true)]
    dp: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate maximum borrowing capacity under a serviceability policy
    BorrowingCapacity(BorrowingArgs),
    /// Estimate capacity under both serviceability policies side by side
    CompareCapacity(BorrowingArgs),
    /// Build an amortization schedule
    Schedule(ScheduleArgs),
    /// Convert an effective annual rate to a periodic rate
    PeriodicRate(PeriodicRateArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::BorrowingCapacity(args) => commands::borrowing::run_borrowing_capacity(args),
        Commands::CompareCapacity(args) => commands::borrowing::run_compare_capacity(args),
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::PeriodicRate(args) => commands::rates::run_periodic_rate(args),
        Commands::Version => {
            println!("lend {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value, cli.dp);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
