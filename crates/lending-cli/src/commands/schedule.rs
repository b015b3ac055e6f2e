use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use lending_core::amortization::charges::PeriodicCharge;
use lending_core::amortization::schedule::{
    self, DateStep, ScheduleInput, SchedulePolicy, DEFAULT_MAX_PERIODS,
};

use crate::input;
use crate::output::csv_out;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum TerminationArg {
    /// Exactly --term periods, balance never clamped
    FixedTerm,
    /// Until the balance is repaid, capped at --max-periods
    UntilRepaid,
}

/// Arguments for amortization schedules
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Opening balance
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Effective annual rate as a decimal (0.1014 = 10.14% EA)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Gross payment per period, charges included
    #[arg(long)]
    pub payment: Option<Decimal>,

    /// Number of periods (fixed-term schedules)
    #[arg(long)]
    pub term: Option<u32>,

    /// Termination policy; defaults to fixed-term when --term is given
    #[arg(long, value_enum)]
    pub policy: Option<TerminationArg>,

    /// Period cap for open-ended schedules
    #[arg(long, default_value_t = DEFAULT_MAX_PERIODS)]
    pub max_periods: u32,

    #[arg(long, default_value_t = 12)]
    pub periods_per_year: u32,

    /// Flat charge per period, NAME=AMOUNT (repeatable)
    #[arg(long = "flat-charge", value_parser = parse_flat_charge)]
    pub flat_charges: Vec<PeriodicCharge>,

    /// Charge as a fraction of the opening balance, NAME=RATE (repeatable)
    #[arg(long = "balance-charge", value_parser = parse_balance_charge)]
    pub balance_charges: Vec<PeriodicCharge>,

    /// Date of the first row (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Days between row dates
    #[arg(long, conflicts_with = "step_months")]
    pub step_days: Option<u32>,

    /// Calendar months between row dates
    #[arg(long)]
    pub step_months: Option<u32>,

    /// Number shown on the first row
    #[arg(long, default_value_t = 1)]
    pub first_period: u32,

    /// Also write the rows to this CSV file
    #[arg(long)]
    pub export: Option<String>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let policy = match args.policy {
            Some(TerminationArg::FixedTerm) => SchedulePolicy::FixedTerm,
            Some(TerminationArg::UntilRepaid) => SchedulePolicy::UntilRepaid {
                max_periods: args.max_periods,
            },
            None if args.term.is_some() => SchedulePolicy::FixedTerm,
            None => SchedulePolicy::UntilRepaid {
                max_periods: args.max_periods,
            },
        };

        let date_step = match (args.step_days, args.step_months) {
            (_, Some(m)) => DateStep::Months(m),
            (Some(d), None) => DateStep::FixedDays(d),
            (None, None) => DateStep::default(),
        };

        let mut charges = args.balance_charges;
        charges.extend(args.flat_charges);

        ScheduleInput {
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate: args.rate.ok_or("--rate is required (or provide --input)")?,
            periods_per_year: args.periods_per_year,
            payment: args.payment,
            term_periods: args.term,
            policy,
            charges,
            start_date: args.start_date,
            date_step,
            first_period: args.first_period,
        }
    };

    let result = schedule::build_schedule(&schedule_input)?;
    let value = serde_json::to_value(&result)?;

    if let Some(ref path) = args.export {
        let rows = serde_json::to_value(&result.result.rows)?;
        csv_out::export_rows(path, rows.as_array().map(Vec::as_slice).unwrap_or_default())?;
    }

    Ok(value)
}

fn split_pair(s: &str) -> Result<(String, Decimal), String> {
    let (name, amount) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("charge name missing in '{s}'"));
    }
    let value = Decimal::from_str(amount.trim()).map_err(|e| format!("'{amount}': {e}"))?;
    Ok((name.to_string(), value))
}

fn parse_flat_charge(s: &str) -> Result<PeriodicCharge, String> {
    let (name, amount) = split_pair(s)?;
    Ok(PeriodicCharge::Flat { name, amount })
}

fn parse_balance_charge(s: &str) -> Result<PeriodicCharge, String> {
    let (name, rate) = split_pair(s)?;
    Ok(PeriodicCharge::BalanceRate { name, rate })
}
