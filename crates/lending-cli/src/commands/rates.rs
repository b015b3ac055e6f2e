use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use lending_core::time_value;

/// Arguments for rate conversion
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PeriodicRateArgs {
    /// Effective annual rate as a decimal (0.1014 = 10.14% EA)
    #[arg(long)]
    pub rate: Decimal,

    #[arg(long, default_value_t = 12)]
    pub periods_per_year: u32,
}

pub fn run_periodic_rate(args: PeriodicRateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = time_value::convert_rate(args.rate, args.periods_per_year)?;
    Ok(serde_json::to_value(result)?)
}
