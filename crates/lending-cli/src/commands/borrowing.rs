use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use lending_core::borrowing::capacity::{
    self, BorrowingConfig, BorrowingInput, ServiceabilityPolicy,
};
use lending_core::borrowing::compare;

use crate::input;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    /// Share of gross income, existing debts ignored
    GrossRatio,
    /// Share of gross income less existing loan and card commitments
    NetOfCommitments,
}

impl From<PolicyArg> for ServiceabilityPolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::GrossRatio => ServiceabilityPolicy::GrossRatio,
            PolicyArg::NetOfCommitments => ServiceabilityPolicy::NetOfCommitments,
        }
    }
}

/// Arguments for borrowing capacity estimation
#[derive(Args)]
pub struct BorrowingArgs {
    /// Path to JSON/YAML input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Path to JSON/YAML lender assumptions (living costs, ratios, haircut)
    #[arg(long)]
    pub config: Option<String>,

    /// Gross annual income before tax
    #[arg(long)]
    pub annual_income: Option<Decimal>,

    /// Other annual income (rental, investments)
    #[arg(long, default_value = "0")]
    pub other_income: Decimal,

    /// Declared monthly living expenses
    #[arg(long)]
    pub monthly_expenses: Option<Decimal>,

    /// Monthly repayments on other loans
    #[arg(long, default_value = "0")]
    pub other_loan_payments: Decimal,

    /// Total credit card limits
    #[arg(long, default_value = "0")]
    pub credit_card_limits: Decimal,

    /// Number of dependents
    #[arg(long, default_value_t = 0)]
    pub dependents: u32,

    /// Nominal annual assessment rate as a decimal (0.0611 = 6.11%)
    #[arg(long, conflicts_with = "rate_percent")]
    pub rate: Option<Decimal>,

    /// Nominal annual assessment rate in percent (6.11)
    #[arg(long)]
    pub rate_percent: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value_t = 30)]
    pub term_years: u32,

    /// Serviceability policy
    #[arg(long, value_enum, default_value = "net-of-commitments")]
    pub policy: PolicyArg,
}

pub fn run_borrowing_capacity(args: BorrowingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let borrowing_input = resolve_input(&args)?;
    let result = capacity::calculate_borrowing_capacity(&borrowing_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_compare_capacity(args: BorrowingArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let borrowing_input = resolve_input(&args)?;
    let result = compare::compare_policies(&borrowing_input)?;
    Ok(serde_json::to_value(result)?)
}

fn resolve_input(args: &BorrowingArgs) -> Result<BorrowingInput, Box<dyn std::error::Error>> {
    let mut borrowing_input: BorrowingInput = if let Some(ref path) = args.input {
        input::file::read_input(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let interest_rate = match (args.rate, args.rate_percent) {
            (Some(r), _) => r,
            (None, Some(pct)) => pct / Decimal::ONE_HUNDRED,
            (None, None) => dec!(0.0611),
        };

        BorrowingInput {
            annual_income: args
                .annual_income
                .ok_or("--annual-income is required (or provide --input)")?,
            other_income: args.other_income,
            monthly_expenses: args
                .monthly_expenses
                .ok_or("--monthly-expenses is required (or provide --input)")?,
            other_loan_payments: args.other_loan_payments,
            credit_card_limits: args.credit_card_limits,
            dependents: args.dependents,
            interest_rate,
            loan_term_years: args.term_years,
            policy: args.policy.into(),
            config: BorrowingConfig::default(),
        }
    };

    if let Some(ref path) = args.config {
        borrowing_input.config = input::file::read_input(path)?;
    }

    Ok(borrowing_input)
}
