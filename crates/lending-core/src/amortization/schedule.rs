use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::charges::{assess_charges, ChargeAmount, PeriodicCharge};
use crate::time_value;
use crate::types::*;
use crate::{LendingError, LendingResult};

/// Safety cap on open-ended schedules (100 years of monthly payments).
pub const DEFAULT_MAX_PERIODS: u32 = 1200;

/// Balances within this distance of zero count as fully repaid.
const REPAID_TOLERANCE: Decimal = dec!(0.01);

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// How the schedule decides when to stop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchedulePolicy {
    /// Run exactly `term_periods` periods. The balance is never clamped, so an
    /// insufficient payment leaves a residual and an excessive one overshoots
    /// below zero.
    FixedTerm,
    /// Run until the balance reaches zero, failing once `max_periods` rows
    /// have been produced without getting there.
    UntilRepaid {
        #[serde(default = "default_max_periods")]
        max_periods: u32,
    },
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        SchedulePolicy::UntilRepaid {
            max_periods: DEFAULT_MAX_PERIODS,
        }
    }
}

/// Spacing between row dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateStep {
    FixedDays(u32),
    /// Calendar months; day-of-month is clamped at month end.
    Months(u32),
}

impl Default for DateStep {
    fn default() -> Self {
        DateStep::FixedDays(30)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleInput {
    /// Balance outstanding at the start of the first scheduled period.
    pub principal: Money,
    /// Effective annual rate; converted to a periodic rate by compounding.
    pub annual_rate: Rate,
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: u32,
    /// Gross payment per period, charges included.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_periods: Option<u32>,
    #[serde(default)]
    pub policy: SchedulePolicy,
    #[serde(default)]
    pub charges: Vec<PeriodicCharge>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub date_step: DateStep,
    /// Number printed on the first row (a schedule can resume mid-loan).
    #[serde(default = "default_first_period")]
    pub first_period: u32,
}

/// A single period in the amortization schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub period: u32,
    pub date: Option<NaiveDate>,
    pub opening_balance: Money,
    pub interest: Money,
    pub principal_portion: Money,
    pub charges: Money,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub charge_breakdown: Vec<ChargeAmount>,
    pub payment: Money,
    pub remaining_balance: Money,
}

/// Totals over the unrounded rows
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleSummary {
    pub periods: u32,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_charges: Money,
    pub total_paid: Money,
    /// Remaining balance reported on the last row.
    pub final_balance: Money,
    /// Amount by which the last payment overshot a zero balance (open-ended
    /// schedules only; fixed-term schedules report the negative balance).
    pub overpayment: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutput {
    pub periodic_rate: Rate,
    pub payment: Money,
    pub rows: Vec<AmortizationRow>,
    pub summary: ScheduleSummary,
}

fn default_max_periods() -> u32 {
    DEFAULT_MAX_PERIODS
}

fn default_periods_per_year() -> u32 {
    12
}

fn default_first_period() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build a period-by-period amortization schedule for a fixed-rate loan.
pub fn build_schedule(input: &ScheduleInput) -> LendingResult<ComputationOutput<ScheduleOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let periodic_rate = time_value::effective_to_periodic(input.annual_rate, input.periods_per_year)?;
    log::debug!(
        "periodic rate {periodic_rate} from effective annual {}",
        input.annual_rate
    );

    let (rows, payment, overpayment) = match &input.policy {
        SchedulePolicy::FixedTerm => {
            // validate_input guarantees a term for this policy
            let term = input.term_periods.unwrap_or_default();
            let payment = match input.payment {
                Some(p) => p,
                None => {
                    let p = time_value::level_payment(input.principal, periodic_rate, term)?;
                    warnings.push(format!(
                        "No payment given; using level payment {} over {term} periods",
                        p.round_dp(2)
                    ));
                    p
                }
            };
            let rows = run_fixed_term(input, periodic_rate, payment, term)?;
            if let Some(last) = rows.last() {
                if last.remaining_balance.abs() > REPAID_TOLERANCE {
                    warnings.push(format!(
                        "Balance of {} remains after {term} periods; payment does not amortise the loan exactly",
                        last.remaining_balance.round_dp(2)
                    ));
                }
            }
            (rows, payment, Decimal::ZERO)
        }
        SchedulePolicy::UntilRepaid { max_periods } => {
            if input.term_periods.is_some() {
                warnings.push("term_periods is ignored for open-ended schedules".into());
            }
            let payment = input.payment.unwrap_or_default();
            let (rows, overpayment) =
                run_until_repaid(input, periodic_rate, payment, *max_periods)?;
            (rows, payment, overpayment)
        }
    };

    let summary = summarise(&rows, overpayment)?;
    log::debug!(
        "schedule complete: {} periods, final balance {}",
        summary.periods,
        summary.final_balance
    );

    let output = ScheduleOutput {
        periodic_rate,
        payment,
        rows,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let methodology = match input.policy {
        SchedulePolicy::FixedTerm => "Amortization Schedule (fixed term)",
        SchedulePolicy::UntilRepaid { .. } => "Amortization Schedule (until repaid)",
    };
    Ok(with_metadata(
        methodology,
        &serde_json::json!({
            "principal": input.principal.to_string(),
            "annual_rate": input.annual_rate.to_string(),
            "periods_per_year": input.periods_per_year,
            "charges": input.charges.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Fold rows into totals. Values are summed unrounded.
pub fn summarise(rows: &[AmortizationRow], overpayment: Money) -> LendingResult<ScheduleSummary> {
    let mut summary = rows
        .iter()
        .try_fold(ScheduleSummary::default(), |mut acc, row| {
            acc.periods += 1;
            acc.total_interest = acc.total_interest.checked_add(row.interest)?;
            acc.total_principal = acc.total_principal.checked_add(row.principal_portion)?;
            acc.total_charges = acc.total_charges.checked_add(row.charges)?;
            acc.total_paid = acc.total_paid.checked_add(row.payment)?;
            acc.final_balance = row.remaining_balance;
            Some(acc)
        })
        .ok_or_else(|| out_of_range(rows.len() as u32))?;
    summary.overpayment = overpayment;
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn run_fixed_term(
    input: &ScheduleInput,
    periodic_rate: Rate,
    payment: Money,
    term: u32,
) -> LendingResult<Vec<AmortizationRow>> {
    let mut rows = Vec::with_capacity(term as usize);
    let mut balance = input.principal;

    for index in 0..term {
        let row = step(input, index, balance, periodic_rate, payment)?;
        balance = row.remaining_balance;
        rows.push(row);
    }

    Ok(rows)
}

/// Returns the rows and the overshoot past zero on the final payment.
fn run_until_repaid(
    input: &ScheduleInput,
    periodic_rate: Rate,
    payment: Money,
    max_periods: u32,
) -> LendingResult<(Vec<AmortizationRow>, Money)> {
    let mut rows = Vec::new();
    let mut balance = input.principal;

    for index in 0..max_periods {
        let mut row = step(input, index, balance, periodic_rate, payment)?;

        if row.principal_portion <= Decimal::ZERO {
            return Err(LendingError::NonConvergent {
                function: "build_schedule".into(),
                iterations: index,
                reason: format!(
                    "payment {} does not cover interest {} plus charges {}",
                    payment.round_dp(2),
                    row.interest.round_dp(2),
                    row.charges.round_dp(2)
                ),
            });
        }

        balance = row.remaining_balance;
        let repaid = balance <= Decimal::ZERO;
        row.remaining_balance = balance.max(Decimal::ZERO);
        rows.push(row);

        if repaid {
            return Ok((rows, -balance));
        }
    }

    Err(LendingError::NonConvergent {
        function: "build_schedule".into(),
        iterations: max_periods,
        reason: format!(
            "balance {} still outstanding at the period cap",
            balance.round_dp(2)
        ),
    })
}

/// One period: interest and charges on the opening balance, the rest of the
/// payment reduces principal. The returned row carries the raw balance.
fn step(
    input: &ScheduleInput,
    index: u32,
    balance: Money,
    periodic_rate: Rate,
    payment: Money,
) -> LendingResult<AmortizationRow> {
    let interest = balance
        .checked_mul(periodic_rate)
        .ok_or_else(|| out_of_range(index))?;
    let (charges, charge_breakdown) =
        assess_charges(&input.charges, balance).ok_or_else(|| out_of_range(index))?;
    let principal_portion = payment
        .checked_sub(charges)
        .and_then(|p| p.checked_sub(interest))
        .ok_or_else(|| out_of_range(index))?;
    let remaining_balance = balance
        .checked_sub(principal_portion)
        .ok_or_else(|| out_of_range(index))?;

    let date = match input.start_date {
        Some(d) => Some(period_date(d, input.date_step, index)?),
        None => None,
    };

    Ok(AmortizationRow {
        period: input.first_period + index,
        date,
        opening_balance: balance,
        interest,
        principal_portion,
        charges,
        charge_breakdown,
        payment,
        remaining_balance,
    })
}

/// A balance that keeps compounding eventually leaves the decimal range.
fn out_of_range(index: u32) -> LendingError {
    LendingError::NonConvergent {
        function: "build_schedule".into(),
        iterations: index,
        reason: "balance grew beyond the representable range; the payment does not cover interest".into(),
    }
}

/// Date of the row `index` periods after `start`, always measured from the
/// start so month-end clamping does not accumulate.
fn period_date(start: NaiveDate, step: DateStep, index: u32) -> LendingResult<NaiveDate> {
    let shifted = match step {
        DateStep::FixedDays(days) => start.checked_add_days(Days::new(u64::from(days) * u64::from(index))),
        DateStep::Months(months) => months
            .checked_mul(index)
            .and_then(|m| start.checked_add_months(Months::new(m))),
    };
    shifted.ok_or_else(|| {
        LendingError::DateError(format!("period {index} from {start} is out of range"))
    })
}

fn validate_input(input: &ScheduleInput) -> LendingResult<()> {
    if input.principal <= Decimal::ZERO {
        return Err(LendingError::InvalidInput {
            field: "principal".into(),
            reason: "Principal must be positive".into(),
        });
    }
    if input.annual_rate < dec!(-1) {
        return Err(LendingError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Effective annual rate must be at least -100%".into(),
        });
    }
    if input.periods_per_year == 0 {
        return Err(LendingError::InvalidInput {
            field: "periods_per_year".into(),
            reason: "Must be at least 1".into(),
        });
    }
    if let Some(p) = input.payment {
        if p < Decimal::ZERO {
            return Err(LendingError::InvalidInput {
                field: "payment".into(),
                reason: "Payment cannot be negative".into(),
            });
        }
    }
    for charge in &input.charges {
        charge.validate()?;
    }

    match &input.policy {
        SchedulePolicy::FixedTerm => {
            match input.term_periods {
                None | Some(0) => {
                    return Err(LendingError::InvalidInput {
                        field: "term_periods".into(),
                        reason: "Fixed-term schedules need a term of at least 1 period".into(),
                    });
                }
                Some(_) => {}
            }
            if input.payment.is_none() && !input.charges.is_empty() {
                return Err(LendingError::InvalidInput {
                    field: "payment".into(),
                    reason: "A payment is required when charges are configured".into(),
                });
            }
        }
        SchedulePolicy::UntilRepaid { max_periods } => {
            if input.payment.is_none() {
                return Err(LendingError::InvalidInput {
                    field: "payment".into(),
                    reason: "Open-ended schedules need a fixed payment".into(),
                });
            }
            if *max_periods == 0 {
                return Err(LendingError::InvalidInput {
                    field: "max_periods".into(),
                    reason: "Period cap must be at least 1".into(),
                });
            }
        }
    }

    Ok(())
}
