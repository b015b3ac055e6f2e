use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::time_value;
use crate::types::*;
use crate::{LendingError, LendingResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// How repayment capacity is derived from income.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceabilityPolicy {
    /// Ratio of gross income, ignoring existing debts. Kept for comparison.
    GrossRatio,
    /// Ratio of gross income less existing loan and card commitments.
    #[default]
    NetOfCommitments,
}

/// Lender assumptions applied to every assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorrowingConfig {
    /// Monthly living-cost floor for a single applicant.
    pub base_living_cost: Money,
    /// Added to the floor per dependent.
    pub dependent_cost: Money,
    /// Share of gross monthly income available for debt service.
    pub serviceability_ratio: Rate,
    /// Monthly commitment assumed per unit of credit card limit.
    pub card_utilisation: Rate,
    /// Multiplier applied to the annuity principal.
    pub haircut: Rate,
    pub periods_per_year: u32,
}

impl Default for BorrowingConfig {
    fn default() -> Self {
        BorrowingConfig {
            base_living_cost: dec!(2500),
            dependent_cost: dec!(500),
            serviceability_ratio: dec!(0.35),
            card_utilisation: dec!(0.03),
            haircut: dec!(0.95),
            periods_per_year: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowingInput {
    /// Gross annual income before tax.
    pub annual_income: Money,
    /// Rental, investment and other annual income.
    #[serde(default)]
    pub other_income: Money,
    /// Declared monthly living expenses.
    pub monthly_expenses: Money,
    #[serde(default)]
    pub other_loan_payments: Money,
    #[serde(default)]
    pub credit_card_limits: Money,
    #[serde(default)]
    pub dependents: u32,
    /// Nominal annual assessment rate (0.0611 = 6.11%).
    #[serde(default = "default_interest_rate")]
    pub interest_rate: Rate,
    #[serde(default = "default_loan_term_years")]
    pub loan_term_years: u32,
    #[serde(default)]
    pub policy: ServiceabilityPolicy,
    #[serde(default)]
    pub config: BorrowingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitmentBreakdown {
    pub credit_card_commitments: Money,
    pub other_loan_payments: Money,
    pub total_debt_payments: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorrowingOutput {
    /// Annuity principal after the haircut.
    pub borrowing_capacity: Money,
    pub monthly_income: Money,
    pub living_expense_floor: Money,
    pub effective_living_expenses: Money,
    pub total_monthly_commitments: Money,
    pub disposable_income: Money,
    /// Repayment fed into the annuity formula (before the haircut).
    pub maximum_monthly_repayment: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commitment_breakdown: Option<CommitmentBreakdown>,
}

fn default_interest_rate() -> Rate {
    dec!(0.0611)
}

fn default_loan_term_years() -> u32 {
    30
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Estimate the largest home loan a lender would extend given income,
/// declared expenses and existing commitments.
pub fn calculate_borrowing_capacity(
    input: &BorrowingInput,
) -> LendingResult<ComputationOutput<BorrowingOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_input(input)?;

    let cfg = &input.config;
    let per_year = Decimal::from(cfg.periods_per_year);

    let monthly_income = (input.annual_income + input.other_income) / per_year;

    // -- Living expenses: declared or benchmark floor, whichever is higher ---
    let living_expense_floor =
        cfg.base_living_cost + cfg.dependent_cost * Decimal::from(input.dependents);
    let effective_living_expenses = input.monthly_expenses.max(living_expense_floor);

    // -- Commitments ----------------------------------------------------------
    let card_commitments = input.credit_card_limits * cfg.card_utilisation;
    let debt_payments = input.other_loan_payments + card_commitments;
    let total_monthly_commitments = effective_living_expenses + debt_payments;
    let disposable_income = monthly_income - total_monthly_commitments;

    if disposable_income < Decimal::ZERO {
        warnings.push(format!(
            "Commitments exceed gross monthly income by {}",
            (-disposable_income).round_dp(2)
        ));
    }

    // -- Repayment capacity ---------------------------------------------------
    let gross_capacity = monthly_income * cfg.serviceability_ratio;
    let maximum_monthly_repayment = match input.policy {
        ServiceabilityPolicy::GrossRatio => gross_capacity,
        ServiceabilityPolicy::NetOfCommitments => {
            let net = gross_capacity - debt_payments;
            if net <= Decimal::ZERO {
                warnings.push("Existing commitments absorb all repayment capacity".into());
            }
            net.max(Decimal::ZERO)
        }
    };

    // -- Annuity principal (nominal rate / 12, not compounded) ----------------
    let periodic_rate = time_value::nominal_to_periodic(input.interest_rate, cfg.periods_per_year)?;
    let num_payments = input
        .loan_term_years
        .checked_mul(cfg.periods_per_year)
        .ok_or_else(|| LendingError::InvalidInput {
            field: "loan_term_years".into(),
            reason: "Term in payment periods is too large".into(),
        })?;
    let principal = time_value::pv_annuity(maximum_monthly_repayment, periodic_rate, num_payments)?;
    let borrowing_capacity = principal * cfg.haircut;

    log::debug!(
        "{:?}: repayment {maximum_monthly_repayment} at {periodic_rate} over {num_payments} -> {borrowing_capacity}",
        input.policy
    );

    let commitment_breakdown = match input.policy {
        ServiceabilityPolicy::GrossRatio => None,
        ServiceabilityPolicy::NetOfCommitments => Some(CommitmentBreakdown {
            credit_card_commitments: card_commitments,
            other_loan_payments: input.other_loan_payments,
            total_debt_payments: debt_payments,
        }),
    };

    let output = BorrowingOutput {
        borrowing_capacity,
        monthly_income,
        living_expense_floor,
        effective_living_expenses,
        total_monthly_commitments,
        disposable_income,
        maximum_monthly_repayment,
        commitment_breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let methodology = match input.policy {
        ServiceabilityPolicy::GrossRatio => "Borrowing Capacity (gross income ratio)",
        ServiceabilityPolicy::NetOfCommitments => "Borrowing Capacity (net of commitments)",
    };
    Ok(with_metadata(
        methodology,
        &serde_json::json!({
            "interest_rate": input.interest_rate.to_string(),
            "loan_term_years": input.loan_term_years,
            "serviceability_ratio": cfg.serviceability_ratio.to_string(),
            "card_utilisation": cfg.card_utilisation.to_string(),
            "haircut": cfg.haircut.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn validate_input(input: &BorrowingInput) -> LendingResult<()> {
    let money_fields = [
        ("annual_income", input.annual_income),
        ("other_income", input.other_income),
        ("monthly_expenses", input.monthly_expenses),
        ("other_loan_payments", input.other_loan_payments),
        ("credit_card_limits", input.credit_card_limits),
        ("config.base_living_cost", input.config.base_living_cost),
        ("config.dependent_cost", input.config.dependent_cost),
    ];
    for (field, value) in money_fields {
        if value < Decimal::ZERO {
            return Err(LendingError::InvalidInput {
                field: field.into(),
                reason: "Must be non-negative".into(),
            });
        }
    }

    if input.interest_rate < dec!(-1) {
        return Err(LendingError::InvalidInput {
            field: "interest_rate".into(),
            reason: "Interest rate must be at least -100%".into(),
        });
    }
    if input.loan_term_years == 0 {
        return Err(LendingError::InvalidInput {
            field: "loan_term_years".into(),
            reason: "Loan term must be at least 1 year".into(),
        });
    }
    if input.config.periods_per_year == 0 {
        return Err(LendingError::InvalidInput {
            field: "config.periods_per_year".into(),
            reason: "Must be at least 1".into(),
        });
    }

    let ratios = [
        ("config.serviceability_ratio", input.config.serviceability_ratio),
        ("config.card_utilisation", input.config.card_utilisation),
        ("config.haircut", input.config.haircut),
    ];
    for (field, value) in ratios {
        if value < Decimal::ZERO || value > Decimal::ONE {
            return Err(LendingError::InvalidInput {
                field: field.into(),
                reason: "Must be between 0 and 1".into(),
            });
        }
    }

    Ok(())
}
