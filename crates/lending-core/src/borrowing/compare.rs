use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::capacity::{calculate_borrowing_capacity, BorrowingInput, BorrowingOutput, ServiceabilityPolicy};
use crate::types::*;
use crate::LendingResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyComparison {
    pub gross_ratio: BorrowingOutput,
    pub net_of_commitments: BorrowingOutput,
    /// Gross-ratio capacity minus net-of-commitments capacity. Never negative.
    pub capacity_difference: Money,
}

/// Assess the same applicant under both serviceability policies.
/// `input.policy` is ignored.
pub fn compare_policies(input: &BorrowingInput) -> LendingResult<ComputationOutput<PolicyComparison>> {
    let start = Instant::now();

    let mut gross_input = input.clone();
    gross_input.policy = ServiceabilityPolicy::GrossRatio;
    let mut net_input = input.clone();
    net_input.policy = ServiceabilityPolicy::NetOfCommitments;

    let gross = calculate_borrowing_capacity(&gross_input)?;
    let net = calculate_borrowing_capacity(&net_input)?;

    let mut warnings = gross.warnings;
    for w in net.warnings {
        if !warnings.contains(&w) {
            warnings.push(w);
        }
    }

    let capacity_difference = gross.result.borrowing_capacity - net.result.borrowing_capacity;
    let output = PolicyComparison {
        gross_ratio: gross.result,
        net_of_commitments: net.result,
        capacity_difference,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Borrowing Capacity Policy Comparison",
        &net.assumptions,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::borrowing::capacity::BorrowingConfig;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn with_debts() -> BorrowingInput {
        BorrowingInput {
            annual_income: dec!(193156),
            other_income: dec!(27288),
            monthly_expenses: dec!(8088),
            other_loan_payments: dec!(171),
            credit_card_limits: dec!(6000),
            dependents: 2,
            interest_rate: dec!(0.07),
            loan_term_years: 30,
            policy: ServiceabilityPolicy::GrossRatio,
            config: BorrowingConfig::default(),
        }
    }

    #[test]
    fn test_net_is_more_conservative() {
        let out = compare_policies(&with_debts()).unwrap();
        let c = &out.result;
        assert!(c.capacity_difference > Decimal::ZERO);
        assert!((c.gross_ratio.borrowing_capacity - dec!(918099.04)).abs() < dec!(0.05));
        assert!((c.net_of_commitments.borrowing_capacity - dec!(867978.98)).abs() < dec!(0.05));
    }

    #[test]
    fn test_no_debts_policies_agree() {
        let mut input = with_debts();
        input.other_loan_payments = Decimal::ZERO;
        input.credit_card_limits = Decimal::ZERO;
        let out = compare_policies(&input).unwrap();
        assert_eq!(out.result.capacity_difference, Decimal::ZERO);
    }
}
