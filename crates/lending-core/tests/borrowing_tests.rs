use lending_core::borrowing::capacity::{
    self, BorrowingConfig, BorrowingInput, ServiceabilityPolicy,
};
use lending_core::borrowing::compare;
use lending_core::time_value;
use lending_core::LendingError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Borrowing capacity
// ===========================================================================

fn single_income_family() -> BorrowingInput {
    BorrowingInput {
        annual_income: dec!(163_156),
        other_income: Decimal::ZERO,
        monthly_expenses: dec!(4_130),
        other_loan_payments: Decimal::ZERO,
        credit_card_limits: Decimal::ZERO,
        dependents: 2,
        interest_rate: dec!(0.0611),
        loan_term_years: 30,
        policy: ServiceabilityPolicy::NetOfCommitments,
        config: BorrowingConfig::default(),
    }
}

#[test]
fn test_reference_household_without_debts() {
    let out = capacity::calculate_borrowing_capacity(&single_income_family()).unwrap();
    let r = &out.result;

    assert_eq!(r.monthly_income.round_dp(2), dec!(13596.33));
    assert_eq!(r.total_monthly_commitments, dec!(4130));
    assert_eq!(r.disposable_income.round_dp(2), dec!(9466.33));
    assert_eq!(r.maximum_monthly_repayment.round_dp(2), dec!(4758.72));

    // annuity(6.11% / 12, 360) * 0.95
    let periodic = dec!(0.0611) / dec!(12);
    let factor = time_value::annuity_factor(periodic, 360).unwrap();
    let expected = r.maximum_monthly_repayment * factor * dec!(0.95);
    assert_eq!(r.borrowing_capacity, expected);
    assert_eq!(r.borrowing_capacity.round_dp(0), dec!(745215));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_commitments_reported_for_gross_policy() {
    let mut input = single_income_family();
    input.policy = ServiceabilityPolicy::GrossRatio;
    input.other_loan_payments = dec!(171);
    input.credit_card_limits = dec!(6_000);
    let out = capacity::calculate_borrowing_capacity(&input).unwrap();
    let r = &out.result;

    // 4130 living + 171 loans + 180 card
    assert_eq!(r.total_monthly_commitments, dec!(4481));
    // Gross policy ignores the debts when sizing repayments
    assert_eq!(r.maximum_monthly_repayment, dec!(163_156) / dec!(12) * dec!(0.35));
    assert!(r.commitment_breakdown.is_none());
}

#[test]
fn test_custom_config_from_json() {
    let json = r#"{
        "annual_income": "120000",
        "monthly_expenses": "3000",
        "dependents": 1,
        "config": { "serviceability_ratio": "0.30", "haircut": "1" }
    }"#;
    let input: BorrowingInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.interest_rate, dec!(0.0611));
    assert_eq!(input.loan_term_years, 30);
    assert_eq!(input.policy, ServiceabilityPolicy::NetOfCommitments);
    assert_eq!(input.config.base_living_cost, dec!(2500));
    assert_eq!(input.config.card_utilisation, dec!(0.03));

    let out = capacity::calculate_borrowing_capacity(&input).unwrap();
    // 10,000 * 0.30 = 3,000
    assert_eq!(out.result.maximum_monthly_repayment, dec!(3000));
}

#[test]
fn test_zero_rate_capacity_is_payment_times_periods() {
    let mut input = single_income_family();
    input.interest_rate = Decimal::ZERO;
    let out = capacity::calculate_borrowing_capacity(&input).unwrap();
    let r = &out.result;
    assert_eq!(
        r.borrowing_capacity,
        r.maximum_monthly_repayment * dec!(360) * dec!(0.95)
    );
}

#[test]
fn test_negative_income_rejected_before_computation() {
    let mut input = single_income_family();
    input.annual_income = dec!(-1);
    match capacity::calculate_borrowing_capacity(&input).unwrap_err() {
        LendingError::InvalidInput { field, .. } => assert_eq!(field, "annual_income"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_rate_below_minus_one_rejected() {
    let mut input = single_income_family();
    input.interest_rate = dec!(-2);
    assert!(matches!(
        capacity::calculate_borrowing_capacity(&input),
        Err(LendingError::InvalidInput { .. })
    ));
}

// ===========================================================================
// Policy comparison
// ===========================================================================

#[test]
fn test_comparison_with_existing_debts() {
    let input = BorrowingInput {
        annual_income: dec!(193_156),
        other_income: dec!(27_288),
        monthly_expenses: dec!(8_088),
        other_loan_payments: dec!(171),
        credit_card_limits: dec!(6_000),
        dependents: 2,
        interest_rate: dec!(0.07),
        loan_term_years: 30,
        policy: ServiceabilityPolicy::NetOfCommitments,
        config: BorrowingConfig::default(),
    };
    let out = compare::compare_policies(&input).unwrap();
    let c = &out.result;

    assert_eq!(c.gross_ratio.total_monthly_commitments, dec!(8439));
    assert_eq!(c.net_of_commitments.total_monthly_commitments, dec!(8439));
    assert_eq!(
        c.gross_ratio.maximum_monthly_repayment - c.net_of_commitments.maximum_monthly_repayment,
        dec!(351)
    );
    assert_eq!(
        c.capacity_difference,
        c.gross_ratio.borrowing_capacity - c.net_of_commitments.borrowing_capacity
    );
    assert!(c.capacity_difference > Decimal::ZERO);
}
