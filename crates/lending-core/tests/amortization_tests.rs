use chrono::NaiveDate;
use lending_core::amortization::charges::PeriodicCharge;
use lending_core::amortization::schedule::{self, DateStep, ScheduleInput, SchedulePolicy};
use lending_core::time_value;
use lending_core::LendingError;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Open-ended schedule with insurance charges
// ===========================================================================

fn mortgage_with_insurance() -> ScheduleInput {
    ScheduleInput {
        principal: dec!(105_496_315),
        annual_rate: dec!(0.1014),
        periods_per_year: 12,
        payment: Some(dec!(2_700_000)),
        term_periods: None,
        policy: SchedulePolicy::UntilRepaid { max_periods: 1200 },
        charges: vec![
            PeriodicCharge::BalanceRate {
                name: "life insurance".into(),
                rate: dec!(0.000224),
            },
            PeriodicCharge::Flat {
                name: "earthquake insurance".into(),
                amount: dec!(22_792),
            },
        ],
        start_date: NaiveDate::from_ymd_opt(2024, 11, 22),
        date_step: DateStep::FixedDays(30),
        first_period: 8,
    }
}

#[test]
fn test_insured_mortgage_terminates() {
    let out = schedule::build_schedule(&mortgage_with_insurance()).unwrap();
    let s = &out.result;

    assert_eq!(s.rows.len(), 48);
    assert_eq!(s.summary.periods, 48);
    assert_eq!(s.rows.last().unwrap().remaining_balance, Decimal::ZERO);
    assert_eq!(s.rows.last().unwrap().period, 55);
    assert!(s.rows[..47].iter().all(|r| r.remaining_balance > Decimal::ZERO));
}

#[test]
fn test_insured_mortgage_balance_non_increasing() {
    let out = schedule::build_schedule(&mortgage_with_insurance()).unwrap();
    let rows = &out.result.rows;
    for pair in rows.windows(2) {
        assert!(pair[1].remaining_balance <= pair[0].remaining_balance);
        assert!(pair[1].principal_portion > Decimal::ZERO);
    }
}

#[test]
fn test_insured_mortgage_principal_round_trip() {
    let input = mortgage_with_insurance();
    let out = schedule::build_schedule(&input).unwrap();
    let summary = &out.result.summary;

    // Principal repaid = initial - final balance + overshoot on the last payment
    let repaid = input.principal - summary.final_balance + summary.overpayment;
    let rel = ((summary.total_principal - repaid) / input.principal).abs();
    assert!(rel < dec!(0.000001), "relative error {rel}");
    assert!((summary.overpayment - dec!(192010.33)).abs() < dec!(1));
}

#[test]
fn test_insured_mortgage_first_row() {
    let out = schedule::build_schedule(&mortgage_with_insurance()).unwrap();
    let first = &out.result.rows[0];

    // interest ≈ 105,496,315 * 0.0080810 ≈ 852,514
    assert!((first.interest - dec!(852_514)).abs() < dec!(5));
    // life 105,496,315 * 0.000224 = 23,631.17 plus 22,792 flat
    assert_eq!(first.charges, dec!(105_496_315) * dec!(0.000224) + dec!(22_792));
    assert_eq!(first.charge_breakdown.len(), 2);
    assert_eq!(first.charge_breakdown[1].name, "earthquake insurance");
    assert_eq!(first.payment, dec!(2_700_000));
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 11, 22));
}

#[test]
fn test_totals_are_unrounded_sums() {
    let out = schedule::build_schedule(&mortgage_with_insurance()).unwrap();
    let s = &out.result;
    let interest: Decimal = s.rows.iter().map(|r| r.interest).sum();
    let charges: Decimal = s.rows.iter().map(|r| r.charges).sum();
    assert_eq!(s.summary.total_interest, interest);
    assert_eq!(s.summary.total_charges, charges);
    assert_eq!(s.summary.total_paid, dec!(2_700_000) * dec!(48));
}

#[test]
fn test_payment_below_charges_and_interest() {
    let mut input = mortgage_with_insurance();
    input.payment = Some(dec!(850_000));
    let err = schedule::build_schedule(&input).unwrap_err();
    match err {
        LendingError::NonConvergent { function, .. } => assert_eq!(function, "build_schedule"),
        other => panic!("Expected NonConvergent, got {other:?}"),
    }
}

#[test]
fn test_open_ended_requires_payment() {
    let mut input = mortgage_with_insurance();
    input.payment = None;
    match schedule::build_schedule(&input).unwrap_err() {
        LendingError::InvalidInput { field, .. } => assert_eq!(field, "payment"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

#[test]
fn test_rate_below_minus_one_rejected() {
    let mut input = mortgage_with_insurance();
    input.annual_rate = dec!(-1.5);
    match schedule::build_schedule(&input).unwrap_err() {
        LendingError::InvalidInput { field, .. } => assert_eq!(field, "annual_rate"),
        other => panic!("Expected InvalidInput, got {other:?}"),
    }
}

// ===========================================================================
// Fixed-term schedule
// ===========================================================================

fn ten_year_plan() -> ScheduleInput {
    ScheduleInput {
        principal: dec!(104_800_000),
        annual_rate: dec!(0.104),
        periods_per_year: 12,
        payment: Some(dec!(1_775_000)),
        term_periods: Some(120),
        policy: SchedulePolicy::FixedTerm,
        charges: vec![],
        start_date: None,
        date_step: DateStep::default(),
        first_period: 1,
    }
}

#[test]
fn test_fixed_term_runs_full_term_without_clamping() {
    let out = schedule::build_schedule(&ten_year_plan()).unwrap();
    let s = &out.result;

    assert_eq!(s.rows.len(), 120);
    assert!(s.rows.iter().all(|r| r.date.is_none()));
    // The payment is far above the level payment, so the balance overshoots
    assert!(s.summary.final_balance < Decimal::ZERO);
    assert!(out.warnings.iter().any(|w| w.contains("remains after 120 periods")));
}

#[test]
fn test_fixed_term_round_trip() {
    let input = ten_year_plan();
    let out = schedule::build_schedule(&input).unwrap();
    let s = &out.result.summary;
    let rel = ((s.total_principal - (input.principal - s.final_balance)) / input.principal).abs();
    assert!(rel < dec!(0.000001));
}

#[test]
fn test_fixed_term_level_payment_amortises() {
    let mut input = ten_year_plan();
    let r = time_value::effective_to_periodic(input.annual_rate, 12).unwrap();
    input.payment = Some(time_value::level_payment(input.principal, r, 120).unwrap());
    let out = schedule::build_schedule(&input).unwrap();
    assert!(out.result.summary.final_balance.abs() < dec!(0.01));
    assert!(out.warnings.is_empty());
}

#[test]
fn test_fixed_term_requires_term() {
    let mut input = ten_year_plan();
    input.term_periods = Some(0);
    assert!(matches!(
        schedule::build_schedule(&input),
        Err(LendingError::InvalidInput { .. })
    ));
}

#[test]
fn test_schedule_input_from_json_defaults() {
    let json = r#"{
        "principal": "1000",
        "annual_rate": "0.12",
        "payment": "100",
        "charges": [{"Flat": {"name": "fee", "amount": "5"}}]
    }"#;
    let input: ScheduleInput = serde_json::from_str(json).unwrap();
    assert_eq!(input.periods_per_year, 12);
    assert_eq!(input.first_period, 1);
    assert_eq!(input.date_step, DateStep::FixedDays(30));
    assert_eq!(
        input.policy,
        SchedulePolicy::UntilRepaid {
            max_periods: schedule::DEFAULT_MAX_PERIODS
        }
    );
    let out = schedule::build_schedule(&input).unwrap();
    assert_eq!(out.result.summary.final_balance, Decimal::ZERO);
}
