use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::LendingError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::LendingResult;

/// Every view of one effective annual rate at a given compounding frequency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateConversion {
    pub effective_annual_rate: Rate,
    pub periods_per_year: u32,
    pub periodic_rate: Rate,
    /// `periodic_rate` compounded back to an annual rate.
    pub round_trip_effective_rate: Rate,
    pub equivalent_nominal_rate: Rate,
    /// `annual / n`, the split used for nominal quotes. Not equivalent.
    pub simple_split_periodic_rate: Rate,
}

fn check_periods(field: &str, periods: u32) -> LendingResult<()> {
    if periods == 0 {
        return Err(LendingError::InvalidInput {
            field: field.into(),
            reason: "Number of periods must be > 0".into(),
        });
    }
    Ok(())
}

/// Periodic rate equivalent to an effective annual rate under compounding:
/// `(1 + annual)^(1/n) - 1`.
pub fn effective_to_periodic(annual_rate: Rate, periods_per_year: u32) -> LendingResult<Rate> {
    check_periods("periods_per_year", periods_per_year)?;
    if annual_rate < dec!(-1) {
        return Err(LendingError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Effective annual rate must be at least -100%".into(),
        });
    }
    if annual_rate.is_zero() {
        return Ok(Decimal::ZERO);
    }
    if annual_rate == dec!(-1) {
        return Ok(dec!(-1));
    }
    if periods_per_year == 1 {
        return Ok(annual_rate);
    }

    let exponent = Decimal::ONE / Decimal::from(periods_per_year);
    let growth = (Decimal::ONE + annual_rate)
        .checked_powd(exponent)
        .ok_or_else(|| LendingError::InvalidInput {
            field: "annual_rate".into(),
            reason: "Rate is outside the computable range".into(),
        })?;

    Ok(growth - Decimal::ONE)
}

/// Effective annual rate implied by a periodic rate: `(1 + r)^n - 1`.
pub fn periodic_to_effective(periodic_rate: Rate, periods_per_year: u32) -> LendingResult<Rate> {
    check_periods("periods_per_year", periods_per_year)?;
    if periodic_rate < dec!(-1) {
        return Err(LendingError::InvalidInput {
            field: "periodic_rate".into(),
            reason: "Periodic rate must be at least -100%".into(),
        });
    }
    let growth = (Decimal::ONE + periodic_rate)
        .checked_powd(Decimal::from(periods_per_year))
        .ok_or_else(|| LendingError::InvalidInput {
            field: "periodic_rate".into(),
            reason: "Rate is outside the computable range".into(),
        })?;
    Ok(growth - Decimal::ONE)
}

/// Simple nominal split: `nominal / n`. No compounding adjustment.
pub fn nominal_to_periodic(nominal_rate: Rate, periods_per_year: u32) -> LendingResult<Rate> {
    check_periods("periods_per_year", periods_per_year)?;
    Ok(nominal_rate / Decimal::from(periods_per_year))
}

/// Convert an effective annual rate and report the equivalent periodic and
/// nominal rates alongside the naive split.
pub fn convert_rate(
    annual_rate: Rate,
    periods_per_year: u32,
) -> LendingResult<ComputationOutput<RateConversion>> {
    let start = Instant::now();

    let periodic_rate = effective_to_periodic(annual_rate, periods_per_year)?;
    let round_trip_effective_rate = periodic_to_effective(periodic_rate, periods_per_year)?;
    let equivalent_nominal_rate = periodic_rate * Decimal::from(periods_per_year);
    let simple_split_periodic_rate = nominal_to_periodic(annual_rate, periods_per_year)?;

    let mut warnings = Vec::new();
    if (round_trip_effective_rate - annual_rate).abs() > dec!(0.0000001) {
        warnings.push(format!(
            "Round trip drifts from {annual_rate} to {round_trip_effective_rate}"
        ));
    }

    let output = RateConversion {
        effective_annual_rate: annual_rate,
        periods_per_year,
        periodic_rate,
        round_trip_effective_rate,
        equivalent_nominal_rate,
        simple_split_periodic_rate,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Effective annual to periodic rate by compounding equivalence",
        &serde_json::json!({
            "compounding": "discrete",
            "periods_per_year": periods_per_year,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Level-payment annuity factor `(1 - (1 + r)^-n) / r`.
///
/// A zero periodic rate would divide by zero; the factor is then `n`.
pub fn annuity_factor(periodic_rate: Rate, nper: u32) -> LendingResult<Decimal> {
    check_periods("nper", nper)?;
    if periodic_rate <= dec!(-1) {
        return Err(LendingError::InvalidInput {
            field: "periodic_rate".into(),
            reason: "Periodic rate must be greater than -100%".into(),
        });
    }
    if periodic_rate.is_zero() {
        return Ok(Decimal::from(nper));
    }

    let factor = (Decimal::ONE + periodic_rate)
        .checked_powd(Decimal::from(nper))
        .ok_or_else(|| LendingError::InvalidInput {
            field: "nper".into(),
            reason: "Compounding factor overflows".into(),
        })?;

    Ok((Decimal::ONE - Decimal::ONE / factor) / periodic_rate)
}

/// Present value of `nper` level payments.
pub fn pv_annuity(payment: Money, periodic_rate: Rate, nper: u32) -> LendingResult<Money> {
    payment
        .checked_mul(annuity_factor(periodic_rate, nper)?)
        .ok_or_else(|| LendingError::InvalidInput {
            field: "payment".into(),
            reason: "Present value is outside the computable range".into(),
        })
}

/// Level payment that fully amortises `principal` over `nper` periods.
pub fn level_payment(principal: Money, periodic_rate: Rate, nper: u32) -> LendingResult<Money> {
    let factor = annuity_factor(periodic_rate, nper)?;
    if factor.is_zero() {
        return Err(LendingError::InvalidInput {
            field: "periodic_rate".into(),
            reason: "Annuity factor is zero".into(),
        });
    }
    Ok(principal / factor)
}
