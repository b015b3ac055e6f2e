use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LendingError;
use crate::types::*;
use crate::LendingResult;

/// A recurring charge collected out of each gross payment before the
/// interest / principal split (insurance premiums and similar add-ons).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PeriodicCharge {
    /// Same amount every period
    Flat { name: String, amount: Money },
    /// Fraction of the balance outstanding at the start of the period
    BalanceRate { name: String, rate: Rate },
}

/// A charge as assessed for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChargeAmount {
    pub name: String,
    pub amount: Money,
}

impl PeriodicCharge {
    pub fn name(&self) -> &str {
        match self {
            PeriodicCharge::Flat { name, .. } | PeriodicCharge::BalanceRate { name, .. } => name,
        }
    }

    /// Amount due for a period opening at `balance`. `None` when the
    /// balance-linked amount is not representable.
    pub fn amount_for(&self, balance: Money) -> Option<Money> {
        match self {
            PeriodicCharge::Flat { amount, .. } => Some(*amount),
            PeriodicCharge::BalanceRate { rate, .. } => balance.checked_mul(*rate),
        }
    }

    pub fn validate(&self) -> LendingResult<()> {
        let (field, value) = match self {
            PeriodicCharge::Flat { amount, .. } => ("charges.amount", *amount),
            PeriodicCharge::BalanceRate { rate, .. } => ("charges.rate", *rate),
        };
        if value < Decimal::ZERO {
            return Err(LendingError::InvalidInput {
                field: field.into(),
                reason: format!("Charge '{}' cannot be negative", self.name()),
            });
        }
        Ok(())
    }
}

/// Assess every charge against the opening balance. Returns the total and
/// the per-charge breakdown in configuration order, or `None` on overflow.
pub fn assess_charges(
    charges: &[PeriodicCharge],
    balance: Money,
) -> Option<(Money, Vec<ChargeAmount>)> {
    let mut total = Decimal::ZERO;
    let mut breakdown = Vec::with_capacity(charges.len());
    for charge in charges {
        let amount = charge.amount_for(balance)?;
        total = total.checked_add(amount)?;
        breakdown.push(ChargeAmount {
            name: charge.name().to_string(),
            amount,
        });
    }
    Some((total, breakdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn insurance() -> Vec<PeriodicCharge> {
        vec![
            PeriodicCharge::BalanceRate {
                name: "life".into(),
                rate: dec!(0.000224),
            },
            PeriodicCharge::Flat {
                name: "earthquake".into(),
                amount: dec!(22792),
            },
        ]
    }

    #[test]
    fn test_assess_mixed_charges() {
        let (total, breakdown) = assess_charges(&insurance(), dec!(100_000_000)).unwrap();
        // 100M * 0.000224 = 22,400 plus 22,792 flat
        assert_eq!(breakdown[0].amount, dec!(22400));
        assert_eq!(breakdown[1].amount, dec!(22792));
        assert_eq!(total, dec!(45192));
    }

    #[test]
    fn test_no_charges_is_zero() {
        let (total, breakdown) = assess_charges(&[], dec!(1000)).unwrap();
        assert_eq!(total, Decimal::ZERO);
        assert!(breakdown.is_empty());
    }

    #[test]
    fn test_unrepresentable_charge_is_none() {
        let charges = vec![PeriodicCharge::BalanceRate {
            name: "life".into(),
            rate: dec!(2),
        }];
        assert!(assess_charges(&charges, Decimal::MAX).is_none());

        let flat = vec![
            PeriodicCharge::Flat {
                name: "a".into(),
                amount: Decimal::MAX,
            },
            PeriodicCharge::Flat {
                name: "b".into(),
                amount: Decimal::MAX,
            },
        ];
        assert!(assess_charges(&flat, Decimal::ZERO).is_none());
    }

    #[test]
    fn test_negative_charge_rejected() {
        let charge = PeriodicCharge::Flat {
            name: "bad".into(),
            amount: dec!(-1),
        };
        assert!(charge.validate().is_err());
    }
}
