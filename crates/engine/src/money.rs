use std::{fmt, iter::Sum, ops::Add};

use crate::{Currency, EngineError, ResultEngine};

/// Largest amount accepted from clients, in minor units.
pub const MAX_AMOUNT_MINOR: i64 = 9_999_999_999;

/// Non-negative money amount represented as **integer minor units** of a
/// [`Currency`].
///
/// Use this type for every monetary computation in the engine (budget
/// totals, stop and activity costs) to avoid floating-point drift.
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, Money};
///
/// let amount = Money::new(12_34);
/// assert_eq!(amount.minor(), 1234);
/// assert_eq!(amount.display(Currency::Usd).to_string(), "12.34 USD");
/// ```
///
/// Parsing user input honours the currency's fraction digits and accepts `.`
/// or `,` as decimal separator:
///
/// ```rust
/// use engine::{Currency, Money};
///
/// assert_eq!(Money::parse("10,5", Currency::Eur).unwrap().minor(), 1050);
/// assert_eq!(Money::parse("1200", Currency::Jpy).unwrap().minor(), 1200);
/// assert!(Money::parse("12.345", Currency::Usd).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Checked addition (returns `None` on overflow).
    #[must_use]
    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    /// Checked subtraction (returns `None` on overflow).
    #[must_use]
    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Sums amounts, failing instead of wrapping on overflow.
    pub fn try_sum<I>(amounts: I) -> ResultEngine<Money>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts.into_iter().try_fold(Money::ZERO, |acc, amount| {
            acc.checked_add(amount)
                .ok_or_else(|| EngineError::InvalidAmount("amount too large".to_string()))
        })
    }

    /// Formats the amount in major units followed by the currency code.
    #[must_use]
    pub fn display(self, currency: Currency) -> MoneyDisplay {
        MoneyDisplay {
            amount: self,
            currency,
        }
    }

    /// Parses a decimal string in major units of `currency` into minor units.
    ///
    /// Validation rules:
    /// - at most `currency.minor_units()` fractional digits
    /// - no sign: amounts are never negative
    /// - rejects empty/invalid strings
    pub fn parse(input: &str, currency: Currency) -> ResultEngine<Money> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let normalized = trimmed.replace(',', ".");
        let mut parts = normalized.split('.');
        let units_str = parts.next().ok_or_else(invalid)?;
        let frac_str = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        if units_str.is_empty() || !units_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let units: i64 = units_str.parse().map_err(|_| overflow())?;

        let digits = u32::from(currency.minor_units());
        let scale = 10_i64.pow(digits);
        let frac: i64 = match frac_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                let len = u32::try_from(frac.len()).map_err(|_| invalid())?;
                if len > digits {
                    return Err(EngineError::InvalidAmount("too many decimals".to_string()));
                }
                let value: i64 = frac.parse().map_err(|_| invalid())?;
                value * 10_i64.pow(digits - len)
            }
        };

        units
            .checked_mul(scale)
            .and_then(|v| v.checked_add(frac))
            .map(Money)
            .ok_or_else(overflow)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Money> for i64 {
    fn from(value: Money) -> Self {
        value.0
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

/// Display adapter returned by [`Money::display`].
pub struct MoneyDisplay {
    amount: Money,
    currency: Currency,
}

impl fmt::Display for MoneyDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.amount.0;
        let sign = if value < 0 { "-" } else { "" };
        let abs = value.unsigned_abs();
        let code = self.currency.code();
        match self.currency.minor_units() {
            0 => write!(f, "{sign}{abs} {code}"),
            digits => {
                let scale = 10_u64.pow(u32::from(digits));
                let units = abs / scale;
                let frac = abs % scale;
                write!(
                    f,
                    "{sign}{units}.{frac:0width$} {code}",
                    width = usize::from(digits)
                )
            }
        }
    }
}
