//! [`Money`]-related definitions.

use std::{cmp, fmt, ops, str::FromStr, time::Duration};

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

/// Amount of money in US dollars.
///
/// All the bookkeeping of this system happens in a single currency, so only
/// the amount is carried, always as a [`Decimal`] (never floats).
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(
    feature = "postgres",
    derive(postgres_types::FromSql, postgres_types::ToSql),
    postgres(transparent)
)]
pub struct Money(Decimal);

impl Money {
    /// Returns the amount of this [`Money`] as a [`Decimal`].
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(amount) = self;
        if amount.is_integer() {
            write!(f, "${}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "${amount}")
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = s.strip_prefix('$').unwrap_or(s);
        Decimal::from_str(amount)
            .map(Self)
            .map_err(|_| "invalid amount")
    }
}

/// Hourly rate of [`Money`] paid for a service.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(
    feature = "postgres",
    derive(postgres_types::FromSql, postgres_types::ToSql),
    postgres(transparent)
)]
pub struct Rate(Decimal);

impl Rate {
    /// Returns the total [`Money`] owed for working the provided `actual`
    /// [`Hours`], billing at least the `minimum` ones.
    #[must_use]
    pub fn total_for(self, actual: Hours, minimum: Hours) -> Money {
        self * cmp::max(actual, minimum)
    }
}

impl From<Decimal> for Rate {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/hour", Money(self.0))
    }
}

impl FromStr for Rate {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = s.strip_suffix("/hour").unwrap_or(s);
        Money::from_str(amount).map(|m| Self(m.0))
    }
}

impl ops::Mul<Hours> for Rate {
    type Output = Money;

    fn mul(self, rhs: Hours) -> Self::Output {
        Money(self.0 * rhs.0)
    }
}

/// Possibly fractional number of worked hours.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(
    feature = "postgres",
    derive(postgres_types::FromSql, postgres_types::ToSql),
    postgres(transparent)
)]
pub struct Hours(Decimal);

impl Hours {
    /// Returns the number of [`Hours`] the provided [`Duration`] lasts.
    ///
    /// Sub-second precision is dropped.
    #[must_use]
    pub fn from_duration(duration: Duration) -> Self {
        Self(Decimal::from(duration.as_secs()) / Decimal::from(3600))
    }
}

impl From<Decimal> for Hours {
    fn from(hours: Decimal) -> Self {
        Self(hours)
    }
}

impl From<u32> for Hours {
    fn from(hours: u32) -> Self {
        Self(Decimal::from(hours))
    }
}

impl fmt::Display for Hours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(hours) = self;
        if hours.is_integer() {
            write!(f, "{}", hours.to_i128().expect("integer"))
        } else {
            write!(f, "{hours}")
        }
    }
}

impl FromStr for Hours {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s).map(Self).map_err(|_| "invalid hours")
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Money amount in `${major}.{minor}` format, where:
    /// - `major` is an integer;
    /// - `minor` is an optional integer.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Money = super::Money;

    impl Money {
        fn to_output<S: ScalarValue>(m: &Money) -> Value<S> {
            Value::scalar(m.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Money` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Money` input scalar: {e}")
                    })
                })
        }
    }

    /// Hourly rate in `${amount}/hour` format (the suffix is optional on
    /// input).
    #[graphql_scalar(with = Self, parse_token(String))]
    type Rate = super::Rate;

    impl Rate {
        fn to_output<S: ScalarValue>(r: &Rate) -> Value<S> {
            Value::scalar(r.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Rate` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Rate` input scalar: {e}")
                    })
                })
        }
    }

    /// Possibly fractional number of hours, as a decimal string.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Hours = super::Hours;

    impl Hours {
        fn to_output<S: ScalarValue>(h: &Hours) -> Value<S> {
            Value::scalar(h.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Hours` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Hours` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use std::{str::FromStr as _, time::Duration};

    use rust_decimal::Decimal;

    use super::{Hours, Money, Rate};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn money_from_str() {
        assert_eq!(
            Money::from_str("123.45").unwrap(),
            Money::from(decimal("123.45")),
        );
        assert_eq!(
            Money::from_str("$123.45").unwrap(),
            Money::from(decimal("123.45")),
        );
        assert!(Money::from_str("12x.45").is_err());
        assert!(Money::from_str("").is_err());
    }

    #[test]
    fn money_to_string() {
        assert_eq!(Money::from(decimal("123.45")).to_string(), "$123.45");
        assert_eq!(Money::from(decimal("123.00")).to_string(), "$123");
        assert_eq!(Money::from(decimal("123")).to_string(), "$123");
    }

    #[test]
    fn rate_to_string() {
        assert_eq!(Rate::from(decimal("55.50")).to_string(), "$55.50/hour");
        assert_eq!(
            Rate::from_str("$55.50/hour").unwrap(),
            Rate::from(decimal("55.50")),
        );
        assert_eq!(
            Rate::from_str("55.50").unwrap(),
            Rate::from(decimal("55.50")),
        );
    }

    #[test]
    fn hours_from_duration() {
        assert_eq!(
            Hours::from_duration(Duration::from_secs(3600)),
            Hours::from(decimal("1")),
        );
        assert_eq!(
            Hours::from_duration(Duration::from_secs(3600 * 7 / 2)),
            Hours::from(decimal("3.5")),
        );
        assert_eq!(
            Hours::from_duration(Duration::from_secs(2700)),
            Hours::from(decimal("0.75")),
        );
    }

    #[test]
    fn minimum_hours_apply() {
        // 1 actual hour billed at the 2 hours minimum.
        assert_eq!(
            Rate::from(decimal("50"))
                .total_for(Hours::from(1_u32), Hours::from(2_u32)),
            Money::from(decimal("100")),
        );
    }

    #[test]
    fn actual_hours_above_minimum() {
        assert_eq!(
            Rate::from(decimal("40"))
                .total_for(Hours::from(decimal("3.5")), Hours::from(1_u32)),
            Money::from(decimal("140.0")),
        );
    }
}
