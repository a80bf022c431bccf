//! [`Expense`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::finance;
#[cfg(doc)]
use crate::domain::{Payment, Transaction};

/// Agency expense booked against a [`Transaction`].
#[derive(Clone, Debug)]
pub struct Expense {
    /// ID of this [`Expense`].
    pub id: Id,

    /// ID of the [`Transaction`] this [`Expense`] is booked against.
    pub transaction_id: finance::Id,

    /// [`Kind`] of this [`Expense`].
    pub kind: Kind,

    /// Amount of [`Money`] spent.
    pub amount: Money,

    /// Human-readable description of this [`Expense`].
    pub description: String,

    /// [`Status`] of this [`Expense`].
    pub status: Status,

    /// [`DateTime`] when this [`Expense`] was incurred.
    pub incurred_at: IncurringDateTime,

    /// [`DateTime`] when this [`Expense`] was paid, if it was.
    pub paid_at: Option<PaymentDateTime>,
}

impl Expense {
    /// Rejects this [`Expense`], unless it is already [`Status::Paid`].
    ///
    /// Returns `false` without any mutation otherwise.
    pub fn reject(&mut self) -> bool {
        if self.status == Status::Paid {
            return false;
        }
        self.status = Status::Rejected;
        true
    }
}

/// ID of an [`Expense`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Kind of an [`Expense`]."]
    enum Kind {
        #[doc = "Operational expense."]
        Operational = 1,

        #[doc = "Administrative expense."]
        Administrative = 2,

        #[doc = "Marketing expense."]
        Marketing = 3,

        #[doc = "Salary paid out (including [`Payment`]s to interpreters)."]
        Salary = 4,

        #[doc = "Tax paid."]
        Tax = 5,

        #[doc = "Any other expense."]
        Other = 6,
    }
}

define_kind! {
    #[doc = "Status of an [`Expense`]."]
    enum Status {
        #[doc = "Awaiting approval."]
        Pending = 1,

        #[doc = "Approved for payment."]
        Approved = 2,

        #[doc = "Paid out."]
        Paid = 3,

        #[doc = "Rejected."]
        Rejected = 4,
    }
}

/// Marker type indicating an [`Expense`] incurring.
#[derive(Clone, Copy, Debug)]
pub struct Incurring;

/// [`DateTime`] when an [`Expense`] was incurred.
pub type IncurringDateTime = DateTimeOf<(Expense, Incurring)>;

/// [`DateTime`] when an [`Expense`] was paid.
pub type PaymentDateTime = DateTimeOf<(Expense, unit::Processing)>;

#[cfg(test)]
mod spec {
    use common::Money;
    use rust_decimal::Decimal;

    use crate::domain::finance;

    use super::{Expense, Id, IncurringDateTime, Kind, Status};

    fn expense(status: Status) -> Expense {
        Expense {
            id: Id::new(),
            transaction_id: finance::Id::new(),
            kind: Kind::Salary,
            amount: Money::from(Decimal::from(100)),
            description: "Interpreter payment expense".into(),
            status,
            incurred_at: IncurringDateTime::now(),
            paid_at: None,
        }
    }

    #[test]
    fn reject_spares_paid_expenses() {
        let mut paid = expense(Status::Paid);
        assert!(!paid.reject());
        assert_eq!(paid.status, Status::Paid);

        for status in [Status::Pending, Status::Approved] {
            let mut e = expense(status);
            assert!(e.reject());
            assert_eq!(e.status, Status::Rejected);
        }
    }
}
