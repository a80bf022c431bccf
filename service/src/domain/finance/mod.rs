//! Financial ledger definitions.

pub mod expense;
pub mod payment;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::audit;

pub use self::{expense::Expense, payment::Payment};

/// Root ledger record every money movement is traced through.
#[derive(Clone, Debug)]
pub struct Transaction {
    /// ID of this [`Transaction`].
    pub id: Id,

    /// [`Kind`] of this [`Transaction`].
    pub kind: Kind,

    /// Amount of [`Money`] moved.
    pub amount: Money,

    /// Human-readable description of this [`Transaction`].
    pub description: String,

    /// Actor this [`Transaction`] was created by, if known.
    pub created_by: Option<audit::Actor>,

    /// [`DateTime`] when this [`Transaction`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Transaction`].
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
    #[doc = "Kind of a [`Transaction`]."]
    enum Kind {
        #[doc = "Money flowing into the agency."]
        Income = 1,

        #[doc = "Money flowing out of the agency."]
        Expense = 2,

        #[doc = "Internal transfer."]
        Internal = 3,
    }
}

/// [`DateTime`] when a [`Transaction`] was created.
pub type CreationDateTime = DateTimeOf<(Transaction, unit::Creation)>;
