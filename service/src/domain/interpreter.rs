//! [`Interpreter`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Rate};
use derive_more::{Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Assignment;
use crate::domain::contact;

/// Interpreter working missions for the agency.
#[derive(Clone, Debug)]
pub struct Interpreter {
    /// ID of this [`Interpreter`].
    pub id: Id,

    /// Name of this [`Interpreter`].
    pub name: contact::Name,

    /// Email address of this [`Interpreter`].
    ///
    /// Notifications are skipped (with a warning) when absent.
    pub email: Option<contact::Email>,

    /// Phone number of this [`Interpreter`].
    pub phone: Option<contact::Phone>,

    /// Default hourly [`Rate`] of this [`Interpreter`], applied when staff
    /// create an [`Assignment`] without an explicit rate.
    pub rate: Option<Rate>,

    /// Indicator whether this [`Interpreter`] accepts new missions.
    pub active: bool,

    /// [`DateTime`] when this [`Interpreter`] was registered.
    pub created_at: CreationDateTime,
}

/// ID of an [`Interpreter`].
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

/// [`DateTime`] when an [`Interpreter`] was registered.
pub type CreationDateTime = DateTimeOf<(Interpreter, unit::Creation)>;
