//! [`Payment`] definitions.

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{assignment, finance, interpreter};
#[cfg(doc)]
use crate::domain::{Assignment, Interpreter, Transaction};

/// Money owed to an [`Interpreter`] for a confirmed [`Assignment`].
#[derive(Clone, Debug)]
pub struct Payment {
    /// ID of this [`Payment`].
    pub id: Id,

    /// ID of the [`Transaction`] backing this [`Payment`].
    pub transaction_id: finance::Id,

    /// ID of the [`Interpreter`] this [`Payment`] is owed to.
    pub interpreter_id: interpreter::Id,

    /// ID of the [`Assignment`] this [`Payment`] is owed for.
    pub assignment_id: assignment::Id,

    /// Amount of [`Money`] owed.
    pub amount: Money,

    /// [`Method`] this [`Payment`] is made with.
    pub method: Method,

    /// [`Status`] of this [`Payment`].
    pub status: Status,

    /// [`DateTime`] when this [`Payment`] is scheduled to be made.
    pub scheduled_at: SchedulingDateTime,

    /// [`DateTime`] when this [`Payment`] was processed, if it was.
    pub processed_at: Option<ProcessingDateTime>,

    /// Unique [`Reference`] of this [`Payment`].
    pub reference: Reference,

    /// [`DateTime`] when this [`Payment`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Payment`] was updated last time.
    pub updated_at: UpdateDateTime,
}

impl Payment {
    /// Checks whether this [`Payment`] may be taken into processing.
    #[must_use]
    pub fn can_be_processed(&self) -> bool {
        self.status == Status::Pending
    }

    /// Checks whether this [`Payment`] may be completed.
    #[must_use]
    pub fn can_be_completed(&self) -> bool {
        self.status == Status::Processing
    }

    /// Moves this [`Payment`] into processing.
    ///
    /// Returns `false` without any mutation if it cannot be processed.
    pub fn mark_as_processing(&mut self) -> bool {
        if !self.can_be_processed() {
            return false;
        }
        self.status = Status::Processing;
        self.touch();
        true
    }

    /// Completes this [`Payment`], stamping the processing [`DateTime`].
    ///
    /// Returns `false` without any mutation if it cannot be completed.
    pub fn mark_as_completed(&mut self) -> bool {
        if !self.can_be_completed() {
            return false;
        }
        self.status = Status::Completed;
        self.processed_at = Some(ProcessingDateTime::now());
        self.touch();
        true
    }

    /// Fails this [`Payment`].
    ///
    /// Returns `false` without any mutation if it is already settled.
    pub fn mark_as_failed(&mut self) -> bool {
        if !matches!(self.status, Status::Pending | Status::Processing) {
            return false;
        }
        self.status = Status::Failed;
        self.touch();
        true
    }

    /// Cancels this [`Payment`], unless it is already [`Status::Completed`]
    /// or [`Status::Failed`].
    ///
    /// Returns `false` without any mutation otherwise.
    pub fn cancel(&mut self) -> bool {
        if matches!(self.status, Status::Completed | Status::Failed) {
            return false;
        }
        self.status = Status::Cancelled;
        self.touch();
        true
    }

    /// Stamps the update [`DateTime`] of this [`Payment`].
    fn touch(&mut self) {
        self.updated_at = UpdateDateTime::now();
    }
}

/// ID of a [`Payment`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    derive_more::FromStr,
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
    #[doc = "Status of a [`Payment`]."]
    enum Status {
        #[doc = "Awaiting processing."]
        Pending = 1,

        #[doc = "Being processed."]
        Processing = 2,

        #[doc = "Paid out."]
        Completed = 3,

        #[doc = "Processing failed."]
        Failed = 4,

        #[doc = "Called off."]
        Cancelled = 5,
    }
}

define_kind! {
    #[doc = "Method a [`Payment`] is made with."]
    enum Method {
        #[doc = "ACH transfer (the default)."]
        Ach = 1,

        #[doc = "Paper check."]
        Check = 2,

        #[doc = "Bank wire transfer."]
        BankTransfer = 3,

        #[doc = "Zelle transfer."]
        Zelle = 4,

        #[doc = "PayPal transfer."]
        Paypal = 5,

        #[doc = "Any other method."]
        Other = 6,
    }
}

/// Unique reference of a [`Payment`], quoted in payroll documents.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Reference(String);

impl Reference {
    /// Generates a new [`Reference`] for a [`Payment`] owed for the provided
    /// [`Assignment`].
    ///
    /// Format: `INT-{assignment id prefix}-{random suffix}`.
    #[must_use]
    pub fn generate(assignment_id: assignment::Id) -> Self {
        let assignment = Uuid::from(assignment_id).simple().to_string();
        let nonce = Uuid::new_v4().simple().to_string();
        Self(format!(
            "INT-{}-{}",
            &assignment[..8],
            nonce[..6].to_uppercase(),
        ))
    }
}

impl FromStr for Reference {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        (s.starts_with("INT-") && s.len() <= 50)
            .then(|| Self(s.to_owned()))
            .ok_or("invalid `Reference`")
    }
}

/// [`DateTime`] when a [`Payment`] is scheduled to be made.
pub type SchedulingDateTime = DateTimeOf<(Payment, unit::Scheduling)>;

/// [`DateTime`] when a [`Payment`] was processed.
pub type ProcessingDateTime = DateTimeOf<(Payment, unit::Processing)>;

/// [`DateTime`] when a [`Payment`] was created.
pub type CreationDateTime = DateTimeOf<(Payment, unit::Creation)>;

/// [`DateTime`] when a [`Payment`] was updated.
pub type UpdateDateTime = DateTimeOf<(Payment, unit::Update)>;

#[cfg(test)]
mod spec {
    use common::Money;
    use rust_decimal::Decimal;

    use crate::domain::{assignment, finance, interpreter};

    use super::{
        CreationDateTime, Id, Method, Payment, Reference, SchedulingDateTime,
        Status, UpdateDateTime,
    };

    fn payment(status: Status) -> Payment {
        Payment {
            id: Id::new(),
            transaction_id: finance::Id::new(),
            interpreter_id: interpreter::Id::new(),
            assignment_id: assignment::Id::new(),
            amount: Money::from(Decimal::from(100)),
            method: Method::Ach,
            status,
            scheduled_at: SchedulingDateTime::now(),
            processed_at: None,
            reference: Reference::generate(assignment::Id::new()),
            created_at: CreationDateTime::now(),
            updated_at: UpdateDateTime::now(),
        }
    }

    #[test]
    fn processing_only_from_pending() {
        let mut p = payment(Status::Pending);
        assert!(p.mark_as_processing());
        assert_eq!(p.status, Status::Processing);
        assert!(!p.mark_as_processing());
    }

    #[test]
    fn completion_stamps_processed_at() {
        let mut p = payment(Status::Processing);
        assert!(p.mark_as_completed());
        assert_eq!(p.status, Status::Completed);
        assert!(p.processed_at.is_some());

        let mut pending = payment(Status::Pending);
        assert!(!pending.mark_as_completed());
        assert_eq!(pending.processed_at, None);
    }

    #[test]
    fn cancel_spares_settled_payments() {
        for status in [Status::Completed, Status::Failed] {
            let mut p = payment(status);
            assert!(!p.cancel());
            assert_eq!(p.status, status);
        }

        for status in [Status::Pending, Status::Processing] {
            let mut p = payment(status);
            assert!(p.cancel());
            assert_eq!(p.status, Status::Cancelled);
        }
    }

    #[test]
    fn reference_format() {
        let assignment_id = assignment::Id::new();
        let reference = Reference::generate(assignment_id);

        let mut parts = AsRef::<str>::as_ref(&reference).split('-');
        assert_eq!(parts.next(), Some("INT"));
        assert_eq!(parts.next().map(str::len), Some(8));
        let nonce = parts.next().unwrap();
        assert_eq!(nonce.len(), 6);
        assert_eq!(nonce, nonce.to_uppercase());
        assert_eq!(parts.next(), None);

        // Suffixes differ between generations.
        assert_ne!(reference, Reference::generate(assignment_id));
    }
}
