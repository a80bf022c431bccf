//! [`Assignment`] definitions.

use std::{fmt, str::FromStr, time::Duration};

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Hours, Money, Rate};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{contact, interpreter};
#[cfg(doc)]
use crate::domain::{Interpreter, Payment};

/// One scheduled interpretation job.
#[derive(Clone, Debug)]
pub struct Assignment {
    /// ID of this [`Assignment`].
    pub id: Id,

    /// Name of the client this [`Assignment`] serves, if known.
    pub client_name: Option<contact::Name>,

    /// Email address of the client, if known.
    pub client_email: Option<contact::Email>,

    /// Phone number of the client, if known.
    pub client_phone: Option<contact::Phone>,

    /// ID of the [`Interpreter`] this [`Assignment`] is offered to.
    ///
    /// Detached (set to [`None`]) when this [`Assignment`] is cancelled,
    /// while the rest of the record is preserved for audit purposes.
    pub interpreter_id: Option<interpreter::Id>,

    /// [`ServiceType`] of this [`Assignment`].
    pub service_type: ServiceType,

    /// [`Language`] interpreted from.
    pub source_language: Language,

    /// [`Language`] interpreted to.
    pub target_language: Language,

    /// [`DateTime`] when the mission starts.
    pub start_at: StartDateTime,

    /// [`DateTime`] when the mission ends.
    pub end_at: EndDateTime,

    /// [`Location`] where the mission takes place.
    pub location: Location,

    /// [`Status`] of this [`Assignment`].
    pub status: Status,

    /// Hourly [`Rate`] the [`Interpreter`] is paid at.
    pub rate: Rate,

    /// Minimum billable [`Hours`] of this [`Assignment`].
    pub minimum_hours: Hours,

    /// Total [`Money`] owed to the [`Interpreter`].
    pub total_payment: Option<Money>,

    /// Indicator whether this [`Assignment`] has been paid out.
    ///
    /// Display-only denormalization of the [`Payment`] ledger:
    /// [`None`] means the decision is still pending.
    pub is_paid: Option<bool>,

    /// Free-form staff notes.
    pub notes: Option<Text>,

    /// Special requirements communicated to the [`Interpreter`].
    pub special_requirements: Option<Text>,

    /// [`DateTime`] when this [`Assignment`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`Assignment`] was updated last time.
    pub updated_at: UpdateDateTime,

    /// [`DateTime`] when this [`Assignment`] was completed, if it was.
    pub completed_at: Option<CompletionDateTime>,
}

impl Assignment {
    /// Checks whether this [`Assignment`] may be confirmed.
    #[must_use]
    pub fn can_be_confirmed(&self) -> bool {
        self.status == Status::Pending
    }

    /// Checks whether this [`Assignment`] may be started.
    #[must_use]
    pub fn can_be_started(&self) -> bool {
        self.status == Status::Confirmed
    }

    /// Checks whether this [`Assignment`] may be completed.
    #[must_use]
    pub fn can_be_completed(&self) -> bool {
        matches!(self.status, Status::Confirmed | Status::InProgress)
    }

    /// Checks whether this [`Assignment`] may be cancelled.
    #[must_use]
    pub fn can_be_cancelled(&self) -> bool {
        matches!(self.status, Status::Pending | Status::Confirmed)
    }

    /// Checks whether a no-show may be recorded for this [`Assignment`].
    #[must_use]
    pub fn can_be_marked_no_show(&self) -> bool {
        matches!(self.status, Status::Confirmed | Status::InProgress)
    }

    /// Confirms this [`Assignment`].
    ///
    /// Returns `false` without any mutation if it cannot be confirmed.
    pub fn confirm(&mut self) -> bool {
        if !self.can_be_confirmed() {
            return false;
        }
        self.status = Status::Confirmed;
        self.touch();
        true
    }

    /// Starts this [`Assignment`].
    ///
    /// Returns `false` without any mutation if it cannot be started.
    pub fn start(&mut self) -> bool {
        if !self.can_be_started() {
            return false;
        }
        self.status = Status::InProgress;
        self.touch();
        true
    }

    /// Completes this [`Assignment`], stamping the completion [`DateTime`]
    /// and the total [`Interpreter`] payment.
    ///
    /// Returns `false` without any mutation if it cannot be completed.
    pub fn complete(&mut self) -> bool {
        if !self.can_be_completed() {
            return false;
        }
        self.status = Status::Completed;
        self.completed_at = Some(CompletionDateTime::now());
        self.total_payment = Some(self.total_payment());
        self.touch();
        true
    }

    /// Cancels this [`Assignment`], detaching its [`Interpreter`].
    ///
    /// Returns the detached [`interpreter::Id`] (for notification purposes),
    /// or [`None`] without any mutation if it cannot be cancelled.
    pub fn cancel(&mut self) -> Option<interpreter::Id> {
        if !self.can_be_cancelled() {
            return None;
        }
        self.status = Status::Cancelled;
        self.touch();
        self.interpreter_id.take()
    }

    /// Records a no-show on this [`Assignment`].
    ///
    /// Returns `false` without any mutation if a no-show cannot be recorded.
    pub fn mark_no_show(&mut self) -> bool {
        if !self.can_be_marked_no_show() {
            return false;
        }
        self.status = Status::NoShow;
        self.touch();
        true
    }

    /// Returns the [`Duration`] of this [`Assignment`]'s mission.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end_at - self.start_at.coerce()
    }

    /// Returns billable [`Hours`] of this [`Assignment`]: the actual mission
    /// duration, or the minimum ones if the mission is shorter.
    #[must_use]
    pub fn billable_hours(&self) -> Hours {
        Hours::from_duration(self.duration()).max(self.minimum_hours)
    }

    /// Returns total [`Money`] owed to the [`Interpreter`] of this
    /// [`Assignment`]: `rate × max(actual_hours, minimum_hours)`.
    #[must_use]
    pub fn total_payment(&self) -> Money {
        self.rate.total_for(
            Hours::from_duration(self.duration()),
            self.minimum_hours,
        )
    }

    /// Returns displayable client information of this [`Assignment`].
    #[must_use]
    pub fn client_display(&self) -> String {
        self.client_name
            .as_ref()
            .map_or_else(|| "Anonymous Client".into(), ToString::to_string)
    }

    /// Stamps the update [`DateTime`] of this [`Assignment`].
    fn touch(&mut self) {
        self.updated_at = UpdateDateTime::now();
    }
}

/// ID of an [`Assignment`].
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
    #[doc = "Status of an [`Assignment`]."]
    enum Status {
        #[doc = "Offered to an [`Interpreter`], awaiting the response."]
        Pending = 1,

        #[doc = "Accepted by the [`Interpreter`]."]
        Confirmed = 2,

        #[doc = "Mission underway."]
        InProgress = 3,

        #[doc = "Mission finished."]
        Completed = 4,

        #[doc = "Declined or called off."]
        Cancelled = 5,

        #[doc = "Client or [`Interpreter`] absent."]
        NoShow = 6,
    }
}

/// Type of an interpretation service (e.g. "Medical Interpretation").
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct ServiceType(String);

impl ServiceType {
    /// Creates a new [`ServiceType`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`ServiceType`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 100
    }
}

impl FromStr for ServiceType {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `ServiceType`")
    }
}

/// Name of a spoken language (e.g. "Haitian Creole").
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Language(String);

impl Language {
    /// Creates a new [`Language`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Language`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 100
    }
}

impl FromStr for Language {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Language`")
    }
}

/// Location where an [`Assignment`]'s mission takes place.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Location {
    /// Street address.
    pub address: Text,

    /// City.
    pub city: Text,

    /// State.
    pub state: Text,

    /// Zip code.
    pub zip_code: Text,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            address,
            city,
            state,
            zip_code,
        } = self;
        write!(f, "{address}, {city}, {state} {zip_code}")
    }
}

/// Short free-form text field.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Text(String);

impl Text {
    /// Creates a new [`Text`] if the given `text` is valid.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Text`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        !text.trim().is_empty() && text.len() <= 2048
    }
}

impl FromStr for Text {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Text`")
    }
}

/// Marker type indicating an [`Assignment`] mission start.
#[derive(Clone, Copy, Debug)]
pub struct Start;

/// Marker type indicating an [`Assignment`] mission end.
#[derive(Clone, Copy, Debug)]
pub struct End;

/// [`DateTime`] when an [`Assignment`]'s mission starts.
pub type StartDateTime = DateTimeOf<(Assignment, Start)>;

/// [`DateTime`] when an [`Assignment`]'s mission ends.
pub type EndDateTime = DateTimeOf<(Assignment, End)>;

/// [`DateTime`] when an [`Assignment`] was created.
pub type CreationDateTime = DateTimeOf<(Assignment, unit::Creation)>;

/// [`DateTime`] when an [`Assignment`] was updated.
pub type UpdateDateTime = DateTimeOf<(Assignment, unit::Update)>;

/// [`DateTime`] when an [`Assignment`] was completed.
pub type CompletionDateTime = DateTimeOf<(Assignment, unit::Completion)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{Hours, Money, Rate};
    use rust_decimal::Decimal;

    use crate::domain::interpreter;

    use super::{
        Assignment, CreationDateTime, Id, Language, Location, ServiceType,
        StartDateTime, Status, Text, UpdateDateTime,
    };

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn assignment(
        status: Status,
        rate: Rate,
        minimum_hours: Hours,
        duration: Duration,
    ) -> Assignment {
        let start_at = StartDateTime::now();
        Assignment {
            id: Id::new(),
            client_name: None,
            client_email: None,
            client_phone: None,
            interpreter_id: Some(interpreter::Id::new()),
            service_type: ServiceType::new("Medical Interpretation").unwrap(),
            source_language: Language::new("English").unwrap(),
            target_language: Language::new("Spanish").unwrap(),
            start_at,
            end_at: (start_at + duration).coerce(),
            location: Location {
                address: Text::new("123 Main St").unwrap(),
                city: Text::new("Boston").unwrap(),
                state: Text::new("MA").unwrap(),
                zip_code: Text::new("02108").unwrap(),
            },
            status,
            rate,
            minimum_hours,
            total_payment: None,
            is_paid: None,
            notes: None,
            special_requirements: None,
            created_at: CreationDateTime::now(),
            updated_at: UpdateDateTime::now(),
            completed_at: None,
        }
    }

    #[test]
    fn confirm_only_from_pending() {
        for status in [
            Status::Confirmed,
            Status::InProgress,
            Status::Completed,
            Status::Cancelled,
            Status::NoShow,
        ] {
            let mut a = assignment(
                status,
                decimal("50").into(),
                Hours::from(2_u32),
                Duration::from_secs(3600),
            );
            let interpreter_id = a.interpreter_id;

            assert!(!a.confirm(), "confirmed from {status}");
            assert_eq!(a.status, status);
            assert_eq!(a.interpreter_id, interpreter_id);
            assert_eq!(a.completed_at, None);
        }

        let mut a = assignment(
            Status::Pending,
            decimal("50").into(),
            Hours::from(2_u32),
            Duration::from_secs(3600),
        );
        assert!(a.confirm());
        assert_eq!(a.status, Status::Confirmed);
    }

    #[test]
    fn start_only_from_confirmed() {
        let mut a = assignment(
            Status::Pending,
            decimal("50").into(),
            Hours::from(2_u32),
            Duration::from_secs(3600),
        );
        assert!(!a.start());

        assert!(a.confirm());
        assert!(a.start());
        assert_eq!(a.status, Status::InProgress);
        assert!(!a.start());
    }

    #[test]
    fn complete_stamps_payment_and_time() {
        let mut a = assignment(
            Status::Confirmed,
            decimal("50").into(),
            Hours::from(2_u32),
            Duration::from_secs(3600),
        );

        assert!(a.complete());
        assert_eq!(a.status, Status::Completed);
        assert!(a.completed_at.is_some());
        // 1 actual hour, billed at the 2 hours minimum.
        assert_eq!(a.total_payment, Some(Money::from(decimal("100"))));

        assert!(!a.complete());
    }

    #[test]
    fn complete_bills_actual_hours_above_minimum() {
        let mut a = assignment(
            Status::InProgress,
            decimal("40").into(),
            Hours::from(1_u32),
            Duration::from_secs(3600 * 7 / 2),
        );

        assert!(a.complete());
        assert_eq!(a.total_payment, Some(Money::from(decimal("140"))));
    }

    #[test]
    fn cancel_detaches_interpreter() {
        let mut a = assignment(
            Status::Confirmed,
            decimal("50").into(),
            Hours::from(2_u32),
            Duration::from_secs(3600),
        );
        let interpreter_id = a.interpreter_id;

        assert_eq!(a.cancel(), interpreter_id);
        assert_eq!(a.status, Status::Cancelled);
        assert_eq!(a.interpreter_id, None);

        // Already cancelled: a no-op.
        assert_eq!(a.cancel(), None);
        assert_eq!(a.status, Status::Cancelled);
    }

    #[test]
    fn cancel_refused_once_completed() {
        let mut a = assignment(
            Status::Completed,
            decimal("50").into(),
            Hours::from(2_u32),
            Duration::from_secs(3600),
        );
        let interpreter_id = a.interpreter_id;

        assert_eq!(a.cancel(), None);
        assert_eq!(a.status, Status::Completed);
        assert_eq!(a.interpreter_id, interpreter_id);
    }

    #[test]
    fn no_show_only_after_acceptance() {
        let mut pending = assignment(
            Status::Pending,
            decimal("50").into(),
            Hours::from(2_u32),
            Duration::from_secs(3600),
        );
        assert!(!pending.mark_no_show());

        let mut confirmed = assignment(
            Status::Confirmed,
            decimal("50").into(),
            Hours::from(2_u32),
            Duration::from_secs(3600),
        );
        assert!(confirmed.mark_no_show());
        assert_eq!(confirmed.status, Status::NoShow);
    }

    #[test]
    fn client_display_falls_back() {
        let mut a = assignment(
            Status::Pending,
            decimal("50").into(),
            Hours::from(2_u32),
            Duration::from_secs(3600),
        );
        assert_eq!(a.client_display(), "Anonymous Client");

        a.client_name = "Acme Health".parse().ok();
        assert_eq!(a.client_display(), "Acme Health");
    }
}
