//! Audit log definitions.

use std::str::FromStr;

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{Assignment, Interpreter, Payment};

/// Append-only audit log entry.
///
/// [`Entry`]s are recorded on every state-changing action, best-effort:
/// a failure to record one never fails the action itself.
#[derive(Clone, Debug)]
pub struct Entry {
    /// ID of this [`Entry`].
    pub id: Id,

    /// [`Actor`] who performed the action, if known.
    pub actor: Option<Actor>,

    /// [`Action`] code of this [`Entry`].
    pub action: Action,

    /// [`Target`] kind the action was performed upon.
    pub target: Target,

    /// ID of the target the action was performed upon.
    pub target_id: Uuid,

    /// JSON payload describing the change.
    pub changes: serde_json::Value,

    /// [`DateTime`] when this [`Entry`] was recorded.
    pub recorded_at: CreationDateTime,
}

impl Entry {
    /// Creates a new [`Entry`] describing an [`Action`] upon the provided
    /// target.
    #[must_use]
    pub fn new(
        actor: Option<Actor>,
        action: Action,
        target: Target,
        target_id: impl Into<Uuid>,
        changes: serde_json::Value,
    ) -> Self {
        Self {
            id: Id::new(),
            actor,
            action,
            target,
            target_id: target_id.into(),
            changes,
            recorded_at: CreationDateTime::now(),
        }
    }
}

/// ID of an [`Entry`].
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

/// Action code of an [`Entry`].
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// An [`Assignment`] was created.
    AssignmentCreated,

    /// An [`Assignment`] was offered to an [`Interpreter`].
    AssignmentOffered,

    /// An [`Interpreter`] accepted an [`Assignment`].
    AssignmentAccepted,

    /// An [`Interpreter`] declined an [`Assignment`].
    AssignmentDeclined,

    /// Staff transitioned an [`Assignment`] status.
    StatusChanged,

    /// A "new assignment" email was sent.
    EmailSentNew,

    /// A "confirmed" email was sent.
    EmailSentConfirmed,

    /// A "cancelled" email was sent.
    EmailSentCancelled,

    /// A "completed" email was sent.
    EmailSentCompleted,

    /// A "no-show" email was sent.
    EmailSentNoShow,

    /// An [`Interpreter`] was registered.
    InterpreterRegistered,
}

/// Kind of a target an [`Entry`] describes an action upon.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Eq,
    PartialEq,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Target {
    /// An [`Assignment`].
    Assignment,

    /// An [`Interpreter`].
    Interpreter,

    /// A [`Payment`].
    Payment,
}

/// Actor who performed an audited action: a staff login, an interpreter
/// email, or the system itself.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Actor(String);

impl Actor {
    /// [`Actor`] representing the system itself.
    #[must_use]
    pub fn system() -> Self {
        Self("system".into())
    }

    /// Creates a new [`Actor`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Actor`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 150
    }
}

impl FromStr for Actor {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Actor`")
    }
}

/// [`DateTime`] when an [`Entry`] was recorded.
pub type CreationDateTime = DateTimeOf<(Entry, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::Action;

    #[test]
    fn action_codes() {
        assert_eq!(Action::AssignmentAccepted.to_string(), "ASSIGNMENT_ACCEPTED");
        assert_eq!(Action::EmailSentNoShow.to_string(), "EMAIL_SENT_NO_SHOW");
        assert_eq!(
            "STATUS_CHANGED".parse::<Action>().unwrap(),
            Action::StatusChanged,
        );
    }
}
