//! Side-effect dispatch upon committed [`Assignment`] transitions.
//!
//! One component covers what the notification/bookkeeping duties of every
//! transition have in common: which email goes out for which new status,
//! which financial records are created or updated, and which audit entries
//! are appended. It fires only AFTER the [`Assignment`] row is durably
//! saved, so every failure in here is caught, logged and reported as a
//! non-fatal [`Warning`] — never as an error unwinding the committed
//! transition.

pub mod calendar;

use std::{collections::BTreeMap, convert::Infallible};

use common::{
    operations::{By, Deliver, Insert, Perform, Select, Update},
    timezone, Handler, Timezone,
};
use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;
use tracing as log;
use uuid::Uuid;

use crate::{
    domain::{
        assignment::{self, Status},
        audit, contact,
        finance::{self, expense, payment, Expense, Payment, Transaction},
        interpreter, Assignment, Interpreter,
    },
    infra::{
        database,
        mailer::{self, Attachment, Email},
        Database, Mailer,
    },
    read, token, Service,
};

use self::calendar::Invite;

/// Configuration of the notification dispatch.
#[derive(Clone, Debug)]
pub struct Config {
    /// Email address the notifications are sent from.
    pub sender: contact::Email,

    /// Email addresses of the staff notified about interpreter responses.
    pub admin_recipients: Vec<contact::Email>,

    /// Public base URL the emailed accept/decline links point to.
    pub public_url: String,

    /// Domain scoping message IDs and calendar UIDs.
    pub domain: String,
}

/// Committed [`Assignment`] transition to fire side effects for.
#[derive(Clone, Debug)]
pub struct Transition {
    /// [`Assignment`] in its already-persisted new state.
    pub assignment: Assignment,

    /// [`Trigger`] of this [`Transition`].
    pub trigger: Trigger,

    /// [`Interpreter`] to notify: the current one, or (for cancellations)
    /// the one detached by the transition.
    pub interpreter: Option<Interpreter>,

    /// Actor who caused this [`Transition`], if known.
    pub actor: Option<audit::Actor>,
}

/// What caused a [`Transition`].
#[derive(Clone, Copy, Debug)]
pub enum Trigger {
    /// The [`Assignment`] was offered to its [`Interpreter`]
    /// (status stays [`Status::Pending`]).
    Offered,

    /// The [`Assignment`] status changed from the provided one.
    StatusChanged {
        /// Status the [`Assignment`] transitioned from.
        old: Status,
    },
}

/// Result of dispatching a [`Transition`].
#[derive(Debug, Default)]
pub struct Report {
    /// Non-fatal [`Warning`]s raised while dispatching.
    pub warnings: Vec<Warning>,
}

/// Pair of freshly issued accept/decline links for an offer email.
#[derive(Clone, Debug)]
struct OfferLinks {
    /// URL accepting the offer.
    accept: String,

    /// URL declining the offer.
    decline: String,
}

/// Non-fatal warning raised while dispatching a [`Transition`].
#[derive(Debug, Display, From, StdError)]
pub enum Warning {
    /// Notification email cannot be sent.
    #[display("cannot send `{_0}` email: {_1}")]
    Email(#[error(not(source))] Kind, #[error(source)] Traced<mailer::Error>),

    /// Notification skipped: the [`Interpreter`] has no email address.
    #[display("`Interpreter(id: {_0})` has no email address")]
    #[from(ignore)]
    NoRecipient(#[error(not(source))] interpreter::Id),

    /// Notification skipped: no [`Interpreter`] to notify.
    #[display("no interpreter to notify")]
    NoInterpreter,

    /// Financial bookkeeping failed.
    #[display("financial bookkeeping failed: {_0}")]
    Finance(Traced<database::Error>),

    /// Accept/decline link tokens cannot be issued.
    #[display("cannot issue action token: {_0}")]
    Token(jsonwebtoken::errors::Error),
}

/// Kind of a notification email sent to an [`Interpreter`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Kind {
    /// A new [`Assignment`] is offered, action required.
    New,

    /// The [`Assignment`] was confirmed.
    Confirmed,

    /// The [`Assignment`] was cancelled.
    Cancelled,

    /// The [`Assignment`] was completed.
    Completed,

    /// A no-show was recorded on the [`Assignment`].
    NoShow,
}

impl Kind {
    /// Returns the [`Kind`] of email the provided new [`Status`] calls for.
    #[must_use]
    pub fn for_status(status: Status) -> Option<Self> {
        match status {
            Status::Confirmed => Some(Self::Confirmed),
            Status::Cancelled => Some(Self::Cancelled),
            Status::Completed => Some(Self::Completed),
            Status::NoShow => Some(Self::NoShow),
            Status::Pending | Status::InProgress => None,
        }
    }

    /// Returns the subject line of this [`Kind`] of email.
    #[must_use]
    pub fn subject(self) -> &'static str {
        match self {
            Self::New => "New Assignment Available - Action Required",
            Self::Confirmed => "Assignment Confirmation",
            Self::Cancelled => "Assignment Cancelled",
            Self::Completed => "Assignment Completed",
            Self::NoShow => "Assignment No-Show Recorded",
        }
    }

    /// Returns the name of the template this [`Kind`] of email is rendered
    /// with.
    #[must_use]
    pub fn template(self) -> &'static str {
        match self {
            Self::New => "notifmail/assignment_new",
            Self::Confirmed => "notifmail/assignment_confirmed",
            Self::Cancelled => "notifmail/assignment_cancelled",
            Self::Completed => "notifmail/assignment_completed",
            Self::NoShow => "notifmail/assignment_no_show",
        }
    }

    /// Indicates whether this [`Kind`] of email carries a calendar invite.
    #[must_use]
    pub fn includes_calendar(self) -> bool {
        matches!(self, Self::Confirmed)
    }

    /// Returns the [`audit::Action`] recorded when this [`Kind`] of email
    /// is sent.
    #[must_use]
    pub fn audit_action(self) -> audit::Action {
        match self {
            Self::New => audit::Action::EmailSentNew,
            Self::Confirmed => audit::Action::EmailSentConfirmed,
            Self::Cancelled => audit::Action::EmailSentCancelled,
            Self::Completed => audit::Action::EmailSentCompleted,
            Self::NoShow => audit::Action::EmailSentNoShow,
        }
    }
}

impl<Db, M> Handler<Perform<Transition>> for Service<Db, M>
where
    Db: Database<Insert<Transaction>, Ok = (), Err = Traced<database::Error>>
        + Database<Insert<Payment>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<Payment>, Ok = (), Err = Traced<database::Error>>
        + Database<Insert<Expense>, Ok = (), Err = Traced<database::Error>>
        + Database<Update<Expense>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Select<By<Option<read::payment::Latest>, assignment::Id>>,
            Ok = Option<read::payment::Latest>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Expense>, finance::Id>>,
            Ok = Option<Expense>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<audit::Entry>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
    M: Mailer<Deliver<Email>, Ok = (), Err = Traced<mailer::Error>>,
{
    type Ok = Report;
    type Err = Infallible;

    async fn execute(
        &self,
        Perform(transition): Perform<Transition>,
    ) -> Result<Self::Ok, Self::Err> {
        let Transition {
            assignment,
            trigger,
            interpreter,
            actor,
        } = transition;

        let mut report = Report::default();

        match trigger {
            Trigger::Offered => {
                self.send_notification(
                    Kind::New,
                    &assignment,
                    interpreter.as_ref(),
                    &mut report,
                )
                .await;
            }
            Trigger::StatusChanged { old } => {
                if assignment.status != old {
                    self.keep_books(&assignment, actor.as_ref(), &mut report)
                        .await;
                }

                if let Some(kind) = Kind::for_status(assignment.status) {
                    self.send_notification(
                        kind,
                        &assignment,
                        interpreter.as_ref(),
                        &mut report,
                    )
                    .await;

                    if matches!(kind, Kind::Confirmed | Kind::Cancelled) {
                        self.notify_admins(
                            kind,
                            &assignment,
                            interpreter.as_ref(),
                            &mut report,
                        )
                        .await;
                    }
                }
            }
        }

        for warning in &report.warnings {
            log::warn!(
                "dispatching side effects of `Assignment(id: {})`: {warning}",
                assignment.id,
            );
        }

        Ok(report)
    }
}

impl<Db, M> Service<Db, M>
where
    M: Mailer<Deliver<Email>, Ok = (), Err = Traced<mailer::Error>>,
{
    /// Sends the provided [`Kind`] of notification email about the provided
    /// [`Assignment`] to its [`Interpreter`].
    ///
    /// Appends the audit [`audit::Entry`] on success, and a [`Warning`] to
    /// the provided [`Report`] on failure.
    async fn send_notification(
        &self,
        kind: Kind,
        assignment: &Assignment,
        interpreter: Option<&Interpreter>,
        report: &mut Report,
    ) where
        Db: Database<
            Insert<audit::Entry>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
    {
        let Some(interpreter) = interpreter else {
            report.warnings.push(Warning::NoInterpreter);
            return;
        };
        let Some(to) = &interpreter.email else {
            report.warnings.push(Warning::NoRecipient(interpreter.id));
            return;
        };

        let config = &self.config().notices;
        let reference = send_reference();

        let mut context = context(assignment, &interpreter.name);
        drop(context.insert("reference_id".into(), reference.clone()));

        if kind == Kind::New {
            let links = match self.offer_links(assignment.id) {
                Ok(links) => links,
                Err(e) => {
                    report.warnings.push(Warning::Token(e));
                    return;
                }
            };
            drop(context.insert("accept_url".into(), links.accept));
            drop(context.insert("decline_url".into(), links.decline));
        }

        let calendar = kind.includes_calendar().then(|| Attachment {
            filename: format!("invite-{reference}.ics"),
            mime_type: "text/calendar".into(),
            content: Invite {
                assignment,
                attendee_name: &interpreter.name,
                attendee_email: to,
                organizer: &config.sender,
                reference: &reference,
                domain: &config.domain,
            }
            .to_ics(),
        });

        let email = Email {
            to: to.clone(),
            subject: format!("{} [{reference}]", kind.subject()),
            template: kind.template().into(),
            context,
            headers: anti_threading_headers(&reference, &config.domain),
            calendar,
        };

        match self.mailer().execute(Deliver(email)).await {
            Ok(()) => {
                self.record(audit::Entry::new(
                    audit::Actor::new(interpreter.name.to_string()),
                    kind.audit_action(),
                    audit::Target::Assignment,
                    assignment.id,
                    serde_json::json!({ "email_type": kind.to_string() }),
                ))
                .await;
            }
            Err(e) => report.warnings.push(Warning::Email(kind, e)),
        }
    }

    /// Notifies the configured staff addresses about an interpreter response
    /// on the provided [`Assignment`].
    async fn notify_admins(
        &self,
        kind: Kind,
        assignment: &Assignment,
        interpreter: Option<&Interpreter>,
        report: &mut Report,
    ) {
        let config = &self.config().notices;
        let action = match kind {
            Kind::Confirmed => "accepted",
            Kind::Cancelled => "cancelled",
            Kind::New | Kind::Completed | Kind::NoShow => return,
        };

        for to in &config.admin_recipients {
            let reference = send_reference();

            let mut context = BTreeMap::new();
            drop(context.insert(
                "interpreter_name".into(),
                interpreter.map_or_else(
                    || "Unassigned".into(),
                    |i| i.name.to_string(),
                ),
            ));
            drop(context
                .insert("client_name".into(), assignment.client_display()));
            drop(context.insert("action".into(), action.into()));
            drop(context
                .insert("assignment_id".into(), assignment.id.to_string()));
            drop(context.insert("reference_id".into(), reference.clone()));

            let email = Email {
                to: to.clone(),
                subject: format!(
                    "Assignment {action} by {} [{reference}]",
                    interpreter.map_or_else(
                        || "Unassigned".into(),
                        |i| i.name.to_string(),
                    ),
                ),
                template: "notifmail/admin_assignment_response".into(),
                context,
                headers: anti_threading_headers(&reference, &config.domain),
                calendar: None,
            };

            if let Err(e) = self.mailer().execute(Deliver(email)).await {
                report.warnings.push(Warning::Email(kind, e));
            }
        }
    }

    /// Issues a fresh pair of accept/decline links for the provided
    /// [`Assignment`].
    fn offer_links(
        &self,
        id: assignment::Id,
    ) -> Result<OfferLinks, jsonwebtoken::errors::Error> {
        let config = &self.config().notices;
        let tokens = &self.config().tokens;

        let accept = tokens.issue(id, token::Action::Accept)?;
        let decline = tokens.issue(id, token::Action::Decline)?;
        Ok(OfferLinks {
            accept: format!(
                "{}/assignments/accept/{accept}",
                config.public_url,
            ),
            decline: format!(
                "{}/assignments/decline/{decline}",
                config.public_url,
            ),
        })
    }

    /// Performs the financial bookkeeping the new [`Status`] of the provided
    /// [`Assignment`] calls for.
    async fn keep_books(
        &self,
        assignment: &Assignment,
        actor: Option<&audit::Actor>,
        report: &mut Report,
    ) where
        Db: Database<
                Insert<Transaction>,
                Ok = (),
                Err = Traced<database::Error>,
            > + Database<Insert<Payment>, Ok = (), Err = Traced<database::Error>>
            + Database<Update<Payment>, Ok = (), Err = Traced<database::Error>>
            + Database<Insert<Expense>, Ok = (), Err = Traced<database::Error>>
            + Database<Update<Expense>, Ok = (), Err = Traced<database::Error>>
            + Database<
                Select<By<Option<read::payment::Latest>, assignment::Id>>,
                Ok = Option<read::payment::Latest>,
                Err = Traced<database::Error>,
            > + Database<
                Select<By<Option<Expense>, finance::Id>>,
                Ok = Option<Expense>,
                Err = Traced<database::Error>,
            >,
    {
        let result = match (assignment.status, assignment.interpreter_id) {
            (Status::Confirmed, Some(interpreter_id)) => self
                .create_payment(
                    assignment,
                    interpreter_id,
                    actor,
                    payment::Status::Pending,
                )
                .await
                .map(drop),
            (Status::Completed, _) => {
                self.settle_payment(assignment, actor).await
            }
            (Status::Cancelled, _) => self.void_payment(assignment).await,
            (Status::Confirmed, None)
            | (
                Status::Pending | Status::InProgress | Status::NoShow,
                _,
            ) => Ok(()),
        };

        if let Err(e) = result {
            report.warnings.push(Warning::Finance(e));
        }
    }

    /// Creates a new [`Payment`] (backed by an `EXPENSE` [`Transaction`])
    /// owed for the provided [`Assignment`].
    async fn create_payment(
        &self,
        assignment: &Assignment,
        interpreter_id: interpreter::Id,
        actor: Option<&audit::Actor>,
        status: payment::Status,
    ) -> Result<Payment, Traced<database::Error>>
    where
        Db: Database<
                Insert<Transaction>,
                Ok = (),
                Err = Traced<database::Error>,
            > + Database<Insert<Payment>, Ok = (), Err = Traced<database::Error>>,
    {
        let amount = assignment
            .total_payment
            .unwrap_or_else(|| assignment.total_payment());

        let transaction = Transaction {
            id: finance::Id::new(),
            kind: finance::Kind::Expense,
            amount,
            description: format!(
                "Interpreter payment for assignment #{}",
                assignment.id,
            ),
            created_by: actor.cloned(),
            created_at: finance::CreationDateTime::now(),
        };
        self.database()
            .execute(Insert(transaction.clone()))
            .await
            .map_err(tracerr::wrap!())?;

        let now = payment::CreationDateTime::now();
        let payment = Payment {
            id: payment::Id::new(),
            transaction_id: transaction.id,
            interpreter_id,
            assignment_id: assignment.id,
            amount,
            method: payment::Method::Ach,
            status,
            scheduled_at: (now + self.config().payment_terms).coerce(),
            processed_at: None,
            reference: payment::Reference::generate(assignment.id),
            created_at: now,
            updated_at: now.coerce(),
        };
        self.database()
            .execute(Insert(payment.clone()))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(payment)
    }

    /// Moves the latest [`Payment`] of the provided [`Assignment`] into
    /// processing (creating it first if it is missing) and books a `SALARY`
    /// [`Expense`] against its [`Transaction`].
    async fn settle_payment(
        &self,
        assignment: &Assignment,
        actor: Option<&audit::Actor>,
    ) -> Result<(), Traced<database::Error>>
    where
        Db: Database<
                Insert<Transaction>,
                Ok = (),
                Err = Traced<database::Error>,
            > + Database<Insert<Payment>, Ok = (), Err = Traced<database::Error>>
            + Database<Update<Payment>, Ok = (), Err = Traced<database::Error>>
            + Database<Insert<Expense>, Ok = (), Err = Traced<database::Error>>
            + Database<
                Select<By<Option<read::payment::Latest>, assignment::Id>>,
                Ok = Option<read::payment::Latest>,
                Err = Traced<database::Error>,
            >,
    {
        let payment = self
            .database()
            .execute(Select(By::<Option<read::payment::Latest>, _>::new(
                assignment.id,
            )))
            .await
            .map_err(tracerr::wrap!())?;

        let payment = match payment {
            Some(read::payment::Latest(mut payment)) => {
                if payment.mark_as_processing() {
                    self.database()
                        .execute(Update(payment.clone()))
                        .await
                        .map_err(tracerr::wrap!())?;
                }
                payment
            }
            None => {
                // No payment was created on confirmation, so book one now.
                let Some(interpreter_id) = assignment.interpreter_id else {
                    return Ok(());
                };
                self.create_payment(
                    assignment,
                    interpreter_id,
                    actor,
                    payment::Status::Processing,
                )
                .await
                .map_err(tracerr::wrap!())?
            }
        };

        let expense = Expense {
            id: expense::Id::new(),
            transaction_id: payment.transaction_id,
            kind: expense::Kind::Salary,
            amount: payment.amount,
            description: format!(
                "Interpreter payment expense for assignment #{}",
                assignment.id,
            ),
            status: expense::Status::Pending,
            incurred_at: expense::IncurringDateTime::now(),
            paid_at: None,
        };
        self.database()
            .execute(Insert(expense))
            .await
            .map_err(tracerr::wrap!())
    }

    /// Cancels the latest [`Payment`] of the provided [`Assignment`] (unless
    /// already settled) and rejects the linked [`Expense`] (unless paid).
    ///
    /// Tolerates the absence of both records.
    async fn void_payment(
        &self,
        assignment: &Assignment,
    ) -> Result<(), Traced<database::Error>>
    where
        Db: Database<Update<Payment>, Ok = (), Err = Traced<database::Error>>
            + Database<Update<Expense>, Ok = (), Err = Traced<database::Error>>
            + Database<
                Select<By<Option<read::payment::Latest>, assignment::Id>>,
                Ok = Option<read::payment::Latest>,
                Err = Traced<database::Error>,
            > + Database<
                Select<By<Option<Expense>, finance::Id>>,
                Ok = Option<Expense>,
                Err = Traced<database::Error>,
            >,
    {
        let Some(read::payment::Latest(mut payment)) = self
            .database()
            .execute(Select(By::<Option<read::payment::Latest>, _>::new(
                assignment.id,
            )))
            .await
            .map_err(tracerr::wrap!())?
        else {
            return Ok(());
        };

        if !payment.cancel() {
            return Ok(());
        }
        self.database()
            .execute(Update(payment.clone()))
            .await
            .map_err(tracerr::wrap!())?;

        let expense = self
            .database()
            .execute(Select(By::<Option<Expense>, _>::new(
                payment.transaction_id,
            )))
            .await
            .map_err(tracerr::wrap!())?;
        if let Some(mut expense) = expense {
            if expense.reject() {
                self.database()
                    .execute(Update(expense))
                    .await
                    .map_err(tracerr::wrap!())?;
            }
        }

        Ok(())
    }
}

impl<Db, M> Service<Db, M> {
    /// Records the provided audit [`audit::Entry`], best-effort: a storage
    /// failure is logged and never fails the calling operation.
    pub(crate) async fn record(&self, entry: audit::Entry)
    where
        Db: Database<
            Insert<audit::Entry>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
    {
        _ = self
            .database()
            .execute(Insert(entry))
            .await
            .map_err(|e| log::error!("cannot record audit entry: {e}"));
    }
}

/// Generates a short per-send unique reference, defeating client-side email
/// threading.
fn send_reference() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_owned()
}

/// Builds the display-string context the notification templates are
/// rendered with.
fn context(
    assignment: &Assignment,
    interpreter_name: &contact::Name,
) -> BTreeMap<String, String> {
    let mut context = BTreeMap::new();
    let mut put = |key: &str, value: String| {
        drop(context.insert(key.to_owned(), value));
    };

    put("interpreter_name", interpreter_name.to_string());
    put("client_name", assignment.client_display());
    put(
        "client_phone",
        assignment
            .client_phone
            .as_ref()
            .map_or("Not provided".into(), ToString::to_string),
    );
    put("service_type", assignment.service_type.to_string());
    put("location", assignment.location.to_string());
    put(
        "start_time",
        timezone::format(assignment.start_at, Timezone::Eastern),
    );
    put(
        "end_time",
        timezone::format(assignment.end_at, Timezone::Eastern),
    );
    put(
        "languages",
        format!(
            "{} -> {}",
            assignment.source_language, assignment.target_language,
        ),
    );
    put("rate", assignment.rate.to_string());
    put(
        "special_requirements",
        assignment
            .special_requirements
            .as_ref()
            .map_or("None".into(), ToString::to_string),
    );

    context
}

/// Builds the headers forcing mail clients to not thread related emails
/// together.
fn anti_threading_headers(
    reference: &str,
    domain: &str,
) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    let mut put = |key: &str, value: String| {
        drop(headers.insert(key.to_owned(), value));
    };

    put(
        "Message-ID",
        format!("<{}@{domain}>", Uuid::new_v4().simple()),
    );
    put("X-Entity-Ref-ID", format!("{reference}@{domain}"));
    put("X-No-Threading", "true".to_owned());
    put("Thread-Topic", format!("Assignment {reference}"));
    put("Thread-Index", reference.to_owned());

    headers
}

#[cfg(test)]
mod spec {
    use crate::domain::{assignment::Status, audit};

    use super::{anti_threading_headers, send_reference, Kind};

    #[test]
    fn email_kind_per_status() {
        assert_eq!(Kind::for_status(Status::Confirmed), Some(Kind::Confirmed));
        assert_eq!(Kind::for_status(Status::Cancelled), Some(Kind::Cancelled));
        assert_eq!(Kind::for_status(Status::Completed), Some(Kind::Completed));
        assert_eq!(Kind::for_status(Status::NoShow), Some(Kind::NoShow));
        assert_eq!(Kind::for_status(Status::Pending), None);
        assert_eq!(Kind::for_status(Status::InProgress), None);
    }

    #[test]
    fn only_confirmation_carries_calendar() {
        for kind in [
            Kind::New,
            Kind::Cancelled,
            Kind::Completed,
            Kind::NoShow,
        ] {
            assert!(!kind.includes_calendar(), "{kind}");
        }
        assert!(Kind::Confirmed.includes_calendar());
    }

    #[test]
    fn audit_actions_match_kinds() {
        assert_eq!(
            Kind::Confirmed.audit_action(),
            audit::Action::EmailSentConfirmed,
        );
        assert_eq!(Kind::NoShow.audit_action(), audit::Action::EmailSentNoShow);
    }

    #[test]
    fn send_references_are_unique() {
        let reference = send_reference();
        assert_eq!(reference.len(), 8);
        assert_ne!(reference, send_reference());
    }

    #[test]
    fn headers_defeat_threading() {
        let headers = anti_threading_headers("a1b2c3d4", "agency.example");

        assert_eq!(
            headers.get("X-Entity-Ref-ID").map(String::as_str),
            Some("a1b2c3d4@agency.example"),
        );
        assert_eq!(
            headers.get("X-No-Threading").map(String::as_str),
            Some("true"),
        );
        assert_eq!(headers.get("Thread-Index").map(String::as_str), Some("a1b2c3d4"));
        assert!(headers["Message-ID"].starts_with('<'));
        assert!(headers["Message-ID"].ends_with("@agency.example>"));
    }
}
