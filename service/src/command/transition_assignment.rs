//! [`Command`] for transitioning an [`Assignment`] status by staff.

use std::convert::Infallible;

use common::{
    operations::{By, Commit, Insert, Lock, Perform, Select, Transact, Transacted},
    Handler,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    dispatch,
    domain::{
        assignment::{self, Status},
        audit, interpreter, Assignment, Interpreter,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for transitioning an [`Assignment`] status by staff.
///
/// This is the explicit pipeline behind every staff-driven status change:
/// guard check, committed mutation, then side-effect dispatch (emails and
/// financial bookkeeping) for the new status.
#[derive(Clone, Debug)]
pub struct TransitionAssignment {
    /// ID of the [`Assignment`] to transition.
    pub assignment_id: assignment::Id,

    /// [`Action`] to perform.
    pub action: Action,

    /// Staff actor requesting the transition, if known.
    pub initiator: Option<audit::Actor>,
}

/// Action transitioning an [`Assignment`] status.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    /// Confirm a pending [`Assignment`].
    Confirm,

    /// Start a confirmed [`Assignment`].
    Start,

    /// Complete a confirmed or in-progress [`Assignment`].
    Complete,

    /// Cancel a pending or confirmed [`Assignment`].
    Cancel,

    /// Record a no-show on a confirmed or in-progress [`Assignment`].
    NoShow,
}

/// Output of a [`TransitionAssignment`] [`Command`] execution.
#[derive(Debug)]
pub struct Output {
    /// The transitioned [`Assignment`].
    pub assignment: Assignment,

    /// Non-fatal warnings raised while dispatching side effects.
    pub warnings: Vec<dispatch::Warning>,
}

impl<Db, M> Command<TransitionAssignment> for Service<Db, M>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Interpreter>, interpreter::Id>>,
            Ok = Option<Interpreter>,
            Err = Traced<database::Error>,
        > + Database<
            Insert<audit::Entry>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<
            Lock<By<Assignment, assignment::Id>>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Assignment>, assignment::Id>>,
            Ok = Option<Assignment>,
            Err = Traced<database::Error>,
        > + Database<Insert<Assignment>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
    Self: Handler<
        Perform<dispatch::Transition>,
        Ok = dispatch::Report,
        Err = Infallible,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: TransitionAssignment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let TransitionAssignment {
            assignment_id,
            action,
            initiator,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent transitions upon the same `Assignment`.
        tx.execute(Lock(By::new(assignment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut assignment = tx
            .execute(Select(By::<Option<Assignment>, _>::new(assignment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AssignmentNotExists(assignment_id))
            .map_err(tracerr::wrap!())?;

        let old_status = assignment.status;
        let mut detached = None;
        let applied = match action {
            Action::Confirm => assignment.confirm(),
            Action::Start => assignment.start(),
            Action::Complete => assignment.complete(),
            Action::Cancel => {
                // `cancel()` reports success via the detached interpreter,
                // which may legitimately be absent, so guard explicitly.
                if assignment.can_be_cancelled() {
                    detached = assignment.cancel();
                    true
                } else {
                    false
                }
            }
            Action::NoShow => assignment.mark_no_show(),
        };
        if !applied {
            return Err(tracerr::new!(E::IllegalTransition {
                action,
                from: old_status,
            }));
        }

        tx.execute(Insert(assignment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.record(audit::Entry::new(
            initiator.clone(),
            audit::Action::StatusChanged,
            audit::Target::Assignment,
            assignment.id,
            serde_json::json!({
                "action": action.to_string(),
                "old_status": old_status.to_string(),
                "new_status": assignment.status.to_string(),
            }),
        ))
        .await;

        // Cancellations notify the interpreter just detached; every other
        // transition notifies the currently attached one.
        let notified = detached.or(assignment.interpreter_id);
        let interpreter = if let Some(interpreter_id) = notified {
            self.database()
                .execute(Select(By::<Option<Interpreter>, _>::new(
                    interpreter_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
        } else {
            None
        };

        let dispatch::Report { warnings } = self
            .execute(Perform(dispatch::Transition {
                assignment: assignment.clone(),
                trigger: dispatch::Trigger::StatusChanged { old: old_status },
                interpreter,
                actor: initiator,
            }))
            .await
            .unwrap_or_else(|e| match e {});

        Ok(Output {
            assignment,
            warnings,
        })
    }
}

/// Error of [`TransitionAssignment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Assignment`] with the provided ID does not exist.
    #[display("`Assignment(id: {_0})` does not exist")]
    AssignmentNotExists(#[error(not(source))] assignment::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Requested [`Action`] is not legal in the current [`Status`].
    #[display("cannot `{action}` an assignment in status `{from}`")]
    IllegalTransition {
        /// Requested [`Action`].
        action: Action,

        /// [`Status`] the [`Assignment`] currently is in.
        from: Status,
    },
}

#[cfg(test)]
mod spec {
    use crate::{
        domain::{
            assignment::Status,
            audit,
            finance::{expense, payment},
        },
        testing, token, Command as _,
    };
    use crate::command::AcceptAssignment;

    use super::{Action, ExecutionError, TransitionAssignment};

    /// Seeds a pending offer and accepts it, so a payment exists.
    async fn accepted(
        service: &crate::Service<testing::InMemory, testing::RecordingMailer>,
        database: &testing::InMemory,
    ) -> crate::domain::assignment::Id {
        let interpreter = testing::interpreter(Some("maria@example.com"));
        let assignment =
            testing::assignment(Status::Pending, Some(interpreter.id));
        let id = assignment.id;
        testing::seed(database, [interpreter], [assignment]);

        let token = service
            .config()
            .tokens
            .issue(id, token::Action::Accept)
            .unwrap();
        drop(service.execute(AcceptAssignment { token }).await.unwrap());
        id
    }

    #[tokio::test]
    async fn cancel_voids_payment_and_notifies_detached_interpreter() {
        let (service, database, mailer) = testing::service();
        let id = accepted(&service, &database).await;
        let mails_after_accept = mailer.sent.lock().unwrap().len();

        let output = service
            .execute(TransitionAssignment {
                assignment_id: id,
                action: Action::Cancel,
                initiator: audit::Actor::new("dispatcher@staff"),
            })
            .await
            .unwrap();

        assert!(output.warnings.is_empty(), "{:?}", output.warnings);
        assert_eq!(output.assignment.status, Status::Cancelled);
        assert_eq!(output.assignment.interpreter_id, None);

        let state = database.state.lock().unwrap();
        assert_eq!(state.payments.len(), 1);
        assert_eq!(state.payments[0].status, payment::Status::Cancelled);

        // Cancellation email still reaches the detached interpreter, plus
        // one staff notification.
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), mails_after_accept + 2);
        assert_eq!(AsRef::<str>::as_ref(&sent[mails_after_accept].to), "maria@example.com");
    }

    #[tokio::test]
    async fn complete_processes_payment_and_books_expense() {
        let (service, database, _) = testing::service();
        let id = accepted(&service, &database).await;

        let output = service
            .execute(TransitionAssignment {
                assignment_id: id,
                action: Action::Complete,
                initiator: audit::Actor::new("dispatcher@staff"),
            })
            .await
            .unwrap();

        assert!(output.warnings.is_empty(), "{:?}", output.warnings);
        assert_eq!(output.assignment.status, Status::Completed);
        assert!(output.assignment.completed_at.is_some());

        let state = database.state.lock().unwrap();
        assert_eq!(state.payments.len(), 1);
        assert_eq!(state.payments[0].status, payment::Status::Processing);
        assert_eq!(state.expenses.len(), 1);
        assert_eq!(state.expenses[0].kind, expense::Kind::Salary);
        assert_eq!(state.expenses[0].status, expense::Status::Pending);
        assert_eq!(
            state.expenses[0].transaction_id,
            state.payments[0].transaction_id,
        );
    }

    #[tokio::test]
    async fn illegal_transition_mutates_nothing() {
        let (service, database, mailer) = testing::service();
        let interpreter = testing::interpreter(Some("maria@example.com"));
        let assignment =
            testing::assignment(Status::Pending, Some(interpreter.id));
        testing::seed(&database, [interpreter], [assignment.clone()]);

        let err = service
            .execute(TransitionAssignment {
                assignment_id: assignment.id,
                action: Action::Start,
                initiator: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::IllegalTransition {
                action: Action::Start,
                from: Status::Pending,
            },
        ));
        let state = database.state.lock().unwrap();
        assert_eq!(state.assignments[&assignment.id].status, Status::Pending);
        assert!(state.payments.is_empty());
        assert!(mailer.sent.lock().unwrap().is_empty());
    }
}
