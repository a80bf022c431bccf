//! [`Command`] for accepting an [`Assignment`] offer via an emailed link.

use std::convert::Infallible;

use common::{
    operations::{By, Commit, Insert, Lock, Perform, Select, Transact, Transacted},
    Handler,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    dispatch,
    domain::{assignment, audit, interpreter, Assignment, Interpreter},
    infra::{database, Database},
    token, Service,
};

use super::Command;

/// [`Command`] for accepting an [`Assignment`] offer via an emailed link.
///
/// Verifies the accept [`token::Token`], confirms the [`Assignment`] and
/// dispatches the side effects of the confirmation: interpreter payment
/// bookkeeping, confirmation email with a calendar invite, and staff
/// notifications.
#[derive(Clone, Debug)]
pub struct AcceptAssignment {
    /// Accept [`token::Token`] from the emailed link.
    pub token: token::Token,
}

/// Output of an [`AcceptAssignment`] [`Command`] execution.
#[derive(Debug)]
pub struct Output {
    /// The confirmed [`Assignment`].
    pub assignment: Assignment,

    /// [`Interpreter`] the [`Assignment`] is confirmed by, if still
    /// registered.
    pub interpreter: Option<Interpreter>,

    /// Non-fatal warnings raised while dispatching side effects.
    pub warnings: Vec<dispatch::Warning>,
}

impl<Db, M> Command<AcceptAssignment> for Service<Db, M>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Select<By<Option<Assignment>, assignment::Id>>,
            Ok = Option<Assignment>,
            Err = Traced<database::Error>,
        > + Database<
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
        cmd: AcceptAssignment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let AcceptAssignment { token } = cmd;

        let id = self
            .config()
            .tokens
            .verify(&token, token::Action::Accept)
            .ok_or(E::InvalidToken)
            .map_err(tracerr::wrap!())?;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent responses upon the same `Assignment`.
        tx.execute(Lock(By::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut assignment = tx
            .execute(Select(By::<Option<Assignment>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::AssignmentNotExists(id))
            .map_err(tracerr::wrap!())?;

        let old_status = assignment.status;
        if !assignment.confirm() {
            return Err(tracerr::new!(E::AlreadyProcessed(id)));
        }

        tx.execute(Insert(assignment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let interpreter = if let Some(interpreter_id) =
            assignment.interpreter_id
        {
            self.database()
                .execute(Select(By::<Option<Interpreter>, _>::new(
                    interpreter_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
        } else {
            None
        };

        self.record(audit::Entry::new(
            interpreter
                .as_ref()
                .and_then(|i| audit::Actor::new(i.name.to_string())),
            audit::Action::AssignmentAccepted,
            audit::Target::Assignment,
            assignment.id,
            serde_json::json!({
                "old_status": old_status.to_string(),
                "new_status": assignment.status.to_string(),
            }),
        ))
        .await;

        let dispatch::Report { warnings } = self
            .execute(Perform(dispatch::Transition {
                assignment: assignment.clone(),
                trigger: dispatch::Trigger::StatusChanged { old: old_status },
                interpreter: interpreter.clone(),
                actor: interpreter
                    .as_ref()
                    .and_then(|i| audit::Actor::new(i.name.to_string())),
            }))
            .await
            .unwrap_or_else(|e| match e {});

        Ok(Output {
            assignment,
            interpreter,
            warnings,
        })
    }
}

/// Error of [`AcceptAssignment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Assignment`] is no longer awaiting a response.
    #[display("`Assignment(id: {_0})` has already been processed")]
    AlreadyProcessed(#[error(not(source))] assignment::Id),

    /// [`Assignment`] the token points to does not exist.
    #[display("`Assignment(id: {_0})` does not exist")]
    AssignmentNotExists(#[error(not(source))] assignment::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// Provided token is malformed, expired, or authorizes another action.
    #[display("invalid or expired action token")]
    InvalidToken,
}

#[cfg(test)]
mod spec {
    use std::sync::atomic::Ordering;

    use common::Money;
    use rust_decimal::Decimal;

    use crate::{
        domain::{
            assignment::Status,
            finance::{self, payment},
        },
        testing, token, Command as _,
    };

    use super::{AcceptAssignment, ExecutionError};

    #[tokio::test]
    async fn confirms_and_books_exactly_one_payment() {
        let (service, database, mailer) = testing::service();
        let interpreter = testing::interpreter(Some("maria@example.com"));
        let assignment =
            testing::assignment(Status::Pending, Some(interpreter.id));
        testing::seed(&database, [interpreter], [assignment.clone()]);

        let token = service
            .config()
            .tokens
            .issue(assignment.id, token::Action::Accept)
            .unwrap();
        let output = service
            .execute(AcceptAssignment { token })
            .await
            .unwrap();

        assert!(output.warnings.is_empty(), "{:?}", output.warnings);
        assert_eq!(output.assignment.status, Status::Confirmed);

        let state = database.state.lock().unwrap();
        assert_eq!(
            state.assignments[&assignment.id].status,
            Status::Confirmed,
        );
        assert_eq!(state.payments.len(), 1);
        assert_eq!(state.transactions.len(), 1);

        // 1 actual hour at $50/hour, billed at the 2 hours minimum.
        let payment = &state.payments[0];
        assert_eq!(payment.amount, Money::from(Decimal::from(100)));
        assert_eq!(payment.status, payment::Status::Pending);
        assert_eq!(payment.assignment_id, assignment.id);
        assert_eq!(state.transactions[0].kind, finance::Kind::Expense);

        // Confirmation email (with the calendar invite) to the interpreter,
        // plus one staff notification.
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(AsRef::<str>::as_ref(&sent[0].to), "maria@example.com");
        assert!(sent[0].calendar.is_some());
        assert_eq!(AsRef::<str>::as_ref(&sent[1].to), "ops@agency.example");
    }

    #[tokio::test]
    async fn second_click_reports_already_processed() {
        let (service, database, mailer) = testing::service();
        let interpreter = testing::interpreter(Some("maria@example.com"));
        let assignment =
            testing::assignment(Status::Pending, Some(interpreter.id));
        testing::seed(&database, [interpreter], [assignment.clone()]);

        let token = service
            .config()
            .tokens
            .issue(assignment.id, token::Action::Accept)
            .unwrap();
        drop(
            service
                .execute(AcceptAssignment {
                    token: token.clone(),
                })
                .await
                .unwrap(),
        );
        let mails_after_first = mailer.sent.lock().unwrap().len();

        let err = service
            .execute(AcceptAssignment { token })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AlreadyProcessed(id) if *id == assignment.id,
        ));

        // No duplicate payment and no duplicate email.
        let state = database.state.lock().unwrap();
        assert_eq!(state.payments.len(), 1);
        assert_eq!(mailer.sent.lock().unwrap().len(), mails_after_first);
    }

    #[tokio::test]
    async fn rejects_invalid_token() {
        let (service, _, _) = testing::service();

        let err = service
            .execute(AcceptAssignment {
                token: "garbage".parse().unwrap(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::InvalidToken));
    }

    #[tokio::test]
    async fn rejects_decline_token() {
        let (service, database, _) = testing::service();
        let interpreter = testing::interpreter(Some("maria@example.com"));
        let assignment =
            testing::assignment(Status::Pending, Some(interpreter.id));
        testing::seed(&database, [interpreter], [assignment.clone()]);

        let token = service
            .config()
            .tokens
            .issue(assignment.id, token::Action::Decline)
            .unwrap();
        let err = service
            .execute(AcceptAssignment { token })
            .await
            .unwrap_err();
        assert!(matches!(err.as_ref(), ExecutionError::InvalidToken));
    }

    #[tokio::test]
    async fn reports_unknown_assignment() {
        let (service, _, _) = testing::service();

        let token = service
            .config()
            .tokens
            .issue(crate::domain::assignment::Id::new(), token::Action::Accept)
            .unwrap();
        let err = service
            .execute(AcceptAssignment { token })
            .await
            .unwrap_err();
        assert!(matches!(
            err.as_ref(),
            ExecutionError::AssignmentNotExists(_),
        ));
    }

    #[tokio::test]
    async fn email_failure_is_a_warning_not_an_error() {
        let (service, database, mailer) = testing::service();
        mailer.fail.store(true, Ordering::Relaxed);

        let interpreter = testing::interpreter(Some("maria@example.com"));
        let assignment =
            testing::assignment(Status::Pending, Some(interpreter.id));
        testing::seed(&database, [interpreter], [assignment.clone()]);

        let token = service
            .config()
            .tokens
            .issue(assignment.id, token::Action::Accept)
            .unwrap();
        let output = service
            .execute(AcceptAssignment { token })
            .await
            .unwrap();

        // The committed transition and its bookkeeping stand.
        assert!(!output.warnings.is_empty());
        let state = database.state.lock().unwrap();
        assert_eq!(
            state.assignments[&assignment.id].status,
            Status::Confirmed,
        );
        assert_eq!(state.payments.len(), 1);
    }
}
