//! [`Command`] for declining an [`Assignment`] offer via an emailed link.

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

/// [`Command`] for declining an [`Assignment`] offer via an emailed link.
///
/// Verifies the decline [`token::Token`], cancels the [`Assignment`]
/// (detaching its [`Interpreter`], while the record itself is preserved for
/// audit purposes) and dispatches the cancellation side effects.
#[derive(Clone, Debug)]
pub struct DeclineAssignment {
    /// Decline [`token::Token`] from the emailed link.
    pub token: token::Token,
}

/// Output of a [`DeclineAssignment`] [`Command`] execution.
#[derive(Debug)]
pub struct Output {
    /// The cancelled [`Assignment`].
    pub assignment: Assignment,

    /// [`Interpreter`] who declined, if still registered.
    pub interpreter: Option<Interpreter>,

    /// Non-fatal warnings raised while dispatching side effects.
    pub warnings: Vec<dispatch::Warning>,
}

impl<Db, M> Command<DeclineAssignment> for Service<Db, M>
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
        cmd: DeclineAssignment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeclineAssignment { token } = cmd;

        let id = self
            .config()
            .tokens
            .verify(&token, token::Action::Decline)
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

        // An emailed link only answers a still-pending offer: anything else
        // has already been processed one way or another.
        let old_status = assignment.status;
        if old_status != assignment::Status::Pending {
            return Err(tracerr::new!(E::AlreadyProcessed(id)));
        }
        let declined_by = assignment.cancel();

        tx.execute(Insert(assignment.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let interpreter = if let Some(interpreter_id) = declined_by {
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
            audit::Action::AssignmentDeclined,
            audit::Target::Assignment,
            assignment.id,
            serde_json::json!({
                "old_status": old_status.to_string(),
                "new_status": assignment.status.to_string(),
                "reason": "declined_by_interpreter",
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

/// Error of [`DeclineAssignment`] [`Command`] execution.
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
    use crate::{
        domain::assignment::Status, testing, token, Command as _,
    };

    use super::{DeclineAssignment, ExecutionError};

    #[tokio::test]
    async fn cancels_and_detaches_interpreter() {
        let (service, database, mailer) = testing::service();
        let interpreter = testing::interpreter(Some("maria@example.com"));
        let assignment =
            testing::assignment(Status::Pending, Some(interpreter.id));
        testing::seed(&database, [interpreter], [assignment.clone()]);

        let token = service
            .config()
            .tokens
            .issue(assignment.id, token::Action::Decline)
            .unwrap();
        let output = service
            .execute(DeclineAssignment { token })
            .await
            .unwrap();

        assert!(output.warnings.is_empty(), "{:?}", output.warnings);
        assert_eq!(output.assignment.status, Status::Cancelled);
        assert_eq!(output.assignment.interpreter_id, None);

        let state = database.state.lock().unwrap();
        let stored = &state.assignments[&assignment.id];
        assert_eq!(stored.status, Status::Cancelled);
        assert_eq!(stored.interpreter_id, None);
        // No payment ever existed for the pending offer.
        assert!(state.payments.is_empty());

        // Decline confirmation to the (now detached) interpreter, plus one
        // staff notification.
        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert_eq!(AsRef::<str>::as_ref(&sent[0].to), "maria@example.com");
        assert!(sent[0].calendar.is_none());
        assert_eq!(AsRef::<str>::as_ref(&sent[1].to), "ops@agency.example");
    }

    #[tokio::test]
    async fn confirmed_assignment_is_already_processed() {
        let (service, database, _) = testing::service();
        let interpreter = testing::interpreter(Some("maria@example.com"));
        let assignment =
            testing::assignment(Status::Confirmed, Some(interpreter.id));
        testing::seed(&database, [interpreter], [assignment.clone()]);

        let token = service
            .config()
            .tokens
            .issue(assignment.id, token::Action::Decline)
            .unwrap();
        let err = service
            .execute(DeclineAssignment { token })
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            ExecutionError::AlreadyProcessed(id) if *id == assignment.id,
        ));
        let state = database.state.lock().unwrap();
        assert_eq!(
            state.assignments[&assignment.id].status,
            Status::Confirmed,
        );
    }
}
