//! [`Command`] for offering an [`Assignment`] to an [`Interpreter`].

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

/// [`Command`] for offering a still-pending [`Assignment`] to an
/// [`Interpreter`] (or re-offering it to another one).
///
/// Sends the "new assignment" email with freshly issued accept/decline
/// links.
#[derive(Clone, Debug)]
pub struct OfferAssignment {
    /// ID of the [`Assignment`] to offer.
    pub assignment_id: assignment::Id,

    /// ID of the [`Interpreter`] to offer the [`Assignment`] to.
    pub interpreter_id: interpreter::Id,

    /// Staff actor making the offer, if known.
    pub initiator: Option<audit::Actor>,
}

/// Output of an [`OfferAssignment`] [`Command`] execution.
#[derive(Debug)]
pub struct Output {
    /// The offered [`Assignment`].
    pub assignment: Assignment,

    /// Non-fatal warnings raised while dispatching side effects.
    pub warnings: Vec<dispatch::Warning>,
}

impl<Db, M> Command<OfferAssignment> for Service<Db, M>
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
        cmd: OfferAssignment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let OfferAssignment {
            assignment_id,
            interpreter_id,
            initiator,
        } = cmd;

        let interpreter = self
            .database()
            .execute(Select(By::<Option<Interpreter>, _>::new(interpreter_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::InterpreterNotExists(interpreter_id))
            .map_err(tracerr::wrap!())?;
        if !interpreter.active {
            return Err(tracerr::new!(E::InterpreterInactive(interpreter_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent offers upon the same `Assignment`.
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

        if assignment.status != Status::Pending {
            return Err(tracerr::new!(E::NotPending(assignment_id)));
        }

        assignment.interpreter_id = Some(interpreter_id);
        assignment.updated_at = assignment::UpdateDateTime::now();

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
            audit::Action::AssignmentOffered,
            audit::Target::Assignment,
            assignment.id,
            serde_json::json!({
                "interpreter_id": interpreter_id.to_string(),
            }),
        ))
        .await;

        let dispatch::Report { warnings } = self
            .execute(Perform(dispatch::Transition {
                assignment: assignment.clone(),
                trigger: dispatch::Trigger::Offered,
                interpreter: Some(interpreter),
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

/// Error of [`OfferAssignment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Assignment`] with the provided ID does not exist.
    #[display("`Assignment(id: {_0})` does not exist")]
    AssignmentNotExists(#[error(not(source))] assignment::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Interpreter`] does not accept new missions.
    #[display("`Interpreter(id: {_0})` is inactive")]
    InterpreterInactive(#[error(not(source))] interpreter::Id),

    /// [`Interpreter`] with the provided ID does not exist.
    #[display("`Interpreter(id: {_0})` does not exist")]
    InterpreterNotExists(#[error(not(source))] interpreter::Id),

    /// [`Assignment`] is not awaiting an offer anymore.
    #[display("`Assignment(id: {_0})` is not pending")]
    NotPending(#[error(not(source))] assignment::Id),
}
