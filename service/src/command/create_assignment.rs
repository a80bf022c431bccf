//! [`Command`] for creating a new [`Assignment`].

use std::convert::Infallible;

use common::{
    operations::{By, Commit, Insert, Perform, Select, Transact, Transacted},
    Handler, Hours, Rate,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    dispatch,
    domain::{
        assignment::{
            self, CreationDateTime, EndDateTime, Language, Location,
            ServiceType, StartDateTime, Status, Text, UpdateDateTime,
        },
        audit, contact, interpreter, Assignment, Interpreter,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Assignment`], either directly by staff
/// or out of an accepted quote's agreed terms.
///
/// A new [`Assignment`] starts [`Status::Pending`]; when an [`Interpreter`]
/// is attached right away, the offer email with accept/decline links goes
/// out immediately.
#[derive(Clone, Debug)]
pub struct CreateAssignment {
    /// Name of the client the [`Assignment`] serves, if known.
    pub client_name: Option<contact::Name>,

    /// Email address of the client, if known.
    pub client_email: Option<contact::Email>,

    /// Phone number of the client, if known.
    pub client_phone: Option<contact::Phone>,

    /// ID of the [`Interpreter`] to offer the [`Assignment`] to.
    pub interpreter_id: Option<interpreter::Id>,

    /// [`ServiceType`] of the [`Assignment`].
    pub service_type: ServiceType,

    /// [`Language`] interpreted from.
    pub source_language: Language,

    /// [`Language`] interpreted to.
    pub target_language: Language,

    /// When the mission starts.
    pub start_at: StartDateTime,

    /// When the mission ends.
    pub end_at: EndDateTime,

    /// [`Location`] of the mission.
    pub location: Location,

    /// Hourly [`Rate`] the [`Interpreter`] is paid at.
    ///
    /// Falls back to the [`Interpreter`]'s default rate when omitted.
    pub rate: Option<Rate>,

    /// Minimum billable [`Hours`].
    pub minimum_hours: Hours,

    /// Free-form staff notes.
    pub notes: Option<Text>,

    /// Special requirements communicated to the [`Interpreter`].
    pub special_requirements: Option<Text>,

    /// Staff actor creating the [`Assignment`], if known.
    pub initiator: Option<audit::Actor>,
}

/// Output of a [`CreateAssignment`] [`Command`] execution.
#[derive(Debug)]
pub struct Output {
    /// The created [`Assignment`].
    pub assignment: Assignment,

    /// Non-fatal warnings raised while dispatching side effects.
    pub warnings: Vec<dispatch::Warning>,
}

impl<Db, M> Command<CreateAssignment> for Service<Db, M>
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
    Transacted<Db>: Database<Insert<Assignment>, Err = Traced<database::Error>>
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
        cmd: CreateAssignment,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateAssignment {
            client_name,
            client_email,
            client_phone,
            interpreter_id,
            service_type,
            source_language,
            target_language,
            start_at,
            end_at,
            location,
            rate,
            minimum_hours,
            notes,
            special_requirements,
            initiator,
        } = cmd;

        if end_at <= start_at.coerce() {
            return Err(tracerr::new!(E::InvalidTimeWindow));
        }

        let interpreter = if let Some(interpreter_id) = interpreter_id {
            let interpreter = self
                .database()
                .execute(Select(By::<Option<Interpreter>, _>::new(
                    interpreter_id,
                )))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::InterpreterNotExists(interpreter_id))
                .map_err(tracerr::wrap!())?;
            if !interpreter.active {
                return Err(tracerr::new!(E::InterpreterInactive(
                    interpreter_id
                )));
            }
            Some(interpreter)
        } else {
            None
        };

        let rate = rate
            .or_else(|| interpreter.as_ref().and_then(|i| i.rate))
            .ok_or(E::RateRequired)
            .map_err(tracerr::wrap!())?;

        let now = CreationDateTime::now();
        let mut assignment = Assignment {
            id: assignment::Id::new(),
            client_name,
            client_email,
            client_phone,
            interpreter_id,
            service_type,
            source_language,
            target_language,
            start_at,
            end_at,
            location,
            status: Status::Pending,
            rate,
            minimum_hours,
            total_payment: None,
            is_paid: None,
            notes,
            special_requirements,
            created_at: now,
            updated_at: UpdateDateTime::now(),
            completed_at: None,
        };
        assignment.total_payment = Some(assignment.total_payment());

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
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
            audit::Action::AssignmentCreated,
            audit::Target::Assignment,
            assignment.id,
            serde_json::json!({
                "status": assignment.status.to_string(),
                "interpreter_id": assignment
                    .interpreter_id
                    .map(|id| id.to_string()),
            }),
        ))
        .await;

        let warnings = if interpreter.is_some() {
            let dispatch::Report { warnings } = self
                .execute(Perform(dispatch::Transition {
                    assignment: assignment.clone(),
                    trigger: dispatch::Trigger::Offered,
                    interpreter,
                    actor: initiator,
                }))
                .await
                .unwrap_or_else(|e| match e {});
            warnings
        } else {
            Vec::new()
        };

        Ok(Output {
            assignment,
            warnings,
        })
    }
}

/// Error of [`CreateAssignment`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
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

    /// Mission end time is not after its start time.
    #[display("mission end time must be after its start time")]
    InvalidTimeWindow,

    /// No rate provided and the [`Interpreter`] has no default one.
    #[display("an hourly rate is required")]
    RateRequired,
}
