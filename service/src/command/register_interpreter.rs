//! [`Command`] for registering a new [`Interpreter`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    Rate,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{
        audit, contact,
        interpreter::{self, CreationDateTime},
        Interpreter,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`Interpreter`].
///
/// The welcome email is not sent inline: it is enqueued and delivered later
/// by the background [`task::SendWelcomeEmails`] [`Task`].
///
/// [`Task`]: crate::Task
/// [`task::SendWelcomeEmails`]: crate::task::SendWelcomeEmails
#[derive(Clone, Debug)]
pub struct RegisterInterpreter {
    /// Name of the new [`Interpreter`].
    pub name: contact::Name,

    /// Email address of the new [`Interpreter`].
    pub email: Option<contact::Email>,

    /// Phone number of the new [`Interpreter`].
    pub phone: Option<contact::Phone>,

    /// Default hourly [`Rate`] of the new [`Interpreter`].
    pub rate: Option<Rate>,

    /// Staff actor registering the [`Interpreter`], if known.
    pub initiator: Option<audit::Actor>,
}

impl<Db, M> Command<RegisterInterpreter> for Service<Db, M>
where
    Db: Database<Transact, Err = Traced<database::Error>>
        + Database<
            Insert<audit::Entry>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
    Transacted<Db>: Database<Insert<Interpreter>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Interpreter;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RegisterInterpreter,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RegisterInterpreter {
            name,
            email,
            phone,
            rate,
            initiator,
        } = cmd;

        let interpreter = Interpreter {
            id: interpreter::Id::new(),
            name,
            email,
            phone,
            rate,
            active: true,
            created_at: CreationDateTime::now(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        tx.execute(Insert(interpreter.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        self.record(audit::Entry::new(
            initiator,
            audit::Action::InterpreterRegistered,
            audit::Target::Interpreter,
            interpreter.id,
            serde_json::json!({
                "name": interpreter.name.to_string(),
            }),
        ))
        .await;

        if interpreter.email.is_some() {
            self.enqueue_welcome_email(interpreter.id);
        }

        Ok(interpreter)
    }
}

/// Error of [`RegisterInterpreter`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),
}
