//! [`SendWelcomeEmails`] [`Task`].
//!
//! Welcome emails are decoupled from the registration request: the command
//! only enqueues the interpreter ID, and this [`Task`] later loads the
//! fresh state and performs the actual send, fire-and-forget.

use std::{collections::BTreeMap, convert::Infallible, error::Error};

use common::operations::{By, Deliver, Perform, Select, Start};
use derive_more::{Debug, Display, Error as StdError, From};
use tokio::sync::mpsc;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{interpreter, Interpreter},
    infra::{
        database,
        mailer::{self, Email},
        Database, Mailer,
    },
    Service,
};

use super::Task;

/// Queue of [`Interpreter`]s awaiting their welcome email.
#[derive(Debug, From)]
pub struct Queue(#[debug(skip)] mpsc::UnboundedReceiver<interpreter::Id>);

/// [`Task`] sending welcome emails to freshly registered [`Interpreter`]s.
#[derive(Clone, Copy, Debug)]
pub struct SendWelcomeEmails<S> {
    /// [`Service`] instance.
    service: S,
}

impl<Db, M> Task<Start<By<SendWelcomeEmails<Self>, Queue>>>
    for Service<Db, M>
where
    SendWelcomeEmails<Self>:
        Task<Perform<interpreter::Id>, Ok = (), Err: Error>,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<SendWelcomeEmails<Self>, Queue>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Queue(mut receiver) = by.into_inner();
        let task = SendWelcomeEmails {
            service: self.clone(),
        };

        while let Some(id) = receiver.recv().await {
            _ = task.execute(Perform(id)).await.map_err(|e| {
                log::error!("`task::SendWelcomeEmails` failed: {e}");
            });
        }

        Ok(())
    }
}

impl<Db, M> Task<Perform<interpreter::Id>>
    for SendWelcomeEmails<Service<Db, M>>
where
    Db: Database<
        Select<By<Option<Interpreter>, interpreter::Id>>,
        Ok = Option<Interpreter>,
        Err = Traced<database::Error>,
    >,
    M: Mailer<Deliver<Email>, Ok = (), Err = Traced<mailer::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        Perform(id): Perform<interpreter::Id>,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let interpreter = self
            .service
            .database()
            .execute(Select(By::<Option<Interpreter>, _>::new(id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::InterpreterNotExists(id))
            .map_err(tracerr::wrap!())?;

        let Some(to) = &interpreter.email else {
            // Nothing to deliver to, which is fine for a courtesy email.
            return Ok(());
        };

        let mut context = BTreeMap::new();
        drop(context.insert("name".to_owned(), interpreter.name.to_string()));

        self.service
            .mailer()
            .execute(Deliver(Email {
                to: to.clone(),
                subject: "Welcome - Join Our Interpreter Network".into(),
                template: "emails/welcome_interpreter".into(),
                context,
                headers: BTreeMap::new(),
                calendar: None,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
    }
}

/// Error of [`SendWelcomeEmails`] execution.
#[derive(Debug, Display, From, StdError)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Interpreter`] with the provided ID does not exist.
    #[display("`Interpreter(id: {_0})` does not exist")]
    InterpreterNotExists(#[error(not(source))] interpreter::Id),

    /// [`Mailer`] error.
    #[display("`Mailer` delivery failed: {_0}")]
    Mailer(mailer::Error),
}
