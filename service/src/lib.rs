//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod dispatch;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;
pub mod token;

#[cfg(test)]
pub(crate) mod testing;

use std::{error::Error as StdError, time::Duration};

use common::operations::{By, Start};
use tokio::sync::mpsc;
use tracing as log;

use crate::domain::interpreter;
#[cfg(doc)]
use crate::{domain::Interpreter, infra::Database, infra::Mailer};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [`token::Signer`] issuing and verifying action tokens.
    pub tokens: token::Signer,

    /// Notification dispatch configuration.
    pub notices: dispatch::Config,

    /// Time between a payment being created and falling due.
    pub payment_terms: Duration,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, M> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Mailer`] of this [`Service`].
    mailer: M,

    /// Queue of [`Interpreter`]s awaiting their welcome email.
    welcome_queue: mpsc::UnboundedSender<interpreter::Id>,
}

impl<Db, M> Service<Db, M> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(config: Config, database: Db, mailer: M) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<
                        task::SendWelcomeEmails<Self>,
                        task::send_welcome_emails::Queue,
                    >,
                >,
                Ok = (),
                Err: StdError,
            > + Clone
            + 'static,
    {
        let (welcome_queue, receiver) = mpsc::unbounded_channel();
        let this = Service {
            config,
            database,
            mailer,
            welcome_queue,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(receiver.into()))).await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Mailer`] of this [`Service`].
    #[must_use]
    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    /// Enqueues a welcome email for the provided [`Interpreter`].
    ///
    /// Fire-and-forget: the email is sent later by the background
    /// [`task::SendWelcomeEmails`] [`Task`] loading fresh state.
    pub fn enqueue_welcome_email(&self, id: interpreter::Id) {
        _ = self.welcome_queue.send(id).map_err(|e| {
            log::error!("cannot enqueue welcome email for `{}`: {e}", e.0);
        });
    }
}
