//! [`Mailer`]-related implementations.
//!
//! Rendering of the named templates and the actual transport are external
//! collaborators: a [`Mailer`] only hands over a fully described [`Email`].

use std::collections::BTreeMap;

use common::operations::Deliver;
use derive_more::{Display, Error as StdError, From};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Serialize;
use tracerr::Traced;

use crate::domain::contact;

/// Port delivering [`Email`]s.
pub use common::Handler as Mailer;

/// Outgoing email, described rather than rendered: a named template plus a
/// mapping of display strings, leaving rendering and transport to the
/// delivery service.
#[derive(Clone, Debug, Serialize)]
pub struct Email {
    /// Address this [`Email`] is sent to.
    pub to: contact::Email,

    /// Subject line.
    pub subject: String,

    /// Name of the template to render the body with.
    pub template: String,

    /// Display strings the template is rendered with.
    pub context: BTreeMap<String, String>,

    /// Additional message headers.
    pub headers: BTreeMap<String, String>,

    /// Calendar invite attached to this [`Email`], if any.
    pub calendar: Option<Attachment>,
}

/// Attachment of an [`Email`].
#[derive(Clone, Debug, Serialize)]
pub struct Attachment {
    /// File name of this [`Attachment`].
    pub filename: String,

    /// MIME type of this [`Attachment`].
    pub mime_type: String,

    /// Textual content of this [`Attachment`].
    pub content: String,
}

/// [`Mailer`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Delivery request cannot be performed.
    #[display("delivery request failed: {_0}")]
    Http(reqwest::Error),

    /// Delivery endpoint refused the [`Email`].
    #[display("delivery endpoint rejected the email: HTTP {_0}")]
    #[from(ignore)]
    Rejected(#[error(not(source))] u16),
}

/// Configuration of the [`Http`] [`Mailer`].
#[derive(Clone, Debug)]
pub struct Config {
    /// URL of the delivery endpoint the [`Email`]s are POSTed to.
    pub endpoint: String,

    /// Bearer token authorizing against the delivery endpoint, if required.
    pub token: Option<SecretString>,
}

/// [`Mailer`] delivering [`Email`]s to a transactional-mail HTTP endpoint.
#[derive(Clone, Debug)]
pub struct Http {
    /// HTTP client performing the requests.
    client: reqwest::Client,

    /// [`Config`] of this [`Mailer`].
    config: Config,
}

impl Http {
    /// Creates a new [`Http`] [`Mailer`] with the provided [`Config`].
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

impl Mailer<Deliver<Email>> for Http {
    type Ok = ();
    type Err = Traced<Error>;

    async fn execute(
        &self,
        Deliver(email): Deliver<Email>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut request =
            self.client.post(&self.config.endpoint).json(&email);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(tracerr::new!(Error::Rejected(status.as_u16())));
        }

        Ok(())
    }
}
