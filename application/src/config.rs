//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use service::{domain::contact, token};
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Service configuration.
    pub service: Service,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(8080)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Service configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Service {
    /// Secret the emailed action tokens are signed with.
    #[default(SecretString::from("secret"))]
    pub token_secret: SecretString,

    /// How long an emailed action token stays valid.
    #[default(token::Signer::VALIDITY)]
    #[serde(with = "humantime_serde")]
    pub token_validity: time::Duration,

    /// Notification configuration.
    pub notices: Notices,

    /// Email delivery configuration.
    pub mailer: Mailer,

    /// Payment bookkeeping configuration.
    pub payments: Payments,
}

impl TryFrom<Service> for service::Config {
    type Error = String;

    fn try_from(value: Service) -> Result<Self, Self::Error> {
        let Service {
            token_secret,
            token_validity,
            notices,
            mailer: _,
            payments,
        } = value;

        let sender = contact::Email::new(&notices.sender)
            .ok_or_else(|| format!("invalid sender email: {}", notices.sender))?;
        let admin_recipients = notices
            .admin_recipients
            .iter()
            .map(|a| {
                contact::Email::new(a)
                    .ok_or_else(|| format!("invalid admin email: {a}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            tokens: token::Signer::new(
                token_secret.expose_secret().as_bytes(),
                token_validity,
            ),
            notices: service::dispatch::Config {
                sender,
                admin_recipients,
                public_url: notices.public_url,
                domain: notices.domain,
            },
            payment_terms: payments.terms,
        })
    }
}

/// Notification configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Notices {
    /// Email address the notifications are sent from.
    #[default("noreply@agency.localhost".to_owned())]
    pub sender: String,

    /// Staff email addresses notified about interpreter responses.
    pub admin_recipients: Vec<String>,

    /// Public base URL the emailed accept/decline links point to.
    #[default("http://127.0.0.1:8080".to_owned())]
    pub public_url: String,

    /// Domain scoping message IDs and calendar UIDs.
    #[default("agency.localhost".to_owned())]
    pub domain: String,
}

/// Email delivery configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Mailer {
    /// URL of the delivery endpoint emails are POSTed to.
    #[default("http://127.0.0.1:8025/api/send".to_owned())]
    pub endpoint: String,

    /// Bearer token authorizing against the delivery endpoint.
    pub token: Option<SecretString>,
}

impl From<Mailer> for service::infra::mailer::Config {
    fn from(value: Mailer) -> Self {
        let Mailer { endpoint, token } = value;
        Self { endpoint, token }
    }
}

/// Payment bookkeeping configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Payments {
    /// Time between a payment being created and falling due.
    #[default(time::Duration::from_secs(14 * 24 * 60 * 60))]
    #[serde(with = "humantime_serde")]
    pub terms: time::Duration,
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default("postgres".to_owned())]
    pub password: String,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,
}

impl From<Postgres> for service::infra::postgres::Config {
    fn from(value: Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
        } = value;

        Self {
            host: Some(host),
            port: Some(port),
            user: Some(user),
            password: Some(password),
            dbname: Some(dbname),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}
