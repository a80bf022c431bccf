//! Infrastructure layer.

pub mod database;
pub mod mailer;

pub use self::database::Database;
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
pub use self::mailer::Mailer;
