//! [`Task`] definitions.

pub mod background;
pub mod send_welcome_emails;

/// [`Task`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Task;

pub use self::{
    background::Background, send_welcome_emails::SendWelcomeEmails,
};
