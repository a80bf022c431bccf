//! [`Payment`] read model definition.

use crate::domain::Payment;
#[cfg(doc)]
use crate::domain::Assignment;

/// Wrapper around [`Payment`] indicating the latest one (by creation time)
/// of an [`Assignment`].
///
/// At most one "active" [`Payment`] exists per [`Assignment`], and readers
/// always resolve it as the latest created one.
#[derive(Clone, Debug)]
pub struct Latest(pub Payment);
