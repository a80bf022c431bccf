//! [`Query`] collection related to a single [`Assignment`].

use common::operations::By;

use crate::domain::{assignment, Assignment};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries an [`Assignment`] by its [`assignment::Id`].
pub type ById = DatabaseQuery<By<Option<Assignment>, assignment::Id>>;
