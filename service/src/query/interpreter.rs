//! [`Query`] collection related to a single [`Interpreter`].

use common::operations::By;

use crate::domain::{interpreter, Interpreter};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries an [`Interpreter`] by its [`interpreter::Id`].
pub type ById = DatabaseQuery<By<Option<Interpreter>, interpreter::Id>>;
