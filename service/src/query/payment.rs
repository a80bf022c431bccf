//! [`Query`] collection related to [`Payment`]s.

use common::operations::By;

use crate::{domain::assignment, read};
#[cfg(doc)]
use crate::{domain::{Assignment, Payment}, Query};

use super::DatabaseQuery;

/// Queries the latest (by creation time) [`Payment`] of an [`Assignment`].
pub type LatestByAssignment =
    DatabaseQuery<By<Option<read::payment::Latest>, assignment::Id>>;
