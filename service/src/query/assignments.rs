//! [`Query`] collection related to multiple [`Assignment`]s.

use common::operations::By;

use crate::read;
#[cfg(doc)]
use crate::{domain::Assignment, Query};

use super::DatabaseQuery;

/// Queries a [`read::assignment::list::Page`] of [`Assignment`]s.
pub type List = DatabaseQuery<
    By<read::assignment::list::Page, read::assignment::list::Selector>,
>;

/// Queries the total count of [`Assignment`]s.
pub type TotalCount =
    DatabaseQuery<By<read::assignment::list::TotalCount, ()>>;
