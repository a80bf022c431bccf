//! [`Assignment`] read model definition.

pub mod list {
    //! [`Assignment`]s list definitions.

    use std::ops;

    use common::define_pagination;
    use derive_more::{From, Into};

    use crate::domain::{assignment, contact};
    #[cfg(doc)]
    use crate::domain::Assignment;

    define_pagination!(Cursor, Node, Filter);

    /// Node in a [`Connection`].
    pub type Node = (assignment::Id, assignment::Status);

    /// Cursor pointing to a specific [`Assignment`] in a list.
    pub type Cursor = assignment::Id;

    /// Filter for [`Selector`].
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`assignment::Status`] to filter by.
        pub status: Option<assignment::Status>,

        /// Client [`contact::Name`] (or its part) to fuzzy search for.
        pub client_name: Option<contact::Name>,
    }

    /// Total count of [`Assignment`]s.
    #[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
    pub struct TotalCount(i32);

    impl ops::Div for TotalCount {
        type Output = f64;

        fn div(self, rhs: Self) -> Self::Output {
            f64::from(self.0) / f64::from(rhs.0)
        }
    }
}
