//! GraphQL [`Query`]s definitions.

use juniper::graphql_object;
use service::{query, read, Query as _};

use crate::{api, define_error, AsError, Context, Error};

/// Root of all GraphQL queries.
#[derive(Clone, Copy, Debug)]
pub struct Query;

impl Query {
    /// Name of the [`tracing::Span`] for the queries.
    pub(crate) const SPAN_NAME: &'static str = "GraphQL query";
}

#[graphql_object(context = Context)]
impl Query {
    /// Returns the `Assignment` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ASSIGNMENT_NOT_EXISTS` - the `Assignment` with the specified ID
    ///                             does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "assignment",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn assignment(
        id: api::assignment::Id,
        ctx: &Context,
    ) -> Result<api::Assignment, Error> {
        ctx.service()
            .execute(query::assignment::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| AssignmentError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Fetches the page of `Assignment`s.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `AMBIGUOUS_PAGINATION_ARGUMENTS` - the pagination arguments are
    ///                                      ambiguous.
    #[tracing::instrument(
        skip_all,
        fields(
            after = ?after,
            before = ?before,
            first = ?first,
            gql.name = "assignments",
            last = ?last,
            status = ?status,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn assignments(
        first: Option<i32>,
        after: Option<api::assignment::list::Cursor>,
        last: Option<i32>,
        before: Option<api::assignment::list::Cursor>,
        status: Option<api::assignment::Status>,
        client_name: Option<api::interpreter::Name>,
        ctx: &Context,
    ) -> Result<api::assignment::list::Connection, Error> {
        const DEFAULT_PAGE_SIZE: i32 = 10;

        let arguments = read::assignment::list::Arguments::new(
            first,
            after.map(Into::into),
            last,
            before.map(Into::into),
            DEFAULT_PAGE_SIZE,
        )
        .ok_or_else(|| api::PaginationError::Ambiguous.into())
        .map_err(ctx.error())?;

        ctx.service()
            .execute(query::assignments::List::by(
                read::assignment::list::Selector {
                    arguments,
                    filter: read::assignment::list::Filter {
                        status: status.map(Into::into),
                        client_name: client_name.map(Into::into),
                    },
                },
            ))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }

    /// Returns the `Interpreter` with the specified ID.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INTERPRETER_NOT_EXISTS` - the `Interpreter` with the specified ID
    ///                              does not exist.
    #[tracing::instrument(
        skip_all,
        fields(
            id = %id,
            gql.name = "interpreter",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn interpreter(
        id: api::interpreter::Id,
        ctx: &Context,
    ) -> Result<api::Interpreter, Error> {
        ctx.service()
            .execute(query::interpreter::ById::by(id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?
            .ok_or_else(|| InterpreterError::NotExists.into())
            .map_err(ctx.error())
            .map(Into::into)
    }
}

define_error! {
    enum AssignmentError {
        #[code = "ASSIGNMENT_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Assignment does not exist"]
        NotExists,
    }
}

define_error! {
    enum InterpreterError {
        #[code = "INTERPRETER_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "Interpreter does not exist"]
        NotExists,
    }
}
