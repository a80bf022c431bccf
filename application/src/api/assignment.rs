//! [`Assignment`]-related definitions.

use common::{DateTime, Hours, Money, Rate};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::{domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// One scheduled interpretation job.
#[derive(Clone, Debug, From)]
pub struct Assignment {
    /// ID of this [`Assignment`].
    pub id: Id,

    /// [`domain::Assignment`] representing this [`Assignment`].
    assignment: OnceCell<domain::Assignment>,
}

impl From<domain::Assignment> for Assignment {
    fn from(assignment: domain::Assignment) -> Self {
        Self {
            id: assignment.id.into(),
            assignment: OnceCell::new_with(Some(assignment)),
        }
    }
}

impl Assignment {
    /// Creates a new [`Assignment`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Assignment`] with the provided ID exists,
    /// otherwise accessing this [`Assignment`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            assignment: OnceCell::new(),
        }
    }

    /// Returns the [`domain::Assignment`] representing this [`Assignment`].
    ///
    /// # Errors
    ///
    /// Error if the [`domain::Assignment`] doesn't exist.
    async fn assignment(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Assignment, Error> {
        let id = self.id.into();
        self.assignment
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::assignment::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|a| {
                        futures::future::ready(a.ok_or_else(|| {
                            api::query::AssignmentError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// One scheduled interpretation job.
#[graphql_object(context = Context)]
impl Assignment {
    /// Unique identifier of this `Assignment`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Displayable client name of this `Assignment`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.clientName",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn client_name(&self, ctx: &Context) -> Result<String, Error> {
        Ok(self.assignment(ctx).await?.client_display())
    }

    /// Status of this `Assignment`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn status(&self, ctx: &Context) -> Result<Status, Error> {
        Ok(self.assignment(ctx).await?.status.into())
    }

    /// `Interpreter` this `Assignment` is offered to, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.interpreter",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn interpreter(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Interpreter>, Error> {
        Ok(self.assignment(ctx).await?.interpreter_id.map(|id| {
            #[expect(
                unsafe_code,
                reason = "`Assignment` loaded from repository guarantees \
                          `Interpreter` existence"
            )]
            unsafe {
                api::Interpreter::new_unchecked(id)
            }
        }))
    }

    /// Latest `Payment` owed for this `Assignment`, if any.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.payment",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn payment(
        &self,
        ctx: &Context,
    ) -> Result<Option<api::Payment>, Error> {
        ctx.service()
            .execute(query::payment::LatestByAssignment::by(self.id.into()))
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(|latest| latest.map(|l| l.0.into()))
    }

    /// Type of the interpretation service.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.serviceType",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn service_type(
        &self,
        ctx: &Context,
    ) -> Result<ServiceType, Error> {
        Ok(self.assignment(ctx).await?.service_type.clone().into())
    }

    /// Language interpreted from.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.sourceLanguage",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn source_language(
        &self,
        ctx: &Context,
    ) -> Result<Language, Error> {
        Ok(self.assignment(ctx).await?.source_language.clone().into())
    }

    /// Language interpreted to.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.targetLanguage",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn target_language(
        &self,
        ctx: &Context,
    ) -> Result<Language, Error> {
        Ok(self.assignment(ctx).await?.target_language.clone().into())
    }

    /// `DateTime` when the mission starts.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.startAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn start_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.assignment(ctx).await?.start_at.coerce())
    }

    /// `DateTime` when the mission ends.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.endAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn end_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.assignment(ctx).await?.end_at.coerce())
    }

    /// Displayable location of the mission.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.location",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn location(&self, ctx: &Context) -> Result<String, Error> {
        Ok(self.assignment(ctx).await?.location.to_string())
    }

    /// Hourly `Rate` the interpreter is paid at.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.rate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn rate(&self, ctx: &Context) -> Result<Rate, Error> {
        Ok(self.assignment(ctx).await?.rate)
    }

    /// Minimum billable `Hours` of this `Assignment`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.minimumHours",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn minimum_hours(&self, ctx: &Context) -> Result<Hours, Error> {
        Ok(self.assignment(ctx).await?.minimum_hours)
    }

    /// Total `Money` owed to the interpreter.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.totalPayment",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn total_payment(
        &self,
        ctx: &Context,
    ) -> Result<Option<Money>, Error> {
        Ok(self.assignment(ctx).await?.total_payment)
    }

    /// Indicator whether this `Assignment` has been paid out.
    ///
    /// `null` means the decision is still pending.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.isPaid",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn is_paid(&self, ctx: &Context) -> Result<Option<bool>, Error> {
        Ok(self.assignment(ctx).await?.is_paid)
    }

    /// Special requirements communicated to the interpreter.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.specialRequirements",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn special_requirements(
        &self,
        ctx: &Context,
    ) -> Result<Option<String>, Error> {
        Ok(self
            .assignment(ctx)
            .await?
            .special_requirements
            .as_ref()
            .map(ToString::to_string))
    }

    /// `DateTime` when this `Assignment` was created.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.assignment(ctx).await?.created_at.coerce())
    }

    /// `DateTime` when this `Assignment` was completed, if it was.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Assignment.completedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn completed_at(
        &self,
        ctx: &Context,
    ) -> Result<Option<DateTime>, Error> {
        Ok(self
            .assignment(ctx)
            .await?
            .completed_at
            .map(common::DateTimeOf::coerce))
    }
}

/// Unique identifier of an `Assignment`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::assignment::Id)]
#[into(domain::assignment::Id)]
#[graphql(name = "AssignmentId", transparent)]
pub struct Id(Uuid);

/// Status of an `Assignment`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "AssignmentStatus")]
pub enum Status {
    /// Offered to an interpreter, awaiting the response.
    Pending,

    /// Accepted by the interpreter.
    Confirmed,

    /// Mission underway.
    InProgress,

    /// Mission finished.
    Completed,

    /// Declined or called off.
    Cancelled,

    /// Client or interpreter absent.
    NoShow,
}

impl From<domain::assignment::Status> for Status {
    fn from(status: domain::assignment::Status) -> Self {
        use domain::assignment::Status as S;

        match status {
            S::Pending => Self::Pending,
            S::Confirmed => Self::Confirmed,
            S::InProgress => Self::InProgress,
            S::Completed => Self::Completed,
            S::Cancelled => Self::Cancelled,
            S::NoShow => Self::NoShow,
        }
    }
}

impl From<Status> for domain::assignment::Status {
    fn from(status: Status) -> Self {
        use domain::assignment::Status as S;

        match status {
            Status::Pending => S::Pending,
            Status::Confirmed => S::Confirmed,
            Status::InProgress => S::InProgress,
            Status::Completed => S::Completed,
            Status::Cancelled => S::Cancelled,
            Status::NoShow => S::NoShow,
        }
    }
}

/// Type of an interpretation service.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ServiceType",
    with = scalar::Via::<domain::assignment::ServiceType>,
)]
pub struct ServiceType(domain::assignment::ServiceType);

/// Name of a spoken language.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "Language",
    with = scalar::Via::<domain::assignment::Language>,
)]
pub struct Language(domain::assignment::Language);

/// Short free-form text field.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "Text",
    with = scalar::Via::<domain::assignment::Text>,
)]
pub struct Text(domain::assignment::Text);

pub mod list {
    //! Definitions related to [`Assignment`] list.

    use derive_more::{AsRef, From, Into};
    use juniper::{graphql_object, GraphQLScalar};
    use service::{query, read, Query as _};

    use crate::{api::scalar, AsError, Context, Error};

    use super::{Assignment, Id, Status};

    /// Cursor for the `Assignment` list.
    #[derive(AsRef, Clone, Copy, Debug, From, GraphQLScalar, Into)]
    #[from(Id, read::assignment::list::Cursor)]
    #[graphql(
        name = "AssignmentListCursor",
        with = scalar::Via::<read::assignment::list::Cursor>,
    )]
    pub struct Cursor(pub read::assignment::list::Cursor);

    /// Edge in the [`Assignment`] list.
    #[derive(Clone, Copy, Debug, From, Into)]
    pub struct Edge(read::assignment::list::Edge);

    /// Edge in the `Assignment` list.
    #[graphql_object(name = "AssignmentListEdge", context = Context)]
    impl Edge {
        /// Cursor of this `AssignmentListEdge`.
        #[must_use]
        pub fn cursor(&self) -> Cursor {
            self.0.cursor.into()
        }

        /// Node of this `AssignmentListEdge`.
        #[must_use]
        pub fn node(&self) -> Assignment {
            #[expect(
                unsafe_code,
                reason = "`Edge` loaded from repository guarantees \
                          `Assignment` existence"
            )]
            unsafe {
                Assignment::new_unchecked(self.0.node.0)
            }
        }

        /// Status of the `Assignment` this `AssignmentListEdge` points to.
        #[must_use]
        pub fn status(&self) -> Status {
            self.0.node.1.into()
        }
    }

    /// Connection of the [`Assignment`] list.
    #[derive(Clone, Debug, From, Into)]
    pub struct Connection(read::assignment::list::Connection);

    /// Connection of the `Assignment` list.
    #[graphql_object(name = "AssignmentListConnection", context = Context)]
    impl Connection {
        /// Edges in this `AssignmentListConnection`.
        #[must_use]
        pub fn edges(&self) -> Vec<Edge> {
            self.0.edges.iter().copied().map(Into::into).collect()
        }

        /// Information about the page.
        #[must_use]
        pub fn page_info(&self) -> PageInfo {
            PageInfo {
                info: self.0.page_info(),
                start_cursor: self.0.edges.first().map(|e| e.cursor.into()),
                end_cursor: self.0.edges.last().map(|e| e.cursor.into()),
            }
        }
    }

    /// Information about a [`Connection`] page.
    #[derive(Clone, Copy, Debug)]
    pub struct PageInfo {
        /// Underlying [`read::assignment::list::PageInfo`].
        info: read::assignment::list::PageInfo,

        /// Start cursor of the page.
        start_cursor: Option<Cursor>,

        /// End cursor of the page.
        end_cursor: Option<Cursor>,
    }

    /// Information about an `AssignmentListConnection` page.
    #[graphql_object(name = "AssignmentListPageInfo", context = Context)]
    impl PageInfo {
        /// Indicator whether there is a next page.
        #[must_use]
        pub fn has_next_page(&self) -> bool {
            self.info.has_next_page
        }

        /// Indicator whether there is a previous page.
        #[must_use]
        pub fn has_previous_page(&self) -> bool {
            self.info.has_previous_page
        }

        /// Start cursor of the page.
        #[must_use]
        pub fn start_cursor(&self) -> &Option<Cursor> {
            &self.start_cursor
        }

        /// End cursor of the page.
        #[must_use]
        pub fn end_cursor(&self) -> &Option<Cursor> {
            &self.end_cursor
        }

        /// Total `Assignment`s count.
        pub async fn total_count(&self, ctx: &Context) -> Result<i32, Error> {
            ctx.service()
                .execute(query::assignments::TotalCount::by(()))
                .await
                .map_err(AsError::into_error)
                .map_err(ctx.error())
                .map(Into::into)
        }
    }
}
