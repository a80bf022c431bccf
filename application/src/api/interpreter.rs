//! [`Interpreter`]-related definitions.

use common::{DateTime, Rate};
use derive_more::{AsRef, Display, From, Into};
use futures::TryFutureExt as _;
use juniper::{graphql_object, GraphQLScalar};
use service::{domain, query, Query as _};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    api::{self, scalar},
    AsError, Context, Error,
};

/// Interpreter working missions for the agency.
#[derive(Clone, Debug, From)]
pub struct Interpreter {
    /// ID of this [`Interpreter`].
    pub id: Id,

    /// [`domain::Interpreter`] representing this [`Interpreter`].
    interpreter: OnceCell<domain::Interpreter>,
}

impl From<domain::Interpreter> for Interpreter {
    fn from(interpreter: domain::Interpreter) -> Self {
        Self {
            id: interpreter.id.into(),
            interpreter: OnceCell::new_with(Some(interpreter)),
        }
    }
}

impl Interpreter {
    /// Creates a new [`Interpreter`] with the provided ID.
    ///
    /// # Safety
    ///
    /// Caller must ensure that [`Interpreter`] with the provided ID exists,
    /// otherwise accessing this [`Interpreter`] will result with an error.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(id: impl Into<Id>) -> Self {
        Self {
            id: id.into(),
            interpreter: OnceCell::new(),
        }
    }

    /// Returns the [`domain::Interpreter`] representing this [`Interpreter`].
    ///
    /// # Errors
    ///
    /// Error if the [`domain::Interpreter`] doesn't exist.
    async fn interpreter(
        &self,
        ctx: &Context,
    ) -> Result<&domain::Interpreter, Error> {
        let id = self.id.into();
        self.interpreter
            .get_or_try_init(|| {
                ctx.service()
                    .execute(query::interpreter::ById::by(id))
                    .map_err(AsError::into_error)
                    .map_err(ctx.error())
                    .and_then(|i| {
                        futures::future::ready(i.ok_or_else(|| {
                            api::query::InterpreterError::NotExists.into()
                        }))
                    })
            })
            .await
    }
}

/// Interpreter working missions for the agency.
#[graphql_object(context = Context)]
impl Interpreter {
    /// Unique identifier of this `Interpreter`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Interpreter.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.id
    }

    /// Name of this `Interpreter`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Interpreter.name",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn name(&self, ctx: &Context) -> Result<Name, Error> {
        Ok(self.interpreter(ctx).await?.name.clone().into())
    }

    /// Email of this `Interpreter`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Interpreter.email",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn email(&self, ctx: &Context) -> Result<Option<Email>, Error> {
        Ok(self.interpreter(ctx).await?.email.clone().map(Into::into))
    }

    /// Phone of this `Interpreter`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Interpreter.phone",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn phone(&self, ctx: &Context) -> Result<Option<Phone>, Error> {
        Ok(self.interpreter(ctx).await?.phone.clone().map(Into::into))
    }

    /// Default hourly `Rate` of this `Interpreter`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Interpreter.rate",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn rate(&self, ctx: &Context) -> Result<Option<Rate>, Error> {
        Ok(self.interpreter(ctx).await?.rate)
    }

    /// Indicator whether this `Interpreter` accepts new missions.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Interpreter.active",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn active(&self, ctx: &Context) -> Result<bool, Error> {
        Ok(self.interpreter(ctx).await?.active)
    }

    /// `DateTime` when this `Interpreter` was registered.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Interpreter.createdAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub async fn created_at(&self, ctx: &Context) -> Result<DateTime, Error> {
        Ok(self.interpreter(ctx).await?.created_at.coerce())
    }
}

/// Unique identifier of an `Interpreter`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::interpreter::Id)]
#[into(domain::interpreter::Id)]
#[graphql(name = "InterpreterId", transparent)]
pub struct Id(Uuid);

/// Name of an `Interpreter` or a client contact.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ContactName",
    with = scalar::Via::<domain::contact::Name>,
)]
pub struct Name(domain::contact::Name);

/// Email address.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ContactEmail",
    with = scalar::Via::<domain::contact::Email>,
)]
pub struct Email(domain::contact::Email);

/// Phone number.
#[derive(AsRef, Clone, Debug, Display, From, GraphQLScalar, Into)]
#[graphql(
    name = "ContactPhone",
    with = scalar::Via::<domain::contact::Phone>,
)]
pub struct Phone(domain::contact::Phone);
