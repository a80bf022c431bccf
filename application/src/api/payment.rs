//! [`Payment`]-related definitions.

use common::{DateTime, Money};
use derive_more::{Display, From, Into};
use juniper::{graphql_object, GraphQLEnum, GraphQLScalar};
use service::domain;
use uuid::Uuid;

use crate::{api, Context};

/// Money owed to an interpreter for a confirmed `Assignment`.
#[derive(Clone, Debug, From)]
pub struct Payment(domain::Payment);

/// Money owed to an interpreter for a confirmed `Assignment`.
#[graphql_object(context = Context)]
impl Payment {
    /// Unique identifier of this `Payment`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Payment.id",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn id(&self) -> Id {
        self.0.id.into()
    }

    /// Amount of `Money` owed.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Payment.amount",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn amount(&self) -> Money {
        self.0.amount
    }

    /// Status of this `Payment`.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Payment.status",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn status(&self) -> Status {
        self.0.status.into()
    }

    /// Method this `Payment` is made with.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Payment.method",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn method(&self) -> Method {
        self.0.method.into()
    }

    /// Unique reference of this `Payment`, quoted in payroll documents.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Payment.reference",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn reference(&self) -> String {
        self.0.reference.to_string()
    }

    /// `DateTime` when this `Payment` is scheduled to be made.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Payment.scheduledAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn scheduled_at(&self) -> DateTime {
        self.0.scheduled_at.coerce()
    }

    /// `DateTime` when this `Payment` was processed, if it was.
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "Payment.processedAt",
            otel.name = api::Query::SPAN_NAME,
        ),
    )]
    pub fn processed_at(&self) -> Option<DateTime> {
        self.0.processed_at.map(common::DateTimeOf::coerce)
    }
}

/// Unique identifier of a `Payment`.
#[derive(
    Clone, Copy, Debug, Display, Eq, From, GraphQLScalar, Into, PartialEq,
)]
#[from(domain::finance::payment::Id)]
#[into(domain::finance::payment::Id)]
#[graphql(name = "PaymentId", transparent)]
pub struct Id(Uuid);

/// Status of a `Payment`.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PaymentStatus")]
pub enum Status {
    /// Awaiting processing.
    Pending,

    /// Being processed.
    Processing,

    /// Paid out.
    Completed,

    /// Processing failed.
    Failed,

    /// Called off.
    Cancelled,
}

impl From<domain::finance::payment::Status> for Status {
    fn from(status: domain::finance::payment::Status) -> Self {
        use domain::finance::payment::Status as S;

        match status {
            S::Pending => Self::Pending,
            S::Processing => Self::Processing,
            S::Completed => Self::Completed,
            S::Failed => Self::Failed,
            S::Cancelled => Self::Cancelled,
        }
    }
}

/// Method a `Payment` is made with.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
#[graphql(name = "PaymentMethod")]
pub enum Method {
    /// ACH transfer.
    Ach,

    /// Paper check.
    Check,

    /// Bank wire transfer.
    BankTransfer,

    /// Zelle transfer.
    Zelle,

    /// PayPal transfer.
    Paypal,

    /// Any other method.
    Other,
}

impl From<domain::finance::payment::Method> for Method {
    fn from(method: domain::finance::payment::Method) -> Self {
        use domain::finance::payment::Method as M;

        match method {
            M::Ach => Self::Ach,
            M::Check => Self::Check,
            M::BankTransfer => Self::BankTransfer,
            M::Zelle => Self::Zelle,
            M::Paypal => Self::Paypal,
            M::Other => Self::Other,
        }
    }
}
