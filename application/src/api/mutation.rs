//! GraphQL [`Mutation`]s definitions.

use common::{DateTime, Hours, Rate};
use juniper::{graphql_object, GraphQLEnum, GraphQLObject};
use service::{command, dispatch, domain, Command as _};

use crate::{api, AsError, Context, Error};

/// Root of all GraphQL mutations.
#[derive(Clone, Copy, Debug)]
pub struct Mutation;

impl Mutation {
    /// Name of the [`tracing::Span`] for the mutations.
    const SPAN_NAME: &'static str = "GraphQL mutation";
}

/// Result of an `Assignment` mutation.
///
/// Side-effect failures (a notification or bookkeeping step) never fail the
/// committed mutation itself: they surface here as `warnings`.
#[derive(Debug, GraphQLObject)]
#[graphql(context = Context, name = "AssignmentMutationResult")]
pub struct AssignmentResult {
    /// The mutated `Assignment`.
    pub assignment: api::Assignment,

    /// Non-fatal warnings raised while dispatching side effects.
    pub warnings: Vec<String>,
}

impl AssignmentResult {
    /// Creates a new [`AssignmentResult`] out of the mutated
    /// [`domain::Assignment`] and dispatch [`dispatch::Warning`]s.
    fn new(
        assignment: domain::Assignment,
        warnings: Vec<dispatch::Warning>,
    ) -> Self {
        Self {
            assignment: assignment.into(),
            warnings: warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Action transitioning an `Assignment` status.
#[derive(Clone, Copy, Debug, Eq, GraphQLEnum, PartialEq)]
pub enum TransitionAction {
    /// Confirm a pending `Assignment`.
    Confirm,

    /// Start a confirmed `Assignment`.
    Start,

    /// Complete a confirmed or in-progress `Assignment`.
    Complete,

    /// Cancel a pending or confirmed `Assignment`.
    Cancel,

    /// Record a no-show on a confirmed or in-progress `Assignment`.
    NoShow,
}

impl From<TransitionAction> for command::transition_assignment::Action {
    fn from(action: TransitionAction) -> Self {
        use TransitionAction as A;

        match action {
            A::Confirm => Self::Confirm,
            A::Start => Self::Start,
            A::Complete => Self::Complete,
            A::Cancel => Self::Cancel,
            A::NoShow => Self::NoShow,
        }
    }
}

#[graphql_object(context = Context)]
impl Mutation {
    /// Creates a new `Assignment`, either directly or out of an accepted
    /// quote's agreed terms.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `INTERPRETER_NOT_EXISTS` - the provided `Interpreter` does not
    ///                              exist;
    /// - `INTERPRETER_INACTIVE` - the provided `Interpreter` does not accept
    ///                            new missions;
    /// - `INVALID_TIME_WINDOW` - the mission end time is not after its start
    ///                           time;
    /// - `RATE_REQUIRED` - no rate was provided and the `Interpreter` has no
    ///                     default one.
    #[expect(clippy::too_many_arguments, reason = "still readable")]
    #[tracing::instrument(
        skip_all,
        fields(
            gql.name = "createAssignment",
            interpreter_id = ?interpreter_id,
            otel.name = Self::SPAN_NAME,
            service_type = %service_type,
        ),
    )]
    pub async fn create_assignment(
        service_type: api::assignment::ServiceType,
        source_language: api::assignment::Language,
        target_language: api::assignment::Language,
        start_at: DateTime,
        end_at: DateTime,
        address: api::assignment::Text,
        city: api::assignment::Text,
        state: api::assignment::Text,
        zip_code: api::assignment::Text,
        client_name: Option<api::interpreter::Name>,
        client_email: Option<api::interpreter::Email>,
        client_phone: Option<api::interpreter::Phone>,
        interpreter_id: Option<api::interpreter::Id>,
        rate: Option<Rate>,
        minimum_hours: Option<Hours>,
        notes: Option<api::assignment::Text>,
        special_requirements: Option<api::assignment::Text>,
        ctx: &Context,
    ) -> Result<AssignmentResult, Error> {
        let output = ctx
            .service()
            .execute(command::CreateAssignment {
                client_name: client_name.map(Into::into),
                client_email: client_email.map(Into::into),
                client_phone: client_phone.map(Into::into),
                interpreter_id: interpreter_id.map(Into::into),
                service_type: service_type.into(),
                source_language: source_language.into(),
                target_language: target_language.into(),
                start_at: start_at.coerce(),
                end_at: end_at.coerce(),
                location: domain::assignment::Location {
                    address: address.into(),
                    city: city.into(),
                    state: state.into(),
                    zip_code: zip_code.into(),
                },
                rate,
                minimum_hours: minimum_hours
                    .unwrap_or_else(|| Hours::from(2_u32)),
                notes: notes.map(Into::into),
                special_requirements: special_requirements.map(Into::into),
                initiator: ctx.actor(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        Ok(AssignmentResult::new(output.assignment, output.warnings))
    }

    /// Offers a still-pending `Assignment` to an `Interpreter`, sending the
    /// offer email with accept/decline links.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ASSIGNMENT_NOT_EXISTS` - the `Assignment` does not exist;
    /// - `ASSIGNMENT_NOT_PENDING` - the `Assignment` is not awaiting an
    ///                              offer anymore;
    /// - `INTERPRETER_NOT_EXISTS` - the `Interpreter` does not exist;
    /// - `INTERPRETER_INACTIVE` - the `Interpreter` does not accept new
    ///                            missions.
    #[tracing::instrument(
        skip_all,
        fields(
            assignment_id = %assignment_id,
            gql.name = "offerAssignment",
            interpreter_id = %interpreter_id,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn offer_assignment(
        assignment_id: api::assignment::Id,
        interpreter_id: api::interpreter::Id,
        ctx: &Context,
    ) -> Result<AssignmentResult, Error> {
        let output = ctx
            .service()
            .execute(command::OfferAssignment {
                assignment_id: assignment_id.into(),
                interpreter_id: interpreter_id.into(),
                initiator: ctx.actor(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        Ok(AssignmentResult::new(output.assignment, output.warnings))
    }

    /// Transitions an `Assignment` status, firing the notification and
    /// bookkeeping side effects of the new status.
    ///
    /// # Errors
    ///
    /// Possible error codes:
    /// - `ASSIGNMENT_NOT_EXISTS` - the `Assignment` does not exist;
    /// - `ILLEGAL_TRANSITION` - the action is not legal in the current
    ///                          status.
    #[tracing::instrument(
        skip_all,
        fields(
            action = ?action,
            assignment_id = %assignment_id,
            gql.name = "transitionAssignment",
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn transition_assignment(
        assignment_id: api::assignment::Id,
        action: TransitionAction,
        ctx: &Context,
    ) -> Result<AssignmentResult, Error> {
        let output = ctx
            .service()
            .execute(command::TransitionAssignment {
                assignment_id: assignment_id.into(),
                action: action.into(),
                initiator: ctx.actor(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())?;

        Ok(AssignmentResult::new(output.assignment, output.warnings))
    }

    /// Registers a new `Interpreter` and enqueues their welcome email.
    #[tracing::instrument(
        skip_all,
        fields(
            email = ?email,
            gql.name = "registerInterpreter",
            name = %name,
            otel.name = Self::SPAN_NAME,
        ),
    )]
    pub async fn register_interpreter(
        name: api::interpreter::Name,
        email: Option<api::interpreter::Email>,
        phone: Option<api::interpreter::Phone>,
        rate: Option<Rate>,
        ctx: &Context,
    ) -> Result<api::Interpreter, Error> {
        ctx.service()
            .execute(command::RegisterInterpreter {
                name: name.into(),
                email: email.map(Into::into),
                phone: phone.map(Into::into),
                rate,
                initiator: ctx.actor(),
            })
            .await
            .map_err(AsError::into_error)
            .map_err(ctx.error())
            .map(Into::into)
    }
}
