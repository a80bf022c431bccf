//! Browser-facing handlers of the emailed accept/decline links.
//!
//! These links reach unauthenticated interpreters, so every outcome is a
//! plain HTML page: a success confirmation, a "link expired" page, an
//! "already processed" page, or a "not found" page. Nothing on this path is
//! a server error unless the storage itself fails.

use axum::{extract::Path, response::Html, Extension};
use common::{timezone, Timezone};
use http::StatusCode;
use service::{command, token, Command as _};
use tracing as log;

use crate::Service;

/// Handler of `GET /assignments/accept/{token}`.
pub async fn accept(
    Extension(service): Extension<Service>,
    Path(token): Path<String>,
) -> (StatusCode, Html<String>) {
    use command::accept_assignment::ExecutionError as E;

    let token = token::Token::from(token);
    match service.execute(command::AcceptAssignment { token }).await {
        Ok(output) => {
            let when =
                timezone::format(output.assignment.start_at, Timezone::Eastern);
            let mut message = format!(
                "You are confirmed for {} on {when} at {}. \
                 A calendar invitation is on its way to your inbox.",
                output.assignment.client_display(),
                output.assignment.location,
            );
            if !output.warnings.is_empty() {
                message.push_str(
                    " Some notifications could not be sent; \
                     the agency has been informed.",
                );
            }
            (StatusCode::OK, page("Assignment Accepted", &message))
        }
        Err(e) => {
            let kind = match e.as_ref() {
                E::InvalidToken => Failure::Expired,
                E::AlreadyProcessed(_) => Failure::AlreadyProcessed,
                E::AssignmentNotExists(_) => Failure::NotFound,
                E::Db(_) => Failure::Internal,
            };
            render_failure(&e.as_ref().to_string(), kind)
        }
    }
}

/// Handler of `GET /assignments/decline/{token}`.
pub async fn decline(
    Extension(service): Extension<Service>,
    Path(token): Path<String>,
) -> (StatusCode, Html<String>) {
    use command::decline_assignment::ExecutionError as E;

    let token = token::Token::from(token);
    match service.execute(command::DeclineAssignment { token }).await {
        Ok(output) => {
            let mut message = format!(
                "You have declined the assignment for {}. \
                 The agency has been notified and will reassign it.",
                output.assignment.client_display(),
            );
            if !output.warnings.is_empty() {
                message.push_str(
                    " Some notifications could not be sent; \
                     the agency has been informed.",
                );
            }
            (StatusCode::OK, page("Assignment Declined", &message))
        }
        Err(e) => {
            let kind = match e.as_ref() {
                E::InvalidToken => Failure::Expired,
                E::AlreadyProcessed(_) => Failure::AlreadyProcessed,
                E::AssignmentNotExists(_) => Failure::NotFound,
                E::Db(_) => Failure::Internal,
            };
            render_failure(&e.as_ref().to_string(), kind)
        }
    }
}

/// Failure outcome of a link click.
#[derive(Clone, Copy, Debug)]
enum Failure {
    /// The link is malformed or expired.
    Expired,

    /// The assignment has already been processed.
    AlreadyProcessed,

    /// The assignment does not exist.
    NotFound,

    /// The storage failed.
    Internal,
}

/// Renders the page of the provided [`Failure`].
fn render_failure(detail: &str, kind: Failure) -> (StatusCode, Html<String>) {
    match kind {
        Failure::Expired => (
            StatusCode::OK,
            page(
                "Link Expired",
                "This link has expired or is no longer valid. \
                 Please contact the agency if you still need to respond.",
            ),
        ),
        Failure::AlreadyProcessed => (
            StatusCode::OK,
            page(
                "Already Processed",
                "This assignment has already been processed.",
            ),
        ),
        Failure::NotFound => (
            StatusCode::NOT_FOUND,
            page(
                "Assignment Not Found",
                "The requested assignment could not be found.",
            ),
        ),
        Failure::Internal => {
            log::error!("link handler failed: {detail}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                page(
                    "Something Went Wrong",
                    "We could not process your response. Please try again \
                     later.",
                ),
            )
        }
    }
}

/// Renders a minimal standalone HTML page.
fn page(title: &str, message: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html>\
         <html lang=\"en\">\
         <head>\
         <meta charset=\"utf-8\">\
         <meta name=\"viewport\" \
               content=\"width=device-width, initial-scale=1\">\
         <title>{title}</title>\
         <style>\
         body{{font-family:sans-serif;margin:15% auto;max-width:32rem;\
         padding:0 1rem;color:#222}}\
         h1{{font-size:1.4rem}}\
         </style>\
         </head>\
         <body><h1>{title}</h1><p>{message}</p></body>\
         </html>",
    ))
}
