//! Calendar invite generation.
//!
//! Produces the iCalendar text attached to confirmation emails, with a
//! per-send unique reference so that mail clients do not collapse repeated
//! invites for the same mission into one thread.

use common::{timezone, DateTime, Timezone};

use crate::domain::{contact, Assignment};
#[cfg(doc)]
use crate::domain::Interpreter;

/// Calendar invite for a confirmed [`Assignment`].
#[derive(Clone, Copy, Debug)]
pub struct Invite<'a> {
    /// [`Assignment`] the invite is generated for.
    pub assignment: &'a Assignment,

    /// Name of the [`Interpreter`] attending the mission.
    pub attendee_name: &'a contact::Name,

    /// Email address of the [`Interpreter`] attending the mission.
    pub attendee_email: &'a contact::Email,

    /// Email address the invite is organized by.
    pub organizer: &'a contact::Email,

    /// Per-send unique reference.
    pub reference: &'a str,

    /// Domain the invite UID is scoped to.
    pub domain: &'a str,
}

impl Invite<'_> {
    /// Renders this [`Invite`] as an iCalendar object.
    #[must_use]
    pub fn to_ics(&self) -> String {
        let Self {
            assignment,
            attendee_name,
            attendee_email,
            organizer,
            reference,
            domain,
        } = self;

        let now = DateTime::now();
        let stamp = timezone::format_stamp(now, Timezone::Utc);

        let description = format!(
            "Client: {client}\n\
             Service: {service}\n\
             Languages: {source} -> {target}\n\
             Location: {location}\n\n\
             Special Requirements: {requirements}\n\n\
             Rate: {rate}\n\n\
             Reference: {reference}",
            client = assignment.client_display(),
            service = assignment.service_type,
            source = assignment.source_language,
            target = assignment.target_language,
            location = assignment.location,
            requirements = assignment
                .special_requirements
                .as_ref()
                .map_or("None".into(), ToString::to_string),
            rate = assignment.rate,
        );

        let mut ics = String::new();
        for line in [
            "BEGIN:VCALENDAR".into(),
            "PRODID:-//Interpretation Assignment System//EN".into(),
            "VERSION:2.0".into(),
            "METHOD:REQUEST".into(),
            "BEGIN:VEVENT".into(),
            format!(
                "SUMMARY:{}",
                escape(&format!(
                    "Interpretation Assignment - {} (Ref:{reference})",
                    assignment.service_type,
                )),
            ),
            format!(
                "DTSTART;TZID=America/New_York:{}",
                timezone::format_stamp(assignment.start_at, Timezone::Eastern),
            ),
            format!(
                "DTEND;TZID=America/New_York:{}",
                timezone::format_stamp(assignment.end_at, Timezone::Eastern),
            ),
            format!("DTSTAMP:{stamp}Z"),
            format!("CREATED:{stamp}Z"),
            format!("LOCATION:{}", escape(&assignment.location.to_string())),
            format!("DESCRIPTION:{}", escape(&description)),
            format!(
                "UID:assignment-{}-{reference}@{domain}",
                uuid::Uuid::from(assignment.id).simple(),
            ),
            format!(
                "ORGANIZER;CN=Interpretation Desk:MAILTO:{organizer}",
            ),
            format!(
                "ATTENDEE;CN={};RSVP=TRUE:MAILTO:{attendee_email}",
                escape(attendee_name.as_ref()),
            ),
            "END:VEVENT".into(),
            "END:VCALENDAR".into(),
        ] {
            fold_onto(&mut ics, &line);
        }
        ics
    }
}

/// Escapes the provided text per RFC 5545 (`TEXT` value type).
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            _ => out.push(c),
        }
    }
    out
}

/// Appends the provided content line, CRLF-terminated and folded at 73
/// octets per RFC 5545.
fn fold_onto(ics: &mut String, line: &str) {
    let mut limit = 73;
    let mut len = 0;

    for c in line.chars() {
        if len + c.len_utf8() > limit {
            ics.push_str("\r\n ");
            // Continuation lines lose one octet to the leading space.
            limit = 72;
            len = 0;
        }
        ics.push(c);
        len += c.len_utf8();
    }
    ics.push_str("\r\n");
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::Hours;
    use rust_decimal::Decimal;

    use crate::domain::{
        assignment::{
            self, CreationDateTime, Language, Location, ServiceType,
            StartDateTime, Status, Text, UpdateDateTime,
        },
        contact, interpreter, Assignment,
    };

    use super::{escape, Invite};

    fn assignment() -> Assignment {
        let start_at =
            StartDateTime::from_rfc3339("2025-07-04T14:00:00Z").unwrap();
        Assignment {
            id: assignment::Id::new(),
            client_name: contact::Name::new("Acme Health"),
            client_email: None,
            client_phone: None,
            interpreter_id: Some(interpreter::Id::new()),
            service_type: ServiceType::new("Medical Interpretation").unwrap(),
            source_language: Language::new("English").unwrap(),
            target_language: Language::new("Spanish").unwrap(),
            start_at,
            end_at: (start_at + Duration::from_secs(7200)).coerce(),
            location: Location {
                address: Text::new("123 Main St").unwrap(),
                city: Text::new("Boston").unwrap(),
                state: Text::new("MA").unwrap(),
                zip_code: Text::new("02108").unwrap(),
            },
            status: Status::Confirmed,
            rate: Decimal::from(50).into(),
            minimum_hours: Hours::from(2_u32),
            total_payment: None,
            is_paid: None,
            notes: None,
            special_requirements: Text::new("Bring badge; arrive early"),
            created_at: CreationDateTime::now(),
            updated_at: UpdateDateTime::now(),
            completed_at: None,
        }
    }

    #[test]
    fn renders_required_fields() {
        let assignment = assignment();
        let attendee_name = contact::Name::new("Maria Lopez").unwrap();
        let attendee_email =
            contact::Email::new("maria@example.com").unwrap();
        let organizer = contact::Email::new("desk@agency.example").unwrap();

        let ics = Invite {
            assignment: &assignment,
            attendee_name: &attendee_name,
            attendee_email: &attendee_email,
            organizer: &organizer,
            reference: "a1b2c3d4",
            domain: "agency.example",
        }
        .to_ics();

        assert!(ics.starts_with("BEGIN:VCALENDAR\r\n"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
        assert!(ics.contains("METHOD:REQUEST\r\n"));
        // 14:00Z on the 4th of July is 10:00 EDT.
        assert!(ics.contains("DTSTART;TZID=America/New_York:20250704T100000"));
        assert!(ics.contains("DTEND;TZID=America/New_York:20250704T120000"));
        assert!(ics.contains(&format!(
            "UID:assignment-{}-a1b2c3d4@agency.example",
            uuid::Uuid::from(assignment.id).simple(),
        )));
        assert!(ics.contains("RSVP=TRUE:MAILTO:maria@example.com"));
        assert!(ics.contains("ORGANIZER;CN=Interpretation Desk"));
        assert!(ics.contains("(Ref:a1b2c3d4)"));

        // Every line is CRLF-terminated and within the folding limit.
        for line in ics.split("\r\n") {
            assert!(line.len() <= 73, "overlong line: {line:?}");
        }
    }

    #[test]
    fn escapes_text_values() {
        assert_eq!(escape("a,b;c\\d"), "a\\,b\\;c\\\\d");
        assert_eq!(escape("line1\nline2"), "line1\\nline2");
    }
}
