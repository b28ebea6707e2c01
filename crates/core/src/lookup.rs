//! Ticket lookup resolution.
//!
//! The same fetch is reported differently depending on where the ticket
//! id came from: a user-entered id that turns out not to exist deserves
//! a visible error, while a stale persisted pointer should degrade to
//! the empty state silently rather than complain on every startup.

use crate::api::ApiError;
use crate::models::Ticket;

/// Where a lookup id originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupOrigin {
    /// Typed into the search field by the user.
    UserEntered,
    /// Read from the persisted last-ticket pointer.
    Persisted,
}

/// How the UI should react to a lookup result.
#[derive(Debug)]
pub enum LookupOutcome {
    /// Render the ticket.
    Show(Ticket),
    /// Surface a visible error and hide the result panel.
    ReportError(String),
    /// Leave the empty state in place without announcing anything.
    SilentEmpty,
}

/// Maps a lookup result onto its user-facing outcome.
pub fn resolve(origin: LookupOrigin, result: Result<Ticket, ApiError>) -> LookupOutcome {
    match result {
        Ok(ticket) => LookupOutcome::Show(ticket),
        Err(err) => match origin {
            LookupOrigin::UserEntered => LookupOutcome::ReportError(err.to_string()),
            // Failures on the persisted path stay quiet regardless of
            // kind; callers log them instead.
            LookupOrigin::Persisted => LookupOutcome::SilentEmpty,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ticket() -> Ticket {
        Ticket {
            ticket_id: "ABC123".to_string(),
            movie_name: "Oppenheimer".to_string(),
            slot: "02:30 PM".to_string(),
            seats: 2,
            booking_type: "Normal Customer".to_string(),
            customer_name: Some("Ada".to_string()),
            booked_at: None,
        }
    }

    #[test]
    fn found_tickets_are_shown_for_either_origin() {
        for origin in [LookupOrigin::UserEntered, LookupOrigin::Persisted] {
            match resolve(origin, Ok(sample_ticket())) {
                LookupOutcome::Show(ticket) => assert_eq!(ticket.ticket_id, "ABC123"),
                other => panic!("expected Show, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_user_entered_ids_surface_an_error() {
        let outcome = resolve(
            LookupOrigin::UserEntered,
            Err(ApiError::NotFound("ticket ABC123 not found".to_string())),
        );
        match outcome {
            LookupOutcome::ReportError(message) => assert!(message.contains("not found")),
            other => panic!("expected ReportError, got {other:?}"),
        }
    }

    #[test]
    fn stale_persisted_pointers_stay_silent() {
        let outcome = resolve(
            LookupOrigin::Persisted,
            Err(ApiError::NotFound("ticket ABC123 not found".to_string())),
        );
        assert!(matches!(outcome, LookupOutcome::SilentEmpty));
    }

    #[test]
    fn persisted_network_failures_also_stay_silent() {
        let outcome = resolve(
            LookupOrigin::Persisted,
            Err(ApiError::Network("request failed: connection refused".to_string())),
        );
        assert!(matches!(outcome, LookupOutcome::SilentEmpty));
    }

    #[test]
    fn user_entered_network_failures_are_reported() {
        let outcome = resolve(
            LookupOrigin::UserEntered,
            Err(ApiError::Network("request failed: connection refused".to_string())),
        );
        assert!(matches!(outcome, LookupOutcome::ReportError(_)));
    }
}
