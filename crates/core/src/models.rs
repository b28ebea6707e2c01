//! Shared domain models mirroring the booking-service wire format.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A movie as returned by `GET /movies`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    /// Server-assigned identifier.
    pub id: u64,
    /// Display title.
    pub name: String,
    /// Genre label, when the catalogue provides one.
    #[serde(default)]
    pub genre: Option<String>,
    /// Aggregate rating, when the catalogue provides one.
    #[serde(default)]
    pub rating: Option<f64>,
    /// Poster image URL, unused by the terminal frontend but kept on the
    /// wire type.
    #[serde(default)]
    pub poster_url: Option<String>,
    /// Showtime slots keyed by label (e.g. `"10:00 AM"`).
    #[serde(default)]
    pub slots: HashMap<String, SlotInfo>,
    /// Running ticket counter, used for popularity ordering.
    #[serde(default)]
    pub tickets_sold: u64,
}

impl Movie {
    /// A movie with an empty slot map cannot be booked.
    pub fn has_slots(&self) -> bool {
        !self.slots.is_empty()
    }

    /// Slot labels in a stable display order.
    ///
    /// The server serialises slots as a JSON object, so arrival order is
    /// not meaningful; sorted labels keep the UI deterministic.
    pub fn slot_labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.slots.keys().cloned().collect();
        labels.sort();
        labels
    }
}

/// Seat accounting for a single showtime slot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlotInfo {
    /// Seats in the auditorium for this showing.
    pub total: u32,
    /// Seats still bookable.
    pub available: u32,
}

/// Ticket category selected at booking time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketType {
    /// Standard admission.
    Normal,
    /// VIP admission, priced at 1.5× the base seat price.
    #[serde(rename = "VIP")]
    Vip,
}

impl TicketType {
    /// The other variant; the modal toggles between the two.
    pub fn toggled(self) -> Self {
        match self {
            TicketType::Normal => TicketType::Vip,
            TicketType::Vip => TicketType::Normal,
        }
    }

    /// Short label as sent on the wire.
    pub fn wire_label(&self) -> &'static str {
        match self {
            TicketType::Normal => "Normal",
            TicketType::Vip => "VIP",
        }
    }

    /// Long label matching the server's `booking_type` strings.
    pub fn display_label(&self) -> &'static str {
        match self {
            TicketType::Normal => "Normal Customer",
            TicketType::Vip => "VIP Member",
        }
    }
}

/// Body for `POST /book`. Built only by a submit-ready booking session
/// and sent exactly once per submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingRequest {
    /// Identifier of the movie being booked.
    pub movie_id: u64,
    /// Selected showtime label.
    pub slot: String,
    /// Seat count, already clamped to the bookable range.
    pub seats: u32,
    /// Requester name, trimmed and non-empty.
    pub name: String,
    /// Ticket category.
    #[serde(rename = "type")]
    pub ticket_type: TicketType,
}

/// Server-confirmed booking record from `GET /ticket/{id}`.
///
/// Immutable once fetched; cancellation invalidates it server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    /// Server-assigned ticket identifier.
    pub ticket_id: String,
    /// Movie title at booking time.
    pub movie_name: String,
    /// Showtime label.
    pub slot: String,
    /// Booked seat count.
    pub seats: u32,
    /// Server-formatted category label (e.g. `"VIP Member"`).
    pub booking_type: String,
    /// Name given at booking time.
    #[serde(default)]
    pub customer_name: Option<String>,
    /// Server-formatted booking timestamp, kept opaque.
    #[serde(default)]
    pub booked_at: Option<String>,
}

/// Confirmation data for a completed booking.
///
/// `POST /book` returns only the ticket id; movie, slot, seats and type
/// are echoed from the submitted session rather than trusted to be in
/// the response.
#[derive(Debug, Clone)]
pub struct BookingReceipt {
    /// Server-assigned ticket identifier.
    pub ticket_id: String,
    /// Booked movie title.
    pub movie_name: String,
    /// Booked showtime label.
    pub slot: String,
    /// Booked seat count.
    pub seats: u32,
    /// Booked ticket category.
    pub ticket_type: TicketType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_without_slots_is_not_bookable() {
        let movie: Movie = serde_json::from_str(
            r#"{"id": 3, "name": "Dune Part Two", "slots": {}}"#,
        )
        .unwrap();
        assert!(!movie.has_slots());
        assert!(movie.slot_labels().is_empty());
    }

    #[test]
    fn slot_labels_are_sorted() {
        let movie: Movie = serde_json::from_str(
            r#"{
                "id": 1,
                "name": "Interstellar",
                "genre": "Sci-Fi",
                "rating": 8.6,
                "slots": {
                    "07:00 PM": {"total": 120, "available": 120},
                    "10:00 AM": {"total": 120, "available": 97},
                    "02:00 PM": {"total": 120, "available": 5}
                },
                "tickets_sold": 23
            }"#,
        )
        .unwrap();
        assert!(movie.has_slots());
        assert_eq!(movie.slot_labels(), ["02:00 PM", "07:00 PM", "10:00 AM"]);
        assert_eq!(movie.slots["10:00 AM"].available, 97);
    }

    #[test]
    fn ticket_type_serialises_to_wire_labels() {
        assert_eq!(
            serde_json::to_string(&TicketType::Normal).unwrap(),
            "\"Normal\""
        );
        assert_eq!(serde_json::to_string(&TicketType::Vip).unwrap(), "\"VIP\"");
        assert_eq!(TicketType::Normal.toggled(), TicketType::Vip);
        assert_eq!(TicketType::Vip.display_label(), "VIP Member");
    }

    #[test]
    fn booking_request_uses_the_wire_field_names() {
        let request = BookingRequest {
            movie_id: 2,
            slot: "08:00 PM".to_string(),
            seats: 3,
            name: "Ada".to_string(),
            ticket_type: TicketType::Vip,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["movie_id"], 2);
        assert_eq!(value["type"], "VIP");
        assert_eq!(value["seats"], 3);
    }
}
