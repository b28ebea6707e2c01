//! Ticket price calculation.

use crate::models::TicketType;

/// Per-seat multiplier applied to the VIP ticket type.
pub const VIP_MULTIPLIER: f64 = 1.5;

/// Result of a price calculation.
///
/// Full precision is retained internally; rounding to whole currency
/// units happens only in the display accessors and is never fed back
/// into a calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quote {
    per_seat: f64,
    total: f64,
}

impl Quote {
    /// Exact per-seat price.
    pub fn per_seat(&self) -> f64 {
        self.per_seat
    }

    /// Exact total price.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Per-seat price rounded to the nearest whole currency unit.
    pub fn per_seat_display(&self) -> i64 {
        self.per_seat.round() as i64
    }

    /// Total price rounded to the nearest whole currency unit.
    pub fn total_display(&self) -> i64 {
        self.total.round() as i64
    }
}

/// Computes per-seat and total price for a booking selection.
///
/// Pure; re-invoked whenever the seat count or ticket type changes.
pub fn quote(base_price: f64, seats: u32, ticket_type: TicketType) -> Quote {
    let per_seat = match ticket_type {
        TicketType::Normal => base_price,
        TicketType::Vip => base_price * VIP_MULTIPLIER,
    };
    Quote {
        per_seat,
        total: per_seat * f64::from(seats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_pricing_scenario() {
        let quote = quote(500.0, 2, TicketType::Normal);
        assert_eq!(quote.per_seat_display(), 500);
        assert_eq!(quote.total_display(), 1000);
    }

    #[test]
    fn vip_pricing_scenario() {
        let quote = quote(500.0, 2, TicketType::Vip);
        assert_eq!(quote.per_seat_display(), 750);
        assert_eq!(quote.total_display(), 1500);
    }

    #[test]
    fn vip_total_is_one_and_a_half_times_normal() {
        for seats in 1..=10 {
            let normal = quote(500.0, seats, TicketType::Normal);
            let vip = quote(500.0, seats, TicketType::Vip);
            assert!((vip.total() - normal.total() * VIP_MULTIPLIER).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn display_rounds_without_losing_internal_precision() {
        let quote = quote(333.33, 3, TicketType::Normal);
        assert_eq!(quote.per_seat_display(), 333);
        // Total rounds from the exact product, not from the rounded
        // per-seat value (which would give 999).
        assert_eq!(quote.total_display(), 1000);
        assert!((quote.total() - 999.99).abs() < 1e-9);
    }
}
