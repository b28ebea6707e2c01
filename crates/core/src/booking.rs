#![allow(missing_docs)]

//! Booking-session state machine backing the modal flow.
//!
//! `Closed → Editing(no slot) → Editing(slot selected) → Submitting →
//! Closed`. The session is owned by the flow for its open lifetime and
//! survives a failed submission untouched.

use thiserror::Error;

use crate::models::{BookingReceipt, BookingRequest, Movie, TicketType};

/// Smallest bookable seat count.
pub const MIN_SEATS: u32 = 1;
/// Largest bookable seat count.
pub const MAX_SEATS: u32 = 10;

const MAX_NAME_LEN: usize = 64;

/// Modal lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowPhase {
    Closed,
    Editing,
    Submitting,
}

/// Mutable selection state while the booking modal is open.
///
/// The movie is cloned into the session, so a background catalogue
/// refresh cannot invalidate an open selection.
#[derive(Debug, Clone)]
pub struct BookingSession {
    pub movie: Movie,
    pub slot: Option<String>,
    pub seats: u32,
    pub ticket_type: TicketType,
    pub guest_name: String,
}

impl BookingSession {
    fn fresh(movie: Movie) -> Self {
        Self {
            movie,
            slot: None,
            seats: MIN_SEATS,
            ticket_type: TicketType::Normal,
            guest_name: String::new(),
        }
    }

    /// Assembles the confirmation receipt for a submitted session. The
    /// booking response carries only the ticket id, so seats and type
    /// are echoed from the session.
    pub fn into_receipt(self, ticket_id: String) -> BookingReceipt {
        BookingReceipt {
            ticket_id,
            movie_name: self.movie.name,
            slot: self.slot.unwrap_or_default(),
            seats: self.seats,
            ticket_type: self.ticket_type,
        }
    }
}

/// Locally signalled flow violations; none involve the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("movie not found")]
    MovieNotFound,
    #[error("no showtimes available for this movie")]
    NoShowtimes,
    #[error("unknown showtime slot")]
    UnknownSlot,
    #[error("no booking in progress")]
    NotOpen,
    #[error("booking form is incomplete")]
    NotReady,
    #[error("a submission is already in flight")]
    SubmitInFlight,
}

/// State machine coordinating the booking modal.
#[derive(Debug)]
pub struct BookingFlow {
    phase: FlowPhase,
    session: Option<BookingSession>,
}

impl BookingFlow {
    pub fn new() -> Self {
        Self {
            phase: FlowPhase::Closed,
            session: None,
        }
    }

    pub fn phase(&self) -> FlowPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != FlowPhase::Closed
    }

    pub fn session(&self) -> Option<&BookingSession> {
        self.session.as_ref()
    }

    /// Opens the modal for a movie from the current catalogue.
    ///
    /// Fails locally when the id is unknown or the movie has no
    /// showtime slots; neither failure leaves the flow open.
    pub fn open(&mut self, movie_id: u64, movies: &[Movie]) -> Result<(), FlowError> {
        if self.phase == FlowPhase::Submitting {
            return Err(FlowError::SubmitInFlight);
        }
        let movie = movies
            .iter()
            .find(|movie| movie.id == movie_id)
            .ok_or(FlowError::MovieNotFound)?;
        if !movie.has_slots() {
            return Err(FlowError::NoShowtimes);
        }
        self.session = Some(BookingSession::fresh(movie.clone()));
        self.phase = FlowPhase::Editing;
        Ok(())
    }

    fn editing_session(&mut self) -> Result<&mut BookingSession, FlowError> {
        if self.phase != FlowPhase::Editing {
            return Err(FlowError::NotOpen);
        }
        self.session.as_mut().ok_or(FlowError::NotOpen)
    }

    /// Selects a showtime. Only one slot can be selected at a time; a
    /// new selection replaces the previous one.
    pub fn select_slot(&mut self, label: &str) -> Result<(), FlowError> {
        let session = self.editing_session()?;
        if !session.movie.slots.contains_key(label) {
            return Err(FlowError::UnknownSlot);
        }
        session.slot = Some(label.to_string());
        Ok(())
    }

    /// Sets the seat count, clamping to the bookable range rather than
    /// rejecting out-of-range values.
    pub fn set_seats(&mut self, seats: i64) -> Result<(), FlowError> {
        let session = self.editing_session()?;
        session.seats = seats.clamp(i64::from(MIN_SEATS), i64::from(MAX_SEATS)) as u32;
        Ok(())
    }

    pub fn adjust_seats(&mut self, delta: i64) -> Result<(), FlowError> {
        let current = i64::from(self.editing_session()?.seats);
        self.set_seats(current + delta)
    }

    pub fn set_ticket_type(&mut self, ticket_type: TicketType) -> Result<(), FlowError> {
        self.editing_session()?.ticket_type = ticket_type;
        Ok(())
    }

    pub fn toggle_ticket_type(&mut self) -> Result<(), FlowError> {
        let session = self.editing_session()?;
        session.ticket_type = session.ticket_type.toggled();
        Ok(())
    }

    pub fn push_name_char(&mut self, ch: char) -> Result<(), FlowError> {
        let session = self.editing_session()?;
        if session.guest_name.len() < MAX_NAME_LEN && ch.is_ascii() && !ch.is_ascii_control() {
            session.guest_name.push(ch);
        }
        Ok(())
    }

    pub fn pop_name_char(&mut self) -> Result<(), FlowError> {
        self.editing_session()?.guest_name.pop();
        Ok(())
    }

    /// True when every required field is present: a non-whitespace name,
    /// a selected slot, and at least one seat.
    pub fn can_submit(&self) -> bool {
        match (self.phase, &self.session) {
            (FlowPhase::Editing, Some(session)) => {
                !session.guest_name.trim().is_empty()
                    && session.slot.is_some()
                    && session.seats >= MIN_SEATS
            }
            _ => false,
        }
    }

    /// Moves to `Submitting` and builds the request to send. The session
    /// is retained so a failed submission loses nothing.
    pub fn begin_submit(&mut self) -> Result<BookingRequest, FlowError> {
        if self.phase == FlowPhase::Submitting {
            return Err(FlowError::SubmitInFlight);
        }
        if !self.can_submit() {
            return Err(FlowError::NotReady);
        }
        let session = self.session.as_ref().ok_or(FlowError::NotOpen)?;
        let slot = session.slot.clone().ok_or(FlowError::NotReady)?;
        self.phase = FlowPhase::Submitting;
        Ok(BookingRequest {
            movie_id: session.movie.id,
            slot,
            seats: session.seats,
            name: session.guest_name.trim().to_string(),
            ticket_type: session.ticket_type,
        })
    }

    /// Closes the flow after a successful submission, yielding the
    /// session for the confirmation receipt.
    pub fn complete_submit(&mut self) -> Option<BookingSession> {
        if self.phase != FlowPhase::Submitting {
            return None;
        }
        self.phase = FlowPhase::Closed;
        self.session.take()
    }

    /// Returns to editing after a failed submission; the session is
    /// preserved so the user can retry or amend.
    pub fn fail_submit(&mut self) {
        if self.phase == FlowPhase::Submitting {
            self.phase = FlowPhase::Editing;
        }
    }

    /// Discards the session and closes the modal. Has no effect while a
    /// submission is in flight; returns whether the flow closed.
    pub fn close(&mut self) -> bool {
        if self.phase != FlowPhase::Editing {
            return false;
        }
        self.phase = FlowPhase::Closed;
        self.session = None;
        true
    }
}

impl Default for BookingFlow {
    fn default() -> Self {
        Self::new()
    }
}
