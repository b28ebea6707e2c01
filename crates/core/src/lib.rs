#![warn(clippy::all, missing_docs)]

//! Core domain logic for the CineTUI booking client.
//!
//! This crate hosts the booking-service API client, the data models,
//! the booking-session state machine, price calculation, ticket lookup
//! resolution, configuration handling, and the last-ticket persistence
//! layer used by the terminal UI and any future frontends.

pub mod api;
pub mod booking;
pub mod config;
pub mod lookup;
pub mod models;
pub mod pricing;
pub mod store;

pub use api::{ApiClient, ApiError};
pub use booking::{BookingFlow, BookingSession, FlowError, FlowPhase};
pub use config::AppConfig;
pub use lookup::{LookupOrigin, LookupOutcome};
pub use models::{BookingReceipt, BookingRequest, Movie, SlotInfo, Ticket, TicketType};
pub use store::TicketStore;
