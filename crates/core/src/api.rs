//! HTTP client for the booking-service API.
//!
//! Wraps the four remote operations (movie listing, booking, ticket
//! lookup, cancellation) over HTTP+JSON and translates non-success
//! responses into the typed [`ApiError`] taxonomy. No operation mutates
//! client state; callers interpret results.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{BookingRequest, Movie, Ticket};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures reported at the booking-service boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure or an unexpected HTTP status.
    #[error("network failure: {0}")]
    Network(String),
    /// The server understood the request but rejected it semantically
    /// (e.g. not enough seats for the requested slot).
    #[error("{0}")]
    Validation(String),
    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct BookResponse {
    ticket_id: String,
}

#[derive(Debug, Deserialize)]
struct CancelResponse {
    message: String,
}

/// Client for the remote booking operations.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Builds a client against the configured endpoint.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|err| ApiError::Network(format!("failed to build HTTP client: {err}")))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    /// `GET /movies` — the full catalogue, replaced wholesale by callers.
    pub async fn list_movies(&self) -> Result<Vec<Movie>, ApiError> {
        let url = format!("{}/movies", self.base_url);
        let response = self.client.get(&url).send().await.map_err(transport)?;
        let status = response.status();
        debug!(%status, "movie list response");
        if !status.is_success() {
            return Err(ApiError::Network(format!(
                "movie list request failed with {status}"
            )));
        }
        response
            .json::<Vec<Movie>>()
            .await
            .map_err(|err| ApiError::Network(format!("malformed movie list: {err}")))
    }

    /// `POST /book` — submits a booking and returns the new ticket id.
    ///
    /// An `{error}` body is a semantic rejection regardless of the HTTP
    /// status the server paired it with.
    pub async fn create_booking(&self, request: &BookingRequest) -> Result<String, ApiError> {
        let url = format!("{}/book", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        debug!(%status, movie_id = request.movie_id, slot = %request.slot, "booking response");
        let body = response.text().await.map_err(transport)?;
        if let Ok(rejection) = serde_json::from_str::<ErrorBody>(&body) {
            if status.is_success() || status.is_client_error() {
                return Err(ApiError::Validation(rejection.error));
            }
        }
        if !status.is_success() {
            return Err(ApiError::Network(format!(
                "booking request failed with {status}"
            )));
        }
        serde_json::from_str::<BookResponse>(&body)
            .map(|booked| booked.ticket_id)
            .map_err(|err| ApiError::Network(format!("malformed booking response: {err}")))
    }

    /// `GET /ticket/{id}` — fetches a ticket by id.
    ///
    /// Ids are upper-cased before the request; the server canonicalises
    /// ticket ids to upper case.
    pub async fn get_ticket(&self, id: &str) -> Result<Ticket, ApiError> {
        let id = canonical_id(id);
        let url = format!("{}/ticket/{}", self.base_url, id);
        let response = self.client.get(&url).send().await.map_err(transport)?;
        let status = response.status();
        debug!(%status, %id, "ticket lookup response");
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("ticket {id} not found")));
        }
        if !status.is_success() {
            return Err(ApiError::Network(format!(
                "ticket lookup failed with {status}"
            )));
        }
        let body = response.text().await.map_err(transport)?;
        if let Ok(rejection) = serde_json::from_str::<ErrorBody>(&body) {
            return Err(ApiError::NotFound(rejection.error));
        }
        serde_json::from_str::<Ticket>(&body)
            .map_err(|err| ApiError::Network(format!("malformed ticket response: {err}")))
    }

    /// `DELETE /cancel/{id}` — cancels a ticket, returning the server's
    /// confirmation message. Cancelling an id the server no longer knows
    /// (already cancelled) fails with [`ApiError::NotFound`].
    pub async fn cancel_ticket(&self, id: &str) -> Result<String, ApiError> {
        let id = canonical_id(id);
        let url = format!("{}/cancel/{}", self.base_url, id);
        let response = self.client.delete(&url).send().await.map_err(transport)?;
        let status = response.status();
        debug!(%status, %id, "cancellation response");
        let body = response.text().await.map_err(transport)?;
        if status == StatusCode::NOT_FOUND {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|rejection| rejection.error)
                .unwrap_or_else(|_| format!("ticket {id} not found"));
            return Err(ApiError::NotFound(message));
        }
        if !status.is_success() {
            return Err(ApiError::Network(format!(
                "cancellation failed with {status}"
            )));
        }
        serde_json::from_str::<CancelResponse>(&body)
            .map(|cancelled| cancelled.message)
            .map_err(|err| ApiError::Network(format!("malformed cancellation response: {err}")))
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Network(format!("request failed: {err}"))
}

fn canonical_id(id: &str) -> String {
    id.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TicketType;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> ApiClient {
        ApiClient::new(server.uri()).unwrap()
    }

    fn sample_request() -> BookingRequest {
        BookingRequest {
            movie_id: 1,
            slot: "10:00 AM".to_string(),
            seats: 2,
            name: "Ada".to_string(),
            ticket_type: TicketType::Normal,
        }
    }

    #[tokio::test]
    async fn list_movies_parses_the_catalogue() {
        let server = MockServer::start().await;
        let body = serde_json::json!([
            {
                "id": 1,
                "name": "Interstellar",
                "genre": "Sci-Fi",
                "rating": 8.6,
                "poster_url": "https://example.com/interstellar.jpg",
                "slots": {
                    "10:00 AM": {"total": 120, "available": 118},
                    "07:00 PM": {"total": 120, "available": 120}
                },
                "tickets_sold": 2
            },
            {"id": 2, "name": "Inception", "slots": {}}
        ]);
        Mock::given(method("GET"))
            .and(path("/movies"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let movies = test_client(&server).list_movies().await.unwrap();
        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].slots["10:00 AM"].available, 118);
        assert!(!movies[1].has_slots());
    }

    #[tokio::test]
    async fn list_movies_maps_server_failure_to_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/movies"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = test_client(&server).list_movies().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn create_booking_returns_the_ticket_id() {
        let server = MockServer::start().await;
        let request = sample_request();
        Mock::given(method("POST"))
            .and(path("/book"))
            .and(body_json(serde_json::json!({
                "movie_id": 1,
                "slot": "10:00 AM",
                "seats": 2,
                "name": "Ada",
                "type": "Normal"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "message": "Booked successfully",
                "ticket_id": "AB12CD34"
            })))
            .mount(&server)
            .await;

        let ticket_id = test_client(&server)
            .create_booking(&request)
            .await
            .unwrap();
        assert_eq!(ticket_id, "AB12CD34");
    }

    #[tokio::test]
    async fn create_booking_reports_seat_shortage_as_validation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/book"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": "Not enough seats. Available: 3"
            })))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .create_booking(&sample_request())
            .await
            .unwrap_err();
        match err {
            ApiError::Validation(message) => assert!(message.contains("Not enough seats")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_booking_treats_error_body_on_success_as_validation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/book"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": "Invalid slot"
            })))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .create_booking(&sample_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn booking_then_lookup_round_trips_the_request() {
        let server = MockServer::start().await;
        let request = sample_request();
        Mock::given(method("POST"))
            .and(path("/book"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "ticket_id": "FEEDBEEF"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/ticket/FEEDBEEF"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ticket_id": "FEEDBEEF",
                "movie_name": "Interstellar",
                "slot": "10:00 AM",
                "seats": 2,
                "booking_type": "Normal Customer",
                "customer_name": "Ada",
                "booked_at": "2026-08-07 10:30"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        let ticket_id = client.create_booking(&request).await.unwrap();
        let ticket = client.get_ticket(&ticket_id).await.unwrap();
        assert_eq!(ticket.slot, request.slot);
        assert_eq!(ticket.seats, request.seats);
        assert_eq!(ticket.booking_type, request.ticket_type.display_label());
        assert_eq!(ticket.customer_name.as_deref(), Some("Ada"));
    }

    #[tokio::test]
    async fn get_ticket_upper_cases_the_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ticket/ABC123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ticket_id": "ABC123",
                "movie_name": "Inception",
                "slot": "08:00 PM",
                "seats": 1,
                "booking_type": "VIP Member"
            })))
            .mount(&server)
            .await;

        let ticket = test_client(&server).get_ticket(" abc123 ").await.unwrap();
        assert_eq!(ticket.ticket_id, "ABC123");
    }

    #[tokio::test]
    async fn get_ticket_maps_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ticket/ABC123"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "Ticket not found"
            })))
            .mount(&server)
            .await;

        let err = test_client(&server).get_ticket("ABC123").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)), "got: {err:?}");
    }

    #[tokio::test]
    async fn cancel_ticket_returns_the_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/cancel/ABC123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Ticket cancelled successfully",
                "ticket_id": "ABC123"
            })))
            .mount(&server)
            .await;

        let message = test_client(&server).cancel_ticket("abc123").await.unwrap();
        assert!(message.contains("cancelled"));
    }

    #[tokio::test]
    async fn cancelling_an_already_cancelled_ticket_fails() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/cancel/ABC123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Ticket cancelled successfully",
                "ticket_id": "ABC123"
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/cancel/ABC123"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "error": "Ticket not found"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server);
        client.cancel_ticket("ABC123").await.unwrap();
        let err = client.cancel_ticket("ABC123").await.unwrap_err();
        match err {
            ApiError::NotFound(message) => assert!(message.contains("not found")),
            other => panic!("expected not-found error, got {other:?}"),
        }
    }
}
