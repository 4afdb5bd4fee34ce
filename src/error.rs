//! Booking error kinds and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::model::{RequestId, RideId};

/// Every way a booking operation can be refused
///
/// All variants describe bad client input; none are transient.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Ride {0} not found")]
    RideNotFound(RideId),

    #[error("Request {request_id} not found on ride {ride_id}")]
    RequestNotFound {
        ride_id: RideId,
        request_id: RequestId,
    },

    #[error("You cannot request to join your own ride.")]
    SelfBooking,

    #[error("You have already requested to join this ride.")]
    DuplicateRequest,

    #[error("No seats available")]
    NoSeatsAvailable,
}

impl BookingError {
    /// Stable machine-readable code returned alongside the message
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::RideNotFound(_) | BookingError::RequestNotFound { .. } => "not_found",
            BookingError::SelfBooking => "self_booking",
            BookingError::DuplicateRequest => "duplicate_request",
            BookingError::NoSeatsAvailable => "no_seats_available",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            BookingError::RideNotFound(_) | BookingError::RequestNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            BookingError::SelfBooking => StatusCode::FORBIDDEN,
            BookingError::DuplicateRequest | BookingError::NoSeatsAvailable => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(json!({
                "error": self.to_string(),
                "code": self.code(),
            })),
        )
            .into_response()
    }
}
