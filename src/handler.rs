//! HTTP request handlers for the carpool API
//!
//! Each handler extracts its inputs, calls exactly one store operation and
//! serializes the result. Store errors convert into responses through
//! `BookingError`'s `IntoResponse` implementation.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::error::BookingError;
use crate::model::{
    HistoryParams, JoinRequest, NewRideOffer, RequestId, RideId, RideOffer, RideRequest,
    SearchParams,
};
use crate::store::AppState;

/// Posts a new ride offer
///
/// # Request Body
///
/// ```json
/// {
///   "startPoint": "Delhi",
///   "destination": "Noida",
///   "stops": ["Stop1", "Stop2"],
///   "dateTime": "2026-10-16T09:30:00",
///   "availableSeats": 2,
///   "offererId": "EMP1001"
/// }
/// ```
///
/// # Response
///
/// - **201 Created** - the stored offer, with its assigned `id`
pub async fn create_ride(
    State(state): State<AppState>,
    Json(payload): Json<NewRideOffer>,
) -> impl IntoResponse {
    let ride = state.store.create_ride(payload).await;
    (StatusCode::CREATED, Json(ride))
}

/// Lists rides that still have seats and have not departed
pub async fn list_active_rides(State(state): State<AppState>) -> Json<Vec<RideOffer>> {
    Json(state.store.list_active_rides().await)
}

/// Searches active rides
///
/// # Example Request
///
/// `GET /rides/search?startPoint=delhi&stop=stop1&minSeats=1`
pub async fn search_rides(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<RideOffer>> {
    tracing::debug!(?params, "searching rides");
    Json(state.store.search_rides(&params).await)
}

pub async fn get_ride(
    Path(ride_id): Path<RideId>,
    State(state): State<AppState>,
) -> Result<Json<RideOffer>, BookingError> {
    state.store.get_ride(ride_id).await.map(Json)
}

/// Replaces a ride's fields, keeping its id
///
/// The request list is replaced too; send the existing `requests` back to
/// keep them.
///
/// # Response
///
/// - **200 OK** - the replaced offer
/// - **404 Not Found** - unknown ride
pub async fn update_ride(
    Path(ride_id): Path<RideId>,
    State(state): State<AppState>,
    Json(payload): Json<NewRideOffer>,
) -> Result<Json<RideOffer>, BookingError> {
    state.store.update_ride(ride_id, payload).await.map(Json)
}

/// Deletes a ride. Unknown ids succeed as well.
pub async fn delete_ride(
    Path(ride_id): Path<RideId>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    state.store.delete_ride(ride_id).await;

    (
        StatusCode::OK,
        Json(json!({
            "message": "Ride deleted successfully",
            "deletedId": ride_id
        })),
    )
}

/// Asks to join a ride
///
/// # Request Body
///
/// ```json
/// { "requesterId": "EMP2002" }
/// ```
///
/// # Response
///
/// - **201 Created** - the pending request
/// - **404 Not Found** - unknown ride
/// - **403 Forbidden** - requester is the ride's offerer
/// - **409 Conflict** - requester already asked to join this ride
pub async fn request_to_join(
    Path(ride_id): Path<RideId>,
    State(state): State<AppState>,
    Json(payload): Json<JoinRequest>,
) -> Result<(StatusCode, Json<RideRequest>), BookingError> {
    let request = state.store.request_to_join(ride_id, payload).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn requests_for_ride(
    Path(ride_id): Path<RideId>,
    State(state): State<AppState>,
) -> Result<Json<Vec<RideRequest>>, BookingError> {
    state.store.requests_for_ride(ride_id).await.map(Json)
}

/// Accepts a join request and takes a seat
///
/// # Response
///
/// - **200 OK** - the accepted request
/// - **404 Not Found** - unknown ride or request
/// - **409 Conflict** - no seats left
pub async fn accept_request(
    Path((ride_id, request_id)): Path<(RideId, RequestId)>,
    State(state): State<AppState>,
) -> Result<Json<RideRequest>, BookingError> {
    state
        .store
        .accept_request(ride_id, request_id)
        .await
        .map(Json)
}

pub async fn reject_request(
    Path((ride_id, request_id)): Path<(RideId, RequestId)>,
    State(state): State<AppState>,
) -> Result<Json<RideRequest>, BookingError> {
    state
        .store
        .reject_request(ride_id, request_id)
        .await
        .map(Json)
}

/// Rides the user posted, past and full ones included
///
/// # Example Request
///
/// `GET /rides/history/offered?companyUserId=EMP1001`
pub async fn offered_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Json<Vec<RideOffer>> {
    Json(state.store.offered_history(&params.user_id).await)
}

/// Rides on which the user was accepted as a passenger
pub async fn taken_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Json<Vec<RideOffer>> {
    Json(state.store.taken_history(&params.user_id).await)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
