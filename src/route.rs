//! Route definitions for the carpool API
//!
//! This module maps every HTTP route onto its handler and attaches the
//! shared application state.

use axum::routing::{get, post};
use axum::Router;

use crate::handler::{
    accept_request, create_ride, delete_ride, get_ride, health, list_active_rides,
    offered_history, reject_request, request_to_join, requests_for_ride, search_rides,
    taken_history, update_ride,
};
use crate::store::AppState;

/// Creates the application router
///
/// # Route Definitions
///
/// - `POST /rides/create` - Posts a ride offer
/// - `GET /rides/all` - Lists active rides
/// - `GET /rides/search` - Searches active rides
/// - `GET /rides/history/offered` - Rides posted by `companyUserId`
/// - `GET /rides/history/taken` - Rides `companyUserId` was accepted on
/// - `GET|PUT|DELETE /rides/{ride_id}` - Looks up, replaces or deletes a ride
/// - `GET|POST /rides/{ride_id}/requests` - Lists or creates join requests
/// - `POST /rides/{ride_id}/requests/{request_id}/accept`
/// - `POST /rides/{ride_id}/requests/{request_id}/reject`
/// - `GET /health` - Liveness probe
///
/// # Example Usage
///
/// ```no_run
/// # use carpool::store::AppState;
/// # use carpool::route::create_app;
/// let app = create_app(AppState::new());
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let ride_routes = Router::new()
        .route("/create", post(create_ride))
        .route("/all", get(list_active_rides))
        .route("/search", get(search_rides))
        .route("/history/offered", get(offered_history))
        .route("/history/taken", get(taken_history))
        .route(
            "/{ride_id}",
            get(get_ride).put(update_ride).delete(delete_ride),
        )
        .route(
            "/{ride_id}/requests",
            get(requests_for_ride).post(request_to_join),
        )
        .route(
            "/{ride_id}/requests/{request_id}/accept",
            post(accept_request),
        )
        .route(
            "/{ride_id}/requests/{request_id}/reject",
            post(reject_request),
        );

    Router::new()
        .route("/health", get(health))
        .nest("/rides", ride_routes)
        .with_state(state)
}
