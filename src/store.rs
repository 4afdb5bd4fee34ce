//! In-memory ride registry
//!
//! This module owns every ride offer and its join requests. The whole
//! registry sits behind a single `RwLock`: mutations hold the write lock for
//! their entire check-then-update sequence, so two accepts racing for the
//! last seat cannot both succeed, and readers always see a ride's seat count
//! and request list from the same moment.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use tokio::sync::RwLock;

use crate::error::BookingError;
use crate::filter::{is_active, matches_search};
use crate::model::{
    JoinRequest, NewRideOffer, RequestId, RequestStatus, RideId, RideOffer, RideRequest,
    SearchParams,
};

/// Application state shared across all request handlers
///
/// Cloning is cheap; every clone refers to the same registry.
#[derive(Clone, Default)]
pub struct AppState {
    pub store: Arc<RideStore>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug)]
struct Registry {
    /// Keyed by id; ids only grow, so iteration follows creation order
    rides: BTreeMap<RideId, RideOffer>,
    next_ride_id: RideId,
    next_request_id: RequestId,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            rides: BTreeMap::new(),
            next_ride_id: 1,
            next_request_id: 1,
        }
    }
}

impl Registry {
    fn ride_mut(&mut self, ride_id: RideId) -> Result<&mut RideOffer, BookingError> {
        self.rides
            .get_mut(&ride_id)
            .ok_or(BookingError::RideNotFound(ride_id))
    }
}

/// Registry of ride offers and the join/accept/reject workflow
#[derive(Debug, Default)]
pub struct RideStore {
    inner: RwLock<Registry>,
}

impl RideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new ride under a fresh id with an empty request list.
    ///
    /// Field contents are not validated: past departures and non-positive
    /// seat counts are stored as given.
    pub async fn create_ride(&self, offer: NewRideOffer) -> RideOffer {
        let mut registry = self.inner.write().await;

        let id = registry.next_ride_id;
        registry.next_ride_id += 1;

        let mut ride = offer.into_offer(id);
        ride.requests.clear();
        registry.rides.insert(id, ride.clone());

        tracing::info!(ride_id = id, offerer = %ride.offerer_id, seats = ride.available_seats, "ride created");
        ride
    }

    /// Direct lookup by id, regardless of seats or departure time
    pub async fn get_ride(&self, ride_id: RideId) -> Result<RideOffer, BookingError> {
        self.inner
            .read()
            .await
            .rides
            .get(&ride_id)
            .cloned()
            .ok_or(BookingError::RideNotFound(ride_id))
    }

    /// Rides with a free seat that have not departed yet
    pub async fn list_active_rides(&self) -> Vec<RideOffer> {
        self.list_active_rides_at(Local::now().naive_local()).await
    }

    pub async fn list_active_rides_at(&self, now: NaiveDateTime) -> Vec<RideOffer> {
        self.search_rides_at(&SearchParams::default(), now).await
    }

    /// Active rides narrowed by every supplied criterion in `params`
    pub async fn search_rides(&self, params: &SearchParams) -> Vec<RideOffer> {
        self.search_rides_at(params, Local::now().naive_local()).await
    }

    pub async fn search_rides_at(&self, params: &SearchParams, now: NaiveDateTime) -> Vec<RideOffer> {
        self.inner
            .read()
            .await
            .rides
            .values()
            .filter(|ride| is_active(ride, now) && matches_search(ride, params))
            .cloned()
            .collect()
    }

    /// Removes the ride if present. Returns whether anything was removed;
    /// an unknown id is not an error.
    pub async fn delete_ride(&self, ride_id: RideId) -> bool {
        let removed = self.inner.write().await.rides.remove(&ride_id).is_some();
        if removed {
            tracing::info!(ride_id, "ride deleted");
        } else {
            tracing::debug!(ride_id, "delete of unknown ride ignored");
        }
        removed
    }

    /// Replaces every field of the stored ride except its id.
    ///
    /// This includes `requests`: the ride's request list becomes whatever
    /// `offer.requests` holds, so existing requests are dropped unless the
    /// caller carries them over.
    pub async fn update_ride(
        &self,
        ride_id: RideId,
        offer: NewRideOffer,
    ) -> Result<RideOffer, BookingError> {
        let mut registry = self.inner.write().await;
        let ride = registry.ride_mut(ride_id).inspect_err(|e| {
            tracing::warn!(ride_id, error = %e, "update rejected");
        })?;

        *ride = offer.into_offer(ride_id);

        tracing::info!(ride_id, requests = ride.requests.len(), "ride replaced");
        Ok(ride.clone())
    }

    /// Appends a pending request from `request.requester_id` to the ride.
    ///
    /// Seat availability is not checked here, only on accept.
    pub async fn request_to_join(
        &self,
        ride_id: RideId,
        request: JoinRequest,
    ) -> Result<RideRequest, BookingError> {
        // Hold the write lock across the checks so two joins by the same
        // requester cannot both pass the duplicate check
        let mut registry = self.inner.write().await;
        let id = registry.next_request_id;

        let ride = registry.ride_mut(ride_id)?;

        // The offerer cannot book their own ride, and each requester gets one
        // request per ride whatever the status of the earlier one
        let refusal = if ride.offerer_id == request.requester_id {
            Some(BookingError::SelfBooking)
        } else if ride
            .requests
            .iter()
            .any(|r| r.requester_id == request.requester_id)
        {
            Some(BookingError::DuplicateRequest)
        } else {
            None
        };
        if let Some(err) = refusal {
            tracing::warn!(ride_id, requester = %request.requester_id, code = err.code(), "join request refused");
            return Err(err);
        }

        // Every new request starts pending under the next global request id
        let stored = RideRequest {
            id,
            ride_id,
            requester_id: request.requester_id,
            status: RequestStatus::Pending,
            passenger_name: request.passenger_name,
            real_name: request.real_name,
        };
        ride.requests.push(stored.clone());
        registry.next_request_id += 1;

        tracing::info!(ride_id, request_id = id, requester = %stored.requester_id, "join requested");
        Ok(stored)
    }

    /// Every request made against the ride, whatever its status
    pub async fn requests_for_ride(&self, ride_id: RideId) -> Result<Vec<RideRequest>, BookingError> {
        self.inner
            .read()
            .await
            .rides
            .get(&ride_id)
            .map(|ride| ride.requests.clone())
            .ok_or(BookingError::RideNotFound(ride_id))
    }

    /// Marks the request accepted and takes one seat.
    ///
    /// Fails with `NoSeatsAvailable` when the ride has no seat left. The
    /// request's current status is not consulted.
    pub async fn accept_request(
        &self,
        ride_id: RideId,
        request_id: RequestId,
    ) -> Result<RideRequest, BookingError> {
        let mut registry = self.inner.write().await;
        let ride = registry.ride_mut(ride_id)?;

        // Resolve the request first so an unknown id reports NotFound even
        // on a full ride
        let seats = ride.available_seats;
        let request = ride
            .requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or(BookingError::RequestNotFound {
                ride_id,
                request_id,
            })?;

        // Seat check and decrement happen under the same write lock
        if seats <= 0 {
            tracing::warn!(ride_id, request_id, "accept refused, ride is full");
            return Err(BookingError::NoSeatsAvailable);
        }

        request.status = RequestStatus::Accepted;
        let accepted = request.clone();
        ride.available_seats -= 1;

        tracing::info!(ride_id, request_id, seats_left = ride.available_seats, "request accepted");
        Ok(accepted)
    }

    /// Marks the request rejected. Rejecting twice is harmless.
    pub async fn reject_request(
        &self,
        ride_id: RideId,
        request_id: RequestId,
    ) -> Result<RideRequest, BookingError> {
        let mut registry = self.inner.write().await;
        let request = registry
            .ride_mut(ride_id)?
            .requests
            .iter_mut()
            .find(|r| r.id == request_id)
            .ok_or(BookingError::RequestNotFound {
                ride_id,
                request_id,
            })?;

        request.status = RequestStatus::Rejected;

        tracing::info!(ride_id, request_id, "request rejected");
        Ok(request.clone())
    }

    /// Every ride posted by `user_id`, including full and past ones
    pub async fn offered_history(&self, user_id: &str) -> Vec<RideOffer> {
        self.inner
            .read()
            .await
            .rides
            .values()
            .filter(|ride| ride.offerer_id == user_id)
            .cloned()
            .collect()
    }

    /// Every ride on which `user_id` holds an accepted request
    pub async fn taken_history(&self, user_id: &str) -> Vec<RideOffer> {
        self.inner
            .read()
            .await
            .rides
            .values()
            .filter(|ride| {
                ride.requests
                    .iter()
                    .any(|r| r.requester_id == user_id && r.status == RequestStatus::Accepted)
            })
            .cloned()
            .collect()
    }
}
