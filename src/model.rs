//! Data models for the carpool service
//!
//! This module defines the stored entities (ride offers and their join
//! requests) together with the request/response payloads and query
//! parameter shapes used by the HTTP layer. All JSON uses camelCase keys.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

pub type RideId = u64;
pub type RequestId = u64;

/// Lifecycle status of a join request
///
/// Every request starts as `Pending`. Only the accept and reject
/// operations change it.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// A ride posted by a driver
///
/// # Example
/// ```json
/// {
///   "id": 1,
///   "startPoint": "Delhi",
///   "destination": "Noida",
///   "stops": ["Stop1", "Stop2"],
///   "dateTime": "2026-10-16T09:30:00",
///   "availableSeats": 2,
///   "requests": [],
///   "offererId": "EMP1001"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RideOffer {
    /// Assigned by the store on creation, never changed afterwards
    pub id: RideId,

    pub start_point: String,

    pub destination: String,

    /// Intermediate waypoints in travel order
    #[serde(default)]
    pub stops: Vec<String>,

    /// Scheduled departure (local time, no zone)
    #[serde(deserialize_with = "deserialize_date_time")]
    pub date_time: NaiveDateTime,

    /// Remaining seats, decremented by one on every accepted request
    pub available_seats: i32,

    /// Join requests in the order they were made
    #[serde(default)]
    pub requests: Vec<RideRequest>,

    /// User who posted the ride
    #[serde(alias = "companyUserId")]
    pub offerer_id: String,

    /// Optional display name of the offerer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
}

/// A passenger's request to join a ride
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RideRequest {
    pub id: RequestId,

    /// Ride this request was made against
    pub ride_id: RideId,

    #[serde(alias = "companyUserId")]
    pub requester_id: String,

    #[serde(default)]
    pub status: RequestStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passenger_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
}

/// Payload for creating or replacing a ride
///
/// On create, `requests` is ignored and the stored ride starts with none.
/// On update the stored ride is replaced wholesale, so whatever `requests`
/// holds here (empty when omitted) becomes the ride's request list.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewRideOffer {
    pub start_point: String,
    pub destination: String,
    #[serde(default)]
    pub stops: Vec<String>,
    #[serde(deserialize_with = "deserialize_date_time")]
    pub date_time: NaiveDateTime,
    pub available_seats: i32,
    #[serde(default)]
    pub requests: Vec<RideRequest>,
    #[serde(alias = "companyUserId")]
    pub offerer_id: String,
    #[serde(default)]
    pub real_name: Option<String>,
}

impl NewRideOffer {
    pub(crate) fn into_offer(self, id: RideId) -> RideOffer {
        RideOffer {
            id,
            start_point: self.start_point,
            destination: self.destination,
            stops: self.stops,
            date_time: self.date_time,
            available_seats: self.available_seats,
            requests: self.requests,
            offerer_id: self.offerer_id,
            real_name: self.real_name,
        }
    }
}

/// Payload for asking to join a ride
///
/// # Example
/// ```json
/// { "requesterId": "EMP2002", "passengerName": "Asha" }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    #[serde(alias = "companyUserId")]
    pub requester_id: String,
    #[serde(default)]
    pub passenger_name: Option<String>,
    #[serde(default)]
    pub real_name: Option<String>,
}

/// Query parameters for searching active rides
///
/// Every field is optional; absent fields impose no constraint.
///
/// # Example
/// Query string: `?startPoint=delhi&date=2026-10-16&minSeats=2`
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Case-insensitive substring of the start point
    pub start_point: Option<String>,

    /// Case-insensitive substring of the destination
    pub destination: Option<String>,

    /// Departure calendar date as `YYYY-MM-DD`; a malformed value matches nothing
    pub date: Option<String>,

    /// Case-insensitive substring of any stop
    pub stop: Option<String>,

    /// Minimum number of free seats; an empty value means no minimum
    #[serde(default, deserialize_with = "deserialize_optional_count")]
    pub min_seats: Option<i32>,
}

/// Query parameters for the history endpoints
#[derive(Deserialize, Debug)]
pub struct HistoryParams {
    #[serde(rename = "companyUserId", alias = "userId")]
    pub user_id: String,
}

const DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a departure timestamp, accepting a full date-time or a bare date
/// (taken as midnight).
pub fn parse_date_time(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn deserialize_date_time<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date_time(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "invalid dateTime '{raw}', expected YYYY-MM-DD or YYYY-MM-DDTHH:MM[:SS]"
        ))
    })
}

fn deserialize_optional_count<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid number '{raw}'"))),
    }
}
