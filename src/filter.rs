//! Visibility and search predicates over ride offers
//!
//! These are pure functions; the store applies them to a snapshot of its
//! rides while holding the read lock.

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::{RideOffer, SearchParams};

/// A ride is listed publicly only while it has a free seat and has not
/// departed yet.
pub fn is_active(offer: &RideOffer, now: NaiveDateTime) -> bool {
    offer.available_seats > 0 && offer.date_time > now
}

/// Parses the `date` search parameter.
///
/// Only the strict ISO form `YYYY-MM-DD` is accepted: no padding, no sign,
/// no single-digit month or day.
pub fn parse_search_date(text: &str) -> Option<NaiveDate> {
    let bytes = text.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// Applies every supplied search criterion to `offer`.
///
/// This does not include the active-ride check; see [`is_active`].
pub fn matches_search(offer: &RideOffer, params: &SearchParams) -> bool {
    if let Some(start) = &params.start_point {
        if !contains_ignore_case(&offer.start_point, start) {
            return false;
        }
    }

    if let Some(destination) = &params.destination {
        if !contains_ignore_case(&offer.destination, destination) {
            return false;
        }
    }

    if let Some(date) = &params.date {
        // An unparseable date filters everything out rather than erroring
        match parse_search_date(date) {
            Some(day) if offer.date_time.date() == day => {}
            _ => return false,
        }
    }

    if let Some(stop) = &params.stop {
        if !offer.stops.iter().any(|s| contains_ignore_case(s, stop)) {
            return false;
        }
    }

    match params.min_seats {
        Some(min) => offer.available_seats >= min,
        None => true,
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
