//! Library exports for the carpool service
//!
//! The booking logic lives in `store` and `filter`; `handler` and `route`
//! expose it over HTTP.

pub mod config;
pub mod error;
pub mod filter;
pub mod handler;
pub mod model;
pub mod route;
pub mod store;
