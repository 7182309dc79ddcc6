//! Festival Organizer Library
//!
//! Fetches music festivals from the festivals API, regroups them by record label
//! and band, and caches the result. The binary is a thin wrapper around
//! [`service::FestivalService`].

pub mod cache;
pub mod cli;
pub mod data;
pub mod output;
pub mod restructure;
pub mod service;
