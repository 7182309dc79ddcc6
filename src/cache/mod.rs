//! Cache module for the restructured festival hierarchy
//!
//! This module provides an in-memory cache that holds the record label hierarchy
//! for a fixed time-to-live. Only one population runs at a time, and a failed
//! population never replaces the value already held.

mod manager;

pub use manager::FestivalCache;
