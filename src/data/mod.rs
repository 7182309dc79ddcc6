//! Core data models for the festival organizer
//!
//! This module contains the raw records decoded from the festivals API and the
//! restructured record label → band → festival hierarchy built from them.

pub mod backoff;
pub mod festivals;
pub mod transport;

pub use backoff::{BackoffConfig, BackoffExecution};
pub use festivals::{parse_festivals, FestivalSource, FestivalsClient, FestivalsError};
pub use transport::{get_with_backoff, HttpExchange, HttpReply, ReqwestExchange};

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Treats an explicit JSON `null` the same as a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A festival as returned by the festivals API
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawFestival {
    /// Festival name, empty when the API omits it
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Bands playing at the festival, in API order
    #[serde(default, deserialize_with = "null_as_default")]
    pub bands: Vec<RawBand>,
}

/// A band entry nested inside a [`RawFestival`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawBand {
    /// Band name, empty when the API omits it
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Record label name, empty when the API omits it
    #[serde(
        rename = "recordLabel",
        default,
        deserialize_with = "null_as_default"
    )]
    pub record_label: String,
}

/// A festival a band has played at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Festival {
    pub name: String,
}

impl Festival {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A band signed to a record label, with the festivals it attended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    /// Band name
    pub name: String,
    /// Festivals keyed by name, iterated in ascending name order
    pub festivals: BTreeMap<String, Festival>,
}

impl Band {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            festivals: BTreeMap::new(),
        }
    }

    /// Festival names in iteration order
    pub fn festival_names(&self) -> Vec<&str> {
        self.festivals.keys().map(String::as_str).collect()
    }
}

/// A record label and the bands signed to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLabel {
    /// Record label name
    pub name: String,
    /// Bands keyed by name, iterated in ascending name order
    pub bands: BTreeMap<String, Band>,
}

impl RecordLabel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bands: BTreeMap::new(),
        }
    }

    /// Looks up a band by name
    pub fn band(&self, name: &str) -> Option<&Band> {
        self.bands.get(name)
    }

    /// Band names in iteration order
    pub fn band_names(&self) -> Vec<&str> {
        self.bands.keys().map(String::as_str).collect()
    }
}

/// The restructured festival data: record labels sorted ascending by name
///
/// Built once by [`crate::restructure::restructure`] and handed out as a shared,
/// read-only snapshot by the cache.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    pub record_labels: Vec<RecordLabel>,
}

impl Hierarchy {
    pub fn iter(&self) -> std::slice::Iter<'_, RecordLabel> {
        self.record_labels.iter()
    }

    pub fn len(&self) -> usize {
        self.record_labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.record_labels.is_empty()
    }

    /// Looks up a record label by name
    pub fn record_label(&self, name: &str) -> Option<&RecordLabel> {
        self.record_labels.iter().find(|label| label.name == name)
    }

    /// Record label names in hierarchy order
    pub fn record_label_names(&self) -> Vec<&str> {
        self.record_labels
            .iter()
            .map(|label| label.name.as_str())
            .collect()
    }
}

impl<'a> IntoIterator for &'a Hierarchy {
    type Item = &'a RecordLabel;
    type IntoIter = std::slice::Iter<'a, RecordLabel>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
