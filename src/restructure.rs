//! Regrouping of the flat festival list into a record label hierarchy
//!
//! The API lists festivals with their bands; callers want record labels with
//! their bands, and each band with the festivals it played. The data is grouped
//! in one unsorted pass, then every level is sorted ascending by name.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::data::{Band, Festival, Hierarchy, RawFestival, RecordLabel};

/// Bands of one record label while grouping, before sorting
#[derive(Debug, Default)]
struct LabelBuilder {
    bands: HashMap<String, HashMap<String, Festival>>,
}

/// Regroups festivals into a record label → band → festival hierarchy
///
/// Names missing in the source data are grouped under the empty string, which
/// sorts before every other name. Seeing the same (label, band, festival)
/// again replaces the earlier festival entry rather than duplicating it.
pub fn restructure(festivals: &[RawFestival]) -> Hierarchy {
    debug!(festivals = festivals.len(), "Restructuring music festivals data");
    let mut labels: HashMap<String, LabelBuilder> = HashMap::new();

    for festival in festivals {
        let festival_name = festival.name.as_str();

        for band in &festival.bands {
            let band_name = band.name.as_str();
            let label_name = band.record_label.as_str();

            let label = labels.entry(label_name.to_string()).or_insert_with(|| {
                debug!(record_label = label_name, "Creating record label entry");
                LabelBuilder::default()
            });

            let band_festivals = label.bands.entry(band_name.to_string()).or_insert_with(|| {
                debug!(band = band_name, record_label = label_name, "Adding band to record label");
                HashMap::new()
            });

            band_festivals.insert(festival_name.to_string(), Festival::new(festival_name));
            debug!(
                festival = festival_name,
                band = band_name,
                record_label = label_name,
                "Added festival"
            );
        }
    }

    let mut record_labels: Vec<RecordLabel> = labels
        .into_iter()
        .map(|(name, builder)| RecordLabel {
            name,
            bands: sort_bands(builder.bands),
        })
        .collect();
    record_labels.sort_by(|a, b| a.name.cmp(&b.name));

    Hierarchy { record_labels }
}

/// Sorts a record label's bands, and each band's festivals, by name
fn sort_bands(bands: HashMap<String, HashMap<String, Festival>>) -> BTreeMap<String, Band> {
    bands
        .into_iter()
        .map(|(name, festivals)| {
            let band = Band {
                name: name.clone(),
                festivals: festivals.into_iter().collect(),
            };
            (name, band)
        })
        .collect()
}
