use leptos::logging::log;
use serde::{Deserialize, Serialize};

use crate::nps::{present, ParkRecord, ResourceKind};

/// Records picked from the search results, in pick order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    items: Vec<ParkRecord>,
}

fn same_record(a: &ParkRecord, b: &ParkRecord) -> bool {
    let same_id = matches!(
        (present(&a.id), present(&b.id)),
        (Some(x), Some(y)) if x == y
    );
    let same_name = matches!(
        (a.name_key(), b.name_key()),
        (Some(x), Some(y)) if x == y
    );
    same_id || same_name
}

impl Selection {
    /// Returns false when the record (same id, or same name) is already selected.
    pub fn add(&mut self, record: ParkRecord) -> bool {
        if self.items.iter().any(|item| same_record(item, &record)) {
            return false;
        }
        self.items.push(record);
        true
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[ParkRecord] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.items
            .iter()
            .map(|item| item.display_title().to_string())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub lat: String,
    pub lng: String,
}

/// The part of a selected record that is handed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextEntry {
    pub resource: ResourceKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub states: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub park_code: Option<String>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub official_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coords: Option<Coords>,
    pub activities: Vec<String>,
}

impl ContextEntry {
    pub fn project(resource: ResourceKind, record: &ParkRecord) -> Self {
        let coords = match (present(&record.latitude), present(&record.longitude)) {
            (Some(lat), Some(lng)) => Some(Coords {
                lat: lat.to_string(),
                lng: lng.to_string(),
            }),
            _ => None,
        };
        Self {
            resource,
            title: record.display_title().to_string(),
            states: present(&record.states).map(str::to_string),
            park_code: present(&record.park_code).map(str::to_string),
            description: present(&record.description).unwrap_or_default().to_string(),
            image: record.first_image().map(str::to_string),
            official_url: present(&record.url).map(str::to_string),
            coords,
            activities: record.activity_names(),
        }
    }
}

/// Point-in-time JSON of the selection, as handed to the chat. Replaced, never edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NpsContext(String);

impl NpsContext {
    pub fn snapshot(resource: ResourceKind, selection: &Selection) -> Self {
        if selection.is_empty() {
            return Self::default();
        }
        let entries: Vec<ContextEntry> = selection
            .items()
            .iter()
            .map(|record| ContextEntry::project(resource, record))
            .collect();
        match serde_json::to_string_pretty(&entries) {
            Ok(json) => Self(json),
            Err(e) => {
                log!("[ERROR] [Search] Failed to serialize selection: {}", e);
                Self::default()
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
