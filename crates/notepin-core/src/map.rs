//! Map overlay: one pin per located note plus the user's current location.
//!
//! Markers are derived from the note list and rebuilt wholesale after every
//! mutation. Every marker and popup carries the note id, so actions taken
//! from a popup look the note up again instead of trusting a list position.

use chrono::{Local, TimeZone};

use crate::config::MapSettings;
use crate::models::{Location, Note, NoteId};

/// Pin for a located note
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub note_id: NoteId,
    pub location: Location,
    pub title: String,
}

/// Details shown when a marker is selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotePopup {
    pub note_id: NoteId,
    pub title: String,
    pub content: String,
    /// `📍 lat, lng` with four decimals
    pub location_label: Option<String>,
    /// `📅 Created: ...`
    pub created_label: Option<String>,
}

impl NotePopup {
    #[must_use]
    pub fn from_note(note: &Note) -> Self {
        Self {
            note_id: note.id,
            title: note.title.clone(),
            content: note.content.clone(),
            location_label: note.location.as_ref().map(Location::label),
            created_label: created_label(note.timestamp),
        }
    }
}

/// Map center and zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Location,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapOverlay {
    markers: Vec<Marker>,
    viewport: Viewport,
    current_location: Option<Location>,
}

impl MapOverlay {
    #[must_use]
    pub const fn new(settings: &MapSettings) -> Self {
        Self {
            markers: Vec::new(),
            viewport: Viewport {
                center: settings.default_center,
                zoom: settings.default_zoom,
            },
            current_location: None,
        }
    }

    /// Throw away all markers and recreate them from `notes`.
    pub fn rebuild(&mut self, notes: &[Note]) {
        self.markers = notes
            .iter()
            .filter_map(|note| {
                note.location.map(|location| Marker {
                    note_id: note.id,
                    location,
                    title: note.title.clone(),
                })
            })
            .collect();
        tracing::debug!("Rebuilt {} map markers", self.markers.len());
    }

    /// Record the device location and center the view on it
    pub fn set_current_location(&mut self, location: Location) {
        self.current_location = Some(location);
        self.viewport.center = location;
    }

    #[must_use]
    pub const fn current_location(&self) -> Option<Location> {
        self.current_location
    }

    #[must_use]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    #[must_use]
    pub fn marker(&self, note_id: NoteId) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.note_id == note_id)
    }

    #[must_use]
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }
}

fn created_label(timestamp_ms: i64) -> Option<String> {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|date| format!("📅 Created: {}", date.format("%b %-d, %Y, %H:%M")))
}
