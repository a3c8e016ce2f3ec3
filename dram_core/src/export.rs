//! CSV export and import of consumption events.

use crate::{ConsumptionEvent, DrinkCategory, Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// A row in the CSV file
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    id: String,
    timestamp: String,
    category: String,
    volume_ml: f64,
    abv_percent: f64,
    price: Option<f64>,
    location: Option<String>,
    note: Option<String>,
    favorite: bool,
}

impl From<&ConsumptionEvent> for CsvRow {
    fn from(event: &ConsumptionEvent) -> Self {
        CsvRow {
            id: event.id.to_string(),
            timestamp: event.timestamp.to_rfc3339(),
            category: event.category.key().to_string(),
            volume_ml: event.volume_ml,
            abv_percent: event.abv_percent,
            price: event.price,
            location: event.location.clone(),
            note: event.note.clone(),
            favorite: event.is_favorite,
        }
    }
}

impl TryFrom<CsvRow> for ConsumptionEvent {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|e| Error::Import(format!("Invalid UUID '{}': {}", row.id, e)))?;

        let timestamp = DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| Error::Import(format!("Invalid timestamp '{}': {}", row.timestamp, e)))?
            .with_timezone(&Utc);

        let category: DrinkCategory = row.category.parse()?;

        let event = ConsumptionEvent {
            id,
            timestamp,
            category,
            volume_ml: row.volume_ml,
            abv_percent: row.abv_percent,
            price: row.price,
            location: row.location.filter(|s| !s.is_empty()),
            note: row.note.filter(|s| !s.is_empty()),
            is_favorite: row.favorite,
        };
        event.validate()?;
        Ok(event)
    }
}

/// Write events to a CSV file, oldest first; returns the row count
pub fn write_csv(events: &[ConsumptionEvent], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut sorted: Vec<&ConsumptionEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);

    let mut writer = csv::Writer::from_path(path)?;
    for event in &sorted {
        writer.serialize(CsvRow::from(*event))?;
    }
    writer.flush()?;

    tracing::info!("Exported {} events to {:?}", sorted.len(), path);
    Ok(sorted.len())
}

/// Read events from a CSV file, skipping rows that do not parse
///
/// An empty `location` or `note` cell reads back as `None`; the CSV form
/// cannot tell an absent value from an empty string.
pub fn read_csv(path: &Path) -> Result<Vec<ConsumptionEvent>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;

    let mut events = Vec::new();
    for (row_num, result) in reader.deserialize::<CsvRow>().enumerate() {
        match result {
            Ok(row) => match ConsumptionEvent::try_from(row) {
                Ok(event) => events.push(event),
                Err(e) => tracing::warn!("Skipping CSV row {}: {}", row_num + 1, e),
            },
            Err(e) => tracing::warn!("Failed to deserialize CSV row {}: {}", row_num + 1, e),
        }
    }

    tracing::info!("Read {} events from {:?}", events.len(), path);
    Ok(events)
}
