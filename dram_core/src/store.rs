//! Event store: the canonical owner of events, presets and profile.
//!
//! Calculators and the aggregation engine never reach into the store; callers
//! take a snapshot (`events()`, `profile()`) and pass it in.

use crate::journal::{self, EventMutation, JsonlJournal, MutationSink};
use crate::state::UserState;
use crate::{ConsumptionEvent, ConsumptionPreset, Error, Result, UserPhysiology};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File name of the event journal inside the data dir
pub const JOURNAL_FILE: &str = "journal.jsonl";

/// File name of the profile/preset state inside the data dir
pub const STATE_FILE: &str = "state.json";

/// Storage collaborator interface
pub trait EventStore {
    /// Latest committed events, in insertion order
    fn events(&self) -> &[ConsumptionEvent];

    fn event(&self, id: Uuid) -> Option<&ConsumptionEvent> {
        self.events().iter().find(|e| e.id == id)
    }

    /// Insert a new event or replace the one with the same id
    fn upsert_event(&mut self, event: ConsumptionEvent) -> Result<()>;

    /// Remove an event; `Error::NotFound` if the id is unknown
    fn delete_event(&mut self, id: Uuid) -> Result<()>;

    fn presets(&self) -> &[ConsumptionPreset];

    fn upsert_preset(&mut self, preset: ConsumptionPreset) -> Result<()>;

    fn delete_preset(&mut self, id: &str) -> Result<()>;

    fn profile(&self) -> &UserPhysiology;

    fn set_profile(&mut self, profile: UserPhysiology) -> Result<()>;
}

/// Store persisted as a journal plus a state file under one directory
pub struct FileStore {
    journal: JsonlJournal,
    state_path: PathBuf,
    events: Vec<ConsumptionEvent>,
    state: UserState,
}

impl FileStore {
    /// Open (or lazily create) a store rooted at `data_dir`
    pub fn open(data_dir: &Path) -> Result<Self> {
        let journal_path = data_dir.join(JOURNAL_FILE);
        let state_path = data_dir.join(STATE_FILE);

        let events = journal::load_events(&journal_path)?;
        let state = UserState::load(&state_path)?;

        tracing::info!(
            "Opened store at {:?}: {} events, {} presets",
            data_dir,
            events.len(),
            state.presets.len()
        );

        Ok(Self {
            journal: JsonlJournal::new(journal_path),
            state_path,
            events,
            state,
        })
    }

    pub fn journal_path(&self) -> &Path {
        self.journal.path()
    }

    /// Rewrite the journal as one upsert per live event
    pub fn compact(&mut self) -> Result<usize> {
        journal::rewrite(self.journal.path(), &self.events)?;
        Ok(self.events.len())
    }

    /// Add events whose ids are not already present; returns how many were added
    pub fn import(&mut self, events: Vec<ConsumptionEvent>) -> Result<usize> {
        let mut known: HashSet<Uuid> = self.events.iter().map(|e| e.id).collect();
        let mut added = 0;

        for event in events {
            if !known.insert(event.id) {
                tracing::debug!("Skipping already-known event {}", event.id);
                continue;
            }
            if let Err(e) = event.validate() {
                tracing::warn!("Skipping invalid imported event {}: {}", event.id, e);
                continue;
            }
            self.upsert_event(event)?;
            added += 1;
        }

        tracing::info!("Imported {} new events", added);
        Ok(added)
    }

    fn save_state(&self) -> Result<()> {
        self.state.save(&self.state_path)
    }
}

impl EventStore for FileStore {
    fn events(&self) -> &[ConsumptionEvent] {
        &self.events
    }

    fn upsert_event(&mut self, event: ConsumptionEvent) -> Result<()> {
        event.validate()?;
        self.journal.append(&EventMutation::Upsert {
            event: event.clone(),
        })?;

        match self.events.iter_mut().find(|e| e.id == event.id) {
            Some(existing) => *existing = event,
            None => self.events.push(event),
        }
        Ok(())
    }

    fn delete_event(&mut self, id: Uuid) -> Result<()> {
        let position = self
            .events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| Error::NotFound(format!("event {}", id)))?;

        self.journal.append(&EventMutation::Delete { id })?;
        self.events.remove(position);
        Ok(())
    }

    fn presets(&self) -> &[ConsumptionPreset] {
        &self.state.presets
    }

    fn upsert_preset(&mut self, preset: ConsumptionPreset) -> Result<()> {
        preset.validate()?;
        match self.state.presets.iter_mut().find(|p| p.id == preset.id) {
            Some(existing) => *existing = preset,
            None => self.state.presets.push(preset),
        }
        self.save_state()
    }

    fn delete_preset(&mut self, id: &str) -> Result<()> {
        let position = self
            .state
            .presets
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| Error::NotFound(format!("preset '{}'", id)))?;
        self.state.presets.remove(position);
        self.save_state()
    }

    fn profile(&self) -> &UserPhysiology {
        &self.state.profile
    }

    fn set_profile(&mut self, profile: UserPhysiology) -> Result<()> {
        profile.validate()?;
        self.state.profile = profile;
        self.save_state()
    }
}
