//! Append-only event journal.
//!
//! Every upsert or delete is appended as one JSON line under an exclusive
//! file lock. Replaying the journal in order yields the current event list.

use crate::{ConsumptionEvent, Error, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// One journaled change to the event collection
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EventMutation {
    Upsert { event: ConsumptionEvent },
    Delete { id: Uuid },
}

/// Sink for event mutations
pub trait MutationSink {
    fn append(&mut self, mutation: &EventMutation) -> Result<()>;
}

/// JSONL-backed journal with file locking
pub struct JsonlJournal {
    path: PathBuf,
}

impl JsonlJournal {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl MutationSink for JsonlJournal {
    fn append(&mut self, mutation: &EventMutation) -> Result<()> {
        self.ensure_parent_dir()?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;
        let torn_tail = ends_without_newline(&mut file)?;

        let mut writer = std::io::BufWriter::new(&file);
        if torn_tail {
            tracing::warn!("Journal {:?} ends in a partial line", self.path);
            writer.write_all(b"\n")?;
        }
        let line = serde_json::to_string(mutation)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.unlock()?;

        match mutation {
            EventMutation::Upsert { event } => {
                tracing::debug!("Journaled upsert of event {}", event.id)
            }
            EventMutation::Delete { id } => tracing::debug!("Journaled delete of event {}", id),
        }
        Ok(())
    }
}

fn ends_without_newline(file: &mut File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

/// Read all mutations from a journal file
///
/// Lines that fail to parse (including a torn final line) are skipped.
pub fn read_mutations(path: &Path) -> Result<Vec<EventMutation>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let file = File::open(path)?;
    file.lock_shared()?;

    let reader = BufReader::new(&file);
    let mut mutations = Vec::new();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<EventMutation>(&line) {
            Ok(mutation) => mutations.push(mutation),
            Err(e) => {
                tracing::warn!("Skipping journal line {}: {}", line_num + 1, e);
            }
        }
    }

    file.unlock()?;
    tracing::debug!("Read {} mutations from journal", mutations.len());
    Ok(mutations)
}

/// Apply mutations in order
///
/// An upsert of a known id replaces it in place; a new id is appended.
/// Deleting an unknown id is a no-op.
pub fn replay(mutations: impl IntoIterator<Item = EventMutation>) -> Vec<ConsumptionEvent> {
    let mut slots: Vec<Option<ConsumptionEvent>> = Vec::new();
    let mut index: HashMap<Uuid, usize> = HashMap::new();

    for mutation in mutations {
        match mutation {
            EventMutation::Upsert { event } => match index.get(&event.id) {
                Some(&slot) => slots[slot] = Some(event),
                None => {
                    index.insert(event.id, slots.len());
                    slots.push(Some(event));
                }
            },
            EventMutation::Delete { id } => {
                if let Some(slot) = index.remove(&id) {
                    slots[slot] = None;
                }
            }
        }
    }

    slots.into_iter().flatten().collect()
}

/// Load the current event list from a journal file
pub fn load_events(path: &Path) -> Result<Vec<ConsumptionEvent>> {
    let events = replay(read_mutations(path)?);
    tracing::info!("Loaded {} events from journal", events.len());
    Ok(events)
}

/// Atomically replace the journal with one upsert per event
pub fn rewrite(path: &Path, events: &[ConsumptionEvent]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| Error::Store(format!("journal path {:?} has no parent", path)))?;
    std::fs::create_dir_all(parent)?;

    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        for event in events {
            let mutation = EventMutation::Upsert {
                event: event.clone(),
            };
            serde_json::to_writer(&mut writer, &mutation)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!("Rewrote journal {:?} with {} events", path, events.len());
    Ok(())
}
