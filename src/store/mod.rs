// 💾 Store - Best-effort persistence of the tracker state
//
// The whole TrackerState lives in one named slot of a key-value backend.
// Loading never fails (missing or corrupt data degrades to the default state)
// and saving never propagates errors (they are logged and dropped).

pub mod file;
pub mod memory;
pub mod sqlite;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::expense::{Expense, TrackerState, DEFAULT_BUDGET};
use serde::Deserialize;

/// Slot holding the serialized tracker state
pub const STORAGE_KEY: &str = "expenses-data";

// ============================================================================
// KEY-VALUE BACKEND
// ============================================================================

/// A local string-to-string slot store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

// ============================================================================
// STATE STORE
// ============================================================================

/// How the last load resolved
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// Slot found and decoded
    Loaded,
    /// Nothing saved yet
    Missing,
    /// Slot present but unusable
    Corrupt(String),
    /// Backend could not be read
    Unavailable(String),
}

/// Lenient on-disk shape: absent or null fields take their defaults
#[derive(Debug, Deserialize)]
struct PersistedState {
    #[serde(default)]
    expenses: Option<Vec<Expense>>,
    #[serde(default)]
    budget: Option<f64>,
}

pub struct Store<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> Store<S> {
    pub fn new(backend: S) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: S, key: &str) -> Self {
        Store {
            backend,
            key: key.to_string(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn into_backend(self) -> S {
        self.backend
    }

    /// Read the slot, falling back to the default state on any problem
    pub fn load(&self) -> TrackerState {
        self.load_with_outcome().0
    }

    pub fn load_with_outcome(&self) -> (TrackerState, LoadOutcome) {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %self.key, "no saved state, starting fresh");
                return (TrackerState::default(), LoadOutcome::Missing);
            }
            Err(err) => {
                tracing::warn!(key = %self.key, "could not read saved state: {}", err);
                return (TrackerState::default(), LoadOutcome::Unavailable(err.to_string()));
            }
        };

        match decode_state(&raw) {
            Ok(state) => {
                tracing::debug!(
                    key = %self.key,
                    expenses = state.expenses.len(),
                    budget = state.budget,
                    "loaded saved state"
                );
                (state, LoadOutcome::Loaded)
            }
            Err(reason) => {
                tracing::warn!(key = %self.key, "saved state is corrupt, using defaults: {}", reason);
                (TrackerState::default(), LoadOutcome::Corrupt(reason))
            }
        }
    }

    /// Write the state, logging and dropping any failure
    pub fn save(&mut self, state: &TrackerState) {
        if let Err(err) = self.try_save(state) {
            tracing::warn!(key = %self.key, "failed to save state: {}", err);
        }
    }

    pub fn try_save(&mut self, state: &TrackerState) -> Result<(), StoreError> {
        let payload = encode_state(state)?;
        self.backend.set(&self.key, &payload)
    }
}

pub fn encode_state(state: &TrackerState) -> Result<String, StoreError> {
    Ok(serde_json::to_string(state)?)
}

/// Decode a saved blob. Errors carry a human-readable reason.
pub fn decode_state(raw: &str) -> Result<TrackerState, String> {
    let persisted: PersistedState = serde_json::from_str(raw).map_err(|e| e.to_string())?;

    let state = TrackerState {
        expenses: persisted.expenses.unwrap_or_default(),
        budget: persisted.budget.unwrap_or(DEFAULT_BUDGET),
    };

    if !state.is_well_formed() {
        return Err("state violates invariants (empty name or negative value)".to_string());
    }

    Ok(state)
}

// ============================================================================
// TESTS
// ============================================================================
