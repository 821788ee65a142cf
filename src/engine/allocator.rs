use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use log::{debug, error};
use crate::{IdAllocator, Result};
use crate::engine::{CounterFile, Counters};

/// Issues monotonically increasing identifiers per counter name.
///
/// With a [`CounterFile`] attached every call performs a full
/// read-modify-write round trip against disk, so identifiers survive process
/// restarts. Without one the counters only live as long as the allocator.
///
/// The round trip runs under a single mutex; concurrent callers in the same
/// process never receive the same identifier. Separate processes sharing a
/// counter file are not coordinated.
pub struct Allocator {
    persistence: Option<CounterFile>,
    state: Mutex<Counters>,
}

impl Allocator {
    pub fn new(persistence: Option<CounterFile>) -> Self {
        Self {
            persistence,
            state: Mutex::new(Counters::new()),
        }
    }

    /// Opens a file-backed allocator at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Some(CounterFile::new(path)?)))
    }

    pub fn in_memory() -> Self {
        Self::new(None)
    }

    pub fn is_persistent(&self) -> bool {
        self.persistence.is_some()
    }

    /// Returns a snapshot of the counters as they would be read by the next allocation.
    pub fn counters(&self) -> Counters {
        let state = self.lock();
        self.read(&state)
    }

    /// Forgets every counter, deleting the backing file when there is one.
    ///
    /// The next allocation for any counter returns 1.
    pub fn reset(&self) -> Result<()> {
        let mut state = self.lock();
        *state = Counters::new();
        if let Some(p) = &self.persistence {
            p.remove()?;
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Counters> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self, cached: &Counters) -> Counters {
        match &self.persistence {
            Some(p) => match p.load() {
                Ok(counters) => counters,
                Err(e) => {
                    error!(
                        "Could not read counter file {:?}, starting from an empty mapping: {}",
                        p.path(),
                        e
                    );
                    Counters::new()
                }
            },
            None => cached.clone(),
        }
    }
}

impl IdAllocator for Allocator {
    fn next_id(&self, counter: &str) -> Result<u64> {
        let mut state = self.lock();
        let mut counters = self.read(&state);
        let id = counters.advance(counter)?;

        if let Some(p) = &self.persistence {
            if let Err(e) = p.save(&counters) {
                error!("Failed to persist counter {} (issued id {}): {}", counter, id, e);
            }
        }

        debug!("Allocated {} id {}", counter, id);
        *state = counters;
        Ok(id)
    }
}
