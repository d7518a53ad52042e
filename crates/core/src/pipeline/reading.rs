use std::sync::{Arc, Mutex};

use crate::classification::domain::interpreter::Classification;

/// Latest classification, shared between the pipeline (sole writer) and any
/// number of observers.
///
/// Each publish replaces the whole value, so a reader never sees a partially
/// updated result. The value persists across cycles that classify nothing;
/// it only changes when a new face is classified.
#[derive(Clone, Default)]
pub struct SharedReading {
    inner: Arc<Mutex<Option<Classification>>>,
}

impl SharedReading {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, result: Classification) {
        *self.inner.lock().unwrap() = Some(result);
    }

    pub fn get(&self) -> Option<Classification> {
        self.inner.lock().unwrap().clone()
    }
}
