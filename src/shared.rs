//! Shared-ownership wrapper for multi-threaded hosts
//!
//! The engine itself is a plain `&mut self` state machine. Hosts that spin
//! from multiple threads (a UI thread plus an auto-play timer, say) wrap it
//! in `SharedEngine`, which serializes access through a mutex. Every method
//! takes the lock for exactly one engine call, so no lock is held across
//! host code.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::EngineConfig;
use crate::engine::{SessionStats, SlotEngine};
use crate::error::EngineError;
use crate::spin::SpinResult;
use crate::state::GameState;

/// Cheaply clonable handle to a mutex-guarded engine.
#[derive(Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<SlotEngine>>,
}

impl SharedEngine {
    /// Wrap an engine for shared use.
    pub fn new(engine: SlotEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// Build directly from a configuration.
    pub fn from_config(config: EngineConfig) -> Result<Self, EngineError> {
        Ok(Self::new(SlotEngine::new(config)?))
    }

    /// Run a closure with exclusive access to the engine. The lock is held
    /// for the duration of the closure only.
    pub fn with<T>(&self, f: impl FnOnce(&mut SlotEngine) -> T) -> T {
        f(&mut self.inner.lock())
    }

    /// One complete spin under the lock.
    pub fn spin(&self) -> Result<SpinResult, EngineError> {
        self.with(|engine| engine.spin())
    }

    /// One auto-play tick under the lock.
    pub fn auto_play_tick(&self) -> Result<Option<SpinResult>, EngineError> {
        self.with(|engine| engine.auto_play_tick())
    }

    /// Clone of the current session state.
    pub fn snapshot(&self) -> GameState {
        self.with(|engine| engine.state().clone())
    }

    /// Clone of the current session statistics.
    pub fn stats(&self) -> SessionStats {
        self.with(|engine| engine.stats().clone())
    }
}
