// flag.rs - "Intro already played" persistence
//
// Written to both local and session storage; a "1" in either counts as
// played. Storage can throw (private mode, blocked cookies): every failure
// reads as "not played" and writes are best-effort.

use std::cell::Cell;
use std::rc::Rc;

use web_sys::Storage;

use crate::error::{EngineError, EngineResult};

pub const INTRO_PLAYED_KEY: &str = "introPlayed";
const PLAYED: &str = "1";

pub trait FlagStore {
    fn has_played(&self) -> bool;
    fn mark_played(&self);
}

#[derive(Clone, Copy, Debug)]
enum Scope {
    Local,
    Session,
}

/// Browser-backed flag.
#[derive(Debug, Default)]
pub struct WebFlagStore;

impl WebFlagStore {
    fn storage(scope: Scope) -> EngineResult<Storage> {
        let window = web_sys::window().ok_or(EngineError::Storage("no window".into()))?;
        let storage = match scope {
            Scope::Local => window.local_storage(),
            Scope::Session => window.session_storage(),
        };
        storage
            .map_err(EngineError::storage)?
            .ok_or_else(|| EngineError::Storage(format!("{scope:?} storage disabled")))
    }

    fn read(scope: Scope) -> EngineResult<bool> {
        let value = Self::storage(scope)?
            .get_item(INTRO_PLAYED_KEY)
            .map_err(EngineError::storage)?;
        Ok(value.as_deref() == Some(PLAYED))
    }

    fn write(scope: Scope) -> EngineResult<()> {
        Self::storage(scope)?
            .set_item(INTRO_PLAYED_KEY, PLAYED)
            .map_err(EngineError::storage)
    }
}

impl FlagStore for WebFlagStore {
    fn has_played(&self) -> bool {
        [Scope::Local, Scope::Session]
            .into_iter()
            .any(|scope| Self::read(scope).unwrap_or(false))
    }

    fn mark_played(&self) {
        for scope in [Scope::Local, Scope::Session] {
            if let Err(err) = Self::write(scope) {
                gloo::console::debug!(format!("intro flag not persisted: {err}"));
            }
        }
    }
}

impl<T: FlagStore> FlagStore for Rc<T> {
    fn has_played(&self) -> bool {
        (**self).has_played()
    }

    fn mark_played(&self) {
        (**self).mark_played()
    }
}

/// In-memory flag for tests and hosts without storage.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    played: Cell<bool>,
    writes: Cell<u32>,
}

impl MemoryFlagStore {
    pub fn played() -> Self {
        Self {
            played: Cell::new(true),
            writes: Cell::new(0),
        }
    }

    /// How many times `mark_played` was called.
    pub fn writes(&self) -> u32 {
        self.writes.get()
    }
}

impl FlagStore for MemoryFlagStore {
    fn has_played(&self) -> bool {
        self.played.get()
    }

    fn mark_played(&self) {
        self.played.set(true);
        self.writes.set(self.writes.get() + 1);
    }
}
