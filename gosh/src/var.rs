//! Fixed-slot variable store.
//!
//! Shell variables live in a table of [`SLOTS`] entries.  Names are capped at
//! [`NAME_MAX`] characters and values at [`VALUE_MAX`]; longer input is cut
//! rather than rejected.  A full table silently ignores new names, but every
//! write reports what happened through [`SetOutcome`] so callers and tests can
//! see it.

use crate::text::truncate_chars;

/// Number of variable slots.
pub const SLOTS: usize = 32;
/// Longest stored name, in characters.
pub const NAME_MAX: usize = 31;
/// Longest stored value, in characters.
pub const VALUE_MAX: usize = 127;

/// Result of a [`VarStore::set`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// Stored exactly as given.
    Ok,
    /// Stored, but the name or value was cut to fit.
    Truncated,
    /// No slot left for a new name; nothing was stored.
    StoreFull,
}

#[derive(Debug, Clone, Default)]
struct Slot {
    name: String,
    value: String,
    used: bool,
}

/// Global key/value variable store.
#[derive(Debug, Clone)]
pub struct VarStore {
    slots: Vec<Slot>,
}

impl Default for VarStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VarStore {
    pub fn new() -> Self {
        Self {
            slots: vec![Slot::default(); SLOTS],
        }
    }

    /// Set (or overwrite) a variable.
    pub fn set(&mut self, name: &str, value: &str) -> SetOutcome {
        let (name, name_cut) = truncate_chars(name, NAME_MAX);
        let (value, value_cut) = truncate_chars(value, VALUE_MAX);

        let slot = match self.position(name) {
            Some(i) => &mut self.slots[i],
            None => match self.slots.iter_mut().find(|s| !s.used) {
                Some(free) => {
                    free.name.clear();
                    free.name.push_str(name);
                    free.used = true;
                    free
                }
                None => {
                    log::debug!("variable store full, dropping `{name}`");
                    return SetOutcome::StoreFull;
                }
            },
        };
        slot.value.clear();
        slot.value.push_str(value);

        if name_cut || value_cut {
            SetOutcome::Truncated
        } else {
            SetOutcome::Ok
        }
    }

    /// Get the string value of a variable.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.slots[i].value.as_str())
    }

    /// Returns `true` if the variable is set.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Mark every slot unused.
    pub fn clear_all(&mut self) {
        for slot in &mut self.slots {
            slot.used = false;
        }
    }

    /// Iterate over used slots in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.slots
            .iter()
            .filter(|s| s.used)
            .map(|s| (s.name.as_str(), s.value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.used).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Names are compared as stored, so an over-long query finds the slot its
    /// cut form was written to.
    fn position(&self, name: &str) -> Option<usize> {
        let (name, _) = truncate_chars(name, NAME_MAX);
        self.slots.iter().position(|s| s.used && s.name == name)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
