//! Highlighted key state
//!
//! The set of keys currently shown in the pressed colour. This is a visual
//! flag, not a mirror of which keys are being touched: what puts a key in
//! here depends on the press mode, and the host can add or remove keys
//! directly.

use std::collections::BTreeSet;

/// Pressed-key set plus the single/multi highlighting rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pressed: BTreeSet<usize>,
    multi: bool,
}

impl Default for Highlight {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Highlight {
    pub fn new(multi: bool) -> Self {
        Self {
            pressed: BTreeSet::new(),
            multi,
        }
    }

    /// Whether more than one key may be highlighted at once
    pub fn is_multi(&self) -> bool {
        self.multi
    }

    pub fn is_pressed(&self, key: usize) -> bool {
        self.pressed.contains(&key)
    }

    /// Pressed keys in ascending order
    pub fn pressed_keys(&self) -> impl Iterator<Item = usize> + '_ {
        self.pressed.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.pressed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    /// Highlight a key
    ///
    /// In single highlighting mode any other highlighted key is released
    /// first. Returns `false` if the key was already highlighted.
    pub fn show_pressed(&mut self, key: usize) -> bool {
        if self.pressed.contains(&key) {
            return false;
        }
        if !self.multi {
            self.pressed.clear();
        }
        self.pressed.insert(key);
        true
    }

    /// Remove a key's highlight. Returns `false` if it was not highlighted.
    pub fn show_not_pressed(&mut self, key: usize) -> bool {
        self.pressed.remove(&key)
    }

    /// Flip a key between highlighted and not highlighted
    pub fn toggle(&mut self, key: usize) {
        if !self.show_not_pressed(key) {
            self.show_pressed(key);
        }
    }

    /// Remove every highlight. Returns `false` if nothing was highlighted.
    pub fn clear(&mut self) -> bool {
        let changed = !self.pressed.is_empty();
        self.pressed.clear();
        changed
    }

    /// Drop highlights for keys that no longer exist
    pub fn prune(&mut self, number_of_keys: usize) -> bool {
        let before = self.pressed.len();
        self.pressed.retain(|&key| key < number_of_keys);
        self.pressed.len() != before
    }

    /// Switch between single and multi highlighting
    ///
    /// Going to single highlighting while several keys are lit keeps only
    /// the lowest one. Returns `true` if the pressed set changed.
    pub fn set_multi(&mut self, multi: bool) -> bool {
        if self.multi == multi {
            return false;
        }
        let mut changed = false;
        if !multi && self.pressed.len() > 1 {
            if let Some(&lowest) = self.pressed.iter().next() {
                log::debug!(
                    "Single key highlighting: keeping key {} of {:?}",
                    lowest,
                    self.pressed
                );
                self.pressed.clear();
                self.pressed.insert(lowest);
                changed = true;
            }
        }
        self.multi = multi;
        changed
    }

    /// Replace the pressed set wholesale, honouring the single-key rule
    pub(crate) fn replace(&mut self, keys: impl IntoIterator<Item = usize>) {
        self.pressed.clear();
        for key in keys {
            self.show_pressed(key);
        }
    }
}
