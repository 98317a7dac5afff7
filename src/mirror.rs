//! The local snapshot everything is rendered from.
//!
//! Only completed poll results write here. Each slice is replaced wholesale, so a
//! reader never sees half of an update.

use crate::asset_cache::{AssetCache, SelectionKey};
use crate::menu::MenuStack;
use crate::navigation::{self, NavChange, NavState};
use crate::types::{Game, InputEvent, Orientation, System};

#[derive(Debug, Clone, Default)]
pub struct Mirror {
    catalogue: Vec<System>,
    current_system: Option<System>,
    orientation: Option<Orientation>,
    orientation_seq: u64,
    nav: NavState,
    pub menus: MenuStack,
    pub assets: AssetCache,
    last_input: Option<InputEvent>,
    input_count: u64,
}

impl Mirror {
    pub fn new() -> Self {
        Self::default()
    }

    // ===================================
    // CATALOGUE
    // ===================================

    pub fn catalogue(&self) -> &[System] {
        &self.catalogue
    }

    pub fn update_catalogue(&mut self, systems: Vec<System>) {
        if systems.len() != self.catalogue.len() {
            tracing::debug!(systems = systems.len(), "catalogue changed");
        }
        self.catalogue = systems;
    }

    pub fn current_system(&self) -> Option<&System> {
        self.current_system.as_ref()
    }

    pub fn update_current_system(&mut self, system: System) {
        self.current_system = Some(system);
    }

    /// Description of the focused system. Only trusted while the polled current
    /// system has the same tag as the catalogue entry under the cursor.
    pub fn banner_description(&self) -> Option<&str> {
        let focused = self.focused_system()?;
        let current = self.current_system.as_ref()?;
        if current.tag != focused.tag {
            return None;
        }
        current
            .description
            .as_deref()
            .or(focused.description.as_deref())
    }

    // ===================================
    // ORIENTATION
    // ===================================

    pub fn orientation(&self) -> Option<&Orientation> {
        self.orientation.as_ref()
    }

    pub fn orientation_seq(&self) -> u64 {
        self.orientation_seq
    }

    pub fn nav(&self) -> NavState {
        self.nav
    }

    /// Applies the orientation answered to request `seq`. A response to an older
    /// request than the one last applied is discarded and `None` returned.
    pub fn update_orientation(&mut self, seq: u64, orientation: Orientation) -> Option<NavChange> {
        if seq <= self.orientation_seq {
            tracing::trace!(seq, applied = self.orientation_seq, "discarding stale orientation");
            return None;
        }
        self.orientation_seq = seq;

        let to = NavState::from_orientation(Some(&orientation));
        let change = navigation::reconcile(&mut self.menus, self.nav, to);
        self.nav = to;
        self.orientation = Some(orientation);
        Some(change)
    }

    /// Defined once both the catalogue and an orientation are present.
    pub fn selected_game_index(&self) -> Option<usize> {
        self.selection().map(|key| key.gamelist_index)
    }

    pub fn selection(&self) -> Option<SelectionKey> {
        if self.catalogue.is_empty() {
            return None;
        }
        self.orientation
            .as_ref()
            .map(|o| SelectionKey::new(o.system_index, o.gamelist_index))
    }

    pub fn focused_system(&self) -> Option<&System> {
        let key = self.selection()?;
        self.catalogue.get(key.system_index)
    }

    /// The game under the cursor, if the orientation points at one.
    pub fn selected_game(&self) -> Option<&Game> {
        let key = self.selection()?;
        self.focused_system()?.gamelist.get(key.gamelist_index)
    }

    // ===================================
    // INPUT
    // ===================================

    pub fn record_input(&mut self, input: InputEvent) {
        self.last_input = Some(input);
        self.input_count += 1;
    }

    pub fn last_input(&self) -> Option<InputEvent> {
        self.last_input
    }

    pub fn input_count(&self) -> u64 {
        self.input_count
    }

    /// Back to the state at mount.
    pub fn reset(&mut self) {
        *self = Mirror::default();
    }
}
