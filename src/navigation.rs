//! Navigation state derived from the remote orientation.
//!
//! Nothing here is mutated by local input: the remote owns the cursor, and each new
//! orientation is reconciled into the menu stack. Newly pushed frames start out
//! pending; the sync context fetches them on the same tick.

use crate::menu::{MenuKind, MenuStack};
use crate::types::Orientation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NavState {
    /// Menu inactive: browsing systems and their game lists.
    #[default]
    Browse,
    /// Top-level menu focused.
    MenuTop { menu_index: Option<usize> },
    /// A submenu entry focused.
    Submenu {
        menu_index: Option<usize>,
        item_index: usize,
    },
}

impl NavState {
    pub fn from_orientation(orientation: Option<&Orientation>) -> Self {
        match orientation {
            Some(o) if o.menu_active => match o.menu_item_index {
                None => NavState::MenuTop {
                    menu_index: o.menu_index,
                },
                Some(item_index) => NavState::Submenu {
                    menu_index: o.menu_index,
                    item_index,
                },
            },
            _ => NavState::Browse,
        }
    }

    pub fn is_menu(&self) -> bool {
        !matches!(self, NavState::Browse)
    }

    pub fn menu_index(&self) -> Option<usize> {
        match self {
            NavState::Browse => None,
            NavState::MenuTop { menu_index } | NavState::Submenu { menu_index, .. } => *menu_index,
        }
    }

    pub fn item_index(&self) -> Option<usize> {
        match self {
            NavState::Submenu { item_index, .. } => Some(*item_index),
            _ => None,
        }
    }

    /// The submenu this state wants open, if any.
    pub fn submenu_kind(&self) -> Option<MenuKind> {
        match self {
            NavState::Submenu { menu_index, .. } => MenuKind::submenu_for(*menu_index),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavChange {
    pub from: NavState,
    pub to: NavState,
}

impl NavChange {
    pub fn opened_menu(&self) -> bool {
        !self.from.is_menu() && self.to.is_menu()
    }

    pub fn closed_menu(&self) -> bool {
        self.from.is_menu() && !self.to.is_menu()
    }

    pub fn left_submenu(&self) -> bool {
        self.from.submenu_kind().is_some() && self.from.submenu_kind() != self.to.submenu_kind()
    }
}

/// Brings `menus` in line with `to`. Idempotent for a repeated state.
pub fn reconcile(menus: &mut MenuStack, from: NavState, to: NavState) -> NavChange {
    let change = NavChange { from, to };
    if change.opened_menu() {
        tracing::debug!(?to, "menu opened");
    } else if change.closed_menu() {
        tracing::debug!(?from, "menu closed");
    }

    if !to.is_menu() {
        menus.clear();
        return change;
    }

    if menus.is_empty() {
        menus.push(MenuKind::Top);
    }

    match to.submenu_kind() {
        None => {
            if menus.depth() > 1 {
                tracing::debug!("submenu closed");
            }
            if let NavState::Submenu { menu_index, .. } = to {
                tracing::trace!(?menu_index, "top-level entry has no submenu");
            }
            menus.truncate(1);
        }
        Some(kind) => {
            let open = menus.submenu().map(|frame| frame.kind);
            if open != Some(kind) {
                menus.truncate(1);
                menus.push(kind);
                tracing::debug!(?kind, "submenu opened");
            }
        }
    }

    change
}
