//! The menu stack mirrored from the remote: top-level menu, then at most one submenu.
//!
//! Frames are replaced wholesale. Every pushed frame gets a fresh id, and fetch results
//! are installed through a [`FrameTicket`] carrying that id, so a result for a frame that
//! has since been popped or replaced is discarded instead of resurrecting a stale menu.

use std::collections::BTreeMap;

use crate::types::{SettingType, SettingValue};

/// Deepest supported nesting: the top menu plus one submenu.
pub const MAX_MENU_DEPTH: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKind {
    Top,
    Settings,
}

impl MenuKind {
    /// The submenu opened by a top-level entry. Only entry 0 has one.
    pub fn submenu_for(menu_index: Option<usize>) -> Option<MenuKind> {
        match menu_index {
            Some(0) => Some(MenuKind::Settings),
            _ => None,
        }
    }

    pub fn has_values(&self) -> bool {
        matches!(self, MenuKind::Settings)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Needs a fetch (new, or the last fetch failed).
    Pending,
    Loading,
    Loaded,
}

/// Identifies one pushed frame for installing fetch results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTicket {
    id: u64,
    kind: MenuKind,
}

impl FrameTicket {
    pub fn kind(&self) -> MenuKind {
        self.kind
    }
}

#[derive(Debug, Clone)]
pub struct MenuFrame {
    id: u64,
    pub kind: MenuKind,
    pub status: FrameStatus,
    pub labels: Vec<String>,
    /// Aligned with `labels`; empty for menus without values.
    pub types: Vec<SettingType>,
    /// Last fetched serialized value per setting index.
    pub values: BTreeMap<usize, String>,
}

impl MenuFrame {
    fn new(id: u64, kind: MenuKind) -> Self {
        MenuFrame {
            id,
            kind,
            status: FrameStatus::Pending,
            labels: Vec::new(),
            types: Vec::new(),
            values: BTreeMap::new(),
        }
    }

    pub fn ticket(&self) -> FrameTicket {
        FrameTicket {
            id: self.id,
            kind: self.kind,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.status == FrameStatus::Loaded
    }

    /// The decoded value of setting `index`, if one has been fetched.
    pub fn value(&self, index: usize) -> Option<SettingValue> {
        self.values
            .get(&index)
            .map(|raw| SettingValue::decode(self.types.get(index), raw))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MenuStack {
    frames: Vec<MenuFrame>,
    next_id: u64,
}

impl MenuStack {
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frame(&self, depth: usize) -> Option<&MenuFrame> {
        self.frames.get(depth)
    }

    pub fn top(&self) -> Option<&MenuFrame> {
        self.frames.first()
    }

    pub fn submenu(&self) -> Option<&MenuFrame> {
        self.frames.get(1)
    }

    /// Pushes an empty frame. Returns `None` when the stack is already at [`MAX_MENU_DEPTH`].
    pub fn push(&mut self, kind: MenuKind) -> Option<FrameTicket> {
        if self.frames.len() >= MAX_MENU_DEPTH {
            tracing::warn!(?kind, "menu stack is full");
            return None;
        }
        self.next_id += 1;
        let frame = MenuFrame::new(self.next_id, kind);
        let ticket = frame.ticket();
        self.frames.push(frame);
        Some(ticket)
    }

    /// Drops every frame deeper than `depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    fn frame_mut(&mut self, ticket: FrameTicket) -> Option<&mut MenuFrame> {
        self.frames.iter_mut().find(|frame| frame.id == ticket.id)
    }

    pub fn is_current(&self, ticket: FrameTicket) -> bool {
        self.frames.iter().any(|frame| frame.id == ticket.id)
    }

    /// Marks every pending frame as loading and returns their tickets.
    pub fn take_pending(&mut self) -> Vec<FrameTicket> {
        self.frames
            .iter_mut()
            .filter(|frame| frame.status == FrameStatus::Pending)
            .map(|frame| {
                frame.status = FrameStatus::Loading;
                frame.ticket()
            })
            .collect()
    }

    /// Returns the frame to pending so the next tick fetches it again.
    pub fn mark_failed(&mut self, ticket: FrameTicket) {
        if let Some(frame) = self.frame_mut(ticket) {
            frame.status = FrameStatus::Pending;
        }
    }

    /// Installs labels. Menus without values are complete once labelled.
    pub fn install_labels(&mut self, ticket: FrameTicket, labels: Vec<String>) -> bool {
        let Some(frame) = self.frame_mut(ticket) else {
            tracing::trace!(?ticket, "discarding labels for a closed menu");
            return false;
        };
        frame.labels = labels;
        frame.values.clear();
        if !frame.kind.has_values() {
            frame.status = FrameStatus::Loaded;
        }
        true
    }

    pub fn install_types(&mut self, ticket: FrameTicket, types: Vec<SettingType>) -> bool {
        let Some(frame) = self.frame_mut(ticket) else {
            tracing::trace!(?ticket, "discarding types for a closed menu");
            return false;
        };
        if types.len() != frame.labels.len() {
            tracing::debug!(
                labels = frame.labels.len(),
                types = types.len(),
                "setting types are not aligned with labels"
            );
        }
        frame.types = types;
        frame.status = FrameStatus::Loaded;
        true
    }

    pub fn install_value(&mut self, ticket: FrameTicket, index: usize, value: String) -> bool {
        match self.frame_mut(ticket) {
            Some(frame) if index < frame.labels.len() => {
                frame.values.insert(index, value);
                true
            }
            _ => false,
        }
    }

    /// Number of settings in the frame, if the frame is still open.
    pub fn value_count(&self, ticket: FrameTicket) -> Option<usize> {
        self.frames
            .iter()
            .find(|frame| frame.id == ticket.id)
            .map(|frame| frame.labels.len())
    }
}
