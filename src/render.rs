//! Projects the mirror into a view tree.
//!
//! The tree is plain data: node kinds plus the class names used as styling hooks.
//! Missing optional data becomes a placeholder node. An orientation that points
//! outside the catalogue is the remote breaking its contract and comes back as a
//! [`RenderError`].

use std::ops::Range;
use std::path::PathBuf;

use crate::asset_cache::AssetEntry;
use crate::error::RenderError;
use crate::highlight::classify;
use crate::menu::MenuFrame;
use crate::mirror::Mirror;
use crate::navigation::NavState;
use crate::types::System;

pub const NO_SYSTEMS: &str = "No Systems Loaded";
pub const NO_GAME_LIST: &str = "No Game List Loaded";
pub const NO_ORIENTATION: &str = "No Game List Provided";

/// Most games shown at once, centred on the selection.
pub const GAME_LIST_WINDOW: usize = 11;

const TRUNCATE_OVER: usize = 100;
const TRUNCATE_KEEP: usize = 97;
const ELLIPSIS: &str = "...";

// ===================================
// VIEW TREE
// ===================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Container,
    Text(String),
    Image(PathBuf),
    /// Reserved space for data that is absent or still loading.
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewNode {
    pub kind: NodeKind,
    pub classes: Vec<&'static str>,
    pub children: Vec<ViewNode>,
}

impl ViewNode {
    fn new(kind: NodeKind, class: &'static str) -> Self {
        ViewNode {
            kind,
            classes: vec![class],
            children: Vec::new(),
        }
    }

    pub fn container(class: &'static str) -> Self {
        Self::new(NodeKind::Container, class)
    }

    pub fn text(class: &'static str, text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(text.into()), class)
    }

    pub fn image(class: &'static str, path: PathBuf) -> Self {
        Self::new(NodeKind::Image(path), class)
    }

    pub fn placeholder(class: &'static str) -> Self {
        Self::new(NodeKind::Placeholder, class)
    }

    pub fn with_class(mut self, class: &'static str) -> Self {
        self.classes.push(class);
        self
    }

    pub fn with_child(mut self, child: ViewNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| *c == class)
    }

    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// First node carrying `class`, depth first.
    pub fn find(&self, class: &str) -> Option<&ViewNode> {
        if self.has_class(class) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(class))
    }

    pub fn find_all<'a>(&'a self, class: &str) -> Vec<&'a ViewNode> {
        let mut found = Vec::new();
        self.collect(class, &mut found);
        found
    }

    fn collect<'a>(&'a self, class: &str, found: &mut Vec<&'a ViewNode>) {
        if self.has_class(class) {
            found.push(self);
        }
        for child in &self.children {
            child.collect(class, found);
        }
    }
}

// ===================================
// HELPERS
// ===================================

/// Caps text at 100 characters: longer text keeps its first 97 followed by `...`.
pub fn truncate_text(text: &str) -> String {
    if text.chars().count() > TRUNCATE_OVER {
        let kept: String = text.chars().take(TRUNCATE_KEEP).collect();
        format!("{kept}{ELLIPSIS}")
    } else {
        text.to_string()
    }
}

/// The slice of a list of `len` rows shown around `current`.
pub fn visible_window(len: usize, current: usize, size: usize) -> Range<usize> {
    let end = (current.saturating_sub(size / 2) + size).min(len);
    let start = end.saturating_sub(size);
    start..end
}

// ===================================
// RENDER
// ===================================

pub fn render(mirror: &Mirror) -> Result<ViewNode, RenderError> {
    let mut root = ViewNode::container("launcher");
    root.children.push(render_browser(mirror)?);
    if mirror.nav().is_menu() {
        root.children.push(render_menu(mirror));
    }
    Ok(root)
}

fn render_browser(mirror: &Mirror) -> Result<ViewNode, RenderError> {
    let browser = ViewNode::container("browser");
    let systems = mirror.catalogue();
    if systems.is_empty() {
        return Ok(browser.with_child(ViewNode::text("empty", NO_SYSTEMS)));
    }
    let Some(orientation) = mirror.orientation() else {
        return Ok(browser.with_child(ViewNode::text("empty", NO_ORIENTATION)));
    };

    let system_index = orientation.system_index;
    let system = systems
        .get(system_index)
        .ok_or(RenderError::SystemOutOfRange {
            index: system_index,
            len: systems.len(),
        })?;

    let mut browser = browser
        .with_child(render_systems(systems, system_index))
        .with_child(render_banner(system, mirror.banner_description()));

    if system.gamelist.is_empty() {
        return Ok(browser.with_child(ViewNode::text("empty", NO_GAME_LIST)));
    }

    let game_index = orientation.gamelist_index;
    if game_index >= system.gamelist.len() {
        return Err(RenderError::GameOutOfRange {
            system: system_index,
            index: game_index,
            len: system.gamelist.len(),
        });
    }

    browser.children.push(render_games(system, game_index));
    let entry = mirror
        .selection()
        .and_then(|key| mirror.assets.visible(key));
    browser.children.push(render_details(entry));
    Ok(browser)
}

fn render_systems(systems: &[System], current: usize) -> ViewNode {
    let mut list = ViewNode::container("systems");
    for (index, system) in systems.iter().enumerate() {
        let class = classify(index, Some(current)).class();
        list.children
            .push(ViewNode::text("system", system.name.clone()).with_class(class));
    }
    list
}

fn render_banner(system: &System, description: Option<&str>) -> ViewNode {
    let banner =
        ViewNode::container("banner").with_child(ViewNode::text("system-name", system.name.clone()));
    match description {
        Some(text) => banner.with_child(ViewNode::text("system-description", truncate_text(text))),
        None => banner,
    }
}

fn render_games(system: &System, current: usize) -> ViewNode {
    let mut list = ViewNode::container("games");
    let window = visible_window(system.gamelist.len(), current, GAME_LIST_WINDOW);
    for index in window {
        let game = &system.gamelist[index];
        let class = classify(index, Some(current)).class();
        list.children
            .push(ViewNode::text("game", game.name.clone()).with_class(class));
    }
    list
}

fn render_details(entry: Option<&AssetEntry>) -> ViewNode {
    let mut details = ViewNode::container("details");

    let artwork = match entry.and_then(|e| e.image.clone()) {
        Some(path) => ViewNode::image("artwork", path),
        None => ViewNode::placeholder("artwork"),
    };
    details.children.push(artwork);

    let description = match entry.and_then(|e| e.description.as_deref()) {
        Some(text) => ViewNode::text("description", truncate_text(text)),
        None => ViewNode::placeholder("description"),
    };
    details.children.push(description);

    if let Some(entry) = entry.filter(|e| !e.facts.is_empty()) {
        let mut facts = ViewNode::container("facts");
        for (text_type, value) in &entry.facts {
            let row = format!("{}: {}", text_type.label(), value);
            facts.children.push(ViewNode::text("fact", truncate_text(&row)));
        }
        details.children.push(facts);
    }

    details
}

fn render_menu(mirror: &Mirror) -> ViewNode {
    let nav = mirror.nav();
    let mut overlay = ViewNode::container("menu");

    match mirror.menus.top() {
        Some(frame) if !frame.labels.is_empty() => {
            let mut items = ViewNode::container("menu-items");
            for (index, label) in frame.labels.iter().enumerate() {
                let class = classify(index, nav.menu_index()).class();
                items
                    .children
                    .push(ViewNode::text("menu-item", label.clone()).with_class(class));
            }
            overlay.children.push(items);
        }
        _ => overlay.children.push(ViewNode::placeholder("menu-items")),
    }

    // entries without a submenu stay on the top-level list
    if let (NavState::Submenu { item_index, .. }, Some(frame)) = (nav, mirror.menus.submenu()) {
        overlay.children.push(render_submenu(frame, item_index));
    }

    overlay
}

fn render_submenu(frame: &MenuFrame, current: usize) -> ViewNode {
    if frame.labels.is_empty() {
        return ViewNode::placeholder("submenu");
    }

    let mut submenu = ViewNode::container("submenu");
    for (index, label) in frame.labels.iter().enumerate() {
        let class = classify(index, Some(current)).class();
        let value = match frame.value(index) {
            Some(value) => ViewNode::text("setting-value", value.to_string()),
            None => ViewNode::placeholder("setting-value"),
        };
        let row = ViewNode::container("setting")
            .with_class(class)
            .with_child(ViewNode::text("setting-label", label.clone()))
            .with_child(value);
        submenu.children.push(row);
    }
    submenu
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset_cache::SelectionKey;
    use crate::test_utils::sample_catalogue;
    use crate::types::{Orientation, SettingType, TextType};

    fn browsing(system_index: usize, gamelist_index: usize) -> Mirror {
        let mut mirror = Mirror::new();
        mirror.update_catalogue(sample_catalogue());
        mirror.update_orientation(
            1,
            Orientation {
                system_index,
                gamelist_index,
                ..Default::default()
            },
        );
        mirror
    }

    fn texts<'a>(tree: &'a ViewNode, class: &str) -> Vec<&'a str> {
        tree.find_all(class)
            .into_iter()
            .filter_map(ViewNode::text_content)
            .collect()
    }

    #[test]
    fn empty_catalogue_says_no_systems() {
        let tree = render(&Mirror::new()).unwrap();
        assert_eq!(texts(&tree, "empty"), vec![NO_SYSTEMS]);
    }

    #[test]
    fn missing_orientation_says_no_game_list_provided() {
        let mut mirror = Mirror::new();
        mirror.update_catalogue(sample_catalogue());
        let tree = render(&mirror).unwrap();
        assert_eq!(texts(&tree, "empty"), vec![NO_ORIENTATION]);
    }

    #[test]
    fn empty_game_list_says_no_game_list() {
        let tree = render(&browsing(2, 0)).unwrap();
        assert_eq!(texts(&tree, "empty"), vec![NO_GAME_LIST]);
        assert_eq!(texts(&tree, "system-name"), vec!["Empty Shelf"]);
    }

    #[test]
    fn out_of_range_indices_are_errors() {
        assert_eq!(
            render(&browsing(7, 0)),
            Err(RenderError::SystemOutOfRange { index: 7, len: 3 })
        );
        assert_eq!(
            render(&browsing(1, 4)),
            Err(RenderError::GameOutOfRange {
                system: 1,
                index: 4,
                len: 2
            })
        );
    }

    #[test]
    fn games_are_highlighted_by_position() {
        let tree = render(&browsing(0, 1)).unwrap();
        let games = tree.find("games").unwrap();
        let classes: Vec<&str> = games.children.iter().map(|g| g.classes[1]).collect();
        assert_eq!(
            classes,
            vec!["not-selected-previous-first", "selected", "not-selected-next"]
        );
    }

    #[test]
    fn missing_assets_render_placeholders() {
        let tree = render(&browsing(0, 0)).unwrap();
        let details = tree.find("details").unwrap();
        assert_eq!(details.find("artwork").unwrap().kind, NodeKind::Placeholder);
        assert_eq!(details.find("description").unwrap().kind, NodeKind::Placeholder);
        assert!(details.find("facts").is_none());
    }

    #[test]
    fn assets_for_another_selection_are_not_shown() {
        let mut mirror = browsing(0, 2);
        mirror.assets.install(AssetEntry {
            description: Some("Balloons".to_string()),
            ..AssetEntry::empty(SelectionKey::new(0, 0))
        });
        let tree = render(&mirror).unwrap();
        assert_eq!(tree.find("description").unwrap().kind, NodeKind::Placeholder);
    }

    #[test]
    fn matching_assets_are_shown_with_facts() {
        let mut mirror = browsing(0, 2);
        mirror.assets.ensure(SelectionKey::new(0, 2));
        mirror.assets.install(AssetEntry {
            key: SelectionKey::new(0, 2),
            image: Some(PathBuf::from("/media/excitebike.png")),
            description: Some("x".repeat(150)),
            facts: vec![(TextType::Developer, "Nintendo".to_string())],
        });

        let tree = render(&mirror).unwrap();
        assert_eq!(
            tree.find("artwork").unwrap().kind,
            NodeKind::Image(PathBuf::from("/media/excitebike.png"))
        );
        let description = texts(&tree, "description")[0];
        assert_eq!(description.len(), 100);
        assert!(description.ends_with("..."));
        assert_eq!(texts(&tree, "fact"), vec!["DEVELOPER: Nintendo"]);
    }

    #[test]
    fn truncation_boundaries() {
        let long = "a".repeat(150);
        let truncated = truncate_text(&long);
        assert_eq!(truncated, format!("{}...", "a".repeat(97)));

        let short = "b".repeat(50);
        assert_eq!(truncate_text(&short), short);

        let exact = "c".repeat(100);
        assert_eq!(truncate_text(&exact), exact);
    }

    #[test]
    fn truncation_counts_characters() {
        let text = "é".repeat(101);
        let truncated = truncate_text(&text);
        assert_eq!(truncated.chars().count(), 100);
    }

    #[test]
    fn window_is_centred_and_clamped() {
        assert_eq!(visible_window(30, 15, 11), 10..21);
        assert_eq!(visible_window(30, 2, 11), 0..11);
        assert_eq!(visible_window(30, 29, 11), 19..30);
        assert_eq!(visible_window(4, 3, 11), 0..4);
    }

    #[test]
    fn settings_submenu_shows_values() {
        let mut mirror = Mirror::new();
        mirror.update_catalogue(sample_catalogue());
        mirror.update_orientation(
            1,
            Orientation {
                menu_active: true,
                menu_index: Some(0),
                menu_item_index: Some(1),
                ..Default::default()
            },
        );
        let tickets = mirror.menus.take_pending();
        mirror
            .menus
            .install_labels(tickets[0], vec!["Settings".into(), "Exit".into()]);
        mirror
            .menus
            .install_labels(tickets[1], vec!["Start in Fullscreen".into(), "Set Theme".into()]);
        mirror
            .menus
            .install_types(tickets[1], vec![SettingType::Boolean, SettingType::String]);
        mirror.menus.install_value(tickets[1], 0, "false".into());

        let tree = render(&mirror).unwrap();
        let items = tree.find("menu-items").unwrap();
        assert!(items.children[0].has_class("selected"));

        let rows = tree.find_all("setting");
        assert_eq!(rows.len(), 2);
        assert!(rows[1].has_class("selected"));
        assert_eq!(texts(&tree, "setting-value"), vec!["OFF"]);
        assert_eq!(rows[1].find("setting-value").unwrap().kind, NodeKind::Placeholder);
    }

    #[test]
    fn menu_is_not_rendered_while_browsing() {
        let tree = render(&browsing(0, 0)).unwrap();
        assert!(tree.find("menu").is_none());
    }
}
