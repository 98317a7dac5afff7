//! An in-process stand-in for the remote process.
//!
//! It owns a small fixed catalogue, the menus and the settings, and applies queued
//! input to its own cursor when `next_event` drains it. Clones share state, so the
//! window thread can push input into the same backend the sync thread polls.

use futures::future::{self, LocalBoxFuture};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::RemoteError;
use crate::remote::{Command, RemoteAccessor, Request};
use crate::types::{AssetType, Event, Game, InputEvent, Orientation, SettingType, System, TextType};

const PAGE: isize = 10;
const THEMES: [&str; 3] = ["Default", "Neon", "Paper"];

// ===================================
// MENUS
// ===================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Settings,
    Fullscreen,
    Exit,
    Reboot,
    Shutdown,
}

impl MenuItem {
    const ALL: [MenuItem; 5] = [
        MenuItem::Settings,
        MenuItem::Fullscreen,
        MenuItem::Exit,
        MenuItem::Reboot,
        MenuItem::Shutdown,
    ];

    fn label(&self) -> &'static str {
        match self {
            MenuItem::Settings => "Settings",
            MenuItem::Fullscreen => "Toggle Fullscreen Window",
            MenuItem::Exit => "Exit Marquee",
            MenuItem::Reboot => "Reboot System",
            MenuItem::Shutdown => "Shutdown System",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Setting {
    SwapConfirm,
    StartFullscreen,
    Theme,
    EnableKeyboard,
}

impl Setting {
    const ALL: [Setting; 4] = [
        Setting::SwapConfirm,
        Setting::StartFullscreen,
        Setting::Theme,
        Setting::EnableKeyboard,
    ];

    fn label(&self) -> &'static str {
        match self {
            Setting::SwapConfirm => "Japanese-style Input",
            Setting::StartFullscreen => "Start in Fullscreen",
            Setting::Theme => "Set Theme",
            Setting::EnableKeyboard => "Enable Keyboard",
        }
    }

    fn value_type(&self) -> SettingType {
        match self {
            Setting::Theme => SettingType::String,
            _ => SettingType::Boolean,
        }
    }
}

#[derive(Debug, Clone)]
struct Settings {
    swap_confirm: bool,
    start_fullscreen: bool,
    theme: Option<String>,
    enable_keyboard: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            swap_confirm: false,
            start_fullscreen: false,
            theme: None,
            enable_keyboard: true,
        }
    }
}

impl Settings {
    fn serialized(&self, setting: Setting) -> Result<String, serde_json::Error> {
        match setting {
            Setting::SwapConfirm => serde_json::to_string(&self.swap_confirm),
            Setting::StartFullscreen => serde_json::to_string(&self.start_fullscreen),
            Setting::Theme => serde_json::to_string(&self.theme),
            Setting::EnableKeyboard => serde_json::to_string(&self.enable_keyboard),
        }
    }

    fn toggle(&mut self, setting: Setting) {
        match setting {
            Setting::SwapConfirm => self.swap_confirm = !self.swap_confirm,
            Setting::StartFullscreen => self.start_fullscreen = !self.start_fullscreen,
            Setting::EnableKeyboard => self.enable_keyboard = !self.enable_keyboard,
            Setting::Theme => {
                let next = match self.theme.as_deref() {
                    None => Some(THEMES[0]),
                    Some(current) => THEMES
                        .iter()
                        .position(|t| *t == current)
                        .and_then(|i| THEMES.get(i + 1))
                        .copied(),
                };
                self.theme = next.map(str::to_string);
            }
        }
    }
}

// ===================================
// CATALOGUE
// ===================================

struct Title {
    name: &'static str,
    developer: &'static str,
    publisher: &'static str,
    released: &'static str,
    genre: &'static str,
    players: &'static str,
    description: &'static str,
}

const fn title(
    name: &'static str,
    developer: &'static str,
    released: &'static str,
    genre: &'static str,
    players: &'static str,
    description: &'static str,
) -> Title {
    Title {
        name,
        developer,
        publisher: developer,
        released,
        genre,
        players,
        description,
    }
}

struct Shelf {
    name: &'static str,
    tag: &'static str,
    description: &'static str,
    titles: &'static [Title],
}

const SHELVES: &[Shelf] = &[
    Shelf {
        name: "Arcade",
        tag: "arcade",
        description: "Cabinet boards from the coin-op era.",
        titles: &[
            title("Star Lancer", "Orbit Works", "1983", "Shooter", "1-2", "Hold the line against waves of drones descending from the upper atmosphere, one credit at a time."),
            title("Brick Baron", "Tandem Soft", "1986", "Puzzle", "1", "Clear the wall before the ceiling drops. Power-ups widen the paddle, split the ball or turn it to lead."),
            title("Turbo Alley", "Redline", "1988", "Racing", "1-2", "Night races through neon streets with a rival who never brakes."),
            title("Kung Fu Kitchen", "Wok Star", "1989", "Beat 'em up", "1-2", "Defend the family restaurant from a rival chef's gang using nothing but utensils and footwork."),
        ],
    },
    Shelf {
        name: "Home Console",
        tag: "console",
        description: "Cartridges for the living room.",
        titles: &[
            title("Moss Knight", "Lantern Games", "1991", "Platformer", "1", "A tiny knight climbs an overgrown tower to relight the beacon at its peak. Each floor changes with the seasons, and the moss remembers where you have been."),
            title("Sky Courier", "Paper Plane", "1992", "Adventure", "1", "Deliver parcels between floating islands before the winds turn."),
            title("Gridlock Tactics", "Hexagon", "1993", "Strategy", "1-4", "Turn-based skirmishes on a city grid where every street can be blocked or bombed."),
        ],
    },
    Shelf {
        name: "Handheld",
        tag: "handheld",
        description: "Portable games with a battery light.",
        titles: &[],
    },
];

fn catalogue() -> Vec<System> {
    SHELVES
        .iter()
        .map(|shelf| System {
            name: shelf.name.to_string(),
            tag: shelf.tag.to_string(),
            description: Some(shelf.description.to_string()),
            photo: None,
            gamelist: shelf
                .titles
                .iter()
                .map(|title| Game {
                    name: title.name.to_string(),
                })
                .collect(),
        })
        .collect()
}

// ===================================
// BACKEND
// ===================================

#[derive(Debug, Default)]
struct DemoState {
    orientation: Orientation,
    settings: Settings,
    inputs: VecDeque<InputEvent>,
    fullscreen_requested: bool,
    quit_requested: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DemoBackend {
    state: Arc<Mutex<DemoState>>,
    media_dir: Option<PathBuf>,
}

/// Moves `index` by `delta` within `len` rows, wrapping at both ends.
fn step(index: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as isize + delta).rem_euclid(len as isize) as usize
}

impl DemoBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves artwork from `<dir>/<system tag>/<game name>.png` when such a file exists.
    pub fn with_media_dir(mut self, dir: PathBuf) -> Self {
        self.media_dir = Some(dir);
        self
    }

    fn lock(&self) -> MutexGuard<'_, DemoState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues input for the next `next_event` call.
    pub fn push_input(&self, input: InputEvent) {
        self.lock().inputs.push_back(input);
    }

    /// Returns and clears a pending fullscreen toggle.
    pub fn take_fullscreen_request(&self) -> bool {
        std::mem::take(&mut self.lock().fullscreen_requested)
    }

    pub fn quit_requested(&self) -> bool {
        self.lock().quit_requested
    }

    pub fn orientation(&self) -> Orientation {
        self.lock().orientation.clone()
    }

    fn answer(&self, request: &Request) -> Result<Value, RemoteError> {
        let command = request.command;
        let mut state = self.lock();
        let decode = |source| RemoteError::Decode { command, source };

        let value = match command {
            Command::AllSystems => json!(catalogue()),
            Command::CurrentSystem => {
                let systems = catalogue();
                let system = systems
                    .get(state.orientation.system_index)
                    .ok_or(RemoteError::Unavailable { command })?;
                json!(system)
            }
            Command::CurrentOrientation => json!(state.orientation),
            Command::NextEvent => match state.inputs.pop_front() {
                Some(input) => {
                    state.apply(input);
                    Event::Input(input).to_value()
                }
                None => Value::Null,
            },
            Command::Menu => json!(MenuItem::ALL.map(|item| item.label())),
            Command::SettingsMenu => json!(Setting::ALL.map(|setting| setting.label())),
            Command::SettingTypes => json!(Setting::ALL.map(|setting| setting.value_type())),
            Command::SettingValue => {
                let setting = request
                    .args
                    .get("setting")
                    .and_then(Value::as_u64)
                    .and_then(|index| Setting::ALL.get(index as usize))
                    .ok_or_else(|| RemoteError::Call {
                        command,
                        message: format!("no such setting: {}", request.args),
                    })?;
                Value::String(state.settings.serialized(*setting).map_err(decode)?)
            }
            Command::CurrentAsset => {
                let asset_type: AssetType =
                    serde_json::from_value(request.args["assetType"].clone()).map_err(decode)?;
                let path = match asset_type {
                    AssetType::Image => self.artwork(&state.orientation),
                    _ => None,
                };
                json!(path.map(|p| p.display().to_string()).unwrap_or_default())
            }
            Command::CurrentText => {
                let text_type: TextType =
                    serde_json::from_value(request.args["textType"].clone()).map_err(decode)?;
                json!(selected_title(&state.orientation).and_then(|title| text(title, text_type)))
            }
        };
        Ok(value)
    }

    fn artwork(&self, orientation: &Orientation) -> Option<PathBuf> {
        let dir = self.media_dir.as_ref()?;
        let shelf = SHELVES.get(orientation.system_index)?;
        let title = shelf.titles.get(orientation.gamelist_index)?;
        let path = dir.join(shelf.tag).join(format!("{}.png", title.name));
        path.exists().then_some(path)
    }
}

fn selected_title(orientation: &Orientation) -> Option<&'static Title> {
    SHELVES
        .get(orientation.system_index)?
        .titles
        .get(orientation.gamelist_index)
}

fn text(title: &Title, text_type: TextType) -> Option<&'static str> {
    match text_type {
        TextType::Description => Some(title.description),
        TextType::Developer => Some(title.developer),
        TextType::Publisher => Some(title.publisher),
        TextType::ReleaseDate => Some(title.released),
        TextType::Genre => Some(title.genre),
        TextType::Players => Some(title.players),
        TextType::Rating | TextType::PlayCount | TextType::LastPlayed => None,
    }
}

impl DemoState {
    fn game_count(&self) -> usize {
        SHELVES
            .get(self.orientation.system_index)
            .map_or(0, |shelf| shelf.titles.len())
    }

    fn apply(&mut self, input: InputEvent) {
        tracing::debug!(?input, "demo input");
        let o = &mut self.orientation;
        match input {
            InputEvent::Menu => {
                o.menu_active = !o.menu_active;
                o.menu_index = o.menu_active.then_some(0);
                o.menu_item_index = None;
            }
            InputEvent::Quit => self.quit_requested = true,
            InputEvent::Cancel if o.menu_active => {
                if o.menu_item_index.take().is_none() {
                    o.menu_active = false;
                    o.menu_index = None;
                }
            }
            InputEvent::Ok if o.menu_active => self.activate_menu(),
            InputEvent::Ok => {
                if let Some(title) = selected_title(o) {
                    tracing::info!(game = title.name, "launch requested");
                }
            }
            InputEvent::Up | InputEvent::Down if o.menu_active => {
                let delta = if input == InputEvent::Up { -1 } else { 1 };
                match (o.menu_index, o.menu_item_index) {
                    (None, _) => o.menu_index = Some(0),
                    (Some(_), Some(item)) => {
                        o.menu_item_index = Some(step(item, Setting::ALL.len(), delta));
                    }
                    (Some(index), None) => {
                        o.menu_index = Some(step(index, MenuItem::ALL.len(), delta));
                    }
                }
            }
            _ if o.menu_active => {}
            InputEvent::Left | InputEvent::Right => {
                let delta = if input == InputEvent::Left { -1 } else { 1 };
                o.system_index = step(o.system_index, SHELVES.len(), delta);
                o.gamelist_index = 0;
            }
            InputEvent::Up | InputEvent::Down | InputEvent::PageUp | InputEvent::PageDown => {
                let delta = match input {
                    InputEvent::Up => -1,
                    InputEvent::Down => 1,
                    InputEvent::PageUp => -PAGE,
                    _ => PAGE,
                };
                let len = self.game_count();
                let o = &mut self.orientation;
                o.gamelist_index = step(o.gamelist_index, len, delta);
            }
            InputEvent::First => o.gamelist_index = 0,
            InputEvent::Last => {
                let len = self.game_count();
                self.orientation.gamelist_index = len.saturating_sub(1);
            }
            InputEvent::Cancel | InputEvent::Delete => {}
        }
    }

    fn activate_menu(&mut self) {
        let Some(item) = self
            .orientation
            .menu_index
            .and_then(|index| MenuItem::ALL.get(index))
        else {
            return;
        };

        match item {
            MenuItem::Settings => match self.orientation.menu_item_index {
                None => self.orientation.menu_item_index = Some(0),
                Some(index) => {
                    if let Some(setting) = Setting::ALL.get(index) {
                        self.settings.toggle(*setting);
                        tracing::info!(setting = setting.label(), "setting changed");
                    }
                }
            },
            MenuItem::Fullscreen => self.fullscreen_requested = true,
            MenuItem::Exit => self.quit_requested = true,
            MenuItem::Reboot | MenuItem::Shutdown => {
                tracing::info!(action = item.label(), "power action ignored by the demo backend");
            }
        }
    }
}

impl RemoteAccessor for DemoBackend {
    fn invoke(&self, request: Request) -> LocalBoxFuture<'_, Result<Value, RemoteError>> {
        Box::pin(future::ready(self.answer(&request)))
    }
}
