use macroquad::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time;
#[cfg(feature = "gamepad")]
use gilrs::Gilrs;
use tracing_subscriber::EnvFilter;

use marquee::config::get_user_data_dir;
use marquee::{Config, DemoBackend, NodeKind, PollingConfig, RemoteClient, RenderError, SyncContext, ViewNode};

mod components;
mod input;
mod utils;

use components::{draw_cursor, text_disabled, text_width, text_with_config_color};
use input::InputState;
use utils::{parse_resolution, string_to_color, wrap_text};

const SCREEN_WIDTH: i32 = 640;
const SCREEN_HEIGHT: i32 = 360;
const PADDING: f32 = 16.0;
const FONT_SIZE: u16 = 16;
const SMALL_FONT_SIZE: u16 = 12;
const TITLE_FONT_SIZE: u16 = 24;
const LINE_HEIGHT: f32 = 20.0;
const DETAILS_X: f32 = 340.0;
const ARTWORK_WIDTH: f32 = 160.0;
const ARTWORK_HEIGHT: f32 = 120.0;
const DESCRIPTION_WRAP: usize = 44;
const UI_BG_COLOR: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.5 };
const UI_BG_COLOR_DIALOG: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.8 };
const BACKGROUND_COLOR: Color = Color { r: 0.08, g: 0.08, b: 0.12, a: 1.0 };

/// How often the sync thread renders the mirror.
const FRAME_INTERVAL: time::Duration = time::Duration::from_millis(16);

type Frame = Result<ViewNode, RenderError>;

fn window_conf() -> Conf {
    let config = Config::load();
    let (width, height) = parse_resolution(&config.resolution).unwrap_or((SCREEN_WIDTH, SCREEN_HEIGHT));
    Conf {
        window_title: "marquee".to_owned(),
        window_resizable: false,
        window_width: width,
        window_height: height,
        high_dpi: false,
        fullscreen: config.fullscreen,

        ..Default::default()
    }
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

// ===================================
// SYNC THREAD
// ===================================

/// Runs the sync context on its own single-threaded runtime and streams rendered
/// frames back until `stop` is set or the receiver goes away.
fn spawn_sync(
    backend: DemoBackend,
    polling: PollingConfig,
    frames: mpsc::Sender<Frame>,
    stop: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_time().build() {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!(%err, "could not start the sync runtime");
                return;
            }
        };

        let local = tokio::task::LocalSet::new();
        local.block_on(&runtime, async move {
            let ctx = SyncContext::new(RemoteClient::new(Rc::new(backend)), polling);
            ctx.mount();

            let mut ticks = tokio::time::interval(FRAME_INTERVAL);
            while !stop.load(Ordering::Relaxed) {
                ticks.tick().await;
                if frames.send(ctx.render()).is_err() {
                    break;
                }
            }
            ctx.teardown();
        });
    })
}

// ===================================
// ANIMATION
// ===================================

struct AnimationState {
    cursor_animation_time: f32, // Time counter for cursor animations
    cursor_transition_time: f32, // Time counter for cursor transition animation
}

impl AnimationState {
    const CURSOR_ANIMATION_SPEED: f32 = 10.0; // Speed of cursor color animation
    const CURSOR_TRANSITION_DURATION: f32 = 0.15; // Duration of cursor transition animation

    fn new() -> Self {
        AnimationState {
            cursor_animation_time: 0.0,
            cursor_transition_time: 0.0,
        }
    }

    fn update_cursor_animation(&mut self, delta_time: f32) {
        self.cursor_animation_time = (self.cursor_animation_time + delta_time * Self::CURSOR_ANIMATION_SPEED) % (2.0 * std::f32::consts::PI);
        if self.cursor_transition_time > 0.0 {
            self.cursor_transition_time = (self.cursor_transition_time - delta_time).max(0.0);
        }
    }

    fn trigger_transition(&mut self) {
        self.cursor_transition_time = Self::CURSOR_TRANSITION_DURATION;
    }

    fn get_cursor_color(&self, base: Color) -> Color {
        let c = (self.cursor_animation_time.sin() * 0.5 + 0.5).max(0.3);
        Color { r: base.r * c, g: base.g * c, b: base.b * c, a: c }
    }

    fn get_cursor_scale(&self) -> f32 {
        if self.cursor_transition_time > 0.0 {
            let t = self.cursor_transition_time / Self::CURSOR_TRANSITION_DURATION;
            1.0 + 0.1 * t
        } else {
            1.0
        }
    }
}

// ===================================
// DRAWING
// ===================================

#[derive(Default)]
struct TextureCache {
    textures: HashMap<PathBuf, Option<Texture2D>>,
}

impl TextureCache {
    async fn get(&mut self, path: &Path) -> Option<Texture2D> {
        if let Some(texture) = self.textures.get(path) {
            return texture.clone();
        }
        let loaded = match load_texture(&path.to_string_lossy()).await {
            Ok(texture) => Some(texture),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "could not load artwork");
                None
            }
        };
        self.textures.insert(path.to_path_buf(), loaded.clone());
        loaded
    }
}

struct DrawContext<'a> {
    config: &'a Config,
    animation: &'a AnimationState,
}

impl DrawContext<'_> {
    fn row(&self, node: &ViewNode, x: f32, y: f32, font_size: u16) {
        let Some(label) = node.text_content() else {
            return;
        };
        if node.has_class("selected") {
            let cursor = self.animation.get_cursor_color(string_to_color(&self.config.cursor_color));
            let width = text_width(label, font_size) + 8.0;
            draw_cursor(x - 4.0, y - font_size as f32, width, font_size as f32 + 6.0, self.animation.get_cursor_scale(), cursor);
            text_with_config_color(self.config, label, x, y, font_size);
        } else {
            text_disabled(label, x, y, font_size);
        }
    }

    fn centered(&self, text: &str, y: f32, font_size: u16) {
        let x = (screen_width() - text_width(text, font_size)) / 2.0;
        text_with_config_color(self.config, text, x, y, font_size);
    }
}

async fn draw_view(ctx: &DrawContext<'_>, view: &ViewNode, textures: &mut TextureCache) {
    if let Some(empty) = view.find("empty").and_then(ViewNode::text_content) {
        ctx.centered(empty, screen_height() / 2.0 + LINE_HEIGHT, FONT_SIZE);
    }

    if let Some(systems) = view.find("systems") {
        let mut x = PADDING;
        for system in &systems.children {
            ctx.row(system, x, PADDING + 8.0, SMALL_FONT_SIZE);
            x += system.text_content().map_or(0.0, |name| text_width(name, SMALL_FONT_SIZE)) + 24.0;
        }
    }

    if let Some(banner) = view.find("banner") {
        if let Some(name) = banner.find("system-name").and_then(ViewNode::text_content) {
            text_with_config_color(ctx.config, name, PADDING, 64.0, TITLE_FONT_SIZE);
        }
        if let Some(description) = banner.find("system-description").and_then(ViewNode::text_content) {
            text_disabled(description, PADDING, 82.0, SMALL_FONT_SIZE);
        }
    }

    if let Some(games) = view.find("games") {
        draw_rectangle(PADDING / 2.0, 96.0, DETAILS_X - PADDING * 1.5, screen_height() - 96.0 - PADDING, UI_BG_COLOR);
        for (i, game) in games.children.iter().enumerate() {
            ctx.row(game, PADDING, 118.0 + i as f32 * LINE_HEIGHT, FONT_SIZE);
        }
    }

    if let Some(details) = view.find("details") {
        draw_details(ctx, details, textures).await;
    }

    if let Some(menu) = view.find("menu") {
        draw_menu(ctx, menu);
    }
}

async fn draw_details(ctx: &DrawContext<'_>, details: &ViewNode, textures: &mut TextureCache) {
    let artwork_y = 100.0;
    let texture = match details.find("artwork").map(|node| &node.kind) {
        Some(NodeKind::Image(path)) => textures.get(path).await,
        _ => None,
    };
    match texture {
        Some(texture) => draw_texture_ex(&texture, DETAILS_X, artwork_y, WHITE, DrawTextureParams {
            dest_size: Some(vec2(ARTWORK_WIDTH, ARTWORK_HEIGHT)),
            ..Default::default()
        }),
        None => {
            draw_rectangle(DETAILS_X, artwork_y, ARTWORK_WIDTH, ARTWORK_HEIGHT, UI_BG_COLOR);
            draw_rectangle_lines(DETAILS_X, artwork_y, ARTWORK_WIDTH, ARTWORK_HEIGHT, 1.0, GRAY);
        }
    }

    let mut y = artwork_y + ARTWORK_HEIGHT + LINE_HEIGHT;
    if let Some(description) = details.find("description").and_then(ViewNode::text_content) {
        for line in wrap_text(description, DESCRIPTION_WRAP) {
            text_with_config_color(ctx.config, &line, DETAILS_X, y, SMALL_FONT_SIZE);
            y += LINE_HEIGHT * 0.8;
        }
    }
    for fact in details.find_all("fact") {
        if let Some(line) = fact.text_content() {
            text_disabled(line, DETAILS_X, y, SMALL_FONT_SIZE);
            y += LINE_HEIGHT * 0.8;
        }
    }
}

fn draw_menu(ctx: &DrawContext<'_>, menu: &ViewNode) {
    draw_rectangle(0.0, 0.0, screen_width(), screen_height(), UI_BG_COLOR_DIALOG);

    let items = menu.find("menu-items");
    match items.filter(|node| node.kind == NodeKind::Container) {
        Some(items) => {
            for (i, item) in items.children.iter().enumerate() {
                ctx.row(item, PADDING * 2.0, 80.0 + i as f32 * LINE_HEIGHT * 1.5, FONT_SIZE);
            }
        }
        None => text_disabled("...", PADDING * 2.0, 80.0, FONT_SIZE),
    }

    let Some(submenu) = menu.find("submenu") else {
        return;
    };
    let x = screen_width() / 2.0;
    if submenu.kind == NodeKind::Placeholder {
        text_disabled("...", x, 80.0, FONT_SIZE);
        return;
    }
    for (i, setting) in submenu.children.iter().enumerate() {
        let y = 80.0 + i as f32 * LINE_HEIGHT * 1.5;
        if let Some(label) = setting.find("setting-label") {
            let row = ViewNode {
                classes: setting.classes.clone(),
                ..label.clone()
            };
            ctx.row(&row, x, y, FONT_SIZE);
        }
        let value = setting.find("setting-value").and_then(ViewNode::text_content).unwrap_or("...");
        text_disabled(value, screen_width() - PADDING * 2.0 - text_width(value, FONT_SIZE), y, FONT_SIZE);
    }
}

fn draw_clock(config: &Config) {
    let now = chrono::Local::now().format("%H:%M").to_string();
    let x = screen_width() - text_width(&now, SMALL_FONT_SIZE) - PADDING;
    text_with_config_color(config, &now, x, PADDING + 8.0, SMALL_FONT_SIZE);
}

#[macroquad::main(window_conf)]
async fn main() {
    let config = Config::load();
    init_logging(&config);

    let mut backend = DemoBackend::new();
    if let Some(media) = get_user_data_dir().map(|dir| dir.join("media")) {
        backend = backend.with_media_dir(media);
    }

    let (frame_tx, frame_rx) = mpsc::channel::<Frame>();
    let stop = Arc::new(AtomicBool::new(false));
    let sync_thread = spawn_sync(backend.clone(), config.polling.clone(), frame_tx, stop.clone());

    let mut input_state = InputState::new();
    #[cfg(feature = "gamepad")]
    let mut gilrs = match Gilrs::new() {
        Ok(gilrs) => Some(gilrs),
        Err(err) => {
            tracing::warn!(%err, "gamepad support unavailable");
            None
        }
    };
    let mut animation_state = AnimationState::new();
    let mut textures = TextureCache::default();
    let mut view: Option<ViewNode> = None;
    let mut last_fault: Option<RenderError> = None;
    let mut fullscreen = config.fullscreen;

    loop {
        // keep only the newest frame; a faulty one leaves the previous frame up
        while let Ok(frame) = frame_rx.try_recv() {
            match frame {
                Ok(frame) => {
                    view = Some(frame);
                    last_fault = None;
                }
                Err(err) => {
                    if last_fault.as_ref() != Some(&err) {
                        tracing::warn!(%err, "remote orientation is outside the catalogue");
                        last_fault = Some(err);
                    }
                }
            }
        }

        input_state.update_keyboard();
        #[cfg(feature = "gamepad")]
        if let Some(gilrs) = gilrs.as_mut() {
            input_state.update_controller(gilrs);
        }
        for event in input_state.events() {
            backend.push_input(event);
            animation_state.trigger_transition();
        }

        if backend.take_fullscreen_request() {
            fullscreen = !fullscreen;
            set_fullscreen(fullscreen);
        }
        if backend.quit_requested() {
            break;
        }

        animation_state.update_cursor_animation(get_frame_time());

        clear_background(BACKGROUND_COLOR);
        let ctx = DrawContext {
            config: &config,
            animation: &animation_state,
        };
        match &view {
            Some(view) => draw_view(&ctx, view, &mut textures).await,
            None => ctx.centered("CONNECTING", screen_height() / 2.0, FONT_SIZE),
        }
        draw_clock(&config);

        next_frame().await
    }

    stop.store(true, Ordering::Relaxed);
    if sync_thread.join().is_err() {
        tracing::error!("sync thread panicked");
    }
    tracing::info!("bye");
}
