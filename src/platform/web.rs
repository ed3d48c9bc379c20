//! Browser platform: `<audio>` playback, 2D canvas drawing, LocalStorage

use glam::Vec2;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlAudioElement, HtmlCanvasElement};

use crate::audio::{AudioTable, Track};
use crate::game::{Game, GameConfig};
use crate::pattern::Pattern;
use crate::render::{Resources, Rgb, Surface, SpriteRef};
use crate::settings::Settings;
use crate::sim::Rect;

/// An `<audio>` element driven as a loop or key bank
pub struct HtmlAudioTrack {
    element: HtmlAudioElement,
}

impl HtmlAudioTrack {
    pub fn new(url: &str) -> Option<Self> {
        let element = HtmlAudioElement::new_with_src(url).ok()?;
        element.set_preload("auto");
        Some(Self { element })
    }
}

impl Track for HtmlAudioTrack {
    fn play(&mut self) {
        // Autoplay may be refused until the first user gesture
        if let Err(err) = self.element.play() {
            log::debug!("play() refused: {err:?}");
        }
    }

    fn pause(&mut self) {
        let _ = self.element.pause();
    }

    fn seek(&mut self, secs: f64) {
        self.element.set_current_time(secs);
    }

    fn set_volume(&mut self, volume: f32) {
        self.element.set_volume(f64::from(volume));
    }
}

/// Build the audio table from `{base_url}/base{n}.ogg` and `{base_url}/tone{n}.ogg`
pub fn load_audio_table(base_url: &str) -> AudioTable {
    let mut table = AudioTable::new();
    for id in 0..=Pattern::MAX {
        let Some(pattern) = Pattern::new(id) else {
            continue;
        };
        let mut names = vec![AudioTable::base_name(pattern)];
        if !pattern.is_neutral() {
            names.push(AudioTable::tone_name(pattern));
        }
        for name in names {
            let url = format!("{base_url}/{name}.ogg");
            match HtmlAudioTrack::new(&url) {
                Some(track) => table.insert(name, Box::new(track)),
                None => log::warn!("Could not create audio element for {url}"),
            }
        }
    }
    table
}

/// Surface backed by a 2D canvas context
///
/// Sprites are drawn as flat cells, one colour per sheet row.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    resources: Resources,
}

impl CanvasSurface {
    pub fn new(canvas: &HtmlCanvasElement, resources: Resources) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()??
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        ctx.set_font("12px monospace");
        ctx.set_text_baseline("top");
        Some(Self { ctx, resources })
    }

    fn sprite_color(sprite: SpriteRef) -> Rgb {
        match sprite.row {
            0 => Rgb::new(80, 200, 255),
            1 => Rgb::new(255, 90, 90),
            2 => Rgb::new(255, 180, 60),
            3 => Rgb::new(200, 110, 255),
            _ => Rgb::new(120, 255, 140),
        }
    }
}

impl Surface for CanvasSurface {
    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.fill_rect(
            f64::from(rect.x),
            f64::from(rect.y),
            f64::from(rect.width),
            f64::from(rect.height),
        );
    }

    fn draw_sprite(&mut self, sprite: SpriteRef, center: Vec2) {
        let cell = Rect::centered(center, self.resources.sprite_size);
        self.fill_rect(cell, Self::sprite_color(sprite));
    }

    fn draw_text(&mut self, text: &str, at: Vec2) {
        self.ctx.set_fill_style_str(&Rgb::WHITE.to_css());
        let _ = self.ctx.fill_text(text, f64::from(at.x), f64::from(at.y));
    }
}

/// Load settings from LocalStorage, falling back to defaults
pub fn load_settings() -> Settings {
    let Some(storage) = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
    else {
        return Settings::default();
    };
    match storage.get_item(Settings::STORAGE_KEY) {
        Ok(Some(json)) => Settings::from_json(&json).unwrap_or_else(|err| {
            log::warn!("Stored settings unreadable ({err}), using defaults");
            Settings::default()
        }),
        _ => Settings::default(),
    }
}

/// Save settings to LocalStorage
pub fn save_settings(settings: &Settings) {
    if let Some(storage) = web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
    {
        let _ = storage.set_item(Settings::STORAGE_KEY, &settings.to_json());
        log::info!("Settings saved");
    }
}

/// Route panics and `log` output to the browser console
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
}

/// Arrow/WASD state folded into a stick direction
#[derive(Debug, Default, Clone, Copy)]
struct HeldKeys {
    left: bool,
    right: bool,
    up: bool,
    down: bool,
}

impl HeldKeys {
    /// Returns true for keys that steer
    fn set(&mut self, key: &str, held: bool) -> bool {
        let slot = match key {
            "ArrowLeft" | "a" | "A" => &mut self.left,
            "ArrowRight" | "d" | "D" => &mut self.right,
            "ArrowUp" | "w" | "W" => &mut self.up,
            "ArrowDown" | "s" | "S" => &mut self.down,
            _ => return false,
        };
        *slot = held;
        true
    }

    fn direction(self) -> Vec2 {
        let axis = |neg: bool, pos: bool| f32::from(u8::from(pos)) - f32::from(u8::from(neg));
        Vec2::new(axis(self.left, self.right), axis(self.up, self.down))
    }
}

/// The game bound to a canvas, driven from requestAnimationFrame
#[wasm_bindgen]
pub struct WebGame {
    game: Game,
    surface: CanvasSurface,
    keys: HeldKeys,
}

#[wasm_bindgen]
impl WebGame {
    /// Attach to `canvas_id`, loading audio from `audio_base_url`
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, audio_base_url: &str) -> Result<WebGame, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()
            .map_err(|_| JsValue::from_str("not a canvas"))?;

        let config = GameConfig {
            seed: js_sys::Date::now() as u64,
            field: Rect::new(0.0, 0.0, canvas.width() as f32, canvas.height() as f32),
            settings: load_settings(),
            ..Default::default()
        };
        let surface = CanvasSurface::new(&canvas, config.resources.clone())
            .ok_or_else(|| JsValue::from_str("no 2d context"))?;
        let game = Game::new(config, load_audio_table(audio_base_url));

        Ok(Self {
            game,
            surface,
            keys: HeldKeys::default(),
        })
    }

    /// One frame at the rAF timestamp
    pub fn frame(&mut self, now_ms: f64) {
        self.game.update(now_ms);
        self.game.render(&mut self.surface, Vec2::ZERO);
    }

    pub fn key_down(&mut self, key: &str) {
        if key == " " {
            self.game.on_button_pressed();
        } else if self.keys.set(key, true) {
            self.game.on_direction_changed(self.keys.direction());
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if key == " " {
            self.game.on_button_released();
        } else if self.keys.set(key, false) {
            self.game.on_direction_changed(self.keys.direction());
        }
    }

    /// Focus lost: freeze and silence
    pub fn blur(&mut self) {
        self.keys = HeldKeys::default();
        self.game.on_direction_changed(Vec2::ZERO);
        self.game.on_button_released();
        self.game.suspend();
    }

    pub fn focus(&mut self) {
        self.game.resume();
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        let settings = Settings {
            reduced_motion: reduced,
            ..self.game.settings().clone()
        };
        save_settings(&settings);
        self.game.apply_settings(settings);
    }

    pub fn set_volumes(&mut self, master: f32, music: f32, sfx: f32) {
        let settings = Settings {
            master_volume: master,
            music_volume: music,
            sfx_volume: sfx,
            ..self.game.settings().clone()
        };
        save_settings(&settings);
        self.game.apply_settings(settings);
    }

    pub fn score(&self) -> u64 {
        self.game.score()
    }

    pub fn pattern(&self) -> u8 {
        self.game.pattern().id()
    }
}
