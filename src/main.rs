//! Beatshot entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use beatshot::platform::web::{WebGame, init_logging};

    pub fn run() -> Result<(), JsValue> {
        init_logging();
        log::info!("Beatshot starting...");

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let game = Rc::new(RefCell::new(WebGame::new("canvas", "audio")?));
        setup_input_handlers(&window, game.clone());
        setup_auto_suspend(&window, &document, game.clone());
        request_animation_frame(game);

        log::info!("Beatshot running!");
        Ok(())
    }

    fn setup_input_handlers(window: &web_sys::Window, game: Rc<RefCell<WebGame>>) {
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if event.repeat() {
                    return;
                }
                game.borrow_mut().key_down(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().key_up(&event.key());
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_suspend(
        window: &web_sys::Window,
        document: &web_sys::Document,
        game: Rc<RefCell<WebGame>>,
    ) {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    g.blur();
                    log::info!("Suspended (tab hidden)");
                } else {
                    g.focus();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().blur();
                log::info!("Suspended (window blur)");
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().focus();
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<WebGame>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<WebGame>>, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Beatshot (native) starting...");
    log::info!("Native mode has no window - running a scripted headless session");

    let tuning = std::env::args().nth(1).map(|path| demo::load_tuning(&path));
    demo::run(3600, tuning.unwrap_or_default());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless session: tracks and draws are recorded instead of played
#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use beatshot::consts::FRAME_MS;
    use beatshot::platform::headless::{RecordingSurface, TrackLog, recording_table};
    use beatshot::{AudioTable, Game, GameConfig, Pattern, Tuning};
    use glam::Vec2;

    /// Read balance overrides from a JSON file, keeping defaults on failure
    pub fn load_tuning(path: &str) -> Tuning {
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                log::warn!("Cannot read tuning file {path}: {err}");
                return Tuning::default();
            }
        };
        Tuning::from_json(&json).unwrap_or_else(|err| {
            log::warn!("Invalid tuning in {path} ({err}), using defaults");
            Tuning::default()
        })
    }

    pub fn run(frames: u32, tuning: Tuning) {
        let log = TrackLog::default();
        let config = GameConfig {
            seed: 0xbea7,
            tuning,
            ..Default::default()
        };
        let mut game = Game::new(config, recording_table(&log));
        game.on_button_pressed();

        let mut surface = RecordingSurface::default();
        for frame in 0..frames {
            // Sweep left and right across the field
            let phase = (frame as f32 / 240.0) * std::f32::consts::TAU;
            game.on_direction_changed(Vec2::new(phase.sin(), 0.0));
            game.update(f64::from(frame) * FRAME_MS);

            if frame % 600 == 0 {
                surface.calls.clear();
                game.render(&mut surface, Vec2::ZERO);
                log::info!(
                    "Frame {frame}: pattern {}, {} draw calls",
                    game.pattern().id(),
                    surface.calls.len()
                );
            }
        }

        println!("Score: {}", game.score());
        println!(
            "Pattern: {} (audible {})",
            game.pattern().id(),
            game.audible_pattern().id()
        );
        for id in 0..=Pattern::MAX {
            let Some(pattern) = Pattern::new(id) else {
                continue;
            };
            println!(
                "  {}: {} plays, {}: {} plays",
                AudioTable::base_name(pattern),
                log.plays(&AudioTable::base_name(pattern)),
                AudioTable::tone_name(pattern),
                log.plays(&AudioTable::tone_name(pattern)),
            );
        }
    }
}
