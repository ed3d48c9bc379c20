//! Platform abstraction layer
//!
//! Supplies what the core treats as external collaborators:
//! - Playback handles for the audio table
//! - A drawing surface
//! - Wall-clock readings and focus changes

pub mod headless;
#[cfg(target_arch = "wasm32")]
pub mod web;
