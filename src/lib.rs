//! Ghost Squad library crate — the location-based AR ghost hunt core.
//!
//! The binary crate (`main.rs`) runs a headless demo hunt. This library
//! crate exposes the same modules so that the web shell and the `tests/`
//! integration tests can drive the game without a camera or GPS.

pub mod shared;
pub mod config;
pub mod geo;
pub mod data;
pub mod hunt;
pub mod proximity;
pub mod map;
pub mod ar;
pub mod capture;
pub mod deposit;
pub mod notice;
pub mod save;
pub mod orchestrator;
pub mod sim;
