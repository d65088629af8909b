//! Fog-of-war map editor engine for tabletop sessions.
//!
//! A game master loads a base map, fits a square or hex grid over it, and
//! reveals or hides grid cells as players explore. This crate owns the
//! coordinate math, the fog state, the layered render pipeline, and the
//! multi-pointer gesture controller that drives them. It compiles to
//! WebAssembly for the browser and natively for the `hexfog` CLI, which
//! replays recorded sessions against headless surfaces.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::Engine`] and testable [`engine::EngineCore`] |
//! | [`grid`] | Grid configuration and world <-> cell conversion |
//! | [`fog`] | Revealed-cell set |
//! | [`camera`] | Pan/zoom view transform and coordinate conversions |
//! | [`input`] | Modes, tools, input events, and UI commands |
//! | [`gesture`] | Pointer/wheel gesture state machine |
//! | [`render`] | Fog and grid layer painting |
//! | [`surface`] | 2D drawing-surface trait and the headless display list |
//! | [`draw`] | Pen and eraser strokes |
//! | [`export`] | Flattening layers into one image |
//! | [`project`] | Saved project state |
//! | [`replay`] | Deterministic session replay |
//! | [`config`] | Editor defaults loaded from JSON |
//! | [`web`] | Canvas-backed surfaces and DOM helpers |
//! | [`scheduler`] | requestAnimationFrame loop |
//! | [`consts`] | Shared numeric constants (zoom limits, cell size bounds, etc.) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod draw;
pub mod engine;
pub mod export;
pub mod fog;
pub mod gesture;
pub mod grid;
pub mod input;
pub mod project;
pub mod render;
pub mod replay;
pub mod scheduler;
pub mod surface;
pub mod web;
