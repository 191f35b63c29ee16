//! Area-digitization engine for vector drawings.
//!
//! The crate turns a parsed CAD drawing into clickable closed regions, lets
//! the user trace polygons inside them, and keeps the resulting areas with
//! their lifecycle status so a host can persist only what changed. It has no
//! async and no I/O; the host wires DOM events to [`engine::EngineCore`] and
//! reacts to the returned [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Host-facing engine and testable [`engine::EngineCore`] |
//! | [`areas`] | Area model, lifecycle store and per-area edit buffers |
//! | [`session`] | Click-by-click polygon builder |
//! | [`regions`] | Closed-region extraction from primitives |
//! | [`primitive`] | Parser output in every supported dialect |
//! | [`geometry`] | Point-in-polygon, distances, polygon area, bounds |
//! | [`camera`] | World/screen transforms, zoom, pan and fit |
//! | [`input`] | Tools, keys and the pan gesture state |
//! | [`render`] | Layered redraw over a `Surface`, plus the Canvas2D surface |
//! | [`consts`] | Shared thresholds, colors and defaults |

pub mod areas;
pub mod camera;
pub mod consts;
pub mod engine;
pub mod geometry;
pub mod input;
pub mod primitive;
pub mod regions;
pub mod render;
pub mod session;
