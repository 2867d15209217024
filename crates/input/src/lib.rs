//! Embodiment input mapped to shared actions.
//!
//! # Invariants
//! - Frontends produce [`Action`]s; only actions touch the transform store.

pub mod action;

pub use action::Action;

pub fn crate_info() -> &'static str {
    "maze-input v0.1.0"
}
