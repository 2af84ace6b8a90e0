//! Theme engine and template rendering.
//!
//! Provides Tera-based rendering of listing view models by view name.

mod engine;

pub use engine::ThemeEngine;
