//! # UI Module
//!
//! Everything the shell prints goes through this module.
//!
//! ## Components
//!
//! - [`theme`] - Built-in themes and the style sheet mapping style names to styles
//! - [`config`] - User configuration (`config.json`): theme, prompt, style overrides
//! - [`view`] - Renderable building blocks: texts, grids, trees, sections
//! - [`builders`] - Small views of nodes, properties and bindings
//! - [`views`] - Complete views: node and property pages, lists, trees, hints
//! - [`term`] - Writes views to the terminal, with or without ANSI styles

pub mod builders;
pub mod config;
pub mod term;
pub mod theme;
pub mod view;
pub mod views;

pub use config::Config;
pub use term::Terminal;
pub use theme::{StyleSheet, Theme};
