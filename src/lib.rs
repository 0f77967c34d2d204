//! dtsh - a shell-like interface to a devicetree
//!
//! This library provides the devicetree model, the command engine with its
//! autocompletion, the views that render nodes, properties and bindings,
//! and the interactive session tying them to a line editor.

pub mod dt;
pub mod logging;
pub mod session;
pub mod shell;
pub mod ui;
