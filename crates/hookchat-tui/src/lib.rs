//! hookchat-tui: Terminal UI components
//!
//! Widgets for rendering a webhook conversation with ratatui and crossterm.

pub mod input;
pub mod theme;
pub mod widgets;

pub use theme::Theme;
