//! Terminal rendering with ratatui.

pub mod common;
pub mod dashboard;
pub mod theme;
pub mod timeline;
pub mod vibration;

pub use theme::Theme;
