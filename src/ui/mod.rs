//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`style`]: Light and dark palettes
//! - the source panel, console panel and preview banner
//! - status, toast and help overlays

pub mod style;

mod overlays;
mod render;
mod status;

pub use render::{render, split_main_columns};

pub const SOURCE_WIDTH_PERCENT: u16 = 55;
pub const CONSOLE_WIDTH_PERCENT: u16 = 45;
