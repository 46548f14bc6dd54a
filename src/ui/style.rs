//! Theming and color definitions.
//!
//! Two palettes, picked by the saved theme. Colors are ANSI indexed values
//! so they follow the terminal's own palette where possible.

use ratatui::style::{Color, Modifier, Style};

use crate::diagnostics::Level;
use crate::executor::PreviewStatus;

/// Colors for one theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub text: Color,
    pub dim: Color,
    pub accent: Color,
    pub bar_bg: Color,
    pub bar_fg: Color,
    pub gutter: Color,
}

impl Palette {
    pub const LIGHT: Self = Self {
        text: Color::Indexed(235),
        dim: Color::Indexed(244),
        accent: Color::Indexed(124),
        bar_bg: Color::Indexed(252),
        bar_fg: Color::Indexed(235),
        gutter: Color::Indexed(248),
    };

    pub const DARK: Self = Self {
        text: Color::Indexed(252),
        dim: Color::Indexed(242),
        accent: Color::Indexed(209),
        bar_bg: Color::DarkGray,
        bar_fg: Color::White,
        gutter: Color::Indexed(240),
    };

    pub const fn for_theme(dark_mode: bool) -> Self {
        if dark_mode { Self::DARK } else { Self::LIGHT }
    }

    pub fn bar(&self) -> Style {
        Style::default().bg(self.bar_bg).fg(self.bar_fg)
    }

    pub fn active_tab(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }
}

/// Style for a console line.
///
/// Stale entries are always dimmed, whatever their level.
pub fn level_style(level: Level, stale: bool, palette: &Palette) -> Style {
    if stale {
        return Style::default()
            .fg(palette.dim)
            .add_modifier(Modifier::DIM | Modifier::ITALIC);
    }
    match level {
        Level::Log => Style::default().fg(palette.text),
        Level::Info => Style::default().fg(Color::Cyan),
        Level::Warn => Style::default().fg(Color::Yellow),
        Level::Error => Style::default()
            .fg(Color::Red)
            .add_modifier(Modifier::BOLD),
    }
}

/// Background of the preview banner.
pub fn banner_style(status: &PreviewStatus) -> Style {
    match status {
        PreviewStatus::Idle => Style::default().bg(Color::DarkGray).fg(Color::White),
        PreviewStatus::Live { .. } => Style::default().bg(Color::Green).fg(Color::Black),
        PreviewStatus::Failed { .. } => Style::default().bg(Color::Red).fg(Color::White),
    }
}
