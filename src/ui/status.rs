use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Model, ToastLevel};
use crate::diagnostics::Level;
use crate::executor::PreviewStatus;
use crate::source::Language;

use super::style::{Palette, banner_style};

pub fn render_tab_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let palette = Palette::for_theme(model.state.dark_mode());
    let mut spans = vec![Span::raw(format!(" {} ", model.project_name()))];
    for (index, language) in Language::ALL.into_iter().enumerate() {
        let label = format!(" {}:{} ", index + 1, language.label());
        if language == model.state.active() {
            spans.push(Span::styled(label, palette.active_tab()));
        } else {
            spans.push(Span::raw(label));
        }
    }
    if model.read_only {
        spans.push(Span::styled(
            " [shared, read-only]",
            Style::default().fg(palette.accent),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).style(palette.bar()), area);
}

/// One-line summary of the preview state.
pub fn banner_text(model: &Model) -> String {
    match &model.preview_status {
        PreviewStatus::Idle => " Preview: waiting for first render".to_string(),
        PreviewStatus::Live { generation } => {
            let errors = model.diagnostics.count_level(Level::Error);
            let warnings = model.diagnostics.count_level(Level::Warn);
            format!(
                " Preview live #{generation}  {errors} error(s), {warnings} warning(s)  {}",
                model.boundary
            )
        }
        PreviewStatus::Failed { message, last_good } => {
            let kept = last_good.map_or_else(
                || "nothing rendered yet".to_string(),
                |generation| format!("showing #{generation}"),
            );
            format!(" Preview failed: {message} ({kept})")
        }
    }
}

pub fn render_preview_banner(model: &Model, frame: &mut Frame, area: Rect) {
    let banner = Paragraph::new(banner_text(model)).style(banner_style(&model.preview_status));
    frame.render_widget(banner, area);
}

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let palette = Palette::for_theme(model.state.dark_mode());
    let stale = if model.show_stale { "  [stale shown]" } else { "" };
    let share = model
        .last_share_url
        .as_deref()
        .map(|url| format!("  share: {url}"))
        .unwrap_or_default();
    let status = format!(" r:refresh  s:share  e:export  p:template  t:theme  ?:help{stale}{share}");
    frame.render_widget(Paragraph::new(status).style(palette.bar()), area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(Color::DarkGray).fg(Color::White),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(Color::Yellow).fg(Color::Black),
        ),
        ToastLevel::Error => ("[error]", Style::default().bg(Color::Red).fg(Color::White)),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
