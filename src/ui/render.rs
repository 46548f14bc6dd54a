use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::Model;

use super::style::{Palette, level_style};
use super::{CONSOLE_WIDTH_PERCENT, SOURCE_WIDTH_PERCENT, overlays, status};

pub fn split_main_columns(area: Rect) -> std::rc::Rc<[Rect]> {
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(SOURCE_WIDTH_PERCENT),
            Constraint::Percentage(CONSOLE_WIDTH_PERCENT),
        ])
        .split(area)
}

/// Render the complete UI.
pub fn render(model: &Model, frame: &mut Frame) {
    let area = frame.area();
    let toast_active = model.active_toast().is_some();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(u16::from(toast_active)),
            Constraint::Length(1),
        ])
        .split(area);

    status::render_tab_bar(model, frame, rows[0]);
    let columns = split_main_columns(rows[1]);
    render_source(model, frame, columns[0]);
    render_console(model, frame, columns[1]);
    status::render_preview_banner(model, frame, rows[2]);
    if toast_active {
        status::render_toast_bar(model, frame, rows[3]);
    }
    status::render_status_bar(model, frame, rows[4]);

    if model.help_visible {
        overlays::render_help_overlay(model, frame, area);
    }
}

fn render_source(model: &Model, frame: &mut Frame, area: Rect) {
    let palette = Palette::for_theme(model.state.dark_mode());
    let language = model.state.active();
    let text = model.state.field(language);
    let line_count = text.lines().count().max(1);
    let gutter_width = line_count.to_string().len();

    let lines: Vec<Line> = if text.is_empty() {
        vec![Line::styled("(empty)", Style::default().fg(palette.dim))]
    } else {
        text.lines()
            .enumerate()
            .map(|(i, line)| {
                Line::from(vec![
                    Span::styled(
                        format!("{:>gutter_width$} ", i + 1),
                        Style::default().fg(palette.gutter),
                    ),
                    Span::styled(line.to_string(), Style::default().fg(palette.text)),
                ])
            })
            .collect()
    };

    let title = if model.read_only {
        language.file_name().to_string()
    } else {
        format!("{} (edit in your editor)", language.file_name())
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.dim));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_console(model: &Model, frame: &mut Frame, area: Rect) {
    let palette = Palette::for_theme(model.state.dark_mode());
    let visible_rows = area.height.saturating_sub(2) as usize;

    let events: Vec<_> = model.diagnostics.visible(model.show_stale).collect();
    // Newest entries at the bottom; scrolling moves the window up.
    let end = events.len().saturating_sub(model.log_scroll);
    let start = end.saturating_sub(visible_rows);

    let lines: Vec<Line> = if events.is_empty() {
        vec![Line::styled("No console output", Style::default().fg(palette.dim))]
    } else {
        events[start..end]
            .iter()
            .map(|event| {
                let style = level_style(event.level, event.stale, &palette);
                Line::from(vec![
                    Span::styled(format!("{:<5} ", event.level.label()), style),
                    Span::styled(event.message.clone(), style),
                ])
            })
            .collect()
    };

    let title = match model.diagnostics.evicted() {
        0 => format!("Console ({})", events.len()),
        dropped => format!("Console ({}, {dropped} dropped)", events.len()),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.dim));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
