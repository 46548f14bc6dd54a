use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Message, Model};
use crate::source::Language;

impl App {
    pub(super) fn handle_event(event: &Event, model: &Model) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => Self::handle_key(*key, model),
            Event::Resize(..) => Some(Message::Redraw),
            _ => None,
        }
    }

    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if model.help_visible {
            return match key.code {
                KeyCode::Char('q') => Some(Message::Quit),
                _ => Some(Message::HideHelp),
            };
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            // Preview
            KeyCode::Enter if ctrl => Some(Message::Refresh),
            // Terminals without modifier reporting send Ctrl+Enter as Ctrl+J.
            KeyCode::Char('j') if ctrl => Some(Message::Refresh),
            KeyCode::Char('r') | KeyCode::F(5) => Some(Message::Refresh),
            KeyCode::Char('c') if ctrl => Some(Message::Quit),
            KeyCode::Char('c') => Some(Message::ClearDiagnostics),
            KeyCode::Char('a') => Some(Message::ToggleStale),

            // Console
            KeyCode::Char('k') | KeyCode::Up => Some(Message::ScrollLogUp(1)),
            KeyCode::Char('j') | KeyCode::Down => Some(Message::ScrollLogDown(1)),
            KeyCode::PageUp => Some(Message::ScrollLogUp(10)),
            KeyCode::PageDown => Some(Message::ScrollLogDown(10)),

            // Tabs
            KeyCode::Char('1') => Some(Message::SelectTab(Language::Markup)),
            KeyCode::Char('2') => Some(Message::SelectTab(Language::Styles)),
            KeyCode::Char('3') => Some(Message::SelectTab(Language::Script)),
            KeyCode::Tab => Some(Message::NextTab),
            KeyCode::Char('t') => Some(Message::ToggleTheme),

            // Project
            KeyCode::Char('s') => Some(Message::Share),
            KeyCode::Char('e') => Some(Message::Export),
            KeyCode::Char('R') => Some(Message::Reset),
            KeyCode::Char('p') => Some(Message::ApplyNextTemplate),

            KeyCode::Char('?') | KeyCode::F(1) => Some(Message::ToggleHelp),
            KeyCode::Esc => Some(Message::HideHelp),
            KeyCode::Char('q') => Some(Message::Quit),

            _ => None,
        }
    }
}
