use crate::app::model::RenderRequest;
use crate::app::{Model, ToastLevel};
use crate::source::Language;
use crate::templates::TEMPLATES;

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // Buffers
    /// A buffer was edited; carries its full new text
    SourceChanged(Language, String),
    /// Restore the default project
    Reset,
    /// Replace all buffers with the next template in the gallery
    ApplyNextTemplate,

    // Preview
    /// Render now, skipping the debounce window
    Refresh,
    /// Empty the console panel
    ClearDiagnostics,
    /// Show or hide diagnostics from superseded renders
    ToggleStale,
    /// Scroll console up by n lines
    ScrollLogUp(usize),
    /// Scroll console down by n lines
    ScrollLogDown(usize),

    // Project
    /// Store a snapshot and produce a share link
    Share,
    /// Write the project archive
    Export,

    // View
    /// Show a buffer in the source panel
    SelectTab(Language),
    /// Show the next buffer
    NextTab,
    /// Switch between light and dark palettes
    ToggleTheme,
    /// Toggle help overlay
    ToggleHelp,
    /// Hide help overlay
    HideHelp,
    /// Redraw screen
    Redraw,

    // Application
    /// Quit the application
    Quit,
}

impl Message {
    /// Whether this message would change the buffers.
    const fn mutates_sources(&self) -> bool {
        matches!(
            self,
            Self::SourceChanged(..) | Self::Reset | Self::ApplyNextTemplate
        )
    }
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here.
/// No side effects should occur in this function. Anything needing I/O
/// (rendering, saving, sharing) is requested through flags on the model
/// and carried out by the event loop.
pub fn update(mut model: Model, msg: Message) -> Model {
    if model.read_only && msg.mutates_sources() {
        model.show_toast(ToastLevel::Warning, "Shared view is read-only");
        return model;
    }

    match msg {
        Message::SourceChanged(language, text) => {
            if model.state.set_field(language, text) {
                model.state_dirty = true;
                model.request_render(RenderRequest::Debounced);
            }
        }
        Message::Reset => {
            if model.state.reset() {
                model.state_dirty = true;
                model.request_render(RenderRequest::Immediate);
            }
            model.template_cursor = None;
            model.show_toast(ToastLevel::Info, "Project reset");
        }
        Message::ApplyNextTemplate => {
            let next = model
                .template_cursor
                .map_or(0, |index| (index + 1) % TEMPLATES.len());
            let template = &TEMPLATES[next];
            model.template_cursor = Some(next);
            if model.state.apply_template(template) {
                model.state_dirty = true;
                model.request_render(RenderRequest::Immediate);
            }
            model.show_toast(ToastLevel::Info, format!("Template: {}", template.name));
        }

        Message::Refresh => {
            model.request_render(RenderRequest::Immediate);
        }
        Message::ClearDiagnostics => {
            model.diagnostics.clear();
            model.log_scroll = 0;
        }
        Message::ToggleStale => {
            model.show_stale = !model.show_stale;
            model.log_scroll = 0;
        }
        Message::ScrollLogUp(n) => {
            let max = model
                .diagnostics
                .visible(model.show_stale)
                .count()
                .saturating_sub(1);
            model.log_scroll = (model.log_scroll + n).min(max);
        }
        Message::ScrollLogDown(n) => {
            model.log_scroll = model.log_scroll.saturating_sub(n);
        }

        // Handled entirely as side effects
        Message::Share | Message::Export | Message::Redraw => {}

        Message::SelectTab(language) => {
            if model.state.active() != language {
                model.state.select(language);
                model.state_dirty = true;
            }
        }
        Message::NextTab => {
            let next = model.state.active().next();
            model.state.select(next);
            model.state_dirty = true;
        }
        Message::ToggleTheme => {
            model.state.toggle_theme();
            model.state_dirty = true;
        }
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }
        Message::HideHelp => {
            model.help_visible = false;
        }

        Message::Quit => {
            model.should_quit = true;
        }
    }

    if model.read_only {
        model.state_dirty = false;
    }
    model
}
