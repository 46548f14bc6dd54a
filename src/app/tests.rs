use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use tempfile::tempdir;

use crate::diagnostics::{Level, RelayMessage};
use crate::executor::testing::FakeBoundary;
use crate::executor::{Executor, PreviewStatus};
use crate::source::{Language, SourceSet};
use crate::state::{AppState, state_path};
use crate::templates::{TEMPLATES, default_sources};

use super::event_loop::Preview;
use super::{App, Message, Model, RenderRequest, ToastLevel, shared_preview_path, update};

fn create_test_model() -> Model {
    Model::new(
        PathBuf::from("project"),
        AppState::new(SourceSet::new("<p>a</p>", "p{}", "console.log(1)")),
    )
}

fn create_preview(boundary: &FakeBoundary) -> Preview<FakeBoundary> {
    Preview::new(Executor::new(boundary.clone(), 100), 300, "test".to_string())
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn rendered(boundary: &FakeBoundary) -> Vec<String> {
    boundary.state.borrow().documents.clone()
}

#[test]
fn test_source_change_sets_field_and_requests_debounced_render() {
    let model = update(
        create_test_model(),
        Message::SourceChanged(Language::Styles, "h1{}".to_string()),
    );
    assert_eq!(model.state.field(Language::Styles), "h1{}");
    assert_eq!(model.render_request, Some(RenderRequest::Debounced));
    assert!(model.state_dirty);
}

#[test]
fn test_identical_source_change_is_ignored() {
    let model = update(
        create_test_model(),
        Message::SourceChanged(Language::Markup, "<p>a</p>".to_string()),
    );
    assert_eq!(model.render_request, None);
    assert!(!model.state_dirty);
}

#[test]
fn test_refresh_is_not_downgraded_by_later_edit() {
    let model = update(create_test_model(), Message::Refresh);
    let model = update(
        model,
        Message::SourceChanged(Language::Script, "x()".to_string()),
    );
    assert_eq!(model.render_request, Some(RenderRequest::Immediate));
}

#[test]
fn test_read_only_blocks_source_mutation() {
    let mut model = create_test_model();
    model.read_only = true;

    let model = update(
        model,
        Message::SourceChanged(Language::Markup, "<p>b</p>".to_string()),
    );
    let model = update(model, Message::Reset);

    assert_eq!(model.state.field(Language::Markup), "<p>a</p>");
    assert_eq!(model.render_request, None);
    assert!(!model.state_dirty);
    assert_eq!(
        model.active_toast().map(|(_, level)| level),
        Some(ToastLevel::Warning)
    );
}

#[test]
fn test_read_only_still_allows_refresh_and_tabs() {
    let mut model = create_test_model();
    model.read_only = true;
    let model = update(model, Message::SelectTab(Language::Script));
    let model = update(model, Message::Refresh);
    assert_eq!(model.state.active(), Language::Script);
    assert_eq!(model.render_request, Some(RenderRequest::Immediate));
    assert!(!model.state_dirty);
}

#[test]
fn test_tabs_and_theme_mark_state_dirty() {
    let model = update(create_test_model(), Message::SelectTab(Language::Styles));
    assert_eq!(model.state.active(), Language::Styles);
    assert!(model.state_dirty);

    let model = update(model, Message::NextTab);
    assert_eq!(model.state.active(), Language::Script);
    let model = update(model, Message::NextTab);
    assert_eq!(model.state.active(), Language::Markup);

    assert!(!model.state.dark_mode());
    let model = update(model, Message::ToggleTheme);
    assert!(model.state.dark_mode());
}

#[test]
fn test_templates_cycle_and_wrap() {
    let mut model = create_test_model();
    for template in TEMPLATES {
        model = update(model, Message::ApplyNextTemplate);
        assert_eq!(model.state.field(Language::Markup), template.markup);
        assert_eq!(model.render_request, Some(RenderRequest::Immediate));
        model.render_request = None;
    }
    let model = update(model, Message::ApplyNextTemplate);
    assert_eq!(model.state.field(Language::Markup), TEMPLATES[0].markup);
}

#[test]
fn test_reset_restores_default_project() {
    let model = update(create_test_model(), Message::Reset);
    assert_eq!(model.state.sources(), &default_sources());
    assert_eq!(model.render_request, Some(RenderRequest::Immediate));
}

#[test]
fn test_help_toggle_and_hide() {
    let model = update(create_test_model(), Message::ToggleHelp);
    assert!(model.help_visible);
    let model = update(model, Message::HideHelp);
    assert!(!model.help_visible);
}

#[test]
fn test_quit_sets_flag() {
    let model = update(create_test_model(), Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_scroll_log_is_clamped_to_entries() {
    let boundary = FakeBoundary::default();
    let mut preview = create_preview(&boundary);
    let mut model = create_test_model();
    let sources = model.state.sources().clone();
    preview.render(&mut model, &sources);
    for seq in 1..=3 {
        boundary.emit(0, RelayMessage::console(Level::Log, "line", seq));
    }
    assert!(preview.pump(&mut model));

    let model = update(model, Message::ScrollLogUp(10));
    assert_eq!(model.log_scroll, 2);
    let model = update(model, Message::ScrollLogDown(5));
    assert_eq!(model.log_scroll, 0);
}

#[test]
fn test_key_bindings() {
    let model = create_test_model();
    let ctrl_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::CONTROL);
    assert_eq!(App::handle_key(ctrl_enter, &model), Some(Message::Refresh));
    assert_eq!(
        App::handle_key(key(KeyCode::Char('r')), &model),
        Some(Message::Refresh)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('2')), &model),
        Some(Message::SelectTab(Language::Styles))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('t')), &model),
        Some(Message::ToggleTheme)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('s')), &model),
        Some(Message::Share)
    );
    let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
    assert_eq!(App::handle_key(ctrl_c, &model), Some(Message::Quit));
    assert_eq!(
        App::handle_key(key(KeyCode::Char('c')), &model),
        Some(Message::ClearDiagnostics)
    );
    assert_eq!(App::handle_key(key(KeyCode::Char('x')), &model), None);
}

#[test]
fn test_any_key_closes_help() {
    let mut model = create_test_model();
    model.help_visible = true;
    assert_eq!(
        App::handle_key(key(KeyCode::Char('r')), &model),
        Some(Message::HideHelp)
    );
    assert_eq!(
        App::handle_event(&Event::Key(key(KeyCode::Char('q'))), &model),
        Some(Message::Quit)
    );
}

#[test]
fn test_burst_of_edits_renders_once_with_last_value() {
    let dir = tempdir().unwrap();
    let app = App::new(dir.path().to_path_buf());
    let boundary = FakeBoundary::default();
    let mut preview = create_preview(&boundary);
    let mut model = Model::new(dir.path().to_path_buf(), AppState::default());

    for (i, now) in [0_u64, 100, 200].into_iter().enumerate() {
        let msg = Message::SourceChanged(Language::Markup, format!("<p>edit {i}</p>"));
        app.dispatch(&mut model, &mut preview, msg, now);
    }
    assert!(!preview.tick(&mut model, 499));
    assert!(rendered(&boundary).is_empty());

    assert!(preview.tick(&mut model, 500));
    let docs = rendered(&boundary);
    assert_eq!(docs.len(), 1);
    assert!(docs[0].contains("<p>edit 2</p>"));
    assert_eq!(model.generation, 1);
}

#[test]
fn test_spaced_edits_render_each_time() {
    let dir = tempdir().unwrap();
    let app = App::new(dir.path().to_path_buf());
    let boundary = FakeBoundary::default();
    let mut preview = create_preview(&boundary);
    let mut model = Model::new(dir.path().to_path_buf(), AppState::default());

    for i in 0..3_u64 {
        let now = i * 1000;
        let msg = Message::SourceChanged(Language::Styles, format!("p{{order:{i}}}"));
        app.dispatch(&mut model, &mut preview, msg, now);
        assert!(preview.tick(&mut model, now + 300));
    }
    assert_eq!(rendered(&boundary).len(), 3);
    assert_eq!(model.generation, 3);
}

#[test]
fn test_refresh_renders_now_and_drops_pending_edit() {
    let dir = tempdir().unwrap();
    let app = App::new(dir.path().to_path_buf());
    let boundary = FakeBoundary::default();
    let mut preview = create_preview(&boundary);
    let mut model = Model::new(dir.path().to_path_buf(), AppState::default());

    let edit = Message::SourceChanged(Language::Markup, "<p>now</p>".to_string());
    app.dispatch(&mut model, &mut preview, edit, 0);
    app.dispatch(&mut model, &mut preview, Message::Refresh, 10);

    let docs = rendered(&boundary);
    assert_eq!(docs.len(), 1);
    assert!(docs[0].contains("<p>now</p>"));
    assert!(!preview.tick(&mut model, 1000));
}

#[test]
fn test_failed_render_keeps_last_good_and_shows_error() {
    let boundary = FakeBoundary::default();
    let mut preview = create_preview(&boundary);
    let mut model = create_test_model();
    let sources = model.state.sources().clone();
    preview.render(&mut model, &sources);

    boundary.state.borrow_mut().fail_next = true;
    preview.render(&mut model, &sources);

    assert!(matches!(
        model.preview_status,
        PreviewStatus::Failed {
            last_good: Some(1),
            ..
        }
    ));
    assert_eq!(model.generation, 2);
    assert_eq!(
        model.active_toast().map(|(_, level)| level),
        Some(ToastLevel::Error)
    );

    preview.render(&mut model, &sources);
    assert_eq!(model.preview_status, PreviewStatus::Live { generation: 3 });
    assert_eq!(
        model.active_toast().map(|(text, _)| text),
        Some("Preview recovered")
    );
}

#[test]
fn test_late_diagnostics_from_old_render_are_stale() {
    let boundary = FakeBoundary::default();
    let mut preview = create_preview(&boundary);
    let mut model = create_test_model();
    let sources = model.state.sources().clone();
    preview.render(&mut model, &sources);
    preview.render(&mut model, &sources);

    boundary.emit(0, RelayMessage::console(Level::Warn, "old", 1));
    boundary.emit(1, RelayMessage::console(Level::Log, "new", 1));
    preview.pump(&mut model);

    let visible: Vec<_> = model
        .diagnostics
        .visible(false)
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(visible, vec!["new"]);
    assert_eq!(model.diagnostics.visible(true).count(), 2);
}

#[test]
fn test_clear_diagnostics_empties_executor_log() {
    let dir = tempdir().unwrap();
    let app = App::new(dir.path().to_path_buf());
    let boundary = FakeBoundary::default();
    let mut preview = create_preview(&boundary);
    let mut model = Model::new(dir.path().to_path_buf(), AppState::default());
    let sources = model.state.sources().clone();
    preview.render(&mut model, &sources);
    boundary.emit(0, RelayMessage::console(Level::Error, "boom", 1));
    preview.pump(&mut model);
    assert_eq!(model.diagnostics.len(), 1);

    app.dispatch(&mut model, &mut preview, Message::ClearDiagnostics, 0);
    assert!(model.diagnostics.is_empty());
    assert!(preview.executor.log().is_empty());
    assert_eq!(rendered(&boundary).len(), 1);
}

#[test]
fn test_dispatch_saves_state_after_transition() {
    let dir = tempdir().unwrap();
    let app = App::new(dir.path().to_path_buf());
    let boundary = FakeBoundary::default();
    let mut preview = create_preview(&boundary);
    let mut model = Model::new(dir.path().to_path_buf(), AppState::default());

    app.dispatch(&mut model, &mut preview, Message::ToggleTheme, 0);

    assert!(!model.state_dirty);
    let saved = AppState::load(&state_path(dir.path())).unwrap();
    assert!(saved.dark_mode());
}

#[test]
fn test_read_only_session_never_writes_state() {
    let dir = tempdir().unwrap();
    let app = App::new(dir.path().to_path_buf());
    let boundary = FakeBoundary::default();
    let mut preview = create_preview(&boundary);
    let mut model = Model::new(dir.path().to_path_buf(), AppState::default());
    model.read_only = true;

    app.dispatch(&mut model, &mut preview, Message::ToggleTheme, 0);
    app.dispatch(&mut model, &mut preview, Message::Reset, 0);

    assert!(!state_path(dir.path()).exists());
    assert!(!dir.path().join("index.html").exists());
}

#[test]
fn test_reset_writes_project_files() {
    let dir = tempdir().unwrap();
    let app = App::new(dir.path().to_path_buf());
    let boundary = FakeBoundary::default();
    let mut preview = create_preview(&boundary);
    let mut model = Model::new(
        dir.path().to_path_buf(),
        AppState::new(SourceSet::new("x", "y", "z")),
    );

    app.dispatch(&mut model, &mut preview, Message::Reset, 0);

    let on_disk = crate::project::load_dir(dir.path()).unwrap();
    assert_eq!(on_disk, default_sources());
    assert_eq!(rendered(&boundary).len(), 1);
}

#[test]
fn test_export_writes_archive_into_project() {
    let dir = tempdir().unwrap();
    let app = App::new(dir.path().to_path_buf());
    let boundary = FakeBoundary::default();
    let mut preview = create_preview(&boundary);
    let sources = SourceSet::new("<b>x</b>", "b{}", "");
    let mut model = Model::new(dir.path().to_path_buf(), AppState::new(sources.clone()));

    app.dispatch(&mut model, &mut preview, Message::Export, 0);

    let bytes = std::fs::read(dir.path().join(crate::project::ARCHIVE_NAME)).unwrap();
    assert_eq!(crate::project::import_archive(&bytes).unwrap(), sources);
}

#[test]
fn test_share_stores_snapshot_and_records_link() {
    let dir = tempdir().unwrap();
    let shares = dir.path().join("shares");
    let app = App::new(dir.path().to_path_buf())
        .with_share_dir(shares.clone())
        .with_base_url(Some(url::Url::parse("https://play.example.com/s").unwrap()));
    let boundary = FakeBoundary::default();
    let mut preview = create_preview(&boundary);
    let mut model = Model::new(dir.path().to_path_buf(), AppState::default());

    app.dispatch(&mut model, &mut preview, Message::Share, 0);

    let link = model.last_share_url.clone().expect("share link");
    assert!(link.starts_with("https://play.example.com/s?id="));
    let id = crate::share::share_id_from(&link).unwrap();
    let store = crate::share::LocalShareStore::new(&shares, crate::share::DEFAULT_SHARE_TTL);
    let record = crate::share::ShareStore::get(&store, &id).unwrap();
    assert_eq!(&record.sources, model.state.sources());
}

#[test]
fn test_initial_model_creates_default_project() {
    let dir = tempdir().unwrap();
    let app = App::new(dir.path().to_path_buf());

    let model = app.initial_model().unwrap();

    assert_eq!(model.state.sources(), &default_sources());
    assert_eq!(
        crate::project::load_dir(dir.path()).unwrap(),
        default_sources()
    );
}

#[test]
fn test_initial_model_prefers_files_on_disk() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("styles.css"), "em{}").unwrap();
    let mut saved = AppState::default();
    saved.select(Language::Styles);
    saved.save(&state_path(dir.path())).unwrap();

    let model = App::new(dir.path().to_path_buf()).initial_model().unwrap();

    assert_eq!(model.state.field(Language::Styles), "em{}");
    assert_eq!(model.state.field(Language::Markup), "");
    assert_eq!(model.state.active(), Language::Styles);
}

#[test]
fn test_initial_model_for_shared_view_is_read_only() {
    let dir = tempdir().unwrap();
    let shared = SourceSet::new("<i>shared</i>", "", "");
    let app = App::new(dir.path().to_path_buf())
        .with_shared_sources(Some(shared.clone()))
        .with_theme(crate::config::ThemeMode::Dark);

    let model = app.initial_model().unwrap();

    assert!(model.read_only);
    assert!(model.state.dark_mode());
    assert_eq!(model.state.sources(), &shared);
    assert!(!dir.path().join("index.html").exists());
}

#[test]
fn test_read_changes_turns_files_into_messages() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("script.js"), "go()").unwrap();
    let model = Model::new(dir.path().to_path_buf(), AppState::default());

    let msgs = App::read_changes(&model, &[Language::Script, Language::Markup]);

    assert_eq!(
        msgs,
        vec![Message::SourceChanged(Language::Script, "go()".to_string())]
    );
}

#[test]
fn test_snapshot_boundary_is_default() {
    let dir = tempdir().unwrap();
    let app = App::new(dir.path().to_path_buf());
    assert_eq!(
        app.preview_path(),
        dir.path().join(".htmlreader").join("preview.html")
    );
    let boundary = app.make_boundary().unwrap();
    assert!(boundary.describe().contains("preview.html"));
}

#[test]
fn test_shared_view_snapshot_defaults_outside_working_directory() {
    let dir = tempdir().unwrap();
    let app = App::new(dir.path().to_path_buf())
        .with_shared_sources(Some(SourceSet::new("<i>shared</i>", "", "")));

    let path = app.preview_path();

    assert_eq!(path, shared_preview_path());
    assert!(path.starts_with(std::env::temp_dir()));
    assert!(!path.starts_with(dir.path()));
}

#[test]
fn test_shared_view_honors_explicit_out() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("view.html");
    let app = App::new(dir.path().to_path_buf())
        .with_shared_sources(Some(SourceSet::default()))
        .with_out(Some(out.clone()));
    assert_eq!(app.preview_path(), out);
}
