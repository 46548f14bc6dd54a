use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event;
use ratatui::DefaultTerminal;

use crate::app::model::RenderRequest;
use crate::app::{App, Message, Model, ToastLevel, update};
use crate::compose::{ComposeOptions, compose_with};
use crate::config::ThemeMode;
use crate::debounce::Debouncer;
use crate::executor::{Executor, IsolationBoundary};
use crate::source::{Language, SourceSet};
use crate::state::{AppState, state_path};
use crate::watcher::ProjectWatcher;

/// How often expired share records are swept while the app runs.
const SWEEP_INTERVAL_MS: u64 = 60_000;

/// Everything that turns buffer changes into preview updates.
pub(super) struct Preview<B: IsolationBoundary> {
    pub(super) executor: Executor<B>,
    pub(super) debouncer: Debouncer<SourceSet>,
    pub(super) options: ComposeOptions,
}

impl<B: IsolationBoundary> Preview<B> {
    pub(super) fn new(executor: Executor<B>, debounce_ms: u64, title: String) -> Self {
        Self {
            executor,
            debouncer: Debouncer::new(debounce_ms),
            options: ComposeOptions { title },
        }
    }

    /// Act on the render the last transition asked for.
    ///
    /// Returns true if the preview was rebuilt.
    pub(super) fn schedule(&mut self, model: &mut Model, now_ms: u64) -> bool {
        match model.take_render_request() {
            Some(RenderRequest::Debounced) => {
                self.debouncer.queue(model.state.sources().clone(), now_ms);
                false
            }
            Some(RenderRequest::Immediate) => {
                // A pending value is never newer than the current buffers.
                self.debouncer.cancel();
                let sources = model.state.sources().clone();
                self.render(model, &sources);
                true
            }
            None => false,
        }
    }

    /// Render the debounced buffers once their window has elapsed.
    pub(super) fn tick(&mut self, model: &mut Model, now_ms: u64) -> bool {
        match self.debouncer.take_ready(now_ms) {
            Some(sources) => {
                self.render(model, &sources);
                true
            }
            None => false,
        }
    }

    /// Drain relayed diagnostics into the model. Returns true if any arrived.
    pub(super) fn pump(&mut self, model: &mut Model) -> bool {
        if self.executor.pump() == 0 {
            return false;
        }
        model.sync_preview(&self.executor);
        true
    }

    pub(super) fn render(&mut self, model: &mut Model, sources: &SourceSet) {
        let document = {
            let _scope = crate::perf::scope("compose");
            compose_with(sources, &self.options)
        };
        let was_failed = model.preview_status.is_failed();
        let status = self.executor.render(&document).clone();
        model.sync_preview(&self.executor);
        model.log_scroll = 0;
        match status {
            crate::executor::PreviewStatus::Failed { message, .. } => {
                model.show_toast(ToastLevel::Error, format!("Preview failed: {message}"));
            }
            _ if was_failed => model.show_toast(ToastLevel::Info, "Preview recovered"),
            _ => {}
        }
    }

    /// Milliseconds the loop may sleep before the debouncer needs attention.
    pub(super) fn wait_ms(&self, now_ms: u64) -> Option<u64> {
        self.debouncer.remaining_ms(now_ms)
    }
}

impl App {
    /// Run the main event loop.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal initialization, loading the project,
    /// or the event loop encounters an I/O failure.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        let mut model = self.initial_model()?;
        let boundary = self
            .make_boundary()
            .context("Failed to set up the preview boundary")?;
        let mut executor = Executor::new(boundary, self.log_cap);
        executor.on_diagnostic(|event| {
            tracing::debug!(
                level = %event.level,
                generation = event.generation,
                sequence = event.sequence,
                stale = event.stale,
                "{}",
                event.message
            );
        });
        let mut preview = Preview::new(executor, self.debounce_ms, model.project_name());
        model.sync_preview(&preview.executor);

        let mut watcher = if model.read_only {
            None
        } else {
            match ProjectWatcher::new(&self.project_dir) {
                Ok(watcher) => Some(watcher),
                Err(err) => {
                    model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
                    crate::perf::log_event(
                        "watcher.error",
                        format!("failed path={} err={err}", self.project_dir.display()),
                    );
                    None
                }
            }
        };

        // Initialize terminal
        let init_scope = crate::perf::scope("app.ratatui_init");
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal - htmlreader requires an interactive terminal")?;
        drop(init_scope);

        // First preview goes out without waiting for an edit.
        let initial = model.state.sources().clone();
        preview.render(&mut model, &initial);

        let result = self.event_loop(&mut terminal, &mut model, &mut preview, &mut watcher);

        ratatui::restore();
        if self.is_read_only() && self.out.is_none() && self.runner.is_none() {
            let snapshot = self.preview_path();
            if let Some(dir) = snapshot.parent()
                && let Err(err) = std::fs::remove_dir_all(dir)
            {
                tracing::debug!(path = %dir.display(), error = %err, "shared preview cleanup failed");
            }
        }
        result
    }

    /// Build the starting model: shared snapshot, saved state, or files on disk.
    ///
    /// # Errors
    /// Returns an error if the state file or project files cannot be read.
    pub(super) fn initial_model(&self) -> Result<Model> {
        if let Some(sources) = &self.shared {
            let mut model = Model::new(self.project_dir.clone(), AppState::new(sources.clone()));
            model.read_only = true;
            self.apply_view_settings(&mut model);
            return Ok(model);
        }

        let path = state_path(&self.project_dir);
        let mut state = AppState::load(&path)
            .with_context(|| format!("Failed to load state from {}", path.display()))?;
        let has_files = Language::ALL
            .iter()
            .any(|language| self.project_dir.join(language.file_name()).exists());
        if has_files {
            // Files on disk are the source of truth; saved state may be stale.
            let sources = crate::project::load_dir(&self.project_dir)
                .with_context(|| format!("Failed to read project {}", self.project_dir.display()))?;
            state.set_sources(sources);
        } else {
            crate::project::write_dir(&self.project_dir, state.sources()).with_context(|| {
                format!("Failed to create project {}", self.project_dir.display())
            })?;
            tracing::info!(dir = %self.project_dir.display(), "created project files");
        }

        let mut model = Model::new(self.project_dir.clone(), state);
        self.apply_view_settings(&mut model);
        Ok(model)
    }

    fn apply_view_settings(&self, model: &mut Model) {
        match self.theme {
            ThemeMode::Light => model.state.set_dark_mode(false),
            ThemeMode::Dark => model.state.set_dark_mode(true),
            ThemeMode::Auto => {}
        }
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);
    }

    /// Apply one message: transition, side effects, rendering, persistence.
    pub(super) fn dispatch<B: IsolationBoundary>(
        &self,
        model: &mut Model,
        preview: &mut Preview<B>,
        msg: Message,
        now_ms: u64,
    ) {
        let side_msg = msg.clone();
        *model = update(std::mem::take(model), msg);
        self.handle_message_side_effects(model, &mut preview.executor, &side_msg);
        preview.schedule(model, now_ms);
        Self::persist_state(model);
    }

    fn persist_state(model: &mut Model) {
        if !model.state_dirty || model.read_only {
            return;
        }
        model.state_dirty = false;
        let path = state_path(&model.project_dir);
        if let Err(err) = model.state.save(&path) {
            tracing::warn!(error = %err, "failed to save state");
            model.show_toast(ToastLevel::Warning, format!("State not saved: {err}"));
        }
    }

    /// Read changed project files into `SourceChanged` messages.
    pub(super) fn read_changes(model: &Model, changed: &[Language]) -> Vec<Message> {
        changed
            .iter()
            .filter_map(|&language| {
                let path = model.project_dir.join(language.file_name());
                match std::fs::read_to_string(&path) {
                    Ok(text) => Some(Message::SourceChanged(language, text)),
                    Err(err) => {
                        // Mid-save editors briefly remove files; the next event catches up.
                        tracing::debug!(path = %path.display(), error = %err, "skipping unreadable change");
                        None
                    }
                }
            })
            .collect()
    }

    fn sweep_shares(&self) {
        match self.share_store().sweep() {
            Ok(0) => {}
            Ok(removed) => tracing::debug!(removed, "swept expired shares"),
            Err(err) => tracing::debug!(error = %err, "share sweep failed"),
        }
    }

    fn event_loop<B: IsolationBoundary>(
        &self,
        terminal: &mut DefaultTerminal,
        model: &mut Model,
        preview: &mut Preview<B>,
        watcher: &mut Option<ProjectWatcher>,
    ) -> Result<()> {
        let start = Instant::now();
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;
        let mut last_sweep_ms: Option<u64> = None;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let now_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

            if last_sweep_ms.is_none_or(|last| now_ms.saturating_sub(last) >= SWEEP_INTERVAL_MS) {
                self.sweep_shares();
                last_sweep_ms = Some(now_ms);
            }

            if let Some(watcher) = watcher.as_mut() {
                let changed = watcher.take_changes();
                for msg in Self::read_changes(model, &changed) {
                    self.dispatch(model, preview, msg, now_ms);
                    needs_render = true;
                }
            }

            if preview.tick(model, now_ms) {
                needs_render = true;
            }
            if preview.pump(model) {
                needs_render = true;
            }

            // Handle events
            let poll_ms = if needs_render {
                0
            } else {
                preview.wait_ms(now_ms).map_or(100, |ms| ms.clamp(5, 100))
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                // Refresh timestamp after poll wait so the debouncer uses accurate times.
                let event_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                if let Some(msg) = Self::handle_event(&event::read()?, model) {
                    crate::perf::log_event(
                        "event.message",
                        format!("frame={frame_idx} msg={msg:?}"),
                    );
                    self.dispatch(model, preview, msg, event_ms);
                    needs_render = true;
                }

                // Coalesce key repeat bursts into a single frame.
                while event::poll(Duration::from_millis(0))? {
                    let drain_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
                    if let Some(msg) = Self::handle_event(&event::read()?, model) {
                        self.dispatch(model, preview, msg, drain_ms);
                        needs_render = true;
                    }
                }
            }

            if needs_render {
                frame_idx += 1;
                let draw_start = Instant::now();
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                crate::perf::log_event(
                    "frame.draw",
                    format!(
                        "frame={} draw_ms={:.3}",
                        frame_idx,
                        draw_start.elapsed().as_secs_f64() * 1000.0
                    ),
                );
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}
