use std::io::{Write, stdout};

use anyhow::{Context, Result};
use base64::Engine;

use crate::app::{App, Message, Model, ToastLevel};
use crate::executor::{Executor, IsolationBoundary};
use crate::project::{self, ARCHIVE_NAME};
use crate::share::{ShareStore, share_url};

impl App {
    pub(super) fn handle_message_side_effects<B: IsolationBoundary>(
        &self,
        model: &mut Model,
        executor: &mut Executor<B>,
        msg: &Message,
    ) {
        match msg {
            Message::Reset | Message::ApplyNextTemplate if !model.read_only => {
                if let Err(err) = project::write_dir(&model.project_dir, model.state.sources()) {
                    model.show_toast(ToastLevel::Error, format!("Write failed: {err}"));
                    crate::perf::log_event(
                        "project.write.error",
                        format!("dir={} err={err}", model.project_dir.display()),
                    );
                }
            }
            Message::ClearDiagnostics => {
                executor.clear_diagnostics();
                model.sync_preview(executor);
            }
            Message::Share => match self.share(model) {
                Ok(link) => {
                    let minutes = self.share_ttl.as_secs() / 60;
                    let note = if copy_to_clipboard(&link).is_ok() {
                        "copied"
                    } else {
                        "created"
                    };
                    model.show_toast(
                        ToastLevel::Info,
                        format!("Share link {note}, valid for {minutes} minutes"),
                    );
                    model.last_share_url = Some(link);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "share failed");
                    model.show_toast(ToastLevel::Error, format!("Share failed: {err:#}"));
                }
            },
            Message::Export => match Self::export(model) {
                Ok(path) => {
                    model.show_toast(ToastLevel::Info, format!("Exported {}", path.display()));
                }
                Err(err) => {
                    model.show_toast(ToastLevel::Error, format!("Export failed: {err:#}"));
                }
            },
            _ => {}
        }
    }

    fn share(&self, model: &Model) -> Result<String> {
        let base = match &self.base_url {
            Some(url) => url.clone(),
            None => super::default_base_url().context("Invalid default share URL")?,
        };
        let record = self
            .share_store()
            .create(model.state.sources())
            .context("Failed to store snapshot")?;
        tracing::info!(id = %record.id, "snapshot shared");
        Ok(share_url(&base, &record.id).to_string())
    }

    fn export(model: &Model) -> Result<std::path::PathBuf> {
        let bytes = project::export_archive(model.state.sources())?;
        let path = model.project_dir.join(ARCHIVE_NAME);
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }
}

fn copy_to_clipboard(text: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        if copy_to_pbcopy(text).is_ok() {
            return Ok(());
        }
    }
    copy_to_clipboard_osc52(text)
}

#[cfg(target_os = "macos")]
fn copy_to_pbcopy(text: &str) -> std::io::Result<()> {
    use std::process::{Command, Stdio};

    let mut child = Command::new("pbcopy").stdin(Stdio::piped()).spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    if child.wait()?.success() {
        Ok(())
    } else {
        Err(std::io::Error::other("pbcopy failed"))
    }
}

fn copy_to_clipboard_osc52(text: &str) -> std::io::Result<()> {
    let mut out = stdout();
    out.write_all(osc52_sequence(text).as_bytes())?;
    out.flush()
}

fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}
