use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread;

use crate::compose::RenderDocument;
use crate::diagnostics::{Generation, Level, RelayMessage};

use super::{BoundaryError, IsolationBoundary, Outbox};

/// Runs each preview in its own runner process.
///
/// The runner receives the complete document on stdin and prints relay
/// messages, one JSON object per line, on stdout. Lines that are not relay
/// messages surface as `log` diagnostics and stderr lines as `error`
/// diagnostics, both with sequence 0 to mark them as host-originated.
///
/// Each runner starts with an empty environment (only `PATH` is kept so the
/// program can be found) inside a scratch directory of its own, as the
/// leader of a new process group. Replacing the document kills the whole
/// group, so nothing the previous runner started outlives it.
///
/// The document is written from a separate thread; a runner that never
/// reads stdin cannot stall the host. Delivery failures surface as `error`
/// diagnostics of that generation.
#[derive(Debug)]
pub struct ProcessBoundary {
    program: String,
    args: Vec<String>,
    scratch_root: PathBuf,
    current: Option<Running>,
}

#[derive(Debug)]
struct Running {
    generation: Generation,
    child: Child,
    scratch: PathBuf,
}

impl ProcessBoundary {
    /// Build a boundary from a whitespace-separated command line.
    ///
    /// # Errors
    /// Returns [`BoundaryError::EmptyCommand`] if `command` has no program.
    pub fn from_command_line(command: &str) -> Result<Self, BoundaryError> {
        let mut tokens = command.split_whitespace().map(ToOwned::to_owned);
        let program = tokens.next().ok_or(BoundaryError::EmptyCommand)?;
        Ok(Self::new(program, tokens.collect()))
    }

    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        let scratch_root =
            std::env::temp_dir().join(format!("htmlreader-sandbox-{}", std::process::id()));
        Self {
            program: program.into(),
            args,
            scratch_root,
            current: None,
        }
    }

    /// Place per-render scratch directories under `root`.
    #[must_use]
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = root.into();
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Generation of the runner currently alive, if any.
    pub fn running_generation(&self) -> Option<Generation> {
        self.current.as_ref().map(|running| running.generation)
    }

    fn spawn(&self, document: &RenderDocument, outbox: Outbox) -> Result<Running, BoundaryError> {
        let generation = outbox.generation();
        let scratch = self.scratch_root.join(format!("gen-{generation}"));
        fs::create_dir_all(&scratch).map_err(|source| BoundaryError::Scratch {
            path: scratch.clone(),
            source,
        })?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .env_clear()
            .current_dir(&scratch)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(path) = std::env::var_os("PATH") {
            command.env("PATH", path);
        }
        #[cfg(unix)]
        std::os::unix::process::CommandExt::process_group(&mut command, 0);

        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(source) => {
                let _ = fs::remove_dir_all(&scratch);
                return Err(BoundaryError::Spawn {
                    command: self.command_line(),
                    source,
                });
            }
        };

        if let Some(stdout) = child.stdout.take() {
            relay_lines(stdout, outbox.clone(), Level::Log, true);
        }
        if let Some(stderr) = child.stderr.take() {
            relay_lines(stderr, outbox.clone(), Level::Error, false);
        }
        if let Some(stdin) = child.stdin.take() {
            deliver(stdin, document.as_str().to_owned(), outbox);
        }

        Ok(Running {
            generation,
            child,
            scratch,
        })
    }
}

impl IsolationBoundary for ProcessBoundary {
    fn replace(&mut self, document: &RenderDocument, outbox: Outbox) -> Result<(), BoundaryError> {
        let next = self.spawn(document, outbox)?;
        tracing::debug!(
            generation = next.generation,
            pid = next.child.id(),
            "runner started"
        );
        if let Some(mut previous) = self.current.replace(next) {
            discard(&mut previous);
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(mut running) = self.current.take() {
            discard(&mut running);
        }
        let _ = fs::remove_dir(&self.scratch_root);
    }

    fn describe(&self) -> String {
        format!("runner: {}", self.command_line())
    }
}

impl Drop for ProcessBoundary {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn discard(running: &mut Running) {
    kill_tree(&running.child);
    // kill() errors when the runner already exited; either way reap it.
    let _ = running.child.kill();
    let _ = running.child.wait();
    if let Err(err) = remove_scratch(&running.scratch) {
        tracing::debug!(path = %running.scratch.display(), error = %err, "scratch cleanup failed");
    }
    crate::perf::log_event(
        "runner.discard",
        format!("generation={}", running.generation),
    );
}

/// Kill every process in the runner's group.
#[cfg(unix)]
fn kill_tree(child: &Child) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Ok(pgid) = i32::try_from(child.id()) else {
        return;
    };
    // ESRCH once the whole group is gone.
    if let Err(err) = killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        tracing::trace!(pgid, error = %err, "runner group already gone");
    }
}

#[cfg(not(unix))]
fn kill_tree(_child: &Child) {}

fn deliver(mut stdin: ChildStdin, document: String, outbox: Outbox) {
    thread::spawn(move || {
        // Dropping stdin afterwards closes the pipe so the runner sees EOF.
        if let Err(err) = stdin.write_all(document.as_bytes()) {
            tracing::debug!(generation = outbox.generation(), error = %err, "document delivery failed");
            outbox.post(RelayMessage::console(
                Level::Error,
                format!("failed to hand document to runner: {err}"),
                0,
            ));
        }
    });
}

fn remove_scratch(path: &Path) -> std::io::Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)?;
    }
    Ok(())
}

fn relay_lines(stream: impl Read + Send + 'static, outbox: Outbox, level: Level, parse: bool) {
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for line in reader.lines() {
            let Ok(line) = line else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }
            let message = if parse {
                RelayMessage::parse(&line).unwrap_or_else(|| RelayMessage::console(level, line, 0))
            } else {
                RelayMessage::console(level, line, 0)
            };
            if !outbox.post(message) {
                break;
            }
        }
    });
}
