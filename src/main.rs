//! htmlreader - a terminal-hosted live HTML/CSS/JS playground.
//!
//! # Usage
//!
//! ```bash
//! htmlreader watch site/
//! htmlreader watch site/ --runner "preview-runner --headless"
//! htmlreader share site/
//! htmlreader open "http://localhost:8080/share?id=..." --print
//! htmlreader new demo --template card-grid
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use url::Url;

use htmlreader::app::{App, DEFAULT_DEBOUNCE_MS, default_base_url};
use htmlreader::compose::{ComposeOptions, compose_with};
use htmlreader::config::{
    ConfigFlags, ThemeMode, clear_config_flags, default_share_dir, global_config_path,
    load_config_flags, local_override_path, parse_flag_tokens, save_config_flags,
};
use htmlreader::diagnostics::DEFAULT_LOG_CAP;
use htmlreader::perf;
use htmlreader::project::{self, ARCHIVE_NAME};
use htmlreader::share::{
    DEFAULT_SHARE_TTL, LocalShareStore, ShareError, ShareStore, expired_notice, share_id_from,
    share_url, ttl_from_minutes,
};
use htmlreader::source::SourceSet;
use htmlreader::templates::{self, TEMPLATES, default_sources};

/// A live HTML/CSS/JS playground for the terminal
#[derive(Parser, Debug)]
#[command(name = "htmlreader", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Palette for the terminal UI
    #[arg(long, value_enum, global = true)]
    theme: Option<ThemeMode>,

    /// Quiet period after the last edit before the preview updates
    #[arg(long, value_name = "MS", global = true)]
    debounce_ms: Option<u64>,

    /// Render previews through this runner command instead of a file
    #[arg(long, value_name = "CMD", global = true)]
    runner: Option<String>,

    /// Where the preview snapshot is written when no runner is set
    #[arg(long, value_name = "PATH", global = true)]
    out: Option<PathBuf>,

    /// Directory holding share records
    #[arg(long, value_name = "PATH", global = true)]
    share_dir: Option<PathBuf>,

    /// Lifetime of share links
    #[arg(long, value_name = "N", global = true)]
    share_ttl_minutes: Option<u64>,

    /// Base URL share links are built on
    #[arg(long, value_name = "URL", global = true)]
    base_url: Option<String>,

    /// Console entries kept before the oldest are dropped
    #[arg(long, value_name = "N", global = true)]
    log_cap: Option<usize>,

    /// Enable performance logging
    #[arg(long, global = true)]
    perf: bool,

    /// Write detailed render debug events to a file
    #[arg(long, value_name = "PATH", global = true)]
    render_debug_log: Option<PathBuf>,

    /// Save current command-line flags as defaults
    #[arg(long, global = true)]
    save: bool,

    /// Clear saved defaults
    #[arg(long, global = true)]
    clear: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch a project directory and keep the preview live (default)
    Watch {
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,
    },
    /// Print or write the composed preview document
    Compose {
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Bundle the project into a zip archive
    Export {
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,
        /// Archive path (defaults to DIR/htmlreader-project.zip)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Load .html/.css/.js files or an exported archive into a project
    Import {
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
        /// Project directory to update
        #[arg(long, value_name = "DIR", default_value = ".")]
        into: PathBuf,
    },
    /// Store a snapshot of the project and print its link
    Share {
        #[arg(value_name = "DIR", default_value = ".")]
        dir: PathBuf,
    },
    /// Open a share link read-only
    Open {
        /// Share link or bare id
        #[arg(value_name = "LINK")]
        link: String,
        /// Copy the shared buffers into a project directory instead
        #[arg(long, value_name = "DIR")]
        into: Option<PathBuf>,
        /// Print the composed document and exit
        #[arg(long)]
        print: bool,
    },
    /// List starter templates
    Templates,
    /// Create a new project
    New {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
        /// Template name or slug (see `templates`)
        #[arg(long, value_name = "NAME")]
        template: Option<String>,
    },
}

/// Settings resolved from config files and the command line.
struct Settings {
    flags: ConfigFlags,
    global_path: PathBuf,
    local_path: PathBuf,
}

impl Settings {
    fn share_ttl(&self) -> Duration {
        self.flags
            .share_ttl_minutes
            .map_or(DEFAULT_SHARE_TTL, ttl_from_minutes)
    }

    fn share_store(&self) -> LocalShareStore {
        let dir = self.flags.share_dir.clone().unwrap_or_else(default_share_dir);
        LocalShareStore::new(dir, self.share_ttl())
    }

    fn base_url(&self) -> Result<Option<Url>> {
        self.flags
            .base_url
            .as_deref()
            .map(|raw| Url::parse(raw).with_context(|| format!("Invalid --base-url {raw}")))
            .transpose()
    }

    fn app(&self, project_dir: PathBuf) -> Result<App> {
        let app = App::new(project_dir)
            .with_debounce_ms(self.flags.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS))
            .with_runner(self.flags.runner.clone())
            .with_out(self.flags.out.clone())
            .with_share_dir(self.share_store().dir().to_path_buf())
            .with_share_ttl(self.share_ttl())
            .with_base_url(self.base_url()?)
            .with_log_cap(self.flags.log_cap.unwrap_or(DEFAULT_LOG_CAP))
            .with_theme(self.flags.theme.unwrap_or(ThemeMode::Auto))
            .with_config_paths(
                Some(self.global_path.clone()),
                self.local_path.exists().then(|| self.local_path.clone()),
            );
        Ok(app)
    }
}

fn sweep_shares(store: &LocalShareStore) {
    if let Err(err) = store.sweep() {
        tracing::debug!(error = %err, "share sweep failed");
    }
}

fn title_for(dir: &Path) -> ComposeOptions {
    let name = dir
        .canonicalize()
        .ok()
        .and_then(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()));
    name.map_or_else(ComposeOptions::default, |title| ComposeOptions { title })
}

fn load_project(dir: &Path) -> Result<SourceSet> {
    if !dir.is_dir() {
        bail!("Project directory not found: {}", dir.display());
    }
    project::load_dir(dir).with_context(|| format!("Failed to read project {}", dir.display()))
}

fn run_compose(dir: &Path, output: Option<&Path>) -> Result<()> {
    let sources = load_project(dir)?;
    let document = compose_with(&sources, &title_for(dir));
    match output {
        Some(path) => std::fs::write(path, document.as_str())
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            let mut out = std::io::stdout().lock();
            out.write_all(document.as_str().as_bytes())?;
            out.flush()?;
            Ok(())
        }
    }
}

fn run_export(dir: &Path, output: Option<PathBuf>) -> Result<()> {
    let sources = load_project(dir)?;
    let bytes = project::export_archive(&sources).context("Failed to build archive")?;
    let path = output.unwrap_or_else(|| dir.join(ARCHIVE_NAME));
    std::fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Exported {}", path.display());
    Ok(())
}

fn run_import(files: &[PathBuf], into: &Path) -> Result<()> {
    let mut sources = project::load_dir(into)
        .with_context(|| format!("Failed to read project {}", into.display()))?;
    let (archives, loose): (Vec<_>, Vec<_>) = files
        .iter()
        .cloned()
        .partition(|path| path.extension().is_some_and(|ext| ext == "zip"));

    let mut applied = Vec::new();
    for archive in &archives {
        let bytes = std::fs::read(archive)
            .with_context(|| format!("Failed to read {}", archive.display()))?;
        let imported = project::import_archive(&bytes)
            .with_context(|| format!("Failed to import {}", archive.display()))?;
        for language in htmlreader::source::Language::ALL {
            sources.set(language, imported.get(language));
            applied.push(language);
        }
    }
    applied.extend(project::import_paths(&mut sources, &loose).context("Failed to import files")?);

    if applied.is_empty() {
        bail!("No .html, .css, .js or .zip files given");
    }
    project::write_dir(into, &sources)
        .with_context(|| format!("Failed to write project {}", into.display()))?;
    applied.sort();
    applied.dedup();
    let names: Vec<_> = applied.iter().map(|l| l.file_name()).collect();
    println!("Updated {} in {}", names.join(", "), into.display());
    Ok(())
}

fn run_share(settings: &Settings, dir: &Path) -> Result<()> {
    let sources = load_project(dir)?;
    let store = settings.share_store();
    sweep_shares(&store);
    let record = store.create(&sources).context("Failed to store snapshot")?;
    let base = match settings.base_url()? {
        Some(url) => url,
        None => default_base_url().context("Invalid default share URL")?,
    };
    println!("{}", share_url(&base, &record.id));
    println!(
        "Valid for {} minutes.",
        settings.share_ttl().as_secs() / 60
    );
    Ok(())
}

fn run_open(settings: &Settings, link: &str, into: Option<&Path>, print: bool) -> Result<()> {
    let store = settings.share_store();
    sweep_shares(&store);
    let resolved = share_id_from(link)
        .ok_or(ShareError::NotFound)
        .and_then(|id| store.resolve(&id));
    let record = match resolved {
        Ok(record) => record,
        Err(ShareError::NotFound) => bail!("{}", expired_notice(settings.share_ttl())),
        Err(err) => return Err(err).context("Failed to open share link"),
    };

    if let Some(dir) = into {
        project::write_dir(dir, &record.sources)
            .with_context(|| format!("Failed to write project {}", dir.display()))?;
        println!("Copied shared project into {}", dir.display());
        return Ok(());
    }
    if print {
        let document = compose_with(&record.sources, &ComposeOptions::default());
        let mut out = std::io::stdout().lock();
        out.write_all(document.as_str().as_bytes())?;
        out.flush()?;
        return Ok(());
    }

    let cwd = std::env::current_dir().context("Failed to resolve current directory")?;
    let mut app = settings
        .app(cwd)?
        .with_shared_sources(Some(record.sources));
    app.run().context("Application error")
}

fn run_templates() {
    for template in TEMPLATES {
        println!("{:<14} {:<14} {}", template.slug(), template.name, template.description);
    }
}

fn run_new(dir: &Path, template: Option<&str>) -> Result<()> {
    let sources = match template {
        Some(name) => templates::find(name)
            .map(templates::Template::sources)
            .with_context(|| format!("Unknown template {name}; see `htmlreader templates`"))?,
        None => default_sources(),
    };
    if project::load_dir(dir).is_ok_and(|existing| !existing.is_empty()) {
        bail!("{} already contains a project", dir.display());
    }
    project::write_dir(dir, &sources)
        .with_context(|| format!("Failed to create project {}", dir.display()))?;
    println!("Created {}", dir.display());
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let settings = Settings {
        flags: file_flags.union(&cli_flags),
        global_path,
        local_path,
    };

    perf::set_enabled(settings.flags.perf);
    let render_debug_log_path = settings
        .flags
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("HTMLREADER_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        tracing::warn!(
            path = %render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            error = %err,
            "failed to initialize render debug log"
        );
    }

    match cli.command.unwrap_or(Command::Watch {
        dir: PathBuf::from("."),
    }) {
        Command::Watch { dir } => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let mut app = settings.app(dir)?;
            app.run().context("Application error")
        }
        Command::Compose { dir, output } => run_compose(&dir, output.as_deref()),
        Command::Export { dir, output } => run_export(&dir, output),
        Command::Import { files, into } => run_import(&files, &into),
        Command::Share { dir } => run_share(&settings, &dir),
        Command::Open { link, into, print } => {
            run_open(&settings, &link, into.as_deref(), print)
        }
        Command::Templates => {
            run_templates();
            Ok(())
        }
        Command::New { dir, template } => run_new(&dir, template.as_deref()),
    }
}
