use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub perf: bool,
    pub theme: Option<ThemeMode>,
    pub debounce_ms: Option<u64>,
    pub runner: Option<String>,
    pub out: Option<PathBuf>,
    pub share_dir: Option<PathBuf>,
    pub share_ttl_minutes: Option<u64>,
    pub base_url: Option<String>,
    pub log_cap: Option<usize>,
    pub render_debug_log: Option<PathBuf>,
}

impl ConfigFlags {
    /// Merge two flag sets; options from `other` win.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            perf: self.perf || other.perf,
            theme: other.theme.or(self.theme),
            debounce_ms: other.debounce_ms.or(self.debounce_ms),
            runner: other.runner.clone().or_else(|| self.runner.clone()),
            out: other.out.clone().or_else(|| self.out.clone()),
            share_dir: other.share_dir.clone().or_else(|| self.share_dir.clone()),
            share_ttl_minutes: other.share_ttl_minutes.or(self.share_ttl_minutes),
            base_url: other.base_url.clone().or_else(|| self.base_url.clone()),
            log_cap: other.log_cap.or(self.log_cap),
            render_debug_log: other
                .render_debug_log
                .clone()
                .or_else(|| self.render_debug_log.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("htmlreader").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("htmlreader")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("htmlreader").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("htmlreader")
                .join("config");
        }
    }

    PathBuf::from(".htmlreaderrc")
}

/// Default directory for locally stored share records.
pub fn default_share_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("LOCALAPPDATA") {
            return PathBuf::from(appdata).join("htmlreader").join("shares");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("htmlreader")
                .join("shares");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("htmlreader").join("shares");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("htmlreader")
                .join("shares");
        }
    }

    PathBuf::from(".htmlreader").join("shares")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".htmlreaderrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let mut tokens = Vec::new();
    for line in content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
    {
        // `--runner` takes the rest of its line so runner arguments survive.
        if let Some(rest) = line.strip_prefix("--runner ") {
            tokens.push(format!("--runner={}", rest.trim()));
        } else {
            tokens.extend(line.split_whitespace().map(ToOwned::to_owned));
        }
    }
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# htmlreader defaults (saved with --save)".to_string());
    if let Some(theme) = flags.theme {
        let theme_str = match theme {
            ThemeMode::Auto => "auto",
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        };
        lines.push(format!("--theme {theme_str}"));
    }
    if let Some(ms) = flags.debounce_ms {
        lines.push(format!("--debounce-ms {ms}"));
    }
    if let Some(runner) = &flags.runner {
        lines.push(format!("--runner {runner}"));
    }
    if let Some(out) = &flags.out {
        lines.push(format!("--out {}", out.display()));
    }
    if let Some(dir) = &flags.share_dir {
        lines.push(format!("--share-dir {}", dir.display()));
    }
    if let Some(minutes) = flags.share_ttl_minutes {
        lines.push(format!("--share-ttl-minutes {minutes}"));
    }
    if let Some(url) = &flags.base_url {
        lines.push(format!("--base-url {url}"));
    }
    if let Some(cap) = flags.log_cap {
        lines.push(format!("--log-cap {cap}"));
    }
    if flags.perf {
        lines.push("--perf".to_string());
    }
    if let Some(path) = &flags.render_debug_log {
        lines.push(format!("--render-debug-log {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

/// Value for `--name value` or `--name=value` at `tokens[*i]`.
///
/// Advances `i` past a separate value token.
fn flag_value<'a>(tokens: &'a [String], i: &mut usize, name: &str) -> Option<&'a str> {
    let token = tokens.get(*i)?;
    if token == name {
        let next = tokens.get(*i + 1)?;
        *i += 1;
        return Some(next.as_str());
    }
    token
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('='))
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        if tokens[i] == "--perf" {
            flags.perf = true;
        } else if let Some(value) = flag_value(tokens, &mut i, "--theme") {
            flags.theme = parse_theme(value);
        } else if let Some(value) = flag_value(tokens, &mut i, "--debounce-ms") {
            flags.debounce_ms = value.parse().ok();
        } else if let Some(value) = flag_value(tokens, &mut i, "--runner") {
            flags.runner = Some(value.to_string());
        } else if let Some(value) = flag_value(tokens, &mut i, "--out") {
            flags.out = Some(PathBuf::from(value));
        } else if let Some(value) = flag_value(tokens, &mut i, "--share-dir") {
            flags.share_dir = Some(PathBuf::from(value));
        } else if let Some(value) = flag_value(tokens, &mut i, "--share-ttl-minutes") {
            flags.share_ttl_minutes = value.parse().ok();
        } else if let Some(value) = flag_value(tokens, &mut i, "--base-url") {
            flags.base_url = Some(value.to_string());
        } else if let Some(value) = flag_value(tokens, &mut i, "--log-cap") {
            flags.log_cap = value.parse().ok();
        } else if let Some(value) = flag_value(tokens, &mut i, "--render-debug-log") {
            flags.render_debug_log = Some(PathBuf::from(value));
        }
        i += 1;
    }
    flags
}

fn parse_theme(s: &str) -> Option<ThemeMode> {
    match s {
        "auto" => Some(ThemeMode::Auto),
        "light" => Some(ThemeMode::Light),
        "dark" => Some(ThemeMode::Dark),
        _ => None,
    }
}
