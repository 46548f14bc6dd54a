//! Diagnostics relayed out of the isolated preview.
//!
//! The shim posts one [`RelayMessage`] per console call. The host tags each
//! one with the render [`Generation`] that produced it and appends it to a
//! capped [`DiagnosticLog`]. Messages from a superseded generation are still
//! recorded but flagged stale so they never pass as current output.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::compose::RELAY_TYPE;

/// Monotonically increasing id assigned to each render.
pub type Generation = u64;

/// Default number of events kept in the log.
pub const DEFAULT_LOG_CAP: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Log,
    Info,
    Warn,
    Error,
}

impl Level {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Wire form of one console call: `{type:"console", level, args, sequence}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub level: Level,
    #[serde(default)]
    pub args: String,
    pub sequence: u64,
}

impl RelayMessage {
    pub fn console(level: Level, args: impl Into<String>, sequence: u64) -> Self {
        Self {
            kind: RELAY_TYPE.to_string(),
            level,
            args: args.into(),
            sequence,
        }
    }

    /// Parse one JSON line. Anything that is not a console relay message
    /// returns `None`.
    pub fn parse(line: &str) -> Option<Self> {
        serde_json::from_str::<Self>(line.trim())
            .ok()
            .filter(|msg| msg.kind == RELAY_TYPE)
    }
}

/// A relay message stamped with the generation of the context that sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub generation: Generation,
    pub message: RelayMessage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub level: Level,
    pub message: String,
    pub sequence: u64,
    pub generation: Generation,
    /// Arrived after a newer render had already started.
    pub stale: bool,
}

/// Ordered, capped log of diagnostic events.
#[derive(Debug, Clone)]
pub struct DiagnosticLog {
    events: VecDeque<DiagnosticEvent>,
    cap: usize,
    current: Generation,
    evicted: usize,
}

impl Default for DiagnosticLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAP)
    }
}

impl DiagnosticLog {
    pub fn new(cap: usize) -> Self {
        Self {
            events: VecDeque::new(),
            cap: cap.max(1),
            current: 0,
            evicted: 0,
        }
    }

    /// Record that a new render generation has started.
    pub const fn begin_generation(&mut self, generation: Generation) {
        if generation > self.current {
            self.current = generation;
        }
    }

    pub const fn current_generation(&self) -> Generation {
        self.current
    }

    /// Append an incoming message, evicting the oldest entry once full.
    pub fn push(&mut self, envelope: Envelope) -> &DiagnosticEvent {
        let stale = envelope.generation < self.current;
        if self.events.len() == self.cap {
            self.events.pop_front();
            self.evicted += 1;
        }
        self.events.push_back(DiagnosticEvent {
            level: envelope.message.level,
            message: envelope.message.args,
            sequence: envelope.message.sequence,
            generation: envelope.generation,
            stale,
        });
        &self.events[self.events.len() - 1]
    }

    pub fn clear(&mut self) {
        self.events.clear();
        self.evicted = 0;
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events dropped to honor the cap since the last clear.
    pub const fn evicted(&self) -> usize {
        self.evicted
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DiagnosticEvent> {
        self.events.iter()
    }

    /// Events for the log panel. Stale events are hidden unless requested.
    pub fn visible(&self, include_stale: bool) -> impl DoubleEndedIterator<Item = &DiagnosticEvent> {
        self.events
            .iter()
            .filter(move |event| include_stale || !event.stale)
    }

    pub fn count_level(&self, level: Level) -> usize {
        self.events
            .iter()
            .filter(|event| !event.stale && event.generation == self.current)
            .filter(|event| event.level == level)
            .count()
    }
}
