// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. share::ShareStore)
    clippy::module_name_repetitions
)]

//! # htmlreader
//!
//! A live HTML/CSS/JS playground hosted in the terminal.
//!
//! A project is three buffers (`index.html`, `styles.css`, `script.js`).
//! htmlreader watches them, and after a short quiet period:
//! - composes one self-contained preview document
//! - hands it to an isolation boundary that replaces the previous preview
//! - collects console output relayed back from the preview
//!
//! Snapshots can be shared through expiring links and exported as zip
//! archives.
//!
//! ## Architecture
//!
//! The terminal UI uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`compose`]: Preview document composition
//! - [`executor`]: Isolation boundaries and diagnostic relay
//! - [`diagnostics`]: Relay wire format and the console log
//! - [`share`]: Expiring share links
//! - [`project`]: Project directories, archives and imports
//! - [`state`]: Persisted app state
//! - [`templates`]: Starter projects
//! - [`ui`]: Terminal UI components
//! - [`watcher`]: File watching

pub mod app;
pub mod compose;
pub mod config;
pub mod debounce;
pub mod diagnostics;
pub mod executor;
pub mod perf;
pub mod project;
pub mod share;
pub mod source;
pub mod state;
pub mod templates;
pub mod ui;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::compose::{RenderDocument, compose};
    pub use crate::executor::{Executor, IsolationBoundary, PreviewStatus};
    pub use crate::share::{LocalShareStore, ShareStore};
    pub use crate::source::{Language, SourceSet};
}
