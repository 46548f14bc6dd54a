//! Project files: directories, archives, and imports.
//!
//! A project on disk is a directory holding `index.html`, `styles.css` and
//! `script.js`. Exported archives carry exactly those three entries.

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::source::{Language, SourceSet};

/// Default file name for downloaded archives.
pub const ARCHIVE_NAME: &str = "htmlreader-project.zip";

#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("archive entry {name} is not valid UTF-8 text")]
    NotText { name: String },
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ArchiveError + '_ {
    move |source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Bundle the three buffers into a zip archive.
///
/// # Errors
/// Returns an error if the archive cannot be assembled.
pub fn export_archive(sources: &SourceSet) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for language in Language::ALL {
        writer.start_file(language.file_name(), options)?;
        writer
            .write_all(sources.get(language).as_bytes())
            .map_err(io_error(Path::new(language.file_name())))?;
    }
    Ok(writer.finish()?.into_inner())
}

/// Read an archive back into a [`SourceSet`].
///
/// Entries are mapped by extension the same way uploads are; a later entry
/// for the same buffer wins. Directories and unrecognized entries are
/// skipped.
///
/// # Errors
/// Returns an error if the bytes are not a readable zip archive or a
/// recognized entry is not UTF-8.
pub fn import_archive(bytes: &[u8]) -> Result<SourceSet, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut sources = SourceSet::default();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let Some(language) = Language::for_file(&name) else {
            continue;
        };
        let mut text = String::new();
        entry
            .read_to_string(&mut text)
            .map_err(|_| ArchiveError::NotText { name: name.clone() })?;
        sources.set(language, text);
    }
    Ok(sources)
}

/// Apply uploaded files to `sources` by extension.
///
/// Returns the buffers that were set, in upload order. Files with other
/// extensions are ignored.
pub fn import_files<'a, I>(sources: &mut SourceSet, files: I) -> Vec<Language>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut applied = Vec::new();
    for (name, content) in files {
        match Language::for_file(name) {
            Some(language) => {
                sources.set(language, content);
                applied.push(language);
            }
            None => tracing::debug!(name, "ignoring upload with unrecognized extension"),
        }
    }
    applied
}

/// Read uploaded files from disk and apply them.
///
/// # Errors
/// Returns an error if a file with a recognized extension cannot be read.
pub fn import_paths(sources: &mut SourceSet, paths: &[PathBuf]) -> Result<Vec<Language>, ArchiveError> {
    let mut loaded = Vec::with_capacity(paths.len());
    for path in paths {
        if Language::for_file(path).is_none() {
            tracing::debug!(path = %path.display(), "ignoring upload with unrecognized extension");
            continue;
        }
        let content = fs::read_to_string(path).map_err(io_error(path))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        loaded.push((name, content));
    }
    Ok(import_files(
        sources,
        loaded.iter().map(|(n, c)| (n.as_str(), c.as_str())),
    ))
}

/// Load a project directory. Missing files read as empty buffers.
///
/// # Errors
/// Returns an error if an existing project file cannot be read.
pub fn load_dir(dir: &Path) -> Result<SourceSet, ArchiveError> {
    let mut sources = SourceSet::default();
    for language in Language::ALL {
        let path = dir.join(language.file_name());
        match fs::read_to_string(&path) {
            Ok(text) => {
                sources.set(language, text);
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => return Err(ArchiveError::Io { path, source }),
        }
    }
    Ok(sources)
}

/// Write one buffer into a project directory.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn write_file(dir: &Path, language: Language, text: &str) -> Result<PathBuf, ArchiveError> {
    fs::create_dir_all(dir).map_err(io_error(dir))?;
    let path = dir.join(language.file_name());
    fs::write(&path, text).map_err(io_error(&path))?;
    Ok(path)
}

/// Write all three buffers into a project directory.
///
/// # Errors
/// Returns an error if any file cannot be written.
pub fn write_dir(dir: &Path, sources: &SourceSet) -> Result<(), ArchiveError> {
    for language in Language::ALL {
        write_file(dir, language, sources.get(language))?;
    }
    Ok(())
}
