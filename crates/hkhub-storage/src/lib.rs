// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod adapted;

pub use adapted::{JsonAdaptedClient, JsonAdaptedDetails, JsonSerializableClientBook};

use anyhow::{Context, Result, anyhow, bail};
use hkhub_app::ClientBook;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const APP_NAME: &str = "hkhub";
pub const BOOK_FILE_NAME: &str = "clients.json";
pub const BOOK_VERSION: i64 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// A stored value failed model validation.
    IllegalValue(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IllegalValue(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for StorageError {}

/// The client book as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonClientBookStorage {
    path: PathBuf,
}

impl JsonClientBookStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when the file does not exist yet.
    pub fn read(&self) -> Result<Option<ClientBook>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "client book not found");
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read client book {}", self.path.display()))?;
        let document: JsonSerializableClientBook = serde_json::from_str(&raw)
            .with_context(|| format!("parse client book {}", self.path.display()))?;
        let book = document
            .to_model_type()
            .with_context(|| format!("load client book {}", self.path.display()))?;
        debug!(path = %self.path.display(), clients = book.len(), "loaded client book");
        Ok(Some(book))
    }

    pub fn read_or_default(&self) -> Result<ClientBook> {
        Ok(self.read()?.unwrap_or_default())
    }

    /// Writes to a sibling temp file first so a failed save leaves the old
    /// book intact.
    pub fn save(&self, book: &ClientBook) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("create book directory {}", parent.display()))?;
        }

        let document = JsonSerializableClientBook::from_model(book);
        let mut json = serde_json::to_string_pretty(&document)
            .with_context(|| format!("serialize client book {}", self.path.display()))?;
        json.push('\n');

        let staging = staging_path(&self.path)?;
        fs::write(&staging, json)
            .with_context(|| format!("write client book {}", staging.display()))?;
        fs::rename(&staging, &self.path).with_context(|| {
            format!(
                "replace client book {} with {}",
                self.path.display(),
                staging.display()
            )
        })?;
        debug!(path = %self.path.display(), clients = book.len(), "saved client book");
        Ok(())
    }
}

/// `HKHUB_BOOK_PATH` if set, otherwise `clients.json` under the platform's
/// local data directory.
pub fn default_book_path() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("HKHUB_BOOK_PATH") {
        let override_path = PathBuf::from(override_path);
        validate_book_path(&override_path.to_string_lossy())
            .context("invalid HKHUB_BOOK_PATH")?;
        return Ok(override_path);
    }

    let data_root = dirs::data_local_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set HKHUB_BOOK_PATH to a writable client book path")
    })?;

    let app_dir = data_root.join(APP_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("create data directory {}", app_dir.display()))?;
    Ok(app_dir.join(BOOK_FILE_NAME))
}

/// A client book path must be a local `.json` file.
pub fn validate_book_path(path: &str) -> Result<()> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        bail!("client book path must not be empty");
    }

    // A single-letter prefix is a drive (`C:\...`), not a scheme.
    if let Some((scheme, _)) = trimmed.split_once(':')
        && scheme.len() > 1
        && scheme.starts_with(|ch: char| ch.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
    {
        bail!(
            "client book path {path:?} looks like a URI ({scheme}:); pass a filesystem path instead"
        );
    }

    let names_directory = trimmed.ends_with('/') || trimmed.ends_with(std::path::MAIN_SEPARATOR);
    let is_json = Path::new(trimmed)
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
    if names_directory || !is_json {
        bail!("client book path {path:?} must name a .json file");
    }

    Ok(())
}

fn staging_path(path: &Path) -> Result<PathBuf> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow!("client book path {} has no file name", path.display()))?;
    let mut staging = file_name.to_os_string();
    staging.push(".tmp");
    Ok(path.with_file_name(staging))
}
