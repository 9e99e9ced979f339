use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::brush::BrushSize;
use crate::canvas::RedoPolicy;
use crate::storage::{CacheDirStore, DEFAULT_FILE_PREFIX};

pub const DEFAULT_PALETTE: [&str; 8] = [
    "#000000", "#FF0000", "#00FF00", "#0000FF", "#FFFF00", "#FF00FF", "#00FFFF", "#FFFFFF",
];

/// User settings, persisted through eframe storage between runs
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)] // settings saved by older versions get defaults for new fields
pub struct Settings {
    pub brush_size: BrushSize,
    pub color: String,
    pub palette: Vec<String>,
    pub redo_policy: RedoPolicy,
    /// Overrides the platform cache directory for exports
    pub export_dir: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            brush_size: BrushSize::default(),
            color: DEFAULT_PALETTE[0].to_owned(),
            palette: DEFAULT_PALETTE.iter().map(|c| (*c).to_owned()).collect(),
            redo_policy: RedoPolicy::default(),
            export_dir: None,
            file_prefix: DEFAULT_FILE_PREFIX.to_owned(),
        }
    }
}

impl Settings {
    pub fn export_store(&self) -> CacheDirStore {
        let directory = self
            .export_dir
            .clone()
            .unwrap_or_else(CacheDirStore::default_directory);
        CacheDirStore::new(directory, self.file_prefix.clone())
    }
}
