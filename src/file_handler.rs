use eframe::egui;
use std::path::Path;

use crate::background::Background;
use crate::error::BackgroundError;

const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Turns image files dropped onto the window into canvas backgrounds
#[derive(Default)]
pub struct FileHandler {
    dropped_files: Vec<egui::DroppedFile>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect newly dropped files from the UI context.
    /// Returns true if any new files arrived.
    pub fn check_for_dropped_files(&mut self, ctx: &egui::Context) -> bool {
        ctx.input(|i| {
            if i.raw.dropped_files.is_empty() {
                false
            } else {
                self.dropped_files = i.raw.dropped_files.clone();
                true
            }
        })
    }

    /// Decode the last dropped image file; other files are skipped
    pub fn take_background(&mut self) -> Option<Result<Background, BackgroundError>> {
        let files = std::mem::take(&mut self.dropped_files);
        let file = files.iter().rev().find(|file| is_image_file(file))?;

        if let Some(bytes) = &file.bytes {
            log::info!("Loading background from memory: {} ({} bytes)", file.name, bytes.len());
            Some(Background::from_bytes(bytes))
        } else if let Some(path) = &file.path {
            log::info!("Loading background from path: {}", path.display());
            Some(Background::from_path(path))
        } else {
            log::warn!("Dropped file has no accessible data: {}", file.name);
            None
        }
    }

    /// Overlay shown while files are dragged over the window
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

        if ctx.input(|i| i.raw.hovered_files.is_empty()) {
            return;
        }

        let painter =
            ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            "Drop an image to use it as the background",
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

/// Check if a file is an image based on MIME type or extension
fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let name = match &file.path {
        Some(path) => path.as_path(),
        None => Path::new(&file.name),
    };
    has_image_extension(name)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}
