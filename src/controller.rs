use egui::Key;
use std::path::PathBuf;
use std::sync::Arc;

use crate::background::Background;
use crate::brush::BrushSize;
use crate::canvas::{DEFAULT_COLOR, RedoPolicy, StrokeCanvas};
use crate::color::to_hex;
use crate::error::{ActionError, CanvasError, ExportResult};
use crate::export::Exporter;
use crate::input::InputEvent;
use crate::storage::ExportStore;

/// Actions triggered from the tools panel
#[derive(Debug, Clone)]
pub enum UiAction {
    Undo,
    Redo,
    SetBrushSize(BrushSize),
    SetColor(String),
    SetBackground(Background),
    ClearBackground,
    Export,
}

/// Routes input and UI actions to the stroke canvas and runs exports
pub struct ScreenController {
    canvas: StrokeCanvas,
    exporter: Exporter,
    brush_size: BrushSize,
    color: String,
}

impl ScreenController {
    pub fn new(redo_policy: RedoPolicy, store: Arc<dyn ExportStore>) -> Self {
        let mut canvas = StrokeCanvas::new(redo_policy);
        let brush_size = BrushSize::default();
        // Built-in sizes are always valid
        let _ = canvas.set_brush_size(brush_size.logical());

        Self {
            canvas,
            exporter: Exporter::new(store),
            brush_size,
            color: to_hex(DEFAULT_COLOR),
        }
    }

    pub fn canvas(&self) -> &StrokeCanvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut StrokeCanvas {
        &mut self.canvas
    }

    pub fn brush_size(&self) -> BrushSize {
        self.brush_size
    }

    /// The last color value accepted by the canvas
    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn is_exporting(&self) -> bool {
        self.exporter.is_busy()
    }

    pub fn set_export_store(&mut self, store: Arc<dyn ExportStore>) {
        self.exporter.set_store(store);
    }

    /// Forward an input event. Returns true if the canvas needs a repaint.
    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { location } if location.is_in_canvas => {
                self.canvas
                    .begin_stroke(location.position.x, location.position.y);
                true
            }
            InputEvent::PointerDown { .. } => false,
            InputEvent::PointerMove {
                location,
                primary_held,
            } => {
                if *primary_held && self.canvas.is_drawing() {
                    self.canvas
                        .extend_stroke(location.position.x, location.position.y);
                    true
                } else {
                    false
                }
            }
            InputEvent::PointerUp { .. } => self.canvas.commit_stroke(),
            InputEvent::KeyDown { key, modifiers } if modifiers.command => match key {
                Key::Z if modifiers.shift => self.redo(),
                Key::Z => self.undo(),
                Key::Y => self.redo(),
                _ => false,
            },
            InputEvent::KeyDown { .. } => false,
        }
    }

    pub fn apply(&mut self, action: UiAction) -> Result<(), ActionError> {
        match action {
            UiAction::Undo => {
                self.undo();
            }
            UiAction::Redo => {
                self.redo();
            }
            UiAction::SetBrushSize(size) => {
                self.canvas.set_brush_size(size.logical())?;
                self.brush_size = size;
                log::info!("Brush size set to {}", size.label());
            }
            UiAction::SetColor(value) => {
                if let Err(err) = self.canvas.set_color(&value) {
                    log::warn!("Rejected color {:?}: {}", value, err);
                    return Err(CanvasError::from(err).into());
                }
                log::info!("Color set to {}", value);
                self.color = value;
            }
            UiAction::SetBackground(background) => {
                log::info!(
                    "Background set ({}x{})",
                    background.width(),
                    background.height()
                );
                self.canvas.set_background(background);
            }
            UiAction::ClearBackground => {
                log::info!("Background cleared");
                self.canvas.clear_background();
            }
            UiAction::Export => self.export_image()?,
        }
        Ok(())
    }

    fn undo(&mut self) -> bool {
        let changed = self.canvas.undo();
        if changed {
            log::info!("Undo ({} strokes left)", self.canvas.committed().len());
        }
        changed
    }

    fn redo(&mut self) -> bool {
        let changed = self.canvas.redo();
        if changed {
            log::info!("Redo ({} strokes)", self.canvas.committed().len());
        }
        changed
    }

    /// Snapshot the canvas now and export it in the background
    pub fn export_image(&mut self) -> ExportResult<()> {
        let snapshot = self.canvas.snapshot();
        log::info!(
            "Starting export of {} strokes at {}x{}",
            snapshot.strokes().len(),
            snapshot.size()[0],
            snapshot.size()[1]
        );
        self.exporter.start(snapshot)
    }

    /// Result of the running export, once it has finished
    pub fn poll_export(&mut self) -> Option<ExportResult<PathBuf>> {
        self.exporter.poll()
    }

    /// Block until the running export has finished
    pub fn wait_for_export(&mut self) -> Option<ExportResult<PathBuf>> {
        self.exporter.wait()
    }
}
