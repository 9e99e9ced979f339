use egui::{Color32, Pos2, Rect, vec2};
use serde::{Deserialize, Serialize};

use crate::background::Background;
use crate::brush;
use crate::color::parse_color;
use crate::error::{CanvasError, ColorError};
use crate::export::CanvasSnapshot;
use crate::stroke::{StrokeBuilder, StrokeRef};
use crate::surface::Surface;

pub const DEFAULT_COLOR: Color32 = Color32::BLACK;
pub const DEFAULT_BRUSH_SIZE: f32 = 20.0;
pub const DEFAULT_BACKGROUND_COLOR: Color32 = Color32::WHITE;

/// What happens to the redo buffer when a new stroke is committed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RedoPolicy {
    /// Committing a stroke discards everything that could be redone
    #[default]
    ClearOnCommit,
    /// Undone strokes stay redoable after new strokes are committed
    Preserve,
}

/// Owns the stroke histories and the active brush.
///
/// Points and thicknesses are in canvas-local device pixels.
#[derive(Debug)]
pub struct StrokeCanvas {
    committed: Vec<StrokeRef>,
    undone: Vec<StrokeRef>,
    current: Option<StrokeBuilder>,
    color: Color32,
    brush_logical: f32,
    thickness: f32,
    pixels_per_point: f32,
    size: [u32; 2],
    background: Option<Background>,
    redo_policy: RedoPolicy,
}

impl Default for StrokeCanvas {
    fn default() -> Self {
        Self::new(RedoPolicy::default())
    }
}

impl StrokeCanvas {
    pub fn new(redo_policy: RedoPolicy) -> Self {
        Self {
            committed: Vec::new(),
            undone: Vec::new(),
            current: None,
            color: DEFAULT_COLOR,
            brush_logical: DEFAULT_BRUSH_SIZE,
            thickness: brush::logical_to_device(DEFAULT_BRUSH_SIZE, 1.0),
            pixels_per_point: 1.0,
            size: [0, 0],
            background: None,
            redo_policy,
        }
    }

    /// Start a new stroke at (x, y), discarding any unfinished one
    pub fn begin_stroke(&mut self, x: f32, y: f32) {
        if self.current.is_some() {
            log::debug!("Discarding unfinished stroke");
        }
        self.current = Some(StrokeBuilder::new(self.color, self.thickness, Pos2::new(x, y)));
    }

    pub fn extend_stroke(&mut self, x: f32, y: f32) {
        if let Some(stroke) = &mut self.current {
            stroke.add_point(Pos2::new(x, y));
        }
    }

    /// Move the current stroke into the committed history.
    /// Returns true if a stroke was committed.
    pub fn commit_stroke(&mut self) -> bool {
        let Some(builder) = self.current.take() else {
            return false;
        };
        if builder.is_empty() {
            return false;
        }

        let stroke = builder.finish();
        log::debug!(
            "Committed stroke {} ({} points)",
            stroke.id(),
            stroke.points().len()
        );
        self.committed.push(stroke);

        if self.redo_policy == RedoPolicy::ClearOnCommit {
            self.undone.clear();
        }
        true
    }

    /// Returns true if a stroke was moved to the redo buffer
    pub fn undo(&mut self) -> bool {
        match self.committed.pop() {
            Some(stroke) => {
                self.undone.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Returns true if a stroke was restored from the redo buffer
    pub fn redo(&mut self) -> bool {
        match self.undone.pop() {
            Some(stroke) => {
                self.committed.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Set the thickness for the next stroke from a logical size
    pub fn set_brush_size(&mut self, logical: f32) -> Result<(), CanvasError> {
        if !logical.is_finite() || logical <= 0.0 {
            return Err(CanvasError::InvalidBrushSize(logical));
        }
        self.brush_logical = logical;
        self.thickness = brush::logical_to_device(logical, self.pixels_per_point);
        Ok(())
    }

    /// Parse `value` and use it for the next stroke; the active color is kept on error
    pub fn set_color(&mut self, value: &str) -> Result<(), ColorError> {
        self.color = parse_color(value)?;
        Ok(())
    }

    /// Update the display density. Only strokes started afterwards are affected.
    pub fn set_display_density(&mut self, pixels_per_point: f32) {
        if !pixels_per_point.is_finite() || pixels_per_point <= 0.0 {
            return;
        }
        if pixels_per_point != self.pixels_per_point {
            self.pixels_per_point = pixels_per_point;
            self.thickness = brush::logical_to_device(self.brush_logical, pixels_per_point);
        }
    }

    /// Resize the canvas, in device pixels
    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = [width, height];
    }

    pub fn set_background(&mut self, background: Background) {
        self.background = Some(background);
    }

    pub fn clear_background(&mut self) {
        self.background = None;
    }

    /// Draw the background, the committed strokes and the current stroke
    pub fn render(&self, surface: &mut dyn Surface) {
        paint_layers(
            surface,
            self.size,
            self.background.as_ref(),
            &self.committed,
        );

        if let Some(current) = &self.current {
            if !current.is_empty() {
                surface.draw_polyline(current.points(), current.color(), current.thickness());
            }
        }
    }

    /// Copy what an export needs; the copy is unaffected by later edits
    pub fn snapshot(&self) -> CanvasSnapshot {
        CanvasSnapshot::new(
            self.size,
            self.background.clone(),
            self.committed.clone(),
            DEFAULT_BACKGROUND_COLOR,
        )
    }

    pub fn committed(&self) -> &[StrokeRef] {
        &self.committed
    }

    pub fn undone(&self) -> &[StrokeRef] {
        &self.undone
    }

    pub fn current(&self) -> Option<&StrokeBuilder> {
        self.current.as_ref()
    }

    pub fn is_drawing(&self) -> bool {
        self.current.is_some()
    }

    pub fn can_undo(&self) -> bool {
        !self.committed.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    pub fn pixels_per_point(&self) -> f32 {
        self.pixels_per_point
    }

    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }
}

/// Background (if any) stretched over the canvas, then strokes oldest to newest
pub(crate) fn paint_layers(
    surface: &mut dyn Surface,
    size: [u32; 2],
    background: Option<&Background>,
    strokes: &[StrokeRef],
) {
    if let Some(background) = background {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(size[0] as f32, size[1] as f32));
        surface.draw_image(background, rect);
    }

    for stroke in strokes {
        surface.draw_polyline(stroke.points(), stroke.color(), stroke.thickness());
    }
}
