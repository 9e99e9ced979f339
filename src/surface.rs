use egui::{Color32, Pos2, Rect};
use uuid::Uuid;

use crate::background::Background;

/// Drawing primitives the canvas needs from a render target.
///
/// Coordinates are canvas-local device pixels.
pub trait Surface {
    fn fill_rect(&mut self, rect: Rect, color: Color32);

    /// Draw `image` stretched to `rect`
    fn draw_image(&mut self, image: &Background, rect: Rect);

    /// Draw a connected polyline with round caps and joins.
    /// A single point is drawn as a dot of diameter `width`.
    fn draw_polyline(&mut self, points: &[Pos2], color: Color32, width: f32);
}

/// A recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        rect: Rect,
        color: Color32,
    },
    Image {
        background: Uuid,
        rect: Rect,
    },
    Polyline {
        points: Vec<Pos2>,
        color: Color32,
        width: f32,
    },
}

/// Surface that records draw calls instead of rasterizing them
#[derive(Debug, Default, Clone, PartialEq)]
pub struct DrawList {
    ops: Vec<DrawOp>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

impl Surface for DrawList {
    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn draw_image(&mut self, image: &Background, rect: Rect) {
        self.ops.push(DrawOp::Image {
            background: image.id(),
            rect,
        });
    }

    fn draw_polyline(&mut self, points: &[Pos2], color: Color32, width: f32) {
        self.ops.push(DrawOp::Polyline {
            points: points.to_vec(),
            color,
            width,
        });
    }
}
