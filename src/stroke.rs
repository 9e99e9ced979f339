use egui::{Color32, Pos2};
use std::sync::Arc;
use uuid::Uuid;

// Immutable stroke for sharing
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    id: Uuid,
    points: Vec<Pos2>,
    color: Color32,
    thickness: f32,
}

// Stroke being extended by pointer movement
#[derive(Debug, Clone)]
pub struct StrokeBuilder {
    points: Vec<Pos2>,
    color: Color32,
    thickness: f32,
}

// Committed strokes are shared between the histories and export snapshots
pub type StrokeRef = Arc<Stroke>;

impl Stroke {
    pub fn new(color: Color32, thickness: f32, points: Vec<Pos2>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            color,
            thickness,
        }
    }

    pub fn new_ref(color: Color32, thickness: f32, points: Vec<Pos2>) -> StrokeRef {
        Arc::new(Self::new(color, thickness, points))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }
}

impl StrokeBuilder {
    /// Start a stroke at `start`, freezing color and thickness
    pub fn new(color: Color32, thickness: f32, start: Pos2) -> Self {
        Self {
            points: vec![start],
            color,
            thickness,
        }
    }

    pub fn add_point(&mut self, point: Pos2) {
        self.points.push(point);
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    /// Consume the builder into a shareable stroke
    pub fn finish(self) -> StrokeRef {
        Arc::new(Stroke::new(self.color, self.thickness, self.points))
    }
}
