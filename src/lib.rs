#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod background;
pub mod brush;
pub mod canvas;
pub mod color;
pub mod config;
pub mod controller;
pub mod error;
pub mod export;
pub mod file_handler;
pub mod input;
pub mod panels;
pub mod renderer;
pub mod storage;
pub mod stroke;
pub mod surface;
pub mod util;

pub use app::PaintApp;
pub use background::Background;
pub use brush::BrushSize;
pub use canvas::{RedoPolicy, StrokeCanvas};
pub use config::Settings;
pub use controller::{ScreenController, UiAction};
pub use export::{CanvasSnapshot, Exporter};
pub use renderer::Renderer;
pub use storage::{CacheDirStore, ExportStore};
pub use stroke::{Stroke, StrokeRef};
pub use surface::{DrawList, DrawOp, Surface};
