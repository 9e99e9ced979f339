use eframe::egui::{self, Color32, Painter, Pos2, Rect, TextureHandle, Vec2};
use uuid::Uuid;

use crate::background::Background;
use crate::canvas::{DEFAULT_BACKGROUND_COLOR, StrokeCanvas};
use crate::surface::Surface;

/// Draws the stroke canvas with an egui painter.
///
/// The background image is uploaded once per distinct background and reused
/// every frame; strokes are re-tessellated from history on each paint.
#[derive(Default)]
pub struct Renderer {
    background_texture: Option<(Uuid, TextureHandle)>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders the canvas into `rect`
    ///
    /// Args:
    ///     ctx (egui::Context): used to upload the background texture
    ///     painter (egui::Painter): The painter to draw with
    ///     rect (egui::Rect): Screen rectangle the canvas occupies, in points
    ///     canvas (StrokeCanvas): the state to draw
    pub fn render(&mut self, ctx: &egui::Context, painter: &Painter, rect: Rect, canvas: &StrokeCanvas) {
        painter.rect_filled(rect, 0.0, DEFAULT_BACKGROUND_COLOR);
        self.sync_background(ctx, canvas.background());

        let mut surface = PainterSurface {
            painter,
            origin: rect.min,
            pixels_per_point: canvas.pixels_per_point(),
            background_texture: self.background_texture.as_ref(),
        };
        canvas.render(&mut surface);
    }

    fn sync_background(&mut self, ctx: &egui::Context, background: Option<&Background>) {
        let Some(background) = background else {
            self.background_texture = None;
            return;
        };
        if matches!(&self.background_texture, Some((id, _)) if *id == background.id()) {
            return;
        }

        let image = background.image();
        let color_image = egui::ColorImage::from_rgba_unmultiplied(
            [image.width() as usize, image.height() as usize],
            image.as_raw(),
        );
        let name = format!("background_{}", background.id());
        let handle = ctx.load_texture(name, color_image, egui::TextureOptions::LINEAR);
        log::debug!("Uploaded background texture {}", background.id());
        self.background_texture = Some((background.id(), handle));
    }
}

/// [`Surface`] over an egui painter; converts device pixels back to points
struct PainterSurface<'a> {
    painter: &'a Painter,
    origin: Pos2,
    pixels_per_point: f32,
    background_texture: Option<&'a (Uuid, TextureHandle)>,
}

impl PainterSurface<'_> {
    fn to_screen(&self, pos: Pos2) -> Pos2 {
        self.origin + pos.to_vec2() / self.pixels_per_point
    }

    fn to_screen_rect(&self, rect: Rect) -> Rect {
        Rect::from_min_max(self.to_screen(rect.min), self.to_screen(rect.max))
    }
}

impl Surface for PainterSurface<'_> {
    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        self.painter.rect_filled(self.to_screen_rect(rect), 0.0, color);
    }

    fn draw_image(&mut self, image: &Background, rect: Rect) {
        match self.background_texture {
            Some((id, texture)) if *id == image.id() => {
                let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
                self.painter
                    .image(texture.id(), self.to_screen_rect(rect), uv, Color32::WHITE);
            }
            _ => log::warn!("No texture uploaded for background {}", image.id()),
        }
    }

    fn draw_polyline(&mut self, points: &[Pos2], color: Color32, width: f32) {
        let width = width / self.pixels_per_point;
        let radius = width / 2.0;
        let screen: Vec<Pos2> = points.iter().map(|p| self.to_screen(*p)).collect();

        match screen.as_slice() {
            [] => {}
            [dot] => {
                self.painter.circle_filled(*dot, radius, color);
            }
            [first, .., last] => {
                self.painter
                    .add(egui::Shape::line(screen.clone(), egui::Stroke::new(width, color)));
                // Round caps
                self.painter.circle_filled(*first, radius, color);
                self.painter.circle_filled(*last, radius, color);
            }
        }
    }
}

/// Canvas size in device pixels for a rect given in points
pub fn device_size(rect: Rect, pixels_per_point: f32) -> [u32; 2] {
    let size: Vec2 = rect.size() * pixels_per_point;
    [size.x.round().max(0.0) as u32, size.y.round().max(0.0) as u32]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::RedoPolicy;

    #[test]
    fn test_device_size() {
        let rect = Rect::from_min_size(Pos2::new(10.0, 10.0), egui::vec2(100.5, 50.0));
        assert_eq!(device_size(rect, 1.0), [101, 50]);
        assert_eq!(device_size(rect, 2.0), [201, 100]);
        assert_eq!(device_size(Rect::NOTHING, 1.0), [0, 0]);
    }

    #[test]
    fn test_render_basics() {
        let ctx = egui::Context::default();
        let layer_id = egui::LayerId::background();
        let rect = Rect::from_min_size(Pos2::ZERO, egui::vec2(100.0, 100.0));
        let painter = Painter::new(ctx.clone(), layer_id, rect);

        let mut canvas = StrokeCanvas::new(RedoPolicy::ClearOnCommit);
        canvas.resize(100, 100);
        canvas.begin_stroke(10.0, 10.0);
        canvas.extend_stroke(40.0, 40.0);
        canvas.commit_stroke();
        canvas.set_background(Background::new(image::RgbaImage::new(4, 4)));

        let mut renderer = Renderer::new();
        renderer.render(&ctx, &painter, rect, &canvas);
        assert!(renderer.background_texture.is_some());

        canvas.clear_background();
        renderer.render(&ctx, &painter, rect, &canvas);
        assert!(renderer.background_texture.is_none());
    }
}
