//! Flattening the canvas into a PNG and writing it off the UI thread.

use egui::{Color32, Pos2, Rect};
use futures::channel::oneshot;
use image::{Rgba, RgbaImage};
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tiny_skia::{
    ColorU8, FillRule, FilterQuality, IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap,
    PixmapPaint, Transform,
};

use crate::background::Background;
use crate::canvas::paint_layers;
use crate::error::{ExportError, ExportResult};
use crate::storage::ExportStore;
use crate::stroke::StrokeRef;
use crate::surface::Surface;

/// Point-in-time copy of everything an export draws
#[derive(Debug, Clone)]
pub struct CanvasSnapshot {
    size: [u32; 2],
    background: Option<Background>,
    strokes: Vec<StrokeRef>,
    background_color: Color32,
}

impl CanvasSnapshot {
    pub fn new(
        size: [u32; 2],
        background: Option<Background>,
        strokes: Vec<StrokeRef>,
        background_color: Color32,
    ) -> Self {
        Self {
            size,
            background,
            strokes,
            background_color,
        }
    }

    pub fn size(&self) -> [u32; 2] {
        self.size
    }

    pub fn strokes(&self) -> &[StrokeRef] {
        &self.strokes
    }

    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// Solid fill, then background image, then strokes in paint order
    pub fn render(&self, surface: &mut dyn Surface) {
        let [width, height] = self.size;
        let bounds = Rect::from_min_size(Pos2::ZERO, egui::vec2(width as f32, height as f32));
        surface.fill_rect(bounds, self.background_color);
        paint_layers(surface, self.size, self.background.as_ref(), &self.strokes);
    }

    /// Rasterize the snapshot at its canvas size
    pub fn composite(&self) -> ExportResult<RgbaImage> {
        let [width, height] = self.size;
        if width == 0 || height == 0 {
            return Err(ExportError::EmptyCanvas);
        }
        let mut surface = RasterSurface::new(width, height)?;
        self.render(&mut surface);
        Ok(surface.into_image())
    }
}

/// Software render target backed by a tiny-skia pixmap
pub struct RasterSurface {
    pixmap: Pixmap,
}

impl RasterSurface {
    pub fn new(width: u32, height: u32) -> ExportResult<Self> {
        let pixmap = Pixmap::new(width, height).ok_or(ExportError::Raster { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn into_image(self) -> RgbaImage {
        let mut image = RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        image
    }
}

fn solid_paint(color: Color32) -> Paint<'static> {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

// tiny-skia works on premultiplied pixels
fn to_pixmap(image: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height())?;
    let mut data = Vec::with_capacity(image.as_raw().len());
    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let c = ColorU8::from_rgba(r, g, b, a).premultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    Pixmap::from_vec(data, size)
}

impl Surface for RasterSurface {
    fn fill_rect(&mut self, rect: Rect, color: Color32) {
        if let Some(rect) = tiny_skia::Rect::from_ltrb(rect.min.x, rect.min.y, rect.max.x, rect.max.y)
        {
            self.pixmap
                .fill_rect(rect, &solid_paint(color), Transform::identity(), None);
        }
    }

    fn draw_image(&mut self, image: &Background, rect: Rect) {
        let Some(source) = to_pixmap(image.image()) else {
            log::warn!("Skipping empty background image");
            return;
        };
        let sx = rect.width() / source.width() as f32;
        let sy = rect.height() / source.height() as f32;
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        self.pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &paint,
            Transform::from_row(sx, 0.0, 0.0, sy, rect.min.x, rect.min.y),
            None,
        );
    }

    fn draw_polyline(&mut self, points: &[Pos2], color: Color32, width: f32) {
        let paint = solid_paint(color);
        match points {
            [] => {}
            [dot] => {
                if let Some(path) = PathBuilder::from_circle(dot.x, dot.y, width / 2.0) {
                    self.pixmap.fill_path(
                        &path,
                        &paint,
                        FillRule::Winding,
                        Transform::identity(),
                        None,
                    );
                }
            }
            [first, rest @ ..] => {
                let mut pb = PathBuilder::new();
                pb.move_to(first.x, first.y);
                for point in rest {
                    pb.line_to(point.x, point.y);
                }
                if let Some(path) = pb.finish() {
                    let stroke = tiny_skia::Stroke {
                        width,
                        line_cap: LineCap::Round,
                        line_join: LineJoin::Round,
                        ..Default::default()
                    };
                    self.pixmap
                        .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
                }
            }
        }
    }
}

pub fn encode_png(image: &RgbaImage) -> ExportResult<Vec<u8>> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
    Ok(bytes)
}

/// Composite, encode and persist a snapshot. Runs on the export worker.
pub fn export_snapshot(snapshot: &CanvasSnapshot, store: &dyn ExportStore) -> ExportResult<PathBuf> {
    let started = Instant::now();
    let image = snapshot.composite()?;
    let bytes = encode_png(&image)?;
    let path = store.persist(&bytes)?;
    log::info!(
        "Exported {} strokes to {} in {:?}",
        snapshot.strokes().len(),
        path.display(),
        started.elapsed()
    );
    Ok(path)
}

/// Runs at most one export at a time on a background thread.
///
/// A request made while another export is in flight is rejected with
/// [`ExportError::Busy`]. The job stays in flight until its result has been
/// taken with [`Exporter::poll`] or [`Exporter::wait`].
pub struct Exporter {
    store: Arc<dyn ExportStore>,
    in_flight: Option<oneshot::Receiver<ExportResult<PathBuf>>>,
}

impl Exporter {
    pub fn new(store: Arc<dyn ExportStore>) -> Self {
        Self {
            store,
            in_flight: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn set_store(&mut self, store: Arc<dyn ExportStore>) {
        self.store = store;
    }

    pub fn start(&mut self, snapshot: CanvasSnapshot) -> ExportResult<()> {
        if self.is_busy() {
            log::warn!("Export requested while another export is running");
            return Err(ExportError::Busy);
        }

        let (sender, receiver) = oneshot::channel();
        let store = Arc::clone(&self.store);
        std::thread::Builder::new()
            .name("export".to_owned())
            .spawn(move || {
                let result = export_snapshot(&snapshot, store.as_ref());
                if let Err(err) = &result {
                    log::error!("Export failed: {}", err);
                }
                // The receiver may have been dropped with the app
                let _ = sender.send(result);
            })?;

        self.in_flight = Some(receiver);
        Ok(())
    }

    /// Non-blocking; returns the result once the running export finishes
    pub fn poll(&mut self) -> Option<ExportResult<PathBuf>> {
        let receiver = self.in_flight.as_mut()?;
        let outcome = match receiver.try_recv() {
            Ok(Some(result)) => result,
            Ok(None) => return None,
            Err(oneshot::Canceled) => Err(ExportError::WorkerLost),
        };
        self.in_flight = None;
        Some(outcome)
    }

    /// Block until the running export finishes
    pub fn wait(&mut self) -> Option<ExportResult<PathBuf>> {
        let receiver = self.in_flight.take()?;
        Some(futures::executor::block_on(receiver).unwrap_or(Err(ExportError::WorkerLost)))
    }
}
