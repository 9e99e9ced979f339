use drawing_app::background::Background;
use drawing_app::canvas::RedoPolicy;
use drawing_app::controller::{ScreenController, UiAction};
use drawing_app::error::{ActionError, ExportError, ExportResult};
use drawing_app::input::{InputEvent, InputLocation};
use drawing_app::storage::{CacheDirStore, ExportStore};
use egui::pos2;
use image::{Rgba, RgbaImage};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, mpsc};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "drawing_app_export_{}_{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}

fn controller_in(dir: &PathBuf) -> ScreenController {
    let mut controller = ScreenController::new(
        RedoPolicy::ClearOnCommit,
        Arc::new(CacheDirStore::new(dir, "DrawingApp")),
    );
    controller.canvas_mut().resize(100, 60);
    controller
}

fn drag(controller: &mut ScreenController, from: (f32, f32), to: (f32, f32)) {
    let at = |(x, y): (f32, f32)| InputLocation {
        position: pos2(x, y),
        is_in_canvas: true,
    };
    controller.handle_input(&InputEvent::PointerDown { location: at(from) });
    controller.handle_input(&InputEvent::PointerMove {
        location: at(to),
        primary_held: true,
    });
    controller.handle_input(&InputEvent::PointerUp { location: at(to) });
}

fn read_png(path: &PathBuf) -> RgbaImage {
    image::open(path).unwrap().to_rgba8()
}

/// Holds every write until the test releases it
struct GatedStore {
    gate: Mutex<mpsc::Receiver<()>>,
    inner: CacheDirStore,
}

impl ExportStore for GatedStore {
    fn persist(&self, png: &[u8]) -> ExportResult<PathBuf> {
        let _ = self.gate.lock().unwrap().recv();
        self.inner.persist(png)
    }
}

struct FailingStore;

impl ExportStore for FailingStore {
    fn persist(&self, _png: &[u8]) -> ExportResult<PathBuf> {
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
    }
}

#[test]
fn test_export_without_background_is_white_plus_strokes() {
    let dir = scratch_dir("plain");
    let mut controller = controller_in(&dir);
    controller.apply(UiAction::SetColor("#FF0000".to_owned())).unwrap();
    drag(&mut controller, (10.0, 30.0), (90.0, 30.0));

    controller.apply(UiAction::Export).unwrap();
    let path = controller.wait_for_export().unwrap().unwrap();

    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("DrawingApp"));
    assert!(name.ends_with(".png"));

    let image = read_png(&path);
    assert_eq!(image.dimensions(), (100, 60));
    assert_eq!(image.get_pixel(1, 1), &Rgba([255, 255, 255, 255]));
    assert_eq!(image.get_pixel(50, 30), &Rgba([255, 0, 0, 255]));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_export_composites_background_then_strokes() {
    let dir = scratch_dir("background");
    let mut controller = controller_in(&dir);
    let green = RgbaImage::from_pixel(10, 6, Rgba([0, 200, 0, 255]));
    controller
        .apply(UiAction::SetBackground(Background::new(green)))
        .unwrap();
    controller.apply(UiAction::SetColor("blue".to_owned())).unwrap();
    drag(&mut controller, (50.0, 5.0), (50.0, 55.0));

    controller.apply(UiAction::Export).unwrap();
    let image = read_png(&controller.wait_for_export().unwrap().unwrap());

    assert_eq!(image.get_pixel(10, 30), &Rgba([0, 200, 0, 255]));
    assert_eq!(image.get_pixel(50, 30), &Rgba([0, 0, 255, 255]));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_export_uses_snapshot_and_rejects_overlap() {
    let dir = scratch_dir("snapshot");
    let (release, gate) = mpsc::channel();
    let mut controller = controller_in(&dir);
    controller.set_export_store(Arc::new(GatedStore {
        gate: Mutex::new(gate),
        inner: CacheDirStore::new(&dir, "DrawingApp"),
    }));

    controller.apply(UiAction::SetColor("red".to_owned())).unwrap();
    drag(&mut controller, (10.0, 10.0), (90.0, 10.0));
    controller.apply(UiAction::Export).unwrap();
    assert!(controller.is_exporting());

    // Drawn after the snapshot was taken
    drag(&mut controller, (10.0, 50.0), (90.0, 50.0));

    let second = controller.apply(UiAction::Export);
    assert!(matches!(second, Err(ActionError::Export(ExportError::Busy))));
    assert!(controller.poll_export().is_none());

    release.send(()).unwrap();
    let path = controller.wait_for_export().unwrap().unwrap();
    assert!(!controller.is_exporting());

    let image = read_png(&path);
    assert_eq!(image.get_pixel(50, 10), &Rgba([255, 0, 0, 255]));
    assert_eq!(image.get_pixel(50, 50), &Rgba([255, 255, 255, 255]));
    assert_eq!(controller.canvas().committed().len(), 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn test_failed_export_leaves_canvas_untouched() {
    let dir = scratch_dir("failing");
    let mut controller = controller_in(&dir);
    controller.set_export_store(Arc::new(FailingStore));
    drag(&mut controller, (10.0, 10.0), (20.0, 20.0));

    controller.apply(UiAction::Export).unwrap();
    let result = controller.wait_for_export().unwrap();
    assert!(matches!(result, Err(ExportError::Io(_))));
    assert_eq!(controller.canvas().committed().len(), 1);

    // A new export can start once the failure has been reported
    controller.apply(UiAction::Export).unwrap();
    assert!(controller.wait_for_export().unwrap().is_err());
}

#[test]
fn test_export_of_unsized_canvas_fails() {
    let dir = scratch_dir("unsized");
    let mut controller = controller_in(&dir);
    controller.canvas_mut().resize(0, 0);

    controller.apply(UiAction::Export).unwrap();
    let result = controller.wait_for_export().unwrap();
    assert!(matches!(result, Err(ExportError::EmptyCanvas)));
    assert!(!dir.exists());
}
