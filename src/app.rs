use std::sync::Arc;

use crate::config::Settings;
use crate::controller::{ScreenController, UiAction};
use crate::file_handler::FileHandler;
use crate::input::InputHandler;
use crate::panels;
use crate::renderer::Renderer;

pub struct PaintApp {
    pub(crate) controller: ScreenController,
    pub(crate) settings: Settings,
    pub(crate) renderer: Renderer,
    pub(crate) input_handler: InputHandler,
    file_handler: FileHandler,
    /// Contents of the custom color field
    pub(crate) color_input: String,
    /// Last user-facing message (export result, rejected input)
    pub(crate) status: Option<String>,
}

impl Default for PaintApp {
    fn default() -> Self {
        Self::with_settings(Settings::default())
    }
}

impl PaintApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings: Settings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        log::info!("Starting with settings: {:?}", settings);
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: Settings) -> Self {
        let store = Arc::new(settings.export_store());
        log::info!("Exports go to {}", store.directory().display());

        let mut app = Self {
            controller: ScreenController::new(settings.redo_policy, store),
            renderer: Renderer::new(),
            input_handler: InputHandler::default(),
            file_handler: FileHandler::new(),
            color_input: String::new(),
            status: None,
            settings,
        };

        // Restore the saved brush; fall back to defaults if the saved values are stale
        let brush_size = app.settings.brush_size;
        let color = app.settings.color.clone();
        app.apply(UiAction::SetBrushSize(brush_size));
        app.apply(UiAction::SetColor(color));
        app.status = None;
        app
    }

    pub fn controller(&self) -> &ScreenController {
        &self.controller
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Apply a UI action, keeping settings in sync and reporting failures
    pub fn apply(&mut self, action: UiAction) {
        if let Err(err) = self.controller.apply(action) {
            log::warn!("Action failed: {}", err);
            self.status = Some(err.to_string());
            return;
        }
        self.settings.brush_size = self.controller.brush_size();
        self.settings.color = self.controller.color().to_owned();
    }

    fn poll_export(&mut self) {
        match self.controller.poll_export() {
            Some(Ok(path)) => {
                self.status = Some(format!("Image is stored at: {}", path.display()));
            }
            Some(Err(err)) => {
                self.status = Some(format!("There was an error while storing the image: {err}"));
            }
            None => {}
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        self.file_handler.preview_files_being_dropped(ctx);
        if !self.file_handler.check_for_dropped_files(ctx) {
            return;
        }
        match self.file_handler.take_background() {
            Some(Ok(background)) => self.apply(UiAction::SetBackground(background)),
            Some(Err(err)) => {
                log::error!("{}", err);
                self.status = Some(err.to_string());
            }
            None => self.status = Some("Dropped file is not a supported image".to_owned()),
        }
    }
}

impl eframe::App for PaintApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_export();
        if self.controller.is_exporting() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        self.handle_dropped_files(ctx);

        panels::tools_panel(self, ctx);
        panels::central_panel(self, ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(result) = self.controller.wait_for_export() {
            match result {
                Ok(path) => log::info!("Export finished during shutdown: {}", path.display()),
                Err(err) => log::error!("Export failed during shutdown: {}", err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::BrushSize;

    #[test]
    fn test_settings_follow_accepted_actions() {
        let mut app = PaintApp::default();
        app.apply(UiAction::SetBrushSize(BrushSize::Small));
        app.apply(UiAction::SetColor("#FF0000".to_owned()));
        assert_eq!(app.settings().brush_size, BrushSize::Small);
        assert_eq!(app.settings().color, "#FF0000");
        assert!(app.status.is_none());
    }

    #[test]
    fn test_rejected_color_reports_status() {
        let mut app = PaintApp::default();
        app.apply(UiAction::SetColor("bogus".to_owned()));
        assert_eq!(app.settings().color, "#000000");
        assert!(app.status.as_deref().unwrap().contains("bogus"));
    }

    #[test]
    fn test_stale_saved_color_falls_back() {
        let settings = Settings {
            color: "#nothex".to_owned(),
            ..Default::default()
        };
        let app = PaintApp::with_settings(settings);
        assert_eq!(app.controller().canvas().color(), crate::canvas::DEFAULT_COLOR);
        assert_eq!(app.settings().color, "#000000");
        assert!(app.status.is_none());
    }
}
